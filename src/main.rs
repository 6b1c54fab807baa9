//! CLI entry point (spec §6): `hash [OPTIONS] [SCRIPT [ARGS...]]`.

use clap::Parser;
use hash_shell::shell::Shell;
use std::io::{IsTerminal, Read};

#[derive(Parser)]
#[command(name = "hash", about = "A POSIX-flavored interactive shell", disable_version_flag = true)]
struct Cli {
    /// Run STRING as a command; remaining arguments become $0, $1...
    #[arg(short = 'c')]
    command_string: Option<String>,

    /// Force interactive mode
    #[arg(short = 'i')]
    force_interactive: bool,

    /// Login shell: runs startup and logout files
    #[arg(short = 'l', long = "login")]
    login: bool,

    /// Read commands from stdin; remaining arguments become positional params
    #[arg(short = 's')]
    read_stdin: bool,

    /// Print version and exit
    #[arg(short = 'v', long = "version")]
    version: bool,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    rest: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.version {
        println!("hash {}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    let status = if let Some(src) = &cli.command_string {
        let argv0 = cli.rest.first().cloned().unwrap_or_else(|| "hash".to_string());
        let args = cli.rest.get(1..).map(|s| s.to_vec()).unwrap_or_default();
        let mut shell = Shell::new(argv0, args, cli.login, cli.force_interactive);
        if cli.login {
            shell.run_startup_files();
        }
        let status = shell.run_command_string(src);
        shell.run_logout_file();
        status
    } else if cli.read_stdin {
        let mut shell = Shell::new("hash".to_string(), cli.rest.clone(), cli.login, cli.force_interactive);
        if cli.login {
            shell.run_startup_files();
        }
        let mut script = String::new();
        let _ = std::io::stdin().read_to_string(&mut script);
        let status = shell.run_command_string(&script);
        shell.run_logout_file();
        status
    } else if let Some(path) = cli.rest.first() {
        let args = cli.rest[1..].to_vec();
        let mut shell = Shell::new(path.clone(), args, cli.login, cli.force_interactive);
        if cli.login {
            shell.run_startup_files();
        }
        let status = shell.run_file(path);
        shell.run_logout_file();
        status
    } else {
        let interactive = cli.force_interactive || std::io::stdin().is_terminal();
        let mut shell = Shell::new("hash".to_string(), Vec::new(), cli.login, interactive);
        shell.run_startup_files();
        let status = if interactive {
            shell.run_interactive()
        } else {
            let mut script = String::new();
            let _ = std::io::stdin().read_to_string(&mut script);
            shell.run_command_string(&script)
        };
        shell.run_logout_file();
        status
    };

    std::process::exit(status);
}
