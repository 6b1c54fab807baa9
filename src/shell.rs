//! Top-level `Shell`: wires the parser and [`Interpreter`] together, sources
//! startup files per spec §4.L, and drives the three invocation modes
//! (`-c STRING`, script file/`-s` stdin, and the interactive REPL).

use crate::history::{History, LineSource, StdinLineSource};
use crate::interpreter::Interpreter;
use crate::parser::parse_script;

pub struct Shell {
    pub interp: Interpreter,
    pub history: History,
    pub login: bool,
    pub interactive: bool,
}

impl Shell {
    pub fn new(argv0: String, args: Vec<String>, login: bool, interactive: bool) -> Self {
        Shell {
            interp: Interpreter::new(argv0, args),
            history: History::from_env(),
            login,
            interactive,
        }
    }

    fn source_if_exists(&mut self, path: &std::path::Path) {
        if !path.is_file() {
            return;
        }
        let Ok(contents) = std::fs::read_to_string(path) else { return };
        match parse_script(&contents) {
            Ok(script) => {
                if let Err(e) = self.interp.run_script(&script) {
                    tracing::warn!(file = %path.display(), error = %e, "startup file error");
                }
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "startup file parse error");
            }
        }
    }

    /// Login shells source `/etc/profile` then the first existing of
    /// `~/.hash_profile`, `~/.hash_login`, `~/.profile`, then `~/.hashrc`;
    /// non-login interactive shells source `~/.hashrc` only.
    pub fn run_startup_files(&mut self) {
        let home = self.interp.vars.get("HOME").map(std::path::PathBuf::from);
        if self.login {
            self.source_if_exists(std::path::Path::new("/etc/profile"));
            if let Some(home) = &home {
                let candidates =
                    [".hash_profile", ".hash_login", ".profile"].map(|f| home.join(f));
                if let Some(first) = candidates.iter().find(|p| p.is_file()) {
                    self.source_if_exists(first);
                }
            }
        }
        if let Some(home) = &home {
            self.source_if_exists(&home.join(".hashrc"));
        }
    }

    pub fn run_logout_file(&mut self) {
        if !self.login {
            return;
        }
        if let Some(home) = self.interp.vars.get("HOME") {
            self.source_if_exists(&std::path::PathBuf::from(home).join(".hash_logout"));
        }
    }

    pub fn run_command_string(&mut self, src: &str) -> i32 {
        if self.interp.vars.options.verbose {
            for line in src.lines() {
                eprintln!("{line}");
            }
        }
        match parse_script(src) {
            Ok(script) => self.interp.run_top_level(&script),
            Err(e) => {
                eprintln!("hash: {e}");
                2
            }
        }
    }

    pub fn run_file(&mut self, path: &str) -> i32 {
        match std::fs::read_to_string(path) {
            Ok(contents) => self.run_command_string(&contents),
            Err(e) => {
                eprintln!("hash: {path}: {e}");
                127
            }
        }
    }

    pub fn run_interactive(&mut self) -> i32 {
        let mut source = StdinLineSource;
        let mut status = 0;
        loop {
            self.interp.jobs.reap();
            let ps1 = self.interp.vars.get("PS1").unwrap_or_else(|| "$ ".to_string());
            let Some(line) = source.read_line(&ps1) else { break };
            self.history.push(&line);
            status = self.run_command_string(&line);
        }
        let _ = self.history.persist();
        status
    }
}
