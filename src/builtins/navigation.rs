//! `cd` (spec §4.A): updates `PWD`/`OLDPWD` alongside the real process
//! working directory, since every external command this shell spawns
//! inherits it.

use super::BuiltinOutcome;
use crate::interpreter::Interpreter;

pub fn cd(args: &[String], interp: &mut Interpreter) -> BuiltinOutcome {
    let target = match args.first().map(String::as_str) {
        None | Some("") => match interp.vars.get("HOME") {
            Some(h) => h,
            None => {
                eprintln!("hash: cd: HOME not set");
                return BuiltinOutcome::status(1);
            }
        },
        Some("-") => match interp.vars.get("OLDPWD") {
            Some(p) => {
                println!("{p}");
                p
            }
            None => {
                eprintln!("hash: cd: OLDPWD not set");
                return BuiltinOutcome::status(1);
            }
        },
        Some(dir) => dir.to_string(),
    };

    let old_pwd = std::env::current_dir().ok().map(|p| p.display().to_string());
    if let Err(e) = std::env::set_current_dir(&target) {
        eprintln!("hash: cd: {target}: {e}");
        return BuiltinOutcome::status(1);
    }
    if let Some(old) = old_pwd {
        let _ = interp.vars.set("OLDPWD", old);
    }
    if let Ok(new_pwd) = std::env::current_dir() {
        let _ = interp.vars.set("PWD", new_pwd.display().to_string());
    }
    BuiltinOutcome::status(0)
}
