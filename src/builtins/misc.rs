//! `times`, `type`, `hash` (spec §4.K): peripheral introspection builtins.

use super::BuiltinOutcome;
use crate::interpreter::Interpreter;

pub fn times() -> BuiltinOutcome {
    let mut tms: libc::tms = unsafe { std::mem::zeroed() };
    unsafe { libc::times(&mut tms) };
    let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) }.max(1) as f64;
    let fmt = |t: libc::clock_t| {
        let secs = t as f64 / ticks;
        format!("{}m{:.3}s", (secs / 60.0) as u64, secs % 60.0)
    };
    println!("{} {}", fmt(tms.tms_utime), fmt(tms.tms_stime));
    println!("{} {}", fmt(tms.tms_cutime), fmt(tms.tms_cstime));
    BuiltinOutcome::status(0)
}

pub fn type_cmd(args: &[String], interp: &Interpreter) -> BuiltinOutcome {
    let mut status = 0;
    for name in args {
        if interp.functions.contains(name) {
            println!("{name} is a function");
        } else if super::classify(name).is_some() {
            println!("{name} is a shell builtin");
        } else if let Some(path) = find_in_path(name) {
            println!("{name} is {path}");
        } else {
            println!("{name}: not found");
            status = 1;
        }
    }
    BuiltinOutcome::status(status)
}

pub fn hash(_args: &[String]) -> BuiltinOutcome {
    // No command-path cache is maintained; every lookup re-searches $PATH.
    BuiltinOutcome::status(0)
}

fn find_in_path(name: &str) -> Option<String> {
    if name.contains('/') {
        return std::path::Path::new(name).exists().then(|| name.to_string());
    }
    let path = std::env::var("PATH").ok()?;
    for dir in path.split(':') {
        let candidate = std::path::Path::new(dir).join(name);
        if candidate.is_file() {
            return Some(candidate.display().to_string());
        }
    }
    None
}
