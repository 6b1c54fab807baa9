//! `export`, `unset`, `readonly`, `set`, `read` (spec §4.A/§4.K).

use super::BuiltinOutcome;
use crate::errors::ShellError;
use crate::interpreter::Interpreter;
use std::io::BufRead;

fn split_name_value(arg: &str) -> (&str, Option<&str>) {
    match arg.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (arg, None),
    }
}

pub fn export(args: &[String], interp: &mut Interpreter) -> Result<BuiltinOutcome, ShellError> {
    if args.first().map(String::as_str) == Some("-p") || args.is_empty() {
        for name in interp.vars.list_exported() {
            let value = interp.vars.get(name).unwrap_or_default();
            println!("export {name}=\"{value}\"");
        }
        return Ok(BuiltinOutcome::status(0));
    }
    for arg in args {
        let (name, value) = split_name_value(arg);
        if let Some(value) = value {
            interp.vars.set(name, value)?;
        }
        interp.vars.mark_exported(name);
    }
    Ok(BuiltinOutcome::status(0))
}

pub fn unset(args: &[String], interp: &mut Interpreter) -> Result<BuiltinOutcome, ShellError> {
    let mut status = 0;
    for name in args {
        if name == "-v" || name == "-f" {
            continue;
        }
        if interp.functions.remove(name) {
            continue;
        }
        if interp.vars.unset(name).is_err() {
            eprintln!("hash: unset: {name}: readonly variable");
            status = 1;
        }
    }
    Ok(BuiltinOutcome::status(status))
}

pub fn readonly(args: &[String], interp: &mut Interpreter) -> Result<BuiltinOutcome, ShellError> {
    if args.first().map(String::as_str) == Some("-p") || args.is_empty() {
        for name in interp.vars.list_readonly() {
            let value = interp.vars.get(name).unwrap_or_default();
            println!("readonly {name}=\"{value}\"");
        }
        return Ok(BuiltinOutcome::status(0));
    }
    for arg in args {
        let (name, value) = split_name_value(arg);
        if let Some(value) = value {
            interp.vars.set(name, value)?;
        }
        interp.vars.mark_readonly(name);
    }
    Ok(BuiltinOutcome::status(0))
}

pub fn set(args: &[String], interp: &mut Interpreter) -> Result<BuiltinOutcome, ShellError> {
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        if arg == "--" {
            i += 1;
            interp.vars.positional.truncate(1);
            interp.vars.positional.extend(args[i..].iter().cloned());
            return Ok(BuiltinOutcome::status(0));
        }
        let Some(flags) = arg.strip_prefix('-').or_else(|| arg.strip_prefix('+')) else {
            break;
        };
        let enable = arg.starts_with('-');
        for flag in flags.chars() {
            apply_option(interp, flag, enable);
        }
        i += 1;
    }
    if i < args.len() {
        interp.vars.positional.truncate(1);
        interp.vars.positional.extend(args[i..].iter().cloned());
    }
    Ok(BuiltinOutcome::status(0))
}

fn apply_option(interp: &mut Interpreter, flag: char, enable: bool) {
    let opts = &mut interp.vars.options;
    match flag {
        'e' => opts.errexit = enable,
        'u' => opts.nounset = enable,
        'x' => opts.xtrace = enable,
        'v' => opts.verbose = enable,
        'C' => opts.noclobber = enable,
        'a' => opts.allexport = enable,
        'm' => opts.monitor = enable,
        'n' => opts.noexec = enable,
        _ => {}
    }
}

/// `read [-r] [-t seconds] [var...]`: reads one line from stdin, splits on
/// whitespace, assigns fields to the named variables (last variable absorbs
/// the remainder, POSIX style). With no variable names, assigns to `REPLY`.
/// `-t` polls fd 0 with a deadline before reading, returning status 1 on
/// timeout without consuming input.
pub fn read(args: &[String], interp: &mut Interpreter) -> Result<BuiltinOutcome, ShellError> {
    let mut timeout_secs: Option<f64> = None;
    let mut names: Vec<String> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-r" => i += 1,
            "-t" => {
                timeout_secs = args.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            other => {
                names.push(other.to_string());
                i += 1;
            }
        }
    }

    if let Some(secs) = timeout_secs {
        let mut pfd = libc::pollfd { fd: 0, events: libc::POLLIN, revents: 0 };
        let millis = (secs * 1000.0) as libc::c_int;
        let ready = unsafe { libc::poll(&mut pfd, 1, millis) };
        if ready <= 0 {
            return Ok(BuiltinOutcome::status(1));
        }
    }

    let mut line = String::new();
    let n = std::io::stdin().lock().read_line(&mut line).map_err(ShellError::Io)?;
    if n == 0 {
        return Ok(BuiltinOutcome::status(1));
    }
    let line = line.trim_end_matches('\n');
    let names: Vec<String> = if names.is_empty() { vec!["REPLY".to_string()] } else { names };

    let mut fields: Vec<&str> = line.split_whitespace().collect();
    let mut values: Vec<String> = Vec::with_capacity(names.len());
    for (idx, _) in names.iter().enumerate() {
        if idx + 1 == names.len() {
            values.push(fields.join(" "));
            fields.clear();
        } else if !fields.is_empty() {
            values.push(fields.remove(0).to_string());
        } else {
            values.push(String::new());
        }
    }
    for (name, value) in names.iter().zip(values) {
        interp.vars.set(name, value)?;
    }
    Ok(BuiltinOutcome::status(0))
}
