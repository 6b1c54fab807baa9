//! `eval`, `exec`, `source`/`.`, `command` (spec §4.H).

use super::BuiltinOutcome;
use crate::errors::{ExecError, ShellError};
use crate::exec::process::SpawnSpec;
use crate::flow::Flow;
use crate::interpreter::Interpreter;
use std::ffi::CString;

pub fn eval(args: &[String], interp: &mut Interpreter) -> Result<BuiltinOutcome, ShellError> {
    let src = args.join(" ");
    let script = crate::parser::parse_script(&src)?;
    let flow = interp.run_script(&script)?;
    Ok(BuiltinOutcome::flow(interp.vars.last_status, flow))
}

/// Replaces the shell process image via `execvp` when given a command; with
/// no arguments, any redirections the caller already applied simply persist
/// for the rest of the (non-restored) current scope — `exec`'s usual use as
/// a permanent fd remap for the whole script.
pub fn exec(args: &[String], interp: &mut Interpreter) -> Result<BuiltinOutcome, ShellError> {
    if args.is_empty() {
        return Ok(BuiltinOutcome::status(0));
    }
    if crate::exec::process::exceeds_arg_max(args, &[]) {
        eprintln!("hash: exec: argument list too long");
        interp.vars.last_status = 126;
        return Ok(BuiltinOutcome::status(126));
    }
    let cargs: Vec<CString> = args.iter().map(|a| CString::new(a.as_bytes()).unwrap()).collect();
    let mut argv_ptrs: Vec<*const libc::c_char> = cargs.iter().map(|c| c.as_ptr()).collect();
    argv_ptrs.push(std::ptr::null());
    unsafe {
        libc::execvp(cargs[0].as_ptr(), argv_ptrs.as_ptr());
    }
    let err = std::io::Error::last_os_error();
    let exec_err = crate::exec::process::exec_error_for_argv0(&args[0], &err);
    eprintln!("hash: exec: {exec_err}");
    let status = match exec_err {
        ExecError::NotExecutable(_) => 126,
        _ => 127,
    };
    interp.vars.last_status = status;
    Ok(BuiltinOutcome::status(status))
}

pub fn source(args: &[String], interp: &mut Interpreter) -> Result<BuiltinOutcome, ShellError> {
    let Some(path) = args.first() else {
        return Err(ShellError::Other("source: filename argument required".to_string()));
    };
    let contents = std::fs::read_to_string(path).map_err(ShellError::Io)?;
    let script = crate::parser::parse_script(&contents)?;

    let saved = interp.vars.positional.clone();
    if args.len() > 1 {
        interp.vars.positional = std::iter::once(saved[0].clone()).chain(args[1..].iter().cloned()).collect();
    }
    let result = interp.run_script(&script);
    interp.vars.positional = saved;

    let flow = result?;
    match flow {
        Flow::Return(n) => Ok(BuiltinOutcome::status(n)),
        other => Ok(BuiltinOutcome::flow(interp.vars.last_status, other)),
    }
}

/// `command [-p] name [args...]`: runs `name` bypassing function/alias
/// lookup — regular builtins still apply, external commands go straight to
/// `execvp` via the process layer.
pub fn command(args: &[String], interp: &mut Interpreter) -> Result<BuiltinOutcome, ShellError> {
    let mut rest = args;
    if rest.first().map(String::as_str) == Some("-p") {
        rest = &rest[1..];
    }
    let Some(name) = rest.first() else {
        return Ok(BuiltinOutcome::status(0));
    };
    let call_args = &rest[1..];
    if let Some(super::BuiltinClass::Regular) = super::classify(name) {
        return super::run(name, call_args, interp);
    }
    let mut argv = vec![name.clone()];
    argv.extend(call_args.iter().cloned());
    let spec = SpawnSpec { argv, redirections: &[], env: Vec::new() };
    let status = crate::exec::process::spawn_and_wait(&spec, None, None, interp)?;
    Ok(BuiltinOutcome::status(status))
}
