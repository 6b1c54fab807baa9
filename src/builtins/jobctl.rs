//! `jobs`, `fg`, `bg`, `wait`, `kill` (spec §4.I): built on the polling job
//! table rather than a SIGCHLD handler, so these are also where background
//! jobs actually get reaped.

use super::BuiltinOutcome;
use crate::errors::ShellError;
use crate::exec::jobs::JobStatus;
use crate::exec::process;
use crate::interpreter::Interpreter;
use nix::sys::signal::Signal;
use std::str::FromStr;

fn resolve_job_id(args: &[String], interp: &Interpreter) -> Option<u32> {
    match args.first() {
        Some(spec) => spec.strip_prefix('%').unwrap_or(spec).parse::<u32>().ok(),
        None => interp.jobs.last_id(),
    }
}

pub fn jobs(_args: &[String], interp: &mut Interpreter) -> BuiltinOutcome {
    interp.jobs.reap();
    for job in interp.jobs.list() {
        let state = match job.status {
            JobStatus::Running => "Running",
            JobStatus::Stopped => "Stopped",
            JobStatus::Done(code) => {
                if code == 0 {
                    "Done"
                } else {
                    "Exit"
                }
            }
        };
        println!("[{}]  {}  {}", job.id, state, job.command);
    }
    interp.jobs.remove_done();
    BuiltinOutcome::status(0)
}

pub fn fg(args: &[String], interp: &mut Interpreter) -> Result<BuiltinOutcome, ShellError> {
    let Some(id) = resolve_job_id(args, interp) else {
        eprintln!("hash: fg: no such job");
        return Ok(BuiltinOutcome::status(1));
    };
    let Some(job) = interp.jobs.get(id) else {
        eprintln!("hash: fg: {id}: no such job");
        return Ok(BuiltinOutcome::status(1));
    };
    println!("{}", job.command);
    let mut status = 0;
    for pid in job.pids.clone() {
        status = process::wait_for(pid)?;
    }
    interp.jobs.reap();
    interp.jobs.remove_done();
    Ok(BuiltinOutcome::status(status))
}

pub fn bg(args: &[String], interp: &mut Interpreter) -> Result<BuiltinOutcome, ShellError> {
    let Some(id) = resolve_job_id(args, interp) else {
        eprintln!("hash: bg: no such job");
        return Ok(BuiltinOutcome::status(1));
    };
    let Some(job) = interp.jobs.get(id) else {
        eprintln!("hash: bg: {id}: no such job");
        return Ok(BuiltinOutcome::status(1));
    };
    unsafe {
        libc::kill(job.pgid, libc::SIGCONT);
    }
    Ok(BuiltinOutcome::status(0))
}

pub fn wait(args: &[String], interp: &mut Interpreter) -> Result<BuiltinOutcome, ShellError> {
    if args.is_empty() {
        let pids: Vec<_> = interp.jobs.list().iter().flat_map(|j| j.pids.clone()).collect();
        let mut status = 0;
        for pid in pids {
            status = process::wait_for(pid).unwrap_or(127);
        }
        interp.jobs.reap();
        interp.jobs.remove_done();
        return Ok(BuiltinOutcome::status(status));
    }
    let Some(id) = resolve_job_id(args, interp) else {
        return Ok(BuiltinOutcome::status(127));
    };
    let Some(job) = interp.jobs.get(id) else {
        return Ok(BuiltinOutcome::status(127));
    };
    let mut status = 0;
    for pid in job.pids.clone() {
        status = process::wait_for(pid)?;
    }
    interp.jobs.reap();
    interp.jobs.remove_done();
    Ok(BuiltinOutcome::status(status))
}

pub fn kill(args: &[String]) -> BuiltinOutcome {
    let mut rest = args;
    let mut signal = libc::SIGTERM;
    if let Some(flag) = rest.first() {
        if let Some(name) = flag.strip_prefix("-") {
            let resolved = name.strip_prefix("SIG").unwrap_or(name);
            if let Ok(n) = resolved.parse::<i32>() {
                signal = n;
                rest = &rest[1..];
            } else if let Ok(sig) = Signal::from_str(&format!("SIG{}", resolved.to_ascii_uppercase())) {
                signal = sig as i32;
                rest = &rest[1..];
            }
        }
    }
    let mut status = 0;
    for arg in rest {
        match arg.parse::<libc::pid_t>() {
            Ok(pid) => {
                if unsafe { libc::kill(pid, signal) } != 0 {
                    eprintln!("hash: kill: ({pid}) - no such process");
                    status = 1;
                }
            }
            Err(_) => {
                eprintln!("hash: kill: {arg}: arguments must be process or job IDs");
                status = 1;
            }
        }
    }
    BuiltinOutcome::status(status)
}
