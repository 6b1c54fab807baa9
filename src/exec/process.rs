//! Real process spawning: `fork`/`execvp`/`waitpid` via `libc`, grounded on
//! the same raw-syscall approach as [`crate::redirect`]. A pipeline of N
//! commands forks N children, wiring each one's stdin/stdout to the pipe
//! segment on either side, then waits for all of them.

use crate::ast::RedirectionNode;
use crate::errors::{ExecError, ShellError, SpawnError};
use crate::expand::ExpansionContext;
use crate::redirect;
use std::ffi::CString;

pub type Pid = libc::pid_t;

/// One command ready to spawn: a fully expanded argv plus its redirections.
pub struct SpawnSpec<'a> {
    pub argv: Vec<String>,
    pub redirections: &'a [RedirectionNode],
    pub env: Vec<(String, String)>,
}

/// Forks and executes a single external command, connecting the given
/// stdin/stdout fds (if any) before applying redirections, then waits for it
/// and returns its exit status. `stdin_fd`/`stdout_fd` of `None` leave fd 0/1
/// untouched (inherit the shell's).
pub fn spawn_and_wait(
    spec: &SpawnSpec,
    stdin_fd: Option<libc::c_int>,
    stdout_fd: Option<libc::c_int>,
    ctx: &mut dyn ExpansionContext,
) -> Result<i32, ShellError> {
    let pid = fork_child(spec, stdin_fd, stdout_fd, ctx)?;
    wait_for(pid)
}

/// Checks the assembled argv + environment against `ARG_MAX` with a 95%
/// margin (spec §4.H), the same check the kernel itself would otherwise
/// enforce by failing `execve` with `E2BIG`. `extra_env` overrides/extends
/// the calling process's current environment, the way `VAR=val cmd` does.
pub fn exceeds_arg_max(argv: &[String], extra_env: &[(String, String)]) -> bool {
    let limit = unsafe { libc::sysconf(libc::_SC_ARG_MAX) };
    if limit <= 0 {
        return false;
    }
    let margin = (limit as f64 * 0.95) as usize;
    let argv_bytes: usize = argv.iter().map(|a| a.len() + 1).sum();
    let overridden: std::collections::HashSet<&str> = extra_env.iter().map(|(k, _)| k.as_str()).collect();
    let inherited_bytes: usize = std::env::vars()
        .filter(|(k, _)| !overridden.contains(k.as_str()))
        .map(|(k, v)| k.len() + v.len() + 2)
        .sum();
    let override_bytes: usize = extra_env.iter().map(|(k, v)| k.len() + v.len() + 2).sum();
    argv_bytes + inherited_bytes + override_bytes > margin
}

/// Forks a child, wires up any pipe fds, applies redirections, and execs.
/// Returns the child's pid to the parent; never returns in the child.
pub fn fork_child(
    spec: &SpawnSpec,
    stdin_fd: Option<libc::c_int>,
    stdout_fd: Option<libc::c_int>,
    ctx: &mut dyn ExpansionContext,
) -> Result<Pid, ShellError> {
    if exceeds_arg_max(&spec.argv, &spec.env) {
        return Err(SpawnError::ArgListTooLong.into());
    }
    let pid = unsafe { libc::fork() };
    if pid < 0 {
        return Err(SpawnError::Fork(nix::Error::last()).into());
    }
    if pid == 0 {
        if let Some(fd) = stdin_fd {
            unsafe { libc::dup2(fd, 0) };
        }
        if let Some(fd) = stdout_fd {
            unsafe { libc::dup2(fd, 1) };
        }
        if let Err(e) = redirect::apply_for_exec(spec.redirections, ctx) {
            eprintln!("hash: {e}");
            unsafe { libc::_exit(1) };
        }
        exec_argv(&spec.argv, &spec.env);
    }
    Ok(pid)
}

/// `execvp`s into `argv`, never returning on success. On failure prints a
/// POSIX-style diagnostic and exits with the spec-mandated code (127 for
/// not-found, 126 for not-executable).
fn exec_argv(argv: &[String], env: &[(String, String)]) -> ! {
    if argv.is_empty() {
        unsafe { libc::_exit(127) };
    }
    for (k, v) in env {
        std::env::set_var(k, v);
    }
    let cargs: Vec<CString> = argv.iter().map(|a| CString::new(a.as_bytes()).unwrap()).collect();
    let mut argv_ptrs: Vec<*const libc::c_char> = cargs.iter().map(|c| c.as_ptr()).collect();
    argv_ptrs.push(std::ptr::null());
    let prog = cargs[0].clone();
    unsafe {
        libc::execvp(prog.as_ptr(), argv_ptrs.as_ptr());
    }
    let err = std::io::Error::last_os_error();
    let exec_err = exec_error_for_argv0(&argv[0], &err);
    eprintln!("hash: {exec_err}");
    let code = match exec_err {
        ExecError::NotExecutable(_) => 126,
        _ => 127,
    };
    unsafe { libc::_exit(code) };
}

pub fn wait_for(pid: Pid) -> Result<i32, ShellError> {
    let mut status: libc::c_int = 0;
    loop {
        let r = unsafe { libc::waitpid(pid, &mut status, 0) };
        if r < 0 {
            let err = std::io::Error::last_os_error();
            if err.raw_os_error() == Some(libc::EINTR) {
                continue;
            }
            return Err(ShellError::Other(format!("waitpid: {err}")));
        }
        break;
    }
    Ok(decode_status(status))
}

/// Non-blocking poll used by job control to reap finished background jobs.
pub fn try_wait(pid: Pid) -> Option<i32> {
    let mut status: libc::c_int = 0;
    let r = unsafe { libc::waitpid(pid, &mut status, libc::WNOHANG) };
    if r == pid {
        Some(decode_status(status))
    } else {
        None
    }
}

pub fn decode_status(status: libc::c_int) -> i32 {
    unsafe {
        if libc::WIFEXITED(status) {
            libc::WEXITSTATUS(status)
        } else if libc::WIFSIGNALED(status) {
            128 + libc::WTERMSIG(status)
        } else {
            0
        }
    }
}

/// Maps the `errno` left behind by a failed `execvp` to the matching
/// [`ExecError`] variant, shared by the forked not-found path above and the
/// in-process `exec` builtin.
pub fn exec_error_for_argv0(name: &str, err: &std::io::Error) -> ExecError {
    match err.raw_os_error() {
        Some(libc::ENOENT) => ExecError::NotFound(name.to_string()),
        Some(libc::EACCES) => ExecError::NotExecutable(name.to_string()),
        _ => ExecError::Exec(nix::Error::last()),
    }
}
