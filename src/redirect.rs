//! Redirection planner and applier (spec §4.E). Redirections are resolved to
//! an ordered list of `dup2` operations and applied either directly (in a
//! freshly forked child, right before `execve`) or through a [`RedirGuard`]
//! that saves and restores the affected descriptors (for builtins and
//! compound commands that run in the current process).
//!
//! Raw fd plumbing here goes through `libc` directly rather than `nix`'s
//! safe wrappers: the operations are few, their C signatures never change,
//! and it sidesteps `nix`'s fd-ownership-typed APIs for what is otherwise a
//! handful of `open`/`dup2`/`close` calls.

use crate::ast::{HereDocNode, RedirectionNode, RedirectionOperator, RedirectionTarget};
use crate::errors::{RedirectionError, ShellError};
use crate::expand::word::expand_word_single;
use crate::expand::ExpansionContext;
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;

pub type RawFd = libc::c_int;

/// Resolve each redirection's target to a concrete fd and apply it via
/// `dup2`, closing the scratch descriptor afterward. Intended for use in a
/// forked child just before `execve` — no restoration is performed.
pub fn apply_for_exec(redirs: &[RedirectionNode], ctx: &mut dyn ExpansionContext) -> Result<(), ShellError> {
    for redir in redirs {
        apply_one(redir, ctx)?;
    }
    Ok(())
}

/// Applies redirections in the current process, returning a guard that
/// restores the original descriptors on drop. Used by builtins and compound
/// commands, which must not leak fd changes past their own execution.
pub struct RedirGuard {
    saved: Vec<(RawFd, Option<RawFd>)>,
}

impl RedirGuard {
    pub fn apply(redirs: &[RedirectionNode], ctx: &mut dyn ExpansionContext) -> Result<Self, ShellError> {
        let mut saved = Vec::new();
        for redir in redirs {
            let target_fd = target_fd_of(redir);
            let backup = raw_dup(target_fd);
            saved.push((target_fd, backup));
            apply_one(redir, ctx)?;
        }
        Ok(RedirGuard { saved })
    }
}

impl Drop for RedirGuard {
    fn drop(&mut self) {
        for (fd, backup) in self.saved.drain(..) {
            match backup {
                Some(saved_fd) => {
                    let _ = raw_dup2(saved_fd, fd);
                    raw_close(saved_fd);
                }
                None => raw_close(fd),
            }
        }
    }
}

fn target_fd_of(redir: &RedirectionNode) -> RawFd {
    if let Some(fd) = redir.fd {
        return fd;
    }
    use RedirectionOperator::*;
    match redir.operator {
        Less | LessAnd | DLess | DLessDash => 0,
        _ => 1,
    }
}

fn apply_one(redir: &RedirectionNode, ctx: &mut dyn ExpansionContext) -> Result<(), ShellError> {
    let target_fd = target_fd_of(redir);
    use RedirectionOperator::*;
    match (&redir.operator, &redir.target) {
        (Less, RedirectionTarget::Word(w)) => {
            let path = expand_word_single(w, ctx)?;
            let fd = raw_open(&path, libc::O_RDONLY, 0)?;
            dup2_checked(fd, target_fd)?;
            raw_close(fd);
        }
        (Great, RedirectionTarget::Word(w)) | (Clobber, RedirectionTarget::Word(w)) => {
            let path = expand_word_single(w, ctx)?;
            if redir.operator == Great && ctx.vars().options.noclobber && std::path::Path::new(&path).exists() {
                return Err(RedirectionError::Noclobber(path).into());
            }
            let fd = raw_open(&path, libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC, 0o644)?;
            dup2_checked(fd, target_fd)?;
            raw_close(fd);
        }
        (DGreat, RedirectionTarget::Word(w)) => {
            let path = expand_word_single(w, ctx)?;
            let fd = raw_open(&path, libc::O_WRONLY | libc::O_CREAT | libc::O_APPEND, 0o644)?;
            dup2_checked(fd, target_fd)?;
            raw_close(fd);
        }
        (GreatAnd, RedirectionTarget::Word(w)) | (LessAnd, RedirectionTarget::Word(w)) => {
            let spec = expand_word_single(w, ctx)?;
            if spec == "-" {
                raw_close(target_fd);
            } else {
                let src: RawFd = spec.parse().map_err(|_| RedirectionError::Ambiguous(spec.clone()))?;
                dup2_checked(src, target_fd)?;
            }
        }
        (AndGreat, RedirectionTarget::Word(w)) => {
            let path = expand_word_single(w, ctx)?;
            let fd = raw_open(&path, libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC, 0o644)?;
            dup2_checked(fd, 1)?;
            dup2_checked(fd, 2)?;
            raw_close(fd);
        }
        (AndDGreat, RedirectionTarget::Word(w)) => {
            let path = expand_word_single(w, ctx)?;
            let fd = raw_open(&path, libc::O_WRONLY | libc::O_CREAT | libc::O_APPEND, 0o644)?;
            dup2_checked(fd, 1)?;
            dup2_checked(fd, 2)?;
            raw_close(fd);
        }
        (DLess, RedirectionTarget::HereDoc(h)) | (DLessDash, RedirectionTarget::HereDoc(h)) => {
            let body = render_heredoc_body(h, ctx)?;
            let fd = heredoc_pipe(&body)?;
            dup2_checked(fd, target_fd)?;
            raw_close(fd);
        }
        _ => return Err(RedirectionError::Ambiguous("unsupported redirection".to_string()).into()),
    }
    Ok(())
}

fn raw_open(path: &str, flags: libc::c_int, mode: libc::mode_t) -> Result<RawFd, ShellError> {
    let cpath = CString::new(std::ffi::OsStr::new(path).as_bytes())
        .map_err(|_| RedirectionError::Open(path.to_string(), std::io::Error::from_raw_os_error(libc::EINVAL)))?;
    let fd = unsafe { libc::open(cpath.as_ptr(), flags, mode as libc::c_uint) };
    if fd < 0 {
        return Err(RedirectionError::Open(path.to_string(), std::io::Error::last_os_error()).into());
    }
    Ok(fd)
}

fn dup2_checked(src: RawFd, dst: RawFd) -> Result<(), ShellError> {
    if unsafe { libc::dup2(src, dst) } < 0 {
        return Err(RedirectionError::Dup2(std::io::Error::last_os_error()).into());
    }
    Ok(())
}

fn raw_dup(fd: RawFd) -> Option<RawFd> {
    let new_fd = unsafe { libc::dup(fd) };
    if new_fd < 0 {
        None
    } else {
        Some(new_fd)
    }
}

fn raw_dup2(src: RawFd, dst: RawFd) -> Result<(), ()> {
    if unsafe { libc::dup2(src, dst) } < 0 {
        Err(())
    } else {
        Ok(())
    }
}

fn raw_close(fd: RawFd) {
    unsafe {
        libc::close(fd);
    }
}

fn render_heredoc_body(h: &HereDocNode, ctx: &mut dyn ExpansionContext) -> Result<String, ShellError> {
    let mut content = h.content.clone();
    if h.strip_tabs {
        content = content
            .lines()
            .map(|line| line.trim_start_matches('\t'))
            .collect::<Vec<_>>()
            .join("\n")
            + if content.ends_with('\n') { "\n" } else { "" };
    }
    if h.quoted {
        return Ok(content);
    }
    let word = crate::words::parse_word(&content)?;
    Ok(expand_word_single(&word, ctx)?)
}

/// Writes `body` into a pipe from a forked helper process, returning the
/// read end for the caller to `dup2` into place. Avoids blocking on the
/// pipe's buffer limit for heredocs larger than a single `write(2)`.
fn heredoc_pipe(body: &str) -> Result<RawFd, ShellError> {
    let mut fds = [0 as RawFd; 2];
    if unsafe { libc::pipe(fds.as_mut_ptr()) } < 0 {
        return Err(ShellError::Other(format!("pipe: {}", std::io::Error::last_os_error())));
    }
    let (read_fd, write_fd) = (fds[0], fds[1]);

    let pid = unsafe { libc::fork() };
    if pid < 0 {
        raw_close(read_fd);
        raw_close(write_fd);
        return Err(ShellError::Other(format!("fork: {}", std::io::Error::last_os_error())));
    }
    if pid == 0 {
        raw_close(read_fd);
        let bytes = body.as_bytes();
        let mut offset = 0usize;
        while offset < bytes.len() {
            let n = unsafe {
                libc::write(
                    write_fd,
                    bytes[offset..].as_ptr() as *const libc::c_void,
                    bytes.len() - offset,
                )
            };
            if n <= 0 {
                break;
            }
            offset += n as usize;
        }
        raw_close(write_fd);
        unsafe { libc::_exit(0) };
    }
    raw_close(write_fd);
    Ok(read_fd)
}
