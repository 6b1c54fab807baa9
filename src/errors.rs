//! Subsystem error types.
//!
//! Each kind in spec corresponds to a `thiserror` variant here. These are
//! consulted by the interpreter to decide exit codes and, under `errexit`/
//! `nounset`, whether to abort the running script. They are not printed
//! directly to the user in most cases — callers format a POSIX-style
//! `name: message` diagnostic on stderr and translate to an exit code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unexpected token near `{0}`")]
    UnexpectedToken(String),
    #[error("unterminated quote")]
    UnterminatedQuote,
    #[error("unterminated here-document (wanted `{0}`)")]
    UnterminatedHereDoc(String),
    #[error("syntax error: unexpected end of file")]
    UnexpectedEof,
    #[error("syntax error near unexpected token `{0}`")]
    SyntaxError(String),
}

#[derive(Debug, Error)]
pub enum ExpansionError {
    #[error("{0}: unbound variable")]
    UnboundVariable(String),
    #[error("{0}")]
    ParameterError(String),
    #[error("division by zero")]
    DivideByZero,
    #[error("arithmetic syntax error: {0}")]
    ArithSyntax(String),
    #[error("bad substitution")]
    BadSubstitution,
}

#[derive(Debug, Error)]
pub enum RedirectionError {
    #[error("{0}: {1}")]
    Open(String, std::io::Error),
    #[error("{0}: ambiguous redirect")]
    Ambiguous(String),
    #[error("dup2 failed: {0}")]
    Dup2(std::io::Error),
    #[error("{0}: cannot overwrite existing file")]
    Noclobber(String),
}

#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("fork failed: {0}")]
    Fork(nix::Error),
    #[error("argument list too long")]
    ArgListTooLong,
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{0}: command not found")]
    NotFound(String),
    #[error("{0}: permission denied")]
    NotExecutable(String),
    #[error("execve failed: {0}")]
    Exec(nix::Error),
}

#[derive(Debug, Error)]
pub enum ReadonlyError {
    #[error("{0}: readonly variable")]
    Assignment(String),
}

/// Top-level error union for places that need to bubble up any of the above
/// through `?` (e.g. a builtin implementation).
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Expansion(#[from] ExpansionError),
    #[error(transparent)]
    Redirection(#[from] RedirectionError),
    #[error(transparent)]
    Spawn(#[from] SpawnError),
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error(transparent)]
    Readonly(#[from] ReadonlyError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

impl ShellError {
    /// Map an error kind to the POSIX exit status spec §7 assigns it.
    pub fn exit_code(&self) -> i32 {
        match self {
            ShellError::Parse(_) => 2,
            ShellError::Expansion(_) => 1,
            ShellError::Redirection(_) => 1,
            ShellError::Spawn(SpawnError::ArgListTooLong) => 126,
            ShellError::Spawn(_) => 1,
            ShellError::Exec(ExecError::NotFound(_)) => 127,
            ShellError::Exec(ExecError::NotExecutable(_)) => 126,
            ShellError::Exec(ExecError::Exec(_)) => 127,
            ShellError::Readonly(_) => 1,
            ShellError::Io(_) => 1,
            ShellError::Other(_) => 1,
        }
    }
}
