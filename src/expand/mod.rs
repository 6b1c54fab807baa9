//! Expansion pipeline (spec §4.C/§4.D): tilde → command substitution →
//! arithmetic → parameter/variable → IFS word splitting → pathname
//! globbing. Each stage is grounded on the teacher's `interpreter/expansion`
//! layout, adapted to operate over typed [`crate::ast::WordPart`]s instead
//! of marker-byte strings.

pub mod arithmetic;
pub mod parameter;
pub mod pattern;
pub mod word;

use crate::ast::ScriptNode;
use crate::errors::ShellError;
use crate::vars::VarStore;

/// Everything the expansion pipeline needs from its caller: the variable
/// store, and a way to run a command-substitution body and capture its
/// stdout. Implemented by [`crate::interpreter::Interpreter`]; kept as a
/// trait so `expand` never depends on the interpreter/executor modules
/// (spec §9: no process-wide globals, explicit context threaded in).
pub trait ExpansionContext {
    fn vars(&mut self) -> &mut VarStore;
    fn run_capture(&mut self, script: &ScriptNode) -> Result<(String, i32), ShellError>;
}

pub use word::{expand_word_single, expand_word_splitting};
