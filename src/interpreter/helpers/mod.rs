//! Small pure/near-pure helpers shared by the conditional-expression and
//! `test`/`[` builtin evaluators.

pub mod file_eval;
pub mod file_tests;
pub mod numeric_compare;
pub mod string_tests;
