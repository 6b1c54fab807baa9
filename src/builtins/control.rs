//! `break`, `continue`, `return`, `exit` (spec §4.F): these are the only
//! builtins that produce a non-`Normal` [`Flow`].

use super::BuiltinOutcome;
use crate::flow::Flow;
use crate::interpreter::Interpreter;

fn level_arg(args: &[String]) -> u32 {
    args.first().and_then(|s| s.parse::<u32>().ok()).filter(|n| *n >= 1).unwrap_or(1)
}

pub fn break_cmd(args: &[String]) -> BuiltinOutcome {
    BuiltinOutcome::flow(0, Flow::Break(level_arg(args)))
}

pub fn continue_cmd(args: &[String]) -> BuiltinOutcome {
    BuiltinOutcome::flow(0, Flow::Continue(level_arg(args)))
}

pub fn return_cmd(args: &[String], interp: &Interpreter) -> BuiltinOutcome {
    let code = args
        .first()
        .and_then(|s| s.parse::<i32>().ok())
        .unwrap_or(interp.vars.last_status);
    BuiltinOutcome::flow(code, Flow::Return(code))
}

pub fn exit_cmd(args: &[String], interp: &Interpreter) -> BuiltinOutcome {
    let code = args
        .first()
        .and_then(|s| s.parse::<i32>().ok())
        .unwrap_or(interp.vars.last_status);
    BuiltinOutcome::flow(code, Flow::Exit(code))
}
