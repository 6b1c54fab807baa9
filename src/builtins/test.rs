//! `test`/`[` (spec §4.F): the argument-vector sibling of `[[ ]]`, evaluated
//! against the same file-test/string-test/numeric-compare helpers.

use super::BuiltinOutcome;
use crate::interpreter::helpers::file_eval;
use crate::interpreter::helpers::file_tests::{BinaryFileTestOperator, FileTestOperator};
use crate::interpreter::helpers::numeric_compare::{compare_numeric, NumericOp};
use crate::interpreter::helpers::string_tests::{evaluate_string_test, StringTestOp};

pub fn test(args: &[String]) -> BuiltinOutcome {
    BuiltinOutcome::status(i32::from(!eval(args)))
}

pub fn bracket(args: &[String]) -> BuiltinOutcome {
    let args = match args.last() {
        Some(last) if last == "]" => &args[..args.len() - 1],
        _ => {
            eprintln!("hash: [: missing closing ]");
            return BuiltinOutcome::status(2);
        }
    };
    BuiltinOutcome::status(i32::from(!eval(args)))
}

fn eval(tokens: &[String]) -> bool {
    if let Some(pos) = top_level_index(tokens, "-o") {
        return eval(&tokens[..pos]) || eval(&tokens[pos + 1..]);
    }
    if let Some(pos) = top_level_index(tokens, "-a") {
        return eval(&tokens[..pos]) && eval(&tokens[pos + 1..]);
    }
    match tokens {
        [] => false,
        [a] => !a.is_empty(),
        [a, b] if a == "!" => !eval(std::slice::from_ref(b)),
        [op, arg] => eval_unary(op, arg),
        [a, op, b] => eval_binary(a, op, b),
        [a, rest @ ..] if a == "!" => !eval(rest),
        _ => false,
    }
}

fn top_level_index(tokens: &[String], needle: &str) -> Option<usize> {
    tokens.iter().position(|t| t == needle)
}

fn eval_unary(op: &str, arg: &str) -> bool {
    if let Some(fop) = FileTestOperator::from_str(op) {
        return file_eval::evaluate_unary(fop, arg);
    }
    if let Some(sop) = StringTestOp::from_str(op) {
        return evaluate_string_test(sop, arg);
    }
    false
}

fn eval_binary(a: &str, op: &str, b: &str) -> bool {
    match op {
        "=" | "==" => a == b,
        "!=" => a != b,
        "<" => a < b,
        ">" => a > b,
        _ => {
            if let Some(nop) = NumericOp::from_str(op) {
                let l: i64 = a.trim().parse().unwrap_or(0);
                let r: i64 = b.trim().parse().unwrap_or(0);
                return compare_numeric(nop, l, r);
            }
            if let Some(fop) = BinaryFileTestOperator::from_str(op) {
                return file_eval::evaluate_binary(fop, a, b);
            }
            false
        }
    }
}
