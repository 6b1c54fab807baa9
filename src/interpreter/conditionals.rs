//! `[[ ... ]]` conditional expression evaluator (spec §4.F).

use crate::ast::{CondBinaryOperator, CondUnaryOperator, ConditionalExpressionNode};
use crate::errors::ExpansionError;
use crate::expand::pattern::matches_whole;
use crate::expand::word::expand_word_single;
use crate::expand::ExpansionContext;
use crate::interpreter::helpers::file_eval;
use crate::interpreter::helpers::numeric_compare::{compare_numeric, NumericOp};
use crate::interpreter::helpers::string_tests::{evaluate_string_test, StringTestOp};

pub fn evaluate(expr: &ConditionalExpressionNode, ctx: &mut dyn ExpansionContext) -> Result<bool, ExpansionError> {
    match expr {
        ConditionalExpressionNode::Word(w) => Ok(!expand_word_single(w, ctx)?.is_empty()),
        ConditionalExpressionNode::Not(inner) => Ok(!evaluate(inner, ctx)?),
        ConditionalExpressionNode::Group(inner) => evaluate(inner, ctx),
        ConditionalExpressionNode::And(l, r) => Ok(evaluate(l, ctx)? && evaluate(r, ctx)?),
        ConditionalExpressionNode::Or(l, r) => Ok(evaluate(l, ctx)? || evaluate(r, ctx)?),
        ConditionalExpressionNode::Unary(u) => {
            let value = expand_word_single(&u.operand, ctx)?;
            Ok(match u.operator {
                CondUnaryOperator::StrEmpty => evaluate_string_test(StringTestOp::Empty, &value),
                CondUnaryOperator::StrNonEmpty => evaluate_string_test(StringTestOp::NonEmpty, &value),
                CondUnaryOperator::FileTest(op) => file_eval::evaluate_unary(op, &value),
            })
        }
        ConditionalExpressionNode::Binary(b) => evaluate_binary(b, ctx),
    }
}

fn evaluate_binary(b: &crate::ast::CondBinaryNode, ctx: &mut dyn ExpansionContext) -> Result<bool, ExpansionError> {
    let left = expand_word_single(&b.left, ctx)?;
    let right = expand_word_single(&b.right, ctx)?;
    Ok(match b.operator {
        CondBinaryOperator::Eq => matches_whole(&right, &left),
        CondBinaryOperator::Ne => !matches_whole(&right, &left),
        CondBinaryOperator::Lt => left < right,
        CondBinaryOperator::Gt => left > right,
        CondBinaryOperator::NumEq => numeric(&left, &right, NumericOp::Eq),
        CondBinaryOperator::NumNe => numeric(&left, &right, NumericOp::Ne),
        CondBinaryOperator::NumLt => numeric(&left, &right, NumericOp::Lt),
        CondBinaryOperator::NumLe => numeric(&left, &right, NumericOp::Le),
        CondBinaryOperator::NumGt => numeric(&left, &right, NumericOp::Gt),
        CondBinaryOperator::NumGe => numeric(&left, &right, NumericOp::Ge),
        CondBinaryOperator::Nt => file_eval::evaluate_binary(
            crate::interpreter::helpers::file_tests::BinaryFileTestOperator::NewerThan,
            &left,
            &right,
        ),
        CondBinaryOperator::Ot => file_eval::evaluate_binary(
            crate::interpreter::helpers::file_tests::BinaryFileTestOperator::OlderThan,
            &left,
            &right,
        ),
        CondBinaryOperator::Ef => file_eval::evaluate_binary(
            crate::interpreter::helpers::file_tests::BinaryFileTestOperator::SameFile,
            &left,
            &right,
        ),
    })
}

fn numeric(left: &str, right: &str, op: NumericOp) -> bool {
    let l: i64 = left.trim().parse().unwrap_or(0);
    let r: i64 = right.trim().parse().unwrap_or(0);
    compare_numeric(op, l, r)
}
