//! Arithmetic evaluator: walks an [`ArithExpr`] tree over `i64`. Division
//! and modulo by zero fail the expansion and yield `0` (spec §4.C.3);
//! short-circuit `&&`/`||` must parse both sides but evaluate only the
//! needed one.

use crate::ast::{
    ArithAssignmentOperator, ArithBinaryOperator, ArithExpr, ArithUnaryOperator,
};
use crate::errors::ExpansionError;
use crate::expand::ExpansionContext;

pub fn eval_arith(expr: &ArithExpr, ctx: &mut dyn ExpansionContext) -> Result<i64, ExpansionError> {
    match expr {
        ArithExpr::Number(n) => Ok(*n),
        ArithExpr::Variable(name) => {
            let raw = ctx.vars().get(name).unwrap_or_default();
            Ok(parse_arith_operand(&raw))
        }
        ArithExpr::Group(inner) => eval_arith(inner, ctx),
        ArithExpr::Sequence(items) => {
            let mut last = 0;
            for item in items {
                last = eval_arith(item, ctx)?;
            }
            Ok(last)
        }
        ArithExpr::Unary(u) => {
            let v = eval_arith(&u.operand, ctx)?;
            Ok(match u.operator {
                ArithUnaryOperator::Neg => -v,
                ArithUnaryOperator::Pos => v,
                ArithUnaryOperator::Not => i64::from(v == 0),
                ArithUnaryOperator::BitNot => !v,
                ArithUnaryOperator::Inc => {
                    let nv = v + 1;
                    assign_variable_operand(&u.operand, nv, ctx)?;
                    nv
                }
                ArithUnaryOperator::Dec => {
                    let nv = v - 1;
                    assign_variable_operand(&u.operand, nv, ctx)?;
                    nv
                }
            })
        }
        ArithExpr::Postfix(u) => {
            let v = eval_arith(&u.operand, ctx)?;
            let nv = match u.operator {
                ArithUnaryOperator::Inc => v + 1,
                ArithUnaryOperator::Dec => v - 1,
                _ => v,
            };
            assign_variable_operand(&u.operand, nv, ctx)?;
            Ok(v)
        }
        ArithExpr::Ternary(t) => {
            if eval_arith(&t.condition, ctx)? != 0 {
                eval_arith(&t.consequent, ctx)
            } else {
                eval_arith(&t.alternate, ctx)
            }
        }
        ArithExpr::Binary(b) => eval_binary(b.operator, &b.left, &b.right, ctx),
        ArithExpr::Assignment(a) => {
            let current = || -> Result<i64, ExpansionError> {
                let raw = ctx.vars().get(&a.variable).unwrap_or_default();
                Ok(parse_arith_operand(&raw))
            };
            let rhs = eval_arith(&a.value, ctx)?;
            let nv = match a.operator {
                ArithAssignmentOperator::Assign => rhs,
                ArithAssignmentOperator::AddAssign => current()? + rhs,
                ArithAssignmentOperator::SubAssign => current()? - rhs,
                ArithAssignmentOperator::MulAssign => current()? * rhs,
                ArithAssignmentOperator::DivAssign => checked_div(current()?, rhs)?,
                ArithAssignmentOperator::ModAssign => checked_rem(current()?, rhs)?,
                ArithAssignmentOperator::LShiftAssign => current()? << rhs,
                ArithAssignmentOperator::RShiftAssign => current()? >> rhs,
                ArithAssignmentOperator::AndAssign => current()? & rhs,
                ArithAssignmentOperator::OrAssign => current()? | rhs,
                ArithAssignmentOperator::XorAssign => current()? ^ rhs,
            };
            let _ = ctx.vars().set(&a.variable, nv.to_string());
            Ok(nv)
        }
    }
}

fn eval_binary(
    op: ArithBinaryOperator,
    left: &ArithExpr,
    right: &ArithExpr,
    ctx: &mut dyn ExpansionContext,
) -> Result<i64, ExpansionError> {
    // Short-circuit operators must still parse (already done) but skip
    // evaluating the unused side.
    if op == ArithBinaryOperator::LogAnd {
        let l = eval_arith(left, ctx)?;
        if l == 0 {
            return Ok(0);
        }
        let r = eval_arith(right, ctx)?;
        return Ok(i64::from(r != 0));
    }
    if op == ArithBinaryOperator::LogOr {
        let l = eval_arith(left, ctx)?;
        if l != 0 {
            return Ok(1);
        }
        let r = eval_arith(right, ctx)?;
        return Ok(i64::from(r != 0));
    }
    let l = eval_arith(left, ctx)?;
    let r = eval_arith(right, ctx)?;
    Ok(match op {
        ArithBinaryOperator::Add => l + r,
        ArithBinaryOperator::Sub => l - r,
        ArithBinaryOperator::Mul => l * r,
        ArithBinaryOperator::Div => checked_div(l, r)?,
        ArithBinaryOperator::Mod => checked_rem(l, r)?,
        ArithBinaryOperator::LShift => l << r,
        ArithBinaryOperator::RShift => l >> r,
        ArithBinaryOperator::Lt => i64::from(l < r),
        ArithBinaryOperator::Le => i64::from(l <= r),
        ArithBinaryOperator::Gt => i64::from(l > r),
        ArithBinaryOperator::Ge => i64::from(l >= r),
        ArithBinaryOperator::Eq => i64::from(l == r),
        ArithBinaryOperator::Ne => i64::from(l != r),
        ArithBinaryOperator::BitAnd => l & r,
        ArithBinaryOperator::BitOr => l | r,
        ArithBinaryOperator::BitXor => l ^ r,
        ArithBinaryOperator::LogAnd | ArithBinaryOperator::LogOr => unreachable!(),
    })
}

fn checked_div(l: i64, r: i64) -> Result<i64, ExpansionError> {
    if r == 0 {
        Err(ExpansionError::DivideByZero)
    } else {
        Ok(l / r)
    }
}

fn checked_rem(l: i64, r: i64) -> Result<i64, ExpansionError> {
    if r == 0 {
        Err(ExpansionError::DivideByZero)
    } else {
        Ok(l % r)
    }
}

fn assign_variable_operand(expr: &ArithExpr, value: i64, ctx: &mut dyn ExpansionContext) -> Result<(), ExpansionError> {
    if let ArithExpr::Variable(name) = expr {
        let _ = ctx.vars().set(name, value.to_string());
    }
    Ok(())
}

/// An unset or non-numeric variable reads as 0 in arithmetic context,
/// matching the original implementation's failure-yields-zero behavior.
fn parse_arith_operand(raw: &str) -> i64 {
    raw.trim().parse::<i64>().unwrap_or(0)
}
