//! Parameter / variable expansion (spec §4.C.4).

use crate::ast::{ParameterExpansionPart, ParameterOperation, PatternRemovalSide};
use crate::errors::ExpansionError;
use crate::expand::pattern::{remove_prefix, remove_suffix};
use crate::expand::word::expand_word_single;
use crate::expand::ExpansionContext;

pub enum ParamValue {
    Single(String),
    /// `$@` / `$*`: the positional parameter vector, before the caller
    /// decides how quoting folds it into field(s).
    Positional(Vec<String>),
}

impl ParamValue {
    pub fn joined(&self, sep: &str) -> String {
        match self {
            ParamValue::Single(s) => s.clone(),
            ParamValue::Positional(v) => v.join(sep),
        }
    }
}

pub fn expand_parameter(
    part: &ParameterExpansionPart,
    ctx: &mut dyn ExpansionContext,
) -> Result<ParamValue, ExpansionError> {
    if part.parameter == "@" || part.parameter == "*" {
        let positional = ctx.vars().positional[1..].to_vec();
        if matches!(part.operation, Some(ParameterOperation::Length)) {
            return Ok(ParamValue::Single(positional.len().to_string()));
        }
        return Ok(ParamValue::Positional(positional));
    }

    let is_set = ctx.vars().is_set(&part.parameter);
    let is_null_or_unset = ctx.vars().is_null_or_unset(&part.parameter);

    match &part.operation {
        None => {
            if !is_set && ctx.vars().options.nounset {
                return Err(ExpansionError::UnboundVariable(part.parameter.clone()));
            }
            Ok(ParamValue::Single(ctx.vars().get(&part.parameter).unwrap_or_default()))
        }
        Some(ParameterOperation::Length) => {
            let v = ctx.vars().get(&part.parameter).unwrap_or_default();
            Ok(ParamValue::Single(v.chars().count().to_string()))
        }
        Some(ParameterOperation::DefaultValue { word, check_empty }) => {
            let trigger = if *check_empty { is_null_or_unset } else { !is_set };
            if trigger {
                Ok(ParamValue::Single(expand_word_single(word, ctx)?))
            } else {
                Ok(ParamValue::Single(ctx.vars().get(&part.parameter).unwrap_or_default()))
            }
        }
        Some(ParameterOperation::AssignDefault { word, check_empty }) => {
            let trigger = if *check_empty { is_null_or_unset } else { !is_set };
            if trigger {
                let value = expand_word_single(word, ctx)?;
                let _ = ctx.vars().set(&part.parameter, value.clone());
                Ok(ParamValue::Single(value))
            } else {
                Ok(ParamValue::Single(ctx.vars().get(&part.parameter).unwrap_or_default()))
            }
        }
        Some(ParameterOperation::ErrorIfUnset { word, check_empty }) => {
            let trigger = if *check_empty { is_null_or_unset } else { !is_set };
            if trigger {
                let msg = match word {
                    Some(w) => expand_word_single(w, ctx)?,
                    None => "parameter null or not set".to_string(),
                };
                Err(ExpansionError::ParameterError(format!("{}: {msg}", part.parameter)))
            } else {
                Ok(ParamValue::Single(ctx.vars().get(&part.parameter).unwrap_or_default()))
            }
        }
        Some(ParameterOperation::UseAlternative { word, check_empty }) => {
            let trigger = if *check_empty { !is_null_or_unset } else { is_set };
            if trigger {
                Ok(ParamValue::Single(expand_word_single(word, ctx)?))
            } else {
                Ok(ParamValue::Single(String::new()))
            }
        }
        Some(ParameterOperation::PatternRemoval { pattern, side, greedy }) => {
            if !is_set && ctx.vars().options.nounset {
                return Err(ExpansionError::UnboundVariable(part.parameter.clone()));
            }
            let value = ctx.vars().get(&part.parameter).unwrap_or_default();
            let pat = expand_word_single(pattern, ctx)?;
            let result = match side {
                PatternRemovalSide::Prefix => remove_prefix(&value, &pat, *greedy),
                PatternRemovalSide::Suffix => remove_suffix(&value, &pat, *greedy),
            };
            Ok(ParamValue::Single(result))
        }
    }
}
