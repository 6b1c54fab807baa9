//! Converts a raw word string captured by [`crate::lexer`] into a typed
//! [`WordNode`]. This is where quote/escape/substitution syntax becomes
//! structured `WordPart` variants instead of in-band marker bytes.

use crate::ast::{
    ArithmeticExpansionPart, ArithmeticExpressionNode, CommandSubstitutionPart,
    ParameterExpansionPart, ParameterOperation, PatternRemovalSide, WordNode, WordPart,
};
use crate::arith::parse_arith;
use crate::errors::ParseError;

pub fn parse_word(raw: &str) -> Result<WordNode, ParseError> {
    let chars: Vec<char> = raw.chars().collect();
    let mut pos = 0;
    let parts = parse_parts(&chars, &mut pos, true)?;
    Ok(WordNode { parts })
}

/// Parse word parts until the end of `chars`. `top_level` controls whether
/// tilde expansion and glob-tagging apply (they don't inside `${...}` default
/// words etc. the same way, but do at the top of a word and inside `"..."`
/// interpolation for glob only, never for double-quoted content).
fn parse_parts(chars: &[char], pos: &mut usize, top_level: bool) -> Result<Vec<WordPart>, ParseError> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut at_word_start = true;

    macro_rules! flush {
        () => {
            if !literal.is_empty() {
                let has_glob = literal.contains('*') || literal.contains('?') || literal.contains('[');
                if top_level && has_glob {
                    parts.push(WordPart::Glob(std::mem::take(&mut literal)));
                } else {
                    parts.push(WordPart::Literal(std::mem::take(&mut literal)));
                }
            }
        };
    }

    while *pos < chars.len() {
        let c = chars[*pos];
        match c {
            '~' if top_level && at_word_start => {
                flush!();
                *pos += 1;
                let start = *pos;
                while *pos < chars.len()
                    && (chars[*pos].is_alphanumeric() || chars[*pos] == '_' || chars[*pos] == '-')
                {
                    *pos += 1;
                }
                let user: String = chars[start..*pos].iter().collect();
                parts.push(WordPart::TildeExpansion(if user.is_empty() { None } else { Some(user) }));
                at_word_start = false;
            }
            '\'' => {
                *pos += 1;
                let start = *pos;
                while *pos < chars.len() && chars[*pos] != '\'' {
                    *pos += 1;
                }
                if *pos >= chars.len() {
                    return Err(ParseError::UnterminatedQuote);
                }
                let content: String = chars[start..*pos].iter().collect();
                *pos += 1;
                flush!();
                parts.push(WordPart::SingleQuoted(content));
                at_word_start = false;
            }
            '"' => {
                *pos += 1;
                let inner = parse_double_quoted(chars, pos)?;
                flush!();
                parts.push(WordPart::DoubleQuoted(inner));
                at_word_start = false;
            }
            '\\' => {
                *pos += 1;
                if *pos < chars.len() {
                    flush!();
                    parts.push(WordPart::Escaped(chars[*pos]));
                    *pos += 1;
                }
                at_word_start = false;
            }
            '$' => {
                flush!();
                parts.push(parse_dollar(chars, pos, false)?);
                at_word_start = false;
            }
            '`' => {
                flush!();
                parts.push(parse_backtick(chars, pos)?);
                at_word_start = false;
            }
            _ => {
                literal.push(c);
                *pos += 1;
                at_word_start = false;
            }
        }
    }
    flush!();
    Ok(parts)
}

fn parse_double_quoted(chars: &[char], pos: &mut usize) -> Result<Vec<WordPart>, ParseError> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    macro_rules! flush {
        () => {
            if !literal.is_empty() {
                parts.push(WordPart::Literal(std::mem::take(&mut literal)));
            }
        };
    }
    loop {
        if *pos >= chars.len() {
            return Err(ParseError::UnterminatedQuote);
        }
        match chars[*pos] {
            '"' => {
                *pos += 1;
                break;
            }
            '\\' => {
                *pos += 1;
                if *pos >= chars.len() {
                    return Err(ParseError::UnterminatedQuote);
                }
                let n = chars[*pos];
                match n {
                    '$' | '`' | '"' | '\\' => {
                        literal.push(n);
                        *pos += 1;
                    }
                    '\n' => {
                        *pos += 1;
                    }
                    other => {
                        literal.push('\\');
                        literal.push(other);
                        *pos += 1;
                    }
                }
            }
            '$' => {
                flush!();
                parts.push(parse_dollar(chars, pos, true)?);
            }
            '`' => {
                flush!();
                parts.push(parse_backtick(chars, pos)?);
            }
            c => {
                literal.push(c);
                *pos += 1;
            }
        }
    }
    flush!();
    Ok(parts)
}

fn parse_dollar(chars: &[char], pos: &mut usize, _in_double_quotes: bool) -> Result<WordPart, ParseError> {
    *pos += 1; // consume '$'
    if *pos >= chars.len() {
        return Ok(WordPart::Literal("$".to_string()));
    }
    match chars[*pos] {
        '(' if chars.get(*pos + 1) == Some(&'(') => {
            *pos += 2;
            let start = *pos;
            let mut depth = 1i32;
            while *pos < chars.len() && depth > 0 {
                match chars[*pos] {
                    '(' => depth += 1,
                    ')' => depth -= 1,
                    _ => {}
                }
                if depth > 0 {
                    *pos += 1;
                } else {
                    break;
                }
            }
            let body: String = chars[start..*pos].iter().collect();
            // consume the trailing "))"
            *pos += 2;
            let expr = parse_arith(body.trim())
                .map_err(|e| ParseError::SyntaxError(e.to_string()))?;
            Ok(WordPart::ArithmeticExpansion(ArithmeticExpansionPart {
                expression: ArithmeticExpressionNode { expression: expr },
            }))
        }
        '(' => {
            *pos += 1;
            let start = *pos;
            let mut depth = 1i32;
            let mut in_single = false;
            let mut in_double = false;
            while *pos < chars.len() && depth > 0 {
                let c = chars[*pos];
                if in_single {
                    if c == '\'' {
                        in_single = false;
                    }
                } else if in_double {
                    if c == '\\' {
                        *pos += 1;
                    } else if c == '"' {
                        in_double = false;
                    }
                } else {
                    match c {
                        '\'' => in_single = true,
                        '"' => in_double = true,
                        '(' => depth += 1,
                        ')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                }
                *pos += 1;
            }
            let body: String = chars[start..*pos].iter().collect();
            *pos += 1; // consume ')'
            let script = crate::parser::parse_script(&body)
                .map_err(|e| ParseError::SyntaxError(e.to_string()))?;
            Ok(WordPart::CommandSubstitution(CommandSubstitutionPart { body: script, legacy: false }))
        }
        '{' => {
            *pos += 1;
            let start = *pos;
            let mut depth = 1i32;
            while *pos < chars.len() && depth > 0 {
                match chars[*pos] {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
                *pos += 1;
            }
            let body: String = chars[start..*pos].iter().collect();
            *pos += 1; // consume '}'
            parse_param_expansion(&body)
        }
        c if c.is_alphabetic() || c == '_' => {
            let start = *pos;
            while *pos < chars.len() && (chars[*pos].is_alphanumeric() || chars[*pos] == '_') {
                *pos += 1;
            }
            let name: String = chars[start..*pos].iter().collect();
            Ok(WordPart::ParameterExpansion(ParameterExpansionPart { parameter: name, operation: None }))
        }
        c if c.is_ascii_digit() => {
            *pos += 1;
            Ok(WordPart::ParameterExpansion(ParameterExpansionPart {
                parameter: c.to_string(),
                operation: None,
            }))
        }
        c if "?$!#@*-".contains(c) => {
            *pos += 1;
            Ok(WordPart::ParameterExpansion(ParameterExpansionPart {
                parameter: c.to_string(),
                operation: None,
            }))
        }
        _ => Ok(WordPart::Literal("$".to_string())),
    }
}

fn parse_backtick(chars: &[char], pos: &mut usize) -> Result<WordPart, ParseError> {
    *pos += 1; // consume opening `
    let mut body = String::new();
    loop {
        if *pos >= chars.len() {
            return Err(ParseError::UnterminatedQuote);
        }
        match chars[*pos] {
            '`' => {
                *pos += 1;
                break;
            }
            '\\' if matches!(chars.get(*pos + 1), Some('`') | Some('\\') | Some('$')) => {
                body.push(chars[*pos + 1]);
                *pos += 2;
            }
            c => {
                body.push(c);
                *pos += 1;
            }
        }
    }
    let script = crate::parser::parse_script(&body).map_err(|e| ParseError::SyntaxError(e.to_string()))?;
    Ok(WordPart::CommandSubstitution(CommandSubstitutionPart { body: script, legacy: true }))
}

/// Parse the body of `${...}` (braces already stripped).
fn parse_param_expansion(body: &str) -> Result<WordPart, ParseError> {
    if let Some(rest) = body.strip_prefix('#') {
        if !rest.is_empty() && rest.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Ok(WordPart::ParameterExpansion(ParameterExpansionPart {
                parameter: rest.to_string(),
                operation: Some(ParameterOperation::Length),
            }));
        }
    }

    let chars: Vec<char> = body.chars().collect();
    let mut i = 0;
    while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
        i += 1;
    }
    if i == 0 && i < chars.len() && "?$!#@*-".contains(chars[i]) {
        i += 1;
    }
    let name: String = chars[..i].iter().collect();
    let remainder: String = chars[i..].iter().collect();

    let op = if let Some(w) = remainder.strip_prefix(":-") {
        Some(ParameterOperation::DefaultValue { word: parse_word(w)?, check_empty: true })
    } else if let Some(w) = remainder.strip_prefix('-') {
        Some(ParameterOperation::DefaultValue { word: parse_word(w)?, check_empty: false })
    } else if let Some(w) = remainder.strip_prefix(":=") {
        Some(ParameterOperation::AssignDefault { word: parse_word(w)?, check_empty: true })
    } else if let Some(w) = remainder.strip_prefix('=') {
        Some(ParameterOperation::AssignDefault { word: parse_word(w)?, check_empty: false })
    } else if let Some(w) = remainder.strip_prefix(":?") {
        Some(ParameterOperation::ErrorIfUnset {
            word: if w.is_empty() { None } else { Some(parse_word(w)?) },
            check_empty: true,
        })
    } else if let Some(w) = remainder.strip_prefix('?') {
        Some(ParameterOperation::ErrorIfUnset {
            word: if w.is_empty() { None } else { Some(parse_word(w)?) },
            check_empty: false,
        })
    } else if let Some(w) = remainder.strip_prefix(":+") {
        Some(ParameterOperation::UseAlternative { word: parse_word(w)?, check_empty: true })
    } else if let Some(w) = remainder.strip_prefix('+') {
        Some(ParameterOperation::UseAlternative { word: parse_word(w)?, check_empty: false })
    } else if let Some(w) = remainder.strip_prefix("##") {
        Some(ParameterOperation::PatternRemoval {
            pattern: parse_word(w)?,
            side: PatternRemovalSide::Prefix,
            greedy: true,
        })
    } else if let Some(w) = remainder.strip_prefix('#') {
        Some(ParameterOperation::PatternRemoval {
            pattern: parse_word(w)?,
            side: PatternRemovalSide::Prefix,
            greedy: false,
        })
    } else if let Some(w) = remainder.strip_prefix("%%") {
        Some(ParameterOperation::PatternRemoval {
            pattern: parse_word(w)?,
            side: PatternRemovalSide::Suffix,
            greedy: true,
        })
    } else if let Some(w) = remainder.strip_prefix('%') {
        Some(ParameterOperation::PatternRemoval {
            pattern: parse_word(w)?,
            side: PatternRemovalSide::Suffix,
            greedy: false,
        })
    } else if remainder.is_empty() {
        None
    } else {
        return Err(ParseError::SyntaxError(format!("bad substitution: ${{{body}}}")));
    };

    Ok(WordPart::ParameterExpansion(ParameterExpansionPart { parameter: name, operation: op }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_literal_is_identity() {
        let w = parse_word("hello").unwrap();
        assert!(w.is_plain_literal());
    }

    #[test]
    fn double_quoted_variable() {
        let w = parse_word("\"hello, $NAME\"").unwrap();
        assert_eq!(w.parts.len(), 1);
        match &w.parts[0] {
            WordPart::DoubleQuoted(inner) => assert_eq!(inner.len(), 2),
            _ => panic!("expected double-quoted part"),
        }
    }

    #[test]
    fn default_value_operator() {
        let w = parse_word("${FOO:-bar}").unwrap();
        match &w.parts[0] {
            WordPart::ParameterExpansion(p) => {
                assert_eq!(p.parameter, "FOO");
                assert!(matches!(p.operation, Some(ParameterOperation::DefaultValue { check_empty: true, .. })));
            }
            _ => panic!("expected parameter expansion"),
        }
    }

    #[test]
    fn tilde_at_start_only() {
        let w = parse_word("~/bin").unwrap();
        assert!(matches!(w.parts[0], WordPart::TildeExpansion(None)));
    }
}
