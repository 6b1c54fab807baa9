//! Word expansion entry points. `expand_word_single` runs tilde → command
//! substitution → arithmetic → parameter expansion and concatenates the
//! result with no splitting or globbing (used for assignment RHS, case
//! words/patterns, `[[ ]]` operands, redirection targets). `expand_word_splitting`
//! additionally performs IFS word splitting and pathname globbing (spec
//! §4.C.5/§4.C.6), used for simple-command names/arguments and `for` word
//! lists.

use crate::ast::{WordNode, WordPart};
use crate::errors::ExpansionError;
use crate::expand::arithmetic::eval_arith;
use crate::expand::parameter::{expand_parameter, ParamValue};
use crate::expand::ExpansionContext;

pub fn expand_word_single(word: &WordNode, ctx: &mut dyn ExpansionContext) -> Result<String, ExpansionError> {
    let mut out = String::new();
    for part in &word.parts {
        out.push_str(&expand_part_single(part, ctx)?);
    }
    Ok(out)
}

fn expand_part_single(part: &WordPart, ctx: &mut dyn ExpansionContext) -> Result<String, ExpansionError> {
    match part {
        WordPart::Literal(s) | WordPart::Glob(s) => Ok(s.clone()),
        WordPart::SingleQuoted(s) => Ok(s.clone()),
        WordPart::Escaped(c) => Ok(c.to_string()),
        WordPart::TildeExpansion(user) => Ok(expand_tilde(user.as_deref(), ctx)),
        WordPart::DoubleQuoted(parts) => {
            let mut out = String::new();
            for p in parts {
                out.push_str(&expand_part_single(p, ctx)?);
            }
            Ok(out)
        }
        WordPart::ParameterExpansion(p) => Ok(expand_parameter(p, ctx)?.joined(" ")),
        WordPart::CommandSubstitution(c) => run_command_substitution(c, ctx),
        WordPart::ArithmeticExpansion(a) => {
            let v = eval_arith(&a.expression.expression, ctx).unwrap_or(0);
            Ok(v.to_string())
        }
    }
}

fn run_command_substitution(
    c: &crate::ast::CommandSubstitutionPart,
    ctx: &mut dyn ExpansionContext,
) -> Result<String, ExpansionError> {
    let (mut output, status) = ctx
        .run_capture(&c.body)
        .map_err(|e| ExpansionError::ParameterError(e.to_string()))?;
    while output.ends_with('\n') {
        output.pop();
    }
    ctx.vars().last_status = status;
    Ok(output)
}

pub fn expand_tilde(user: Option<&str>, ctx: &mut dyn ExpansionContext) -> String {
    match user {
        None => ctx
            .vars()
            .get("HOME")
            .or_else(|| home_of_current_user())
            .unwrap_or_else(|| "~".to_string()),
        Some(name) => home_of_user(name).unwrap_or_else(|| format!("~{name}")),
    }
}

fn home_of_current_user() -> Option<String> {
    let uid = nix::unistd::getuid();
    nix::unistd::User::from_uid(uid)
        .ok()
        .flatten()
        .map(|u| u.dir.to_string_lossy().into_owned())
}

fn home_of_user(name: &str) -> Option<String> {
    nix::unistd::User::from_name(name)
        .ok()
        .flatten()
        .map(|u| u.dir.to_string_lossy().into_owned())
}

struct Tag {
    splittable: bool,
    glob_eligible: bool,
}

pub fn expand_word_splitting(word: &WordNode, ctx: &mut dyn ExpansionContext) -> Result<Vec<String>, ExpansionError> {
    // Common case: a bare `"$@"` word expands to one field per positional
    // parameter, completely bypassing IFS splitting (spec's EOT-marker rule).
    if let [WordPart::DoubleQuoted(inner)] = word.parts.as_slice() {
        if let [WordPart::ParameterExpansion(p)] = inner.as_slice() {
            if p.parameter == "@" && p.operation.is_none() {
                return Ok(ctx.vars().positional[1..].to_vec());
            }
        }
    }

    let mut tagged: Vec<(char, Tag)> = Vec::new();
    for part in &word.parts {
        assemble_part(part, ctx, &mut tagged)?;
    }

    let ifs = ctx.vars().get("IFS").unwrap_or_else(|| " \t\n".to_string());
    let is_ifs = |c: char| ifs.contains(c);
    let is_ifs_ws = |c: char| is_ifs(c) && (c == ' ' || c == '\t' || c == '\n');

    let mut fields: Vec<(String, bool)> = Vec::new();
    let mut current = String::new();
    let mut glob_current = false;
    let mut in_ws_run = false;

    for (c, tag) in tagged {
        if tag.splittable && is_ifs(c) {
            if is_ifs_ws(c) {
                if !in_ws_run {
                    if !current.is_empty() {
                        fields.push((std::mem::take(&mut current), glob_current));
                        glob_current = false;
                    }
                    in_ws_run = true;
                }
            } else {
                fields.push((std::mem::take(&mut current), glob_current));
                glob_current = false;
                in_ws_run = false;
            }
        } else {
            in_ws_run = false;
            if tag.glob_eligible && (c == '*' || c == '?' || c == '[') {
                glob_current = true;
            }
            current.push(c);
        }
    }
    if !current.is_empty() || fields.is_empty() {
        fields.push((current, glob_current));
    }

    let mut result = Vec::new();
    for (text, try_glob) in fields {
        if try_glob {
            match glob::glob(&text) {
                Ok(paths) => {
                    let mut matches: Vec<String> = paths
                        .filter_map(|p| p.ok())
                        .map(|p| p.to_string_lossy().into_owned())
                        .collect();
                    if matches.is_empty() {
                        result.push(text);
                    } else {
                        matches.sort();
                        result.extend(matches);
                    }
                }
                Err(_) => result.push(text),
            }
        } else {
            result.push(text);
        }
    }
    Ok(result)
}

fn assemble_part(part: &WordPart, ctx: &mut dyn ExpansionContext, out: &mut Vec<(char, Tag)>) -> Result<(), ExpansionError> {
    match part {
        WordPart::Literal(s) => {
            for c in s.chars() {
                out.push((c, Tag { splittable: false, glob_eligible: true }));
            }
        }
        WordPart::Glob(s) => {
            for c in s.chars() {
                out.push((c, Tag { splittable: false, glob_eligible: true }));
            }
        }
        WordPart::SingleQuoted(s) => {
            for c in s.chars() {
                out.push((c, Tag { splittable: false, glob_eligible: false }));
            }
        }
        WordPart::Escaped(c) => out.push((*c, Tag { splittable: false, glob_eligible: false })),
        WordPart::TildeExpansion(user) => {
            let expanded = expand_tilde(user.as_deref(), ctx);
            for c in expanded.chars() {
                out.push((c, Tag { splittable: false, glob_eligible: false }));
            }
        }
        WordPart::DoubleQuoted(parts) => {
            for p in parts {
                let text = expand_part_single(p, ctx)?;
                for c in text.chars() {
                    out.push((c, Tag { splittable: false, glob_eligible: false }));
                }
            }
        }
        WordPart::ParameterExpansion(p) => {
            let value = expand_parameter(p, ctx)?;
            let text = match value {
                ParamValue::Single(s) => s,
                ParamValue::Positional(v) => v.join(" "),
            };
            for c in text.chars() {
                out.push((c, Tag { splittable: true, glob_eligible: true }));
            }
        }
        WordPart::CommandSubstitution(c) => {
            let text = run_command_substitution(c, ctx)?;
            for c in text.chars() {
                out.push((c, Tag { splittable: true, glob_eligible: true }));
            }
        }
        WordPart::ArithmeticExpansion(a) => {
            let v = eval_arith(&a.expression.expression, ctx).unwrap_or(0);
            for c in v.to_string().chars() {
                out.push((c, Tag { splittable: true, glob_eligible: false }));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ScriptNode;
    use crate::errors::ShellError;
    use crate::vars::VarStore;

    struct TestCtx {
        vars: VarStore,
    }
    impl ExpansionContext for TestCtx {
        fn vars(&mut self) -> &mut VarStore {
            &mut self.vars
        }
        fn run_capture(&mut self, _script: &ScriptNode) -> Result<(String, i32), ShellError> {
            Ok(("sub".to_string(), 0))
        }
    }

    #[test]
    fn literal_identity() {
        let mut ctx = TestCtx { vars: VarStore::new("hash".into(), vec![]) };
        let w = crate::words::parse_word("hello").unwrap();
        assert_eq!(expand_word_splitting(&w, &mut ctx).unwrap(), vec!["hello".to_string()]);
    }

    #[test]
    fn ifs_splitting() {
        let mut ctx = TestCtx { vars: VarStore::new("hash".into(), vec![]) };
        ctx.vars.set("x", "a b c").unwrap();
        let w = crate::words::parse_word("$x").unwrap();
        assert_eq!(
            expand_word_splitting(&w, &mut ctx).unwrap(),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn quoted_no_split() {
        let mut ctx = TestCtx { vars: VarStore::new("hash".into(), vec![]) };
        ctx.vars.set("x", "a b c").unwrap();
        let w = crate::words::parse_word("\"$x\"").unwrap();
        assert_eq!(expand_word_splitting(&w, &mut ctx).unwrap(), vec!["a b c".to_string()]);
    }

    #[test]
    fn unquoted_parameter_expansion_globs_matching_files() {
        let dir = std::env::temp_dir().join(format!("hash_glob_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("a.txt"), "").unwrap();
        std::fs::write(dir.join("b.txt"), "").unwrap();

        let mut ctx = TestCtx { vars: VarStore::new("hash".into(), vec![]) };
        ctx.vars.set("x", &format!("{}/*.txt", dir.display())).unwrap();
        let w = crate::words::parse_word("$x").unwrap();
        let mut result = expand_word_splitting(&w, &mut ctx).unwrap();
        result.sort();
        assert_eq!(
            result,
            vec![
                dir.join("a.txt").to_string_lossy().into_owned(),
                dir.join("b.txt").to_string_lossy().into_owned(),
            ]
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn quoted_parameter_expansion_does_not_glob() {
        let mut ctx = TestCtx { vars: VarStore::new("hash".into(), vec![]) };
        ctx.vars.set("x", "*.txt").unwrap();
        let w = crate::words::parse_word("\"$x\"").unwrap();
        assert_eq!(expand_word_splitting(&w, &mut ctx).unwrap(), vec!["*.txt".to_string()]);
    }
}
