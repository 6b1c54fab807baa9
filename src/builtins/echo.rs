//! `echo` (spec §4.K): `-n` suppresses the trailing newline, `-e` enables
//! backslash escapes, `-E` (the default) disables them.

use super::BuiltinOutcome;

pub fn echo(args: &[String]) -> BuiltinOutcome {
    let mut rest = args;
    let mut newline = true;
    let mut escapes = false;
    while let Some(flag) = rest.first() {
        match flag.as_str() {
            "-n" => newline = false,
            "-e" => escapes = true,
            "-E" => escapes = false,
            _ => break,
        }
        rest = &rest[1..];
    }

    let joined = rest.join(" ");
    let out = if escapes { expand_escapes(&joined) } else { joined };
    if newline {
        println!("{out}");
    } else {
        print!("{out}");
    }
    BuiltinOutcome::status(0)
}

fn expand_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('a') => out.push('\u{7}'),
            Some('b') => out.push('\u{8}'),
            Some('c') => break,
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
