//! Heredoc body extraction (spec §4.E): pulls `<<DELIM` / `<<-DELIM` bodies
//! out of the raw source text before tokenization, leaving the operator and
//! delimiter word in place for the normal lexer/parser to see. Bodies are
//! returned in left-to-right, top-to-bottom occurrence order; the parser
//! pops one per `DLess`/`DLessDash` redirection token it encounters, in the
//! same order.

use crate::ast::HereDocNode;
use crate::errors::ParseError;

pub fn extract_heredocs(src: &str) -> Result<(String, Vec<HereDocNode>), ParseError> {
    let lines: Vec<&str> = src.split('\n').collect();
    let mut out_lines: Vec<String> = Vec::new();
    let mut heredocs = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let ops = find_heredoc_ops(line);
        out_lines.push(line.to_string());
        let mut next_body_line = i + 1;
        for op in ops {
            let (delim, quoted) = parse_delimiter(&op.delimiter_raw);
            let mut content = String::new();
            loop {
                if next_body_line >= lines.len() {
                    return Err(ParseError::UnterminatedHereDoc(delim));
                }
                let body_line = lines[next_body_line];
                let compare = if op.strip_tabs { body_line.trim_start_matches('\t') } else { body_line };
                if compare == delim {
                    next_body_line += 1;
                    break;
                }
                let stored = if op.strip_tabs { body_line.trim_start_matches('\t') } else { body_line };
                content.push_str(stored);
                content.push('\n');
                next_body_line += 1;
            }
            heredocs.push(HereDocNode { delimiter: delim, content, strip_tabs: op.strip_tabs, quoted });
        }
        if next_body_line > i + 1 {
            // consumed body lines belong to i+1..next_body_line; drop them
            i = next_body_line;
        } else {
            i += 1;
        }
    }
    Ok((out_lines.join("\n"), heredocs))
}

struct HeredocOp {
    strip_tabs: bool,
    delimiter_raw: String,
}

fn find_heredoc_ops(line: &str) -> Vec<HeredocOp> {
    let chars: Vec<char> = line.chars().collect();
    let mut ops = Vec::new();
    let mut i = 0;
    let mut in_single = false;
    let mut in_double = false;
    while i < chars.len() {
        let c = chars[i];
        if in_single {
            if c == '\'' {
                in_single = false;
            }
            i += 1;
            continue;
        }
        if in_double {
            if c == '\\' {
                i += 1;
            } else if c == '"' {
                in_double = false;
            }
            i += 1;
            continue;
        }
        match c {
            '\'' => {
                in_single = true;
                i += 1;
            }
            '"' => {
                in_double = true;
                i += 1;
            }
            '#' => break,
            '<' if chars.get(i + 1) == Some(&'<') && chars.get(i + 2) != Some(&'<') => {
                let strip_tabs = chars.get(i + 2) == Some(&'-');
                let mut j = i + if strip_tabs { 3 } else { 2 };
                while j < chars.len() && chars[j] == ' ' {
                    j += 1;
                }
                let start = j;
                let mut depth_single = false;
                let mut depth_double = false;
                while j < chars.len() {
                    let cj = chars[j];
                    if depth_single {
                        if cj == '\'' {
                            depth_single = false;
                        }
                        j += 1;
                        continue;
                    }
                    if depth_double {
                        if cj == '\\' {
                            j += 1;
                        } else if cj == '"' {
                            depth_double = false;
                        }
                        j += 1;
                        continue;
                    }
                    if cj.is_whitespace() || "<>;&|()".contains(cj) {
                        break;
                    }
                    match cj {
                        '\'' => depth_single = true,
                        '"' => depth_double = true,
                        _ => {}
                    }
                    j += 1;
                }
                let raw: String = chars[start..j].iter().collect();
                ops.push(HeredocOp { strip_tabs, delimiter_raw: raw });
                i = j;
            }
            _ => i += 1,
        }
    }
    ops
}

/// Strip quotes from a heredoc delimiter word; any quoting at all disables
/// expansion of the body (spec §4.E).
fn parse_delimiter(raw: &str) -> (String, bool) {
    let mut out = String::new();
    let mut quoted = false;
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                quoted = true;
                for c2 in chars.by_ref() {
                    if c2 == '\'' {
                        break;
                    }
                    out.push(c2);
                }
            }
            '"' => {
                quoted = true;
                while let Some(c2) = chars.next() {
                    if c2 == '"' {
                        break;
                    }
                    if c2 == '\\' {
                        if let Some(n) = chars.next() {
                            out.push(n);
                        }
                    } else {
                        out.push(c2);
                    }
                }
            }
            '\\' => {
                quoted = true;
                if let Some(n) = chars.next() {
                    out.push(n);
                }
            }
            other => out.push(other),
        }
    }
    (out, quoted)
}
