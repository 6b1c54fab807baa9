//! Line source & history (spec §4.M, ambient/peripheral): seams off
//! interactive input so the interpreter never talks to a terminal directly,
//! plus a minimal `HISTFILE`-backed history list.

use std::io::Write;
use std::path::PathBuf;

/// Reads one line of interactive input. The default implementation is a
/// plain `Stdin` reader; a full product's line editor/completer/syntax
/// highlighter would implement this trait instead.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

pub struct StdinLineSource;

impl LineSource for StdinLineSource {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        print!("{prompt}");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches('\n').to_string()),
            Err(_) => None,
        }
    }
}

pub struct History {
    entries: Vec<String>,
    max_size: usize,
    file_max_size: usize,
    control: HistControl,
    file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistControl {
    None,
    IgnoreDups,
    IgnoreSpace,
    IgnoreBoth,
}

impl History {
    pub fn from_env() -> Self {
        let max_size = std::env::var("HISTSIZE").ok().and_then(|s| s.parse().ok()).unwrap_or(500);
        let file_max_size = std::env::var("HISTFILESIZE").ok().and_then(|s| s.parse().ok()).unwrap_or(500);
        let control = match std::env::var("HISTCONTROL").ok().as_deref() {
            Some("ignoredups") => HistControl::IgnoreDups,
            Some("ignorespace") => HistControl::IgnoreSpace,
            Some("ignoreboth") => HistControl::IgnoreBoth,
            _ => HistControl::None,
        };
        let file = std::env::var("HISTFILE").ok().map(PathBuf::from);
        let mut entries = Vec::new();
        if let Some(path) = &file {
            if let Ok(contents) = std::fs::read_to_string(path) {
                entries.extend(contents.lines().map(|s| s.to_string()));
            }
        }
        History { entries, max_size, file_max_size, control, file }
    }

    pub fn push(&mut self, line: &str) {
        let skip_space = matches!(self.control, HistControl::IgnoreSpace | HistControl::IgnoreBoth)
            && line.starts_with(' ');
        let skip_dup = matches!(self.control, HistControl::IgnoreDups | HistControl::IgnoreBoth)
            && self.entries.last().map(String::as_str) == Some(line);
        if skip_space || skip_dup || line.is_empty() {
            return;
        }
        self.entries.push(line.to_string());
        if self.entries.len() > self.max_size {
            let excess = self.entries.len() - self.max_size;
            self.entries.drain(0..excess);
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn persist(&self) -> std::io::Result<()> {
        let Some(path) = &self.file else { return Ok(()) };
        let start = self.entries.len().saturating_sub(self.file_max_size);
        let body = self.entries[start..].join("\n");
        std::fs::write(path, body)
    }
}
