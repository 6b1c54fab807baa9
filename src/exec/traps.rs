//! Trap engine (spec §4.J): an array indexed by signal number, with 0
//! reserved for the `EXIT` pseudo-signal and negative slots for the
//! `DEBUG`/`ERR`/`RETURN` pseudo-signals. `DEBUG`/`ERR`/`RETURN` traps are
//! parsed and stored (so `trap -p` reports them accurately) but are never
//! fired — this core only delivers `EXIT` and real numbered signals.

use nix::sys::signal::Signal;
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrapKey {
    Exit,
    Debug,
    Err,
    Return,
    Signal(i32),
}

impl TrapKey {
    pub fn parse(spec: &str) -> Option<TrapKey> {
        match spec.to_ascii_uppercase().as_str() {
            "EXIT" | "0" => Some(TrapKey::Exit),
            "DEBUG" => Some(TrapKey::Debug),
            "ERR" => Some(TrapKey::Err),
            "RETURN" => Some(TrapKey::Return),
            other => {
                let name = if other.starts_with("SIG") { other.to_string() } else { format!("SIG{other}") };
                if let Ok(sig) = Signal::from_str(&name) {
                    return Some(TrapKey::Signal(sig as i32));
                }
                other.parse::<i32>().ok().map(TrapKey::Signal)
            }
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            TrapKey::Exit => "EXIT".to_string(),
            TrapKey::Debug => "DEBUG".to_string(),
            TrapKey::Err => "ERR".to_string(),
            TrapKey::Return => "RETURN".to_string(),
            TrapKey::Signal(n) => Signal::try_from(*n).map(|s| s.as_str().to_string()).unwrap_or_else(|_| n.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum TrapAction {
    Default,
    Ignore,
    Command(String),
}

#[derive(Debug, Clone, Default)]
pub struct TrapTable {
    actions: HashMap<TrapKey, TrapAction>,
}

impl TrapTable {
    pub fn new() -> Self {
        TrapTable { actions: HashMap::new() }
    }

    pub fn set(&mut self, key: TrapKey, action: TrapAction) {
        match action {
            TrapAction::Default => {
                self.actions.remove(&key);
            }
            other => {
                self.actions.insert(key, other);
            }
        }
    }

    pub fn action(&self, key: TrapKey) -> TrapAction {
        self.actions.get(&key).cloned().unwrap_or(TrapAction::Default)
    }

    pub fn command_for(&self, key: TrapKey) -> Option<&str> {
        match self.actions.get(&key) {
            Some(TrapAction::Command(c)) => Some(c.as_str()),
            _ => None,
        }
    }

    pub fn is_ignored(&self, key: TrapKey) -> bool {
        matches!(self.actions.get(&key), Some(TrapAction::Ignore))
    }

    pub fn list(&self) -> impl Iterator<Item = (&TrapKey, &TrapAction)> {
        self.actions.iter()
    }

    /// Subshells reset all non-ignored trap actions to default on fork, but
    /// the parent keeps its table (for `trap -p` display purposes elsewhere).
    pub fn reset_for_subshell(&self) -> TrapTable {
        let mut reset = TrapTable::new();
        for (k, v) in &self.actions {
            if matches!(v, TrapAction::Ignore) {
                reset.actions.insert(*k, v.clone());
            }
        }
        reset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_signal_names() {
        assert_eq!(TrapKey::parse("INT"), Some(TrapKey::Signal(Signal::SIGINT as i32)));
        assert_eq!(TrapKey::parse("SIGTERM"), Some(TrapKey::Signal(Signal::SIGTERM as i32)));
        assert_eq!(TrapKey::parse("EXIT"), Some(TrapKey::Exit));
        assert_eq!(TrapKey::parse("0"), Some(TrapKey::Exit));
    }

    #[test]
    fn reset_keeps_only_ignored() {
        let mut table = TrapTable::new();
        table.set(TrapKey::Exit, TrapAction::Command("echo bye".into()));
        table.set(TrapKey::Signal(Signal::SIGINT as i32), TrapAction::Ignore);
        let reset = table.reset_for_subshell();
        assert!(matches!(reset.action(TrapKey::Exit), TrapAction::Default));
        assert!(reset.is_ignored(TrapKey::Signal(Signal::SIGINT as i32)));
    }
}
