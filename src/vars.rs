//! Variable Store: keyed map from name to value with `{exported, readonly}`
//! attributes, a positional-parameter vector, and synchronization with the
//! process environment.

use std::collections::HashSet;
use std::env;

use crate::errors::ReadonlyError;

#[derive(Debug, Clone, Default)]
pub struct Variable {
    pub value: Option<String>,
    pub exported: bool,
    pub readonly: bool,
}

/// Name → value map plus positional parameters and the handful of computed
/// special parameters (`$?`, `$$`, `$!`, `$#`, `$@`, `$*`, `$-`, `$0`).
#[derive(Debug, Clone)]
pub struct VarStore {
    vars: std::collections::HashMap<String, Variable>,
    /// argv[0] .. argv[N]; index 0 is `$0`.
    pub positional: Vec<String>,
    pub last_status: i32,
    pub last_bg_pid: Option<i32>,
    pub shell_pid: i32,
    pub options: ShellOptions,
}

#[derive(Debug, Clone, Default)]
pub struct ShellOptions {
    pub nounset: bool,
    pub errexit: bool,
    pub xtrace: bool,
    pub verbose: bool,
    pub noclobber: bool,
    pub allexport: bool,
    pub monitor: bool,
    pub noexec: bool,
}

impl ShellOptions {
    /// The `$-` string: one character per active single-letter option.
    pub fn flags_string(&self) -> String {
        let mut s = String::new();
        if self.errexit {
            s.push('e');
        }
        if self.nounset {
            s.push('u');
        }
        if self.xtrace {
            s.push('x');
        }
        if self.verbose {
            s.push('v');
        }
        if self.noclobber {
            s.push('C');
        }
        if self.allexport {
            s.push('a');
        }
        if self.monitor {
            s.push('m');
        }
        if self.noexec {
            s.push('n');
        }
        s
    }
}

impl VarStore {
    pub fn new(argv0: String, args: Vec<String>) -> Self {
        let mut positional = vec![argv0];
        positional.extend(args);
        VarStore {
            vars: std::collections::HashMap::new(),
            positional,
            last_status: 0,
            last_bg_pid: None,
            shell_pid: std::process::id() as i32,
            options: ShellOptions::default(),
        }
    }

    /// Seed the store from the current process environment, marking every
    /// entry exported (spec §4.A `import_environment`).
    pub fn import_environment(&mut self) {
        for (k, v) in env::vars() {
            self.vars.insert(
                k,
                Variable { value: Some(v), exported: true, readonly: false },
            );
        }
    }

    /// Computed/special parameters are resolved here before falling through
    /// to the ordinary name map.
    pub fn get(&self, name: &str) -> Option<String> {
        match name {
            "?" => return Some(self.last_status.to_string()),
            "$" => return Some(self.shell_pid.to_string()),
            "!" => return self.last_bg_pid.map(|p| p.to_string()),
            "#" => return Some((self.positional.len().saturating_sub(1)).to_string()),
            "@" | "*" => return Some(self.positional[1..].join(" ")),
            "-" => return Some(self.options.flags_string()),
            "0" => return self.positional.first().cloned(),
            _ => {}
        }
        if let Ok(n) = name.parse::<usize>() {
            if n >= 1 {
                return self.positional.get(n).cloned();
            }
        }
        if let Some(v) = self.vars.get(name) {
            if v.value.is_some() {
                return v.value.clone();
            }
            // Declared readonly/exported with no value: falls through to
            // environment only if never locally set at all, so stop here.
            return None;
        }
        env::var(name).ok()
    }

    pub fn is_set(&self, name: &str) -> bool {
        match name {
            "?" | "$" | "#" | "@" | "*" | "-" | "0" => return true,
            "!" => return self.last_bg_pid.is_some(),
            _ => {}
        }
        if let Ok(n) = name.parse::<usize>() {
            return self.positional.get(n).is_some();
        }
        self.vars.contains_key(name) || env::var(name).is_ok()
    }

    pub fn is_null_or_unset(&self, name: &str) -> bool {
        match self.get(name) {
            None => true,
            Some(v) => v.is_empty(),
        }
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), ReadonlyError> {
        if self.is_readonly(name) {
            return Err(ReadonlyError::Assignment(name.to_string()));
        }
        let value = value.into();
        let entry = self.vars.entry(name.to_string()).or_default();
        entry.value = Some(value.clone());
        if entry.exported || self.options.allexport {
            entry.exported = true;
            env::set_var(name, &value);
        }
        Ok(())
    }

    pub fn append(&mut self, name: &str, suffix: impl AsRef<str>) -> Result<(), ReadonlyError> {
        let current = self.get(name).unwrap_or_default();
        let joined = format!("{current}{}", suffix.as_ref());
        self.set(name, joined)
    }

    pub fn unset(&mut self, name: &str) -> Result<(), ReadonlyError> {
        if self.is_readonly(name) {
            return Err(ReadonlyError::Assignment(name.to_string()));
        }
        self.vars.remove(name);
        env::remove_var(name);
        Ok(())
    }

    pub fn mark_readonly(&mut self, name: &str) {
        self.vars.entry(name.to_string()).or_default().readonly = true;
    }

    pub fn mark_exported(&mut self, name: &str) {
        let entry = self.vars.entry(name.to_string()).or_default();
        entry.exported = true;
        if let Some(v) = &entry.value {
            env::set_var(name, v);
        }
    }

    pub fn is_readonly(&self, name: &str) -> bool {
        self.vars.get(name).map(|v| v.readonly).unwrap_or(false)
    }

    pub fn is_exported(&self, name: &str) -> bool {
        self.vars.get(name).map(|v| v.exported).unwrap_or(false)
    }

    pub fn list_all(&self) -> Vec<(&String, &Variable)> {
        let mut v: Vec<_> = self.vars.iter().collect();
        v.sort_by(|a, b| a.0.cmp(b.0));
        v
    }

    pub fn list_exported(&self) -> Vec<&String> {
        let mut v: Vec<&String> =
            self.vars.iter().filter(|(_, var)| var.exported).map(|(k, _)| k).collect();
        v.sort();
        v
    }

    pub fn list_readonly(&self) -> Vec<&String> {
        let mut v: Vec<&String> =
            self.vars.iter().filter(|(_, var)| var.readonly).map(|(k, _)| k).collect();
        v.sort();
        v
    }

    pub fn exported_names(&self) -> HashSet<String> {
        self.vars
            .iter()
            .filter(|(_, v)| v.exported)
            .map(|(k, _)| k.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_params() {
        let v = VarStore::new("hash".into(), vec!["a".into(), "b".into()]);
        assert_eq!(v.get("0"), Some("hash".into()));
        assert_eq!(v.get("1"), Some("a".into()));
        assert_eq!(v.get("#"), Some("2".into()));
        assert_eq!(v.get("@"), Some("a b".into()));
    }

    #[test]
    fn readonly_blocks_set() {
        let mut v = VarStore::new("hash".into(), vec![]);
        v.set("X", "1").unwrap();
        v.mark_readonly("X");
        assert!(v.set("X", "2").is_err());
        assert_eq!(v.get("X"), Some("1".into()));
    }

    #[test]
    fn unset_removes_env() {
        let mut v = VarStore::new("hash".into(), vec![]);
        v.set("MYTESTVAR_XYZ", "1").unwrap();
        v.mark_exported("MYTESTVAR_XYZ");
        assert_eq!(env::var("MYTESTVAR_XYZ").unwrap(), "1");
        v.unset("MYTESTVAR_XYZ").unwrap();
        assert!(env::var("MYTESTVAR_XYZ").is_err());
    }
}
