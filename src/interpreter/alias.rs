//! Alias table (spec §4.H step 2 / §9 Open Question): alias expansion runs
//! on `argv[0]` *after* word expansion, re-tokenizing the alias's value and
//! the remaining argv. A name is never expanded twice within the same
//! expansion chain, closing the recursive-alias Open Question.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        AliasTable { aliases: HashMap::new() }
    }

    pub fn define(&mut self, name: &str, value: &str) {
        self.aliases.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(|s| s.as_str())
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.aliases.remove(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Re-tokenizes `alias_value` followed by the already-expanded remaining
/// argv, expanding further aliases on the new first word up to the guard.
/// Returns the fully-expanded argv once no further alias on the leading word
/// applies, or the chain revisits a name already seen.
pub fn expand_chain(
    table: &AliasTable,
    first_word: &str,
    rest: &[String],
    seen: &mut std::collections::HashSet<String>,
) -> Vec<String> {
    let mut head = first_word.to_string();
    let mut tail = rest.to_vec();
    loop {
        if seen.contains(&head) {
            break;
        }
        let Some(value) = table.get(&head) else { break };
        seen.insert(head.clone());
        let mut expanded: Vec<String> = value.split_whitespace().map(|s| s.to_string()).collect();
        if expanded.is_empty() {
            break;
        }
        let new_head = expanded.remove(0);
        expanded.extend(tail);
        tail = expanded;
        head = new_head;
    }
    let mut out = vec![head];
    out.extend(tail);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_expansion() {
        let mut table = AliasTable::new();
        table.define("ll", "ls -l");
        let mut seen = std::collections::HashSet::new();
        let out = expand_chain(&table, "ll", &["file".to_string()], &mut seen);
        assert_eq!(out, vec!["ls".to_string(), "-l".to_string(), "file".to_string()]);
    }

    #[test]
    fn recursion_guarded() {
        let mut table = AliasTable::new();
        table.define("a", "a b");
        let mut seen = std::collections::HashSet::new();
        let out = expand_chain(&table, "a", &[], &mut seen);
        assert_eq!(out, vec!["a".to_string(), "b".to_string()]);
    }
}
