//! Function table (spec §4.G): shell functions are stored by name and
//! executed with their own positional-parameter frame, sharing the caller's
//! variable scope (no local scoping beyond positionals).

use crate::ast::CompoundCommandNode;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct FunctionTable {
    functions: HashMap<String, CompoundCommandNode>,
}

impl FunctionTable {
    pub fn new() -> Self {
        FunctionTable { functions: HashMap::new() }
    }

    pub fn define(&mut self, name: &str, body: CompoundCommandNode) {
        self.functions.insert(name.to_string(), body);
    }

    pub fn get(&self, name: &str) -> Option<&CompoundCommandNode> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.functions.remove(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.functions.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::new()
    }
}
