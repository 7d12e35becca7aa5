//! Cross-runtime module aliases.

use std::collections::HashMap;

use crate::types::{LEGACY_STD_MODULE, STD_MODULE, TypeDescriptor, Universe, module_simple_name};

/// Maps foreign module names onto local module ids before type lookup.
///
/// Keys are simple module names; version qualifiers on the incoming
/// descriptor are ignored when matching.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every standard-module flavor maps to the universe's own standard module.
    pub fn for_universe(universe: &Universe) -> Self {
        let local = universe.std_module_id();
        Self::new()
            .with_alias(STD_MODULE, local)
            .with_alias(LEGACY_STD_MODULE, local)
    }

    pub fn with_alias(mut self, foreign: impl Into<String>, local: impl Into<String>) -> Self {
        let foreign = foreign.into();
        let key = module_simple_name(&foreign).to_owned();
        self.entries.insert(key, local.into());
        self
    }

    /// Local module id for `module`, or `module` itself when no alias applies.
    pub fn resolve<'a>(&'a self, module: &'a str) -> &'a str {
        self.entries
            .get(module_simple_name(module))
            .map_or(module, String::as_str)
    }

    /// Rewrite the module of `desc` and of all its generic arguments.
    pub fn apply(&self, desc: &TypeDescriptor) -> TypeDescriptor {
        if desc.is_generic_param() {
            return desc.clone();
        }
        TypeDescriptor {
            module: self.resolve(&desc.module).to_owned(),
            type_name: desc.type_name.clone(),
            generic_arguments: desc.generic_arguments.iter().map(|a| self.apply(a)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
