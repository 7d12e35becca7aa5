//! Loaded modules and their types.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::catalog::SymbolError;

use super::descriptor::{TypeDescriptor, module_simple_name};
use super::info::{MemberDef, MemberInfo, Type, TypeInfo, TypeKind};
use super::std_module;

/// Standard module id in the current runtime flavor.
pub const STD_MODULE: &str = "core";
/// Standard module id in the legacy runtime flavor.
pub const LEGACY_STD_MODULE: &str = "corelib";

/// True for any flavor's standard module id, versioned or not.
pub fn is_std_module(module: &str) -> bool {
    matches!(module_simple_name(module), STD_MODULE | LEGACY_STD_MODULE)
}

/// Runtime flavor; decides the standard module's id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Flavor {
    #[default]
    Current,
    Legacy,
}

impl Flavor {
    pub fn std_module(self) -> &'static str {
        match self {
            Flavor::Current => STD_MODULE,
            Flavor::Legacy => LEGACY_STD_MODULE,
        }
    }
}

/// A named set of types.
#[derive(Debug)]
pub struct Module {
    id: String,
    types: IndexMap<String, Type>,
}

impl Module {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        module_simple_name(&self.id)
    }

    /// Type by exact qualified name.
    pub fn get(&self, qualified_name: &str) -> Option<&Type> {
        self.types.get(qualified_name)
    }

    pub fn types(&self) -> impl Iterator<Item = &Type> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Builder for [`Module`].
pub struct ModuleBuilder {
    id: String,
    types: Vec<TypeInfo>,
}

impl ModuleBuilder {
    /// `id` may carry a version qualifier (`"contracts, Version=1.2.0"`).
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            types: Vec::new(),
        }
    }

    pub fn record(mut self, record: RecordBuilder) -> Self {
        let info = record.build(&self.id);
        self.types.push(info);
        self
    }

    pub(crate) fn push(&mut self, info: TypeInfo) {
        self.types.push(info);
    }

    pub fn build(self) -> Module {
        let types = self
            .types
            .into_iter()
            .map(|t| (t.descriptor.type_name.clone(), Arc::new(t)))
            .collect();
        Module { id: self.id, types }
    }
}

/// Builder for a record type: a named bag of slot-backed properties and fields,
/// plus any native members the caller adds.
pub struct RecordBuilder {
    name: String,
    members: Vec<MemberDef>,
}

impl RecordBuilder {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            name: qualified_name.into(),
            members: Vec::new(),
        }
    }

    pub fn property(self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.member(MemberDef::property(name, ty))
    }

    pub fn field(self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.member(MemberDef::field(name, ty))
    }

    pub fn member(mut self, def: MemberDef) -> Self {
        self.members.push(def);
        self
    }

    fn build(self, module: &str) -> TypeInfo {
        let descriptor = TypeDescriptor::new(module, self.name);
        let mut info = TypeInfo::new(descriptor, TypeKind::Record);
        info.members = self
            .members
            .into_iter()
            .map(|def| Arc::new(MemberInfo::from_def(&info.descriptor, def)))
            .collect();
        info
    }
}

/// The set of loaded modules. Always contains the standard module.
#[derive(Debug)]
pub struct Universe {
    flavor: Flavor,
    /// Keyed by simple module name.
    modules: IndexMap<String, Module>,
}

impl Default for Universe {
    fn default() -> Self {
        Self::new()
    }
}

impl Universe {
    pub fn new() -> Self {
        Self::with_flavor(Flavor::Current)
    }

    pub fn with_flavor(flavor: Flavor) -> Self {
        let std = std_module::build(flavor.std_module());
        let mut modules = IndexMap::new();
        modules.insert(std.name().to_owned(), std);
        Self { flavor, modules }
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn std_module_id(&self) -> &str {
        self.flavor.std_module()
    }

    pub fn add_module(&mut self, module: Module) -> Result<(), SymbolError> {
        let name = module.name().to_owned();
        if self.modules.contains_key(&name) {
            return Err(SymbolError::DuplicateModule(name));
        }
        self.modules.insert(name, module);
        Ok(())
    }

    /// Chainable form of [`Universe::add_module`].
    pub fn with_module(mut self, module: Module) -> Result<Self, SymbolError> {
        self.add_module(module)?;
        Ok(self)
    }

    /// Module by id; version qualifiers are ignored.
    pub fn module(&self, id: &str) -> Option<&Module> {
        self.modules.get(module_simple_name(id))
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }
}
