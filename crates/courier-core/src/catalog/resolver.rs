//! Descriptor resolution with process-lifetime memoization.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::types::{
    Member, MemberInfo, MemberKind, Primitive, SymbolDescriptor, Type, TypeDescriptor, TypeInfo,
    Universe, simple_type_name,
};

use super::alias::AliasTable;
use super::error::SymbolError;

/// Resolver seam used by the transcoder passes.
///
/// `scope` is the id of the module whose types are searched first and
/// suffix-matched last; `None` restricts lookup to the named module.
pub trait SymbolCatalog: Send + Sync {
    fn resolve_type(&self, desc: &TypeDescriptor, scope: Option<&str>) -> Result<Type, SymbolError>;

    fn resolve_symbol(
        &self,
        desc: &SymbolDescriptor,
        scope: Option<&str>,
    ) -> Result<Member, SymbolError>;

    fn describe_type(&self, ty: &Type) -> TypeDescriptor;

    fn describe_symbol(&self, member: &Member) -> SymbolDescriptor;
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TypeKey {
    scope: Option<String>,
    module: String,
    name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SymbolKey {
    owner: TypeDescriptor,
    kind: MemberKind,
    name: String,
    signature: String,
    generic_arguments: Vec<TypeDescriptor>,
}

/// Concrete [`SymbolCatalog`] over a [`Universe`].
///
/// Caches are concurrent maps. Two threads racing on the same key may both
/// compute the value; the results are identical and the first insert wins.
pub struct Catalog {
    universe: Arc<Universe>,
    aliases: AliasTable,
    definitions: DashMap<TypeKey, Type>,
    constructed: DashMap<TypeDescriptor, Type>,
    symbols: DashMap<SymbolKey, Member>,
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("aliases", &self.aliases)
            .field("cached_types", &self.cached_types())
            .field("cached_symbols", &self.cached_symbols())
            .finish_non_exhaustive()
    }
}

impl Catalog {
    pub fn new(universe: Arc<Universe>) -> Self {
        let aliases = AliasTable::for_universe(&universe);
        Self::with_aliases(universe, aliases)
    }

    pub fn with_aliases(universe: Arc<Universe>, aliases: AliasTable) -> Self {
        Self {
            universe,
            aliases,
            definitions: DashMap::new(),
            constructed: DashMap::new(),
            symbols: DashMap::new(),
        }
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Number of memoized type handles (definitions and constructed types).
    pub fn cached_types(&self) -> usize {
        self.definitions.len() + self.constructed.len()
    }

    pub fn cached_symbols(&self) -> usize {
        self.symbols.len()
    }

    pub fn std_type(&self, name: &str) -> Result<Type, SymbolError> {
        self.resolve_type(&TypeDescriptor::std(name), None)
    }

    pub fn primitive(&self, p: Primitive) -> Result<Type, SymbolError> {
        self.std_type(p.name())
    }

    pub fn nullable(&self, inner: &Type) -> Result<Type, SymbolError> {
        self.resolve_type(&TypeDescriptor::nullable(inner.descriptor().clone()), None)
    }

    pub fn array(&self, element: &Type) -> Result<Type, SymbolError> {
        self.resolve_type(&TypeDescriptor::array(element.descriptor().clone()), None)
    }

    pub fn list(&self, element: &Type) -> Result<Type, SymbolError> {
        self.resolve_type(&TypeDescriptor::list(element.descriptor().clone()), None)
    }

    /// `Func<params..., ret>`.
    pub fn function(&self, params: &[Type], ret: &Type) -> Result<Type, SymbolError> {
        let args = params
            .iter()
            .chain(std::iter::once(ret))
            .map(|t| t.descriptor().clone())
            .collect();
        self.resolve_type(&TypeDescriptor::std("Func").with_args(args), None)
    }

    pub fn type_named(&self, module: &str, name: &str) -> Result<Type, SymbolError> {
        self.resolve_type(&TypeDescriptor::new(module, name), None)
    }

    /// Live type of a member's value (property type, return type).
    pub fn value_type_of(&self, member: &MemberInfo) -> Result<Type, SymbolError> {
        let scope = member.declaring_type().module.clone();
        self.resolve_type(member.value_type(), Some(&scope))
    }

    /// Live types of a member's parameters.
    pub fn parameter_types_of(&self, member: &MemberInfo) -> Result<Vec<Type>, SymbolError> {
        let scope = member.declaring_type().module.clone();
        member
            .parameters()
            .iter()
            .map(|p| self.resolve_type(p, Some(&scope)))
            .collect()
    }

    fn resolve_definition(
        &self,
        desc: &TypeDescriptor,
        scope: Option<&str>,
    ) -> Result<Type, SymbolError> {
        let key = TypeKey {
            scope: scope.map(|s| self.aliases.resolve(s).to_owned()),
            module: desc.module.clone(),
            name: desc.type_name.clone(),
        };
        if let Some(hit) = self.definitions.get(&key) {
            return Ok(hit.value().clone());
        }

        let found = self
            .locate(desc, key.scope.as_deref())
            .ok_or_else(|| SymbolError::TypeNotFound {
                module: desc.module.clone(),
                name: desc.type_name.clone(),
            })?;
        tracing::debug!(module = %desc.module, name = %desc.type_name, resolved = %found, "type cache miss");

        Ok(self.definitions.entry(key).or_insert(found).value().clone())
    }

    /// Declaring module, then the named module, then a suffix match in the declaring module.
    fn locate(&self, desc: &TypeDescriptor, scope: Option<&str>) -> Option<Type> {
        let name = desc.type_name.as_str();
        let scope_module = scope.and_then(|s| self.universe.module(s));

        if let Some(found) = scope_module.and_then(|m| m.get(name)) {
            return Some(found.clone());
        }
        if let Some(found) = self.universe.module(&desc.module).and_then(|m| m.get(name)) {
            return Some(found.clone());
        }
        scope_module
            .and_then(|m| m.types().find(|t| suffix_matches(name, t.name())))
            .cloned()
    }

    fn construct(
        &self,
        definition: &Type,
        desc: &TypeDescriptor,
        scope: Option<&str>,
    ) -> Result<Type, SymbolError> {
        let args = desc
            .generic_arguments
            .iter()
            .map(|a| self.resolve_type(a, scope).map(|t| t.descriptor().clone()))
            .collect::<Result<Vec<_>, _>>()?;
        let key = definition.descriptor().clone().with_args(args.clone());
        if let Some(hit) = self.constructed.get(&key) {
            return Ok(hit.value().clone());
        }

        let info: TypeInfo = definition.construct(args)?;
        tracing::debug!(constructed = %key, "generic type cache miss");
        Ok(self
            .constructed
            .entry(key)
            .or_insert_with(|| Arc::new(info))
            .value()
            .clone())
    }
}

impl SymbolCatalog for Catalog {
    fn resolve_type(&self, desc: &TypeDescriptor, scope: Option<&str>) -> Result<Type, SymbolError> {
        if desc.is_generic_param() {
            return Err(SymbolError::OpenGeneric(desc.type_name.clone()));
        }
        let desc = self.aliases.apply(desc);
        let definition = self.resolve_definition(&desc, scope)?;
        if desc.generic_arguments.is_empty() {
            return Ok(definition);
        }
        self.construct(&definition, &desc, scope)
    }

    fn resolve_symbol(
        &self,
        desc: &SymbolDescriptor,
        scope: Option<&str>,
    ) -> Result<Member, SymbolError> {
        let owner = self.resolve_type(&desc.owner, scope)?;
        let generic_arguments = desc
            .generic_arguments
            .iter()
            .map(|a| self.resolve_type(a, scope).map(|t| t.descriptor().clone()))
            .collect::<Result<Vec<_>, _>>()?;
        let key = SymbolKey {
            owner: owner.descriptor().clone(),
            kind: desc.kind,
            name: desc.name.clone(),
            signature: desc.signature.clone(),
            generic_arguments,
        };
        if let Some(hit) = self.symbols.get(&key) {
            return Ok(hit.value().clone());
        }

        let candidates: Vec<&Member> = owner
            .members_named(&desc.name, desc.kind)
            .filter(|m| m.signature() == desc.signature)
            .collect();
        let found = match candidates.as_slice() {
            [] => {
                return Err(SymbolError::SymbolNotFound {
                    owner: owner.to_string(),
                    signature: desc.signature.clone(),
                });
            }
            [single] => (*single).clone(),
            many => {
                return Err(SymbolError::AmbiguousSymbol {
                    owner: owner.to_string(),
                    signature: desc.signature.clone(),
                    count: many.len(),
                });
            }
        };

        let member = if key.generic_arguments.is_empty() {
            found
        } else {
            Arc::new(found.instantiate(key.generic_arguments.clone())?)
        };
        tracing::debug!(owner = %owner, signature = %desc.signature, "symbol cache miss");

        Ok(self.symbols.entry(key).or_insert(member).value().clone())
    }

    fn describe_type(&self, ty: &Type) -> TypeDescriptor {
        ty.descriptor().clone()
    }

    fn describe_symbol(&self, member: &Member) -> SymbolDescriptor {
        SymbolDescriptor::new(
            member.declaring_type().clone(),
            member.kind(),
            member.name(),
            member.signature(),
        )
        .with_generic_arguments(member.generic_arguments().to_vec())
    }
}

/// `Client.Models.Person` suffix-matches a local `Sample.Person` at a namespace boundary.
fn suffix_matches(wire_name: &str, local_name: &str) -> bool {
    let simple = simple_type_name(local_name);
    wire_name == simple
        || wire_name
            .strip_suffix(simple)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
