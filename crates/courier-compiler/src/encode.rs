//! Predicate tree to portable tree.
//!
//! The predicate is folded first. Each node then becomes one portable node;
//! live types and members are replaced by their descriptors.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use courier_core::{
    Expr, ExprKind, Lambda, Member, MemberKind, NodeType, Param, Primitive, SymbolCatalog, Type,
    TypeDescriptor, Value,
};
use courier_vm::FuelLimits;
use courier_wire::{
    ConstantValue, ConstructorRef, MemberRef, MethodRef, NodeBody, PortableNode, PortableTree,
};

use crate::constant::{self, ConstantError};
use crate::error::EncodeError;
use crate::fold::ConstantFolder;

type Result<T> = std::result::Result<T, EncodeError>;

/// Encode a predicate with default fold limits.
pub fn encode(lambda: &Lambda, catalog: &dyn SymbolCatalog) -> Result<PortableTree> {
    Encoder::new(catalog).encode(lambda)
}

/// Per-call encoder state: descriptor memos and parameter names.
pub struct Encoder<'c> {
    catalog: &'c dyn SymbolCatalog,
    limits: FuelLimits,
    types: HashMap<usize, TypeDescriptor>,
    params: HashMap<usize, String>,
    names: HashSet<String>,
}

impl<'c> Encoder<'c> {
    pub fn new(catalog: &'c dyn SymbolCatalog) -> Self {
        Self {
            catalog,
            limits: FuelLimits::folding(),
            types: HashMap::new(),
            params: HashMap::new(),
            names: HashSet::new(),
        }
    }

    /// Limits for evaluating folded subtrees.
    pub fn with_limits(mut self, limits: FuelLimits) -> Self {
        self.limits = limits;
        self
    }

    #[tracing::instrument(skip_all, fields(parameter = lambda.parameters.first().and_then(Param::name)))]
    pub fn encode(mut self, lambda: &Lambda) -> Result<PortableTree> {
        if !lambda.is_predicate() {
            return Err(EncodeError::InvalidShape(format!(
                "expected one parameter and a Boolean body, found {} parameter(s) and `{}`",
                lambda.parameters.len(),
                lambda.body.ty
            )));
        }
        let folded = ConstantFolder::new(self.limits).fold(lambda)?;
        let root = self.lambda(&folded)?;
        tracing::debug!(types = self.types.len(), "predicate encoded");
        Ok(PortableTree::new(root))
    }

    fn node(&mut self, expr: &Expr) -> Result<PortableNode> {
        if expr.node_type.category() != expr.kind.category() {
            return Err(EncodeError::UnsupportedConstruct(format!(
                "{} on a {:?} node",
                expr.node_type,
                expr.kind.category()
            )));
        }

        let body = match &expr.kind {
            ExprKind::Binary {
                left,
                right,
                method,
                conversion,
                lift_to_null,
            } => NodeBody::BinaryOp {
                left: Box::new(self.node(left)?),
                right: Box::new(self.node(right)?),
                operator: expr.node_type,
                method: method.as_ref().map(|m| self.method(m)),
                conversion: match conversion {
                    Some(c) => Some(Box::new(self.lambda(c)?)),
                    None => None,
                },
                lift_to_null: *lift_to_null,
            },
            ExprKind::Unary { operand, method } => NodeBody::UnaryOp {
                operand: Box::new(self.node(operand)?),
                operator: expr.node_type,
                method: method.as_ref().map(|m| self.method(m)),
            },
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            } => NodeBody::Conditional {
                test: Box::new(self.node(test)?),
                if_true: Box::new(self.node(if_true)?),
                if_false: Box::new(self.node(if_false)?),
            },
            ExprKind::Constant(value) => NodeBody::Constant {
                value: self.constant(value, &expr.ty)?,
            },
            ExprKind::Default => NodeBody::Default {},
            ExprKind::Index {
                object,
                indexer,
                arguments,
            } => NodeBody::Index {
                object: Box::new(self.node(object)?),
                indexer: indexer.as_ref().map(|m| self.member(m)),
                arguments: self.nodes(arguments)?,
            },
            ExprKind::Invocation {
                expression,
                arguments,
            } => NodeBody::Invocation {
                expression: Box::new(self.node(expression)?),
                arguments: self.nodes(arguments)?,
            },
            ExprKind::Lambda(l) => return self.lambda(l),
            ExprKind::MemberAccess { expression, member } => NodeBody::MemberAccess {
                expression: match expression {
                    Some(e) => Some(Box::new(self.node(e)?)),
                    None => None,
                },
                member: self.member(member),
            },
            ExprKind::MethodCall {
                object,
                method,
                arguments,
            } => NodeBody::MethodCall {
                object: match object {
                    Some(o) => Some(Box::new(self.node(o)?)),
                    None => None,
                },
                method: self.method(method),
                arguments: self.nodes(arguments)?,
            },
            ExprKind::NewArray {
                element_type,
                expressions,
            } => NodeBody::NewArray {
                element_type: self.type_desc(element_type),
                expressions: self.nodes(expressions)?,
            },
            ExprKind::NewObject {
                constructor,
                arguments,
                members,
            } => NodeBody::NewObject {
                constructor: self.constructor(constructor),
                arguments: self.nodes(arguments)?,
                members: members.iter().map(|m| self.member(m)).collect(),
            },
            ExprKind::Parameter(p) => return Ok(self.parameter(p)),
            ExprKind::RuntimeVariables(vars) => NodeBody::RuntimeVariablesGroup {
                variables: vars.iter().map(|v| self.parameter(v)).collect(),
            },
            ExprKind::TypeTest {
                expression,
                type_operand,
            } => NodeBody::TypeTest {
                expression: Box::new(self.node(expression)?),
                type_operand: self.type_desc(type_operand),
                test_kind: expr.node_type,
            },
            ExprKind::Block {
                variables,
                expressions,
            } => NodeBody::Block {
                expressions: self.nodes(expressions)?,
                variables: variables.iter().map(|v| self.parameter(v)).collect(),
            },
        };

        let ty = self.type_desc(&expr.ty);
        Ok(PortableNode::new(expr.node_type, ty, body))
    }

    fn nodes(&mut self, exprs: &[Expr]) -> Result<Vec<PortableNode>> {
        exprs.iter().map(|e| self.node(e)).collect()
    }

    fn lambda(&mut self, lambda: &Lambda) -> Result<PortableNode> {
        let parameters = lambda.parameters.iter().map(|p| self.parameter(p)).collect();
        let body = self.node(&lambda.body)?;
        Ok(PortableNode::new(
            NodeType::Lambda,
            self.type_desc(&lambda.ty),
            NodeBody::Lambda {
                name: lambda.name.clone(),
                parameters,
                body: Box::new(body),
                tail_call: lambda.tail_call,
            },
        ))
    }

    fn parameter(&mut self, param: &Param) -> PortableNode {
        let name = self.parameter_name(param);
        PortableNode::new(
            NodeType::Parameter,
            self.type_desc(param.ty()),
            NodeBody::Parameter { name: Some(name) },
        )
    }

    /// Wire name of a parameter, unique per distinct parameter in this tree.
    ///
    /// The decoder shares parameters by name, so unnamed parameters get `$n`
    /// and a second parameter reusing a name gets a `$n` suffix.
    fn parameter_name(&mut self, param: &Param) -> String {
        if let Some(name) = self.params.get(&param.identity()) {
            return name.clone();
        }
        let base = param.name().unwrap_or("");
        let mut name = if base.is_empty() {
            format!("${}", self.params.len())
        } else {
            base.to_owned()
        };
        let mut n = 1;
        while self.names.contains(&name) {
            name = format!("{base}${n}");
            n += 1;
        }
        self.names.insert(name.clone());
        self.params.insert(param.identity(), name.clone());
        name
    }

    fn constant(&mut self, value: &Value, ty: &Type) -> Result<Option<ConstantValue>> {
        if value.is_null() {
            return Ok(None);
        }
        let carried = if ty.is_primitive(Primitive::Object) {
            self.runtime_type(value)?.unwrap_or_else(|| ty.clone())
        } else {
            ty.clone()
        };
        Ok(Some(ConstantValue {
            ty: self.type_desc(&carried),
            value: constant::to_json(value)?,
        }))
    }

    /// Runtime type of a boxed scalar or record, written in place of `Object`
    /// so the receiver reads the value back with its own type.
    fn runtime_type(&self, value: &Value) -> Result<Option<Type>> {
        if let Value::Record(record) = value {
            return Ok(Some(record.record_type().clone()));
        }
        let Some(p) = value.primitive() else {
            return Ok(None);
        };
        let ty = self
            .catalog
            .resolve_type(&TypeDescriptor::std(p.name()), None)
            .map_err(ConstantError::from)?;
        Ok(Some(ty))
    }

    fn type_desc(&mut self, ty: &Type) -> TypeDescriptor {
        let key = Arc::as_ptr(ty) as usize;
        if let Some(desc) = self.types.get(&key) {
            return desc.clone();
        }
        let desc = self.catalog.describe_type(ty);
        self.types.insert(key, desc.clone());
        desc
    }

    fn member(&self, member: &Member) -> MemberRef {
        let desc = self.catalog.describe_symbol(member);
        MemberRef {
            owner: desc.owner,
            member_kind: desc.kind,
            name: desc.name,
            signature: desc.signature,
        }
    }

    fn method(&self, method: &Member) -> MethodRef {
        let desc = self.catalog.describe_symbol(method);
        debug_assert_eq!(desc.kind, MemberKind::Method);
        MethodRef {
            owner: desc.owner,
            name: desc.name,
            signature: desc.signature,
            generic: desc.generic_arguments,
        }
    }

    fn constructor(&self, constructor: &Member) -> ConstructorRef {
        let desc = self.catalog.describe_symbol(constructor);
        ConstructorRef {
            owner: desc.owner,
            name: desc.name,
            signature: desc.signature,
        }
    }
}
