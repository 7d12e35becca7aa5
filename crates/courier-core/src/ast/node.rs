//! Predicate AST node types.
//!
//! A closed tagged union: one [`ExprKind`] variant per node kind, an
//! operator/kind tag ([`NodeType`]) and a live static type on every node.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::types::{Member, Primitive, Type};
use crate::value::Value;

/// Node kind, one per [`ExprKind`] variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    Binary,
    Unary,
    Conditional,
    Constant,
    Default,
    Index,
    Invocation,
    Lambda,
    MemberAccess,
    MethodCall,
    NewArray,
    NewObject,
    Parameter,
    RuntimeVariables,
    TypeTest,
    Block,
}

/// Operator or kind tag carried by every node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    And,
    Or,
    ExclusiveOr,
    LeftShift,
    RightShift,
    AndAlso,
    OrElse,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Coalesce,
    ArrayIndex,

    Not,
    Negate,
    UnaryPlus,
    Convert,
    TypeAs,
    ArrayLength,
    Quote,
    IsTrue,
    IsFalse,

    Conditional,
    Constant,
    Default,
    Index,
    Invoke,
    Lambda,
    MemberAccess,
    Call,
    NewArrayInit,
    NewArrayBounds,
    New,
    Parameter,
    RuntimeVariables,
    TypeIs,
    TypeEqual,
    Block,
}

impl NodeType {
    /// The one node kind this tag is legal on.
    pub fn category(self) -> NodeCategory {
        use NodeType::*;
        match self {
            Add | Subtract | Multiply | Divide | Modulo | Power | And | Or | ExclusiveOr
            | LeftShift | RightShift | AndAlso | OrElse | Equal | NotEqual | LessThan
            | LessThanOrEqual | GreaterThan | GreaterThanOrEqual | Coalesce | ArrayIndex => {
                NodeCategory::Binary
            }
            Not | Negate | UnaryPlus | Convert | TypeAs | ArrayLength | Quote | IsTrue
            | IsFalse => NodeCategory::Unary,
            Conditional => NodeCategory::Conditional,
            Constant => NodeCategory::Constant,
            Default => NodeCategory::Default,
            Index => NodeCategory::Index,
            Invoke => NodeCategory::Invocation,
            Lambda => NodeCategory::Lambda,
            MemberAccess => NodeCategory::MemberAccess,
            Call => NodeCategory::MethodCall,
            NewArrayInit | NewArrayBounds => NodeCategory::NewArray,
            New => NodeCategory::NewObject,
            Parameter => NodeCategory::Parameter,
            RuntimeVariables => NodeCategory::RuntimeVariables,
            TypeIs | TypeEqual => NodeCategory::TypeTest,
            Block => NodeCategory::Block,
        }
    }

    pub fn is_comparison(self) -> bool {
        use NodeType::*;
        matches!(
            self,
            Equal | NotEqual | LessThan | LessThanOrEqual | GreaterThan | GreaterThanOrEqual
        )
    }

    pub fn is_arithmetic(self) -> bool {
        use NodeType::*;
        matches!(
            self,
            Add | Subtract
                | Multiply
                | Divide
                | Modulo
                | Power
                | And
                | Or
                | ExclusiveOr
                | LeftShift
                | RightShift
        )
    }

    pub fn is_short_circuit(self) -> bool {
        matches!(self, NodeType::AndAlso | NodeType::OrElse)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug)]
struct ParamInfo {
    name: Option<String>,
    ty: Type,
}

/// Free-variable handle.
///
/// Clones share identity; two params are the same variable iff they come
/// from the same [`Param::new`] call.
#[derive(Clone, Debug)]
pub struct Param(Arc<ParamInfo>);

impl Param {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self(Arc::new(ParamInfo {
            name: Some(name.into()),
            ty,
        }))
    }

    pub fn unnamed(ty: Type) -> Self {
        Self(Arc::new(ParamInfo { name: None, ty }))
    }

    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    pub fn ty(&self) -> &Type {
        &self.0.ty
    }

    pub fn same(&self, other: &Param) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Stable per-instance key for identity-keyed maps.
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Param {}

/// Lambda: parameters, a body, and its `Func<...>` type.
#[derive(Clone, Debug)]
pub struct Lambda {
    pub name: Option<String>,
    pub parameters: Vec<Param>,
    pub body: Expr,
    pub tail_call: bool,
    pub ty: Type,
}

impl Lambda {
    /// Exactly one parameter and a `Boolean` body.
    pub fn is_predicate(&self) -> bool {
        self.parameters.len() == 1 && self.body.ty.is_primitive(Primitive::Boolean)
    }
}

#[derive(Clone, Debug)]
pub struct Expr {
    pub node_type: NodeType,
    pub ty: Type,
    pub kind: ExprKind,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    Binary {
        left: Box<Expr>,
        right: Box<Expr>,
        method: Option<Member>,
        conversion: Option<Arc<Lambda>>,
        lift_to_null: bool,
    },
    Unary {
        operand: Box<Expr>,
        method: Option<Member>,
    },
    Conditional {
        test: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },
    Constant(Value),
    Default,
    Index {
        object: Box<Expr>,
        indexer: Option<Member>,
        arguments: Vec<Expr>,
    },
    Invocation {
        expression: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Lambda(Arc<Lambda>),
    MemberAccess {
        /// `None` for static members.
        expression: Option<Box<Expr>>,
        member: Member,
    },
    MethodCall {
        /// `None` for static methods.
        object: Option<Box<Expr>>,
        method: Member,
        arguments: Vec<Expr>,
    },
    NewArray {
        element_type: Type,
        expressions: Vec<Expr>,
    },
    NewObject {
        constructor: Member,
        arguments: Vec<Expr>,
        members: Vec<Member>,
    },
    Parameter(Param),
    RuntimeVariables(Vec<Param>),
    TypeTest {
        expression: Box<Expr>,
        type_operand: Type,
    },
    Block {
        variables: Vec<Param>,
        expressions: Vec<Expr>,
    },
}

impl ExprKind {
    pub fn category(&self) -> NodeCategory {
        match self {
            ExprKind::Binary { .. } => NodeCategory::Binary,
            ExprKind::Unary { .. } => NodeCategory::Unary,
            ExprKind::Conditional { .. } => NodeCategory::Conditional,
            ExprKind::Constant(_) => NodeCategory::Constant,
            ExprKind::Default => NodeCategory::Default,
            ExprKind::Index { .. } => NodeCategory::Index,
            ExprKind::Invocation { .. } => NodeCategory::Invocation,
            ExprKind::Lambda(_) => NodeCategory::Lambda,
            ExprKind::MemberAccess { .. } => NodeCategory::MemberAccess,
            ExprKind::MethodCall { .. } => NodeCategory::MethodCall,
            ExprKind::NewArray { .. } => NodeCategory::NewArray,
            ExprKind::NewObject { .. } => NodeCategory::NewObject,
            ExprKind::Parameter(_) => NodeCategory::Parameter,
            ExprKind::RuntimeVariables(_) => NodeCategory::RuntimeVariables,
            ExprKind::TypeTest { .. } => NodeCategory::TypeTest,
            ExprKind::Block { .. } => NodeCategory::Block,
        }
    }
}

impl Expr {
    pub fn new(node_type: NodeType, ty: Type, kind: ExprKind) -> Self {
        Self {
            node_type,
            ty,
            kind,
        }
    }

    pub fn constant(value: Value, ty: Type) -> Self {
        Self::new(NodeType::Constant, ty, ExprKind::Constant(value))
    }

    pub fn parameter(param: &Param) -> Self {
        Self::new(
            NodeType::Parameter,
            param.ty().clone(),
            ExprKind::Parameter(param.clone()),
        )
    }

    pub fn lambda(lambda: Lambda) -> Self {
        let ty = lambda.ty.clone();
        Self::new(NodeType::Lambda, ty, ExprKind::Lambda(Arc::new(lambda)))
    }

    pub fn as_parameter(&self) -> Option<&Param> {
        match &self.kind {
            ExprKind::Parameter(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Value> {
        match &self.kind {
            ExprKind::Constant(v) => Some(v),
            _ => None,
        }
    }

    /// Child expressions in schema order, including lambda bodies.
    pub fn children(&self) -> Vec<&Expr> {
        let mut out = Vec::new();
        match &self.kind {
            ExprKind::Binary {
                left,
                right,
                conversion,
                ..
            } => {
                out.push(left.as_ref());
                out.push(right.as_ref());
                if let Some(c) = conversion {
                    out.push(&c.body);
                }
            }
            ExprKind::Unary { operand, .. } => out.push(operand),
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            } => out.extend([test.as_ref(), if_true.as_ref(), if_false.as_ref()]),
            ExprKind::Index {
                object, arguments, ..
            } => {
                out.push(object.as_ref());
                out.extend(arguments);
            }
            ExprKind::Invocation {
                expression,
                arguments,
            } => {
                out.push(expression.as_ref());
                out.extend(arguments);
            }
            ExprKind::Lambda(l) => out.push(&l.body),
            ExprKind::MemberAccess { expression, .. } => out.extend(expression.as_deref()),
            ExprKind::MethodCall {
                object, arguments, ..
            } => {
                out.extend(object.as_deref());
                out.extend(arguments);
            }
            ExprKind::NewArray { expressions, .. } => out.extend(expressions),
            ExprKind::NewObject { arguments, .. } => out.extend(arguments),
            ExprKind::TypeTest { expression, .. } => out.push(expression),
            ExprKind::Block { expressions, .. } => out.extend(expressions),
            ExprKind::Constant(_)
            | ExprKind::Default
            | ExprKind::Parameter(_)
            | ExprKind::RuntimeVariables(_) => {}
        }
        out
    }

    /// True if `param` is referenced anywhere below (nested lambdas included).
    pub fn references(&self, param: &Param) -> bool {
        match &self.kind {
            ExprKind::Parameter(p) => p.same(param),
            ExprKind::RuntimeVariables(vars) => vars.iter().any(|v| v.same(param)),
            _ => self.children().into_iter().any(|c| c.references(param)),
        }
    }

    /// Rebuild with every direct child passed through `f`.
    ///
    /// Parameters inside `Lambda`, `Block` and `RuntimeVariables` lists are kept as is.
    pub fn try_map_children<E>(
        &self,
        f: &mut impl FnMut(&Expr) -> Result<Expr, E>,
    ) -> Result<Expr, E> {
        let kind = match &self.kind {
            ExprKind::Binary {
                left,
                right,
                method,
                conversion,
                lift_to_null,
            } => ExprKind::Binary {
                left: Box::new(f(left)?),
                right: Box::new(f(right)?),
                method: method.clone(),
                conversion: match conversion {
                    Some(c) => Some(Arc::new(map_lambda(c, f)?)),
                    None => None,
                },
                lift_to_null: *lift_to_null,
            },
            ExprKind::Unary { operand, method } => ExprKind::Unary {
                operand: Box::new(f(operand)?),
                method: method.clone(),
            },
            ExprKind::Conditional {
                test,
                if_true,
                if_false,
            } => ExprKind::Conditional {
                test: Box::new(f(test)?),
                if_true: Box::new(f(if_true)?),
                if_false: Box::new(f(if_false)?),
            },
            ExprKind::Index {
                object,
                indexer,
                arguments,
            } => ExprKind::Index {
                object: Box::new(f(object)?),
                indexer: indexer.clone(),
                arguments: map_all(arguments, f)?,
            },
            ExprKind::Invocation {
                expression,
                arguments,
            } => ExprKind::Invocation {
                expression: Box::new(f(expression)?),
                arguments: map_all(arguments, f)?,
            },
            ExprKind::Lambda(l) => ExprKind::Lambda(Arc::new(map_lambda(l, f)?)),
            ExprKind::MemberAccess { expression, member } => ExprKind::MemberAccess {
                expression: match expression {
                    Some(e) => Some(Box::new(f(e)?)),
                    None => None,
                },
                member: member.clone(),
            },
            ExprKind::MethodCall {
                object,
                method,
                arguments,
            } => ExprKind::MethodCall {
                object: match object {
                    Some(o) => Some(Box::new(f(o)?)),
                    None => None,
                },
                method: method.clone(),
                arguments: map_all(arguments, f)?,
            },
            ExprKind::NewArray {
                element_type,
                expressions,
            } => ExprKind::NewArray {
                element_type: element_type.clone(),
                expressions: map_all(expressions, f)?,
            },
            ExprKind::NewObject {
                constructor,
                arguments,
                members,
            } => ExprKind::NewObject {
                constructor: constructor.clone(),
                arguments: map_all(arguments, f)?,
                members: members.clone(),
            },
            ExprKind::TypeTest {
                expression,
                type_operand,
            } => ExprKind::TypeTest {
                expression: Box::new(f(expression)?),
                type_operand: type_operand.clone(),
            },
            ExprKind::Block {
                variables,
                expressions,
            } => ExprKind::Block {
                variables: variables.clone(),
                expressions: map_all(expressions, f)?,
            },
            leaf @ (ExprKind::Constant(_)
            | ExprKind::Default
            | ExprKind::Parameter(_)
            | ExprKind::RuntimeVariables(_)) => leaf.clone(),
        };
        Ok(Expr::new(self.node_type, self.ty.clone(), kind))
    }
}

fn map_all<E>(
    items: &[Expr],
    f: &mut impl FnMut(&Expr) -> Result<Expr, E>,
) -> Result<Vec<Expr>, E> {
    items.iter().map(|e| f(e)).collect()
}

fn map_lambda<E>(
    lambda: &Lambda,
    f: &mut impl FnMut(&Expr) -> Result<Expr, E>,
) -> Result<Lambda, E> {
    Ok(Lambda {
        name: lambda.name.clone(),
        parameters: lambda.parameters.clone(),
        body: f(&lambda.body)?,
        tail_call: lambda.tail_call,
        ty: lambda.ty.clone(),
    })
}
