//! Typed construction of predicate trees.
//!
//! The builder looks members up by name, picks overloads by argument type
//! and applies the operator typing rules (numeric promotion, nullable
//! lifting through `Convert`). Every type and member it hands out comes
//! from the catalog, so the resulting tree shares the catalog's handles.

use std::sync::Arc;

use crate::catalog::{Catalog, SymbolCatalog, SymbolError};
use crate::types::{Member, MemberKind, Primitive, Type, TypeKind};
use crate::value::Value;

use super::node::{Expr, ExprKind, Lambda, NodeCategory, NodeType, Param};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error("`{ty}` has no member `{name}`")]
    MemberNotFound { ty: String, name: String },

    #[error("no overload of `{ty}.{name}` accepts ({args})")]
    NoOverload {
        ty: String,
        name: String,
        args: String,
    },

    #[error("{op} cannot be applied to `{left}` and `{right}`")]
    OperandMismatch {
        op: NodeType,
        left: String,
        right: String,
    },

    #[error("{op} cannot be applied to `{operand}`")]
    InvalidOperand { op: NodeType, operand: String },

    #[error("{0} is not a {1:?} operator")]
    WrongCategory(NodeType, NodeCategory),

    #[error("`{0}` is not invocable")]
    NotInvocable(String),

    #[error("`{0}` has no indexer")]
    NoIndexer(String),

    #[error("block has no expressions")]
    EmptyBlock,
}

type Result<T> = std::result::Result<T, BuildError>;

/// Builds typed [`Expr`] trees against a [`Catalog`].
#[derive(Clone, Copy)]
pub struct ExprBuilder<'c> {
    catalog: &'c Catalog,
}

impl<'c> ExprBuilder<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    pub fn param(&self, name: &str, ty: &Type) -> Param {
        Param::new(name, ty.clone())
    }

    pub fn parameter(&self, param: &Param) -> Expr {
        Expr::parameter(param)
    }

    pub fn constant(&self, value: impl Into<Value>, ty: &Type) -> Expr {
        Expr::constant(value.into(), ty.clone())
    }

    /// Constant typed after its value: primitives by kind, records by record type,
    /// everything else as `Object`.
    pub fn literal(&self, value: impl Into<Value>) -> Result<Expr> {
        let value = value.into();
        let ty = match (&value, value.primitive()) {
            (_, Some(p)) => self.catalog.primitive(p)?,
            (Value::Record(r), None) => r.record_type().clone(),
            _ => self.catalog.primitive(Primitive::Object)?,
        };
        Ok(Expr::constant(value, ty))
    }

    /// `null` typed as `ty`.
    pub fn null(&self, ty: &Type) -> Expr {
        Expr::constant(Value::Null, ty.clone())
    }

    /// Instance property or field read.
    pub fn member(&self, instance: Expr, name: &str) -> Result<Expr> {
        let member = self.find_member(&instance.ty, name, false)?;
        let ty = self.catalog.value_type_of(&member)?;
        Ok(Expr::new(
            NodeType::MemberAccess,
            ty,
            ExprKind::MemberAccess {
                expression: Some(Box::new(instance)),
                member,
            },
        ))
    }

    pub fn static_member(&self, owner: &Type, name: &str) -> Result<Expr> {
        let member = self.find_member(owner, name, true)?;
        let ty = self.catalog.value_type_of(&member)?;
        Ok(Expr::new(
            NodeType::MemberAccess,
            ty,
            ExprKind::MemberAccess {
                expression: None,
                member,
            },
        ))
    }

    pub fn call(&self, instance: Expr, name: &str, args: Vec<Expr>) -> Result<Expr> {
        let owner = instance.ty.clone();
        let method = self.overload(&owner, name, MemberKind::Method, false, &[], &args)?;
        let ty = self.catalog.value_type_of(&method)?;
        Ok(Expr::new(
            NodeType::Call,
            ty,
            ExprKind::MethodCall {
                object: Some(Box::new(instance)),
                method,
                arguments: args,
            },
        ))
    }

    /// Static call; `generic` instantiates a generic method definition.
    pub fn call_static(
        &self,
        owner: &Type,
        name: &str,
        generic: &[Type],
        args: Vec<Expr>,
    ) -> Result<Expr> {
        let method = self.overload(owner, name, MemberKind::Method, true, generic, &args)?;
        let ty = self.catalog.value_type_of(&method)?;
        Ok(Expr::new(
            NodeType::Call,
            ty,
            ExprKind::MethodCall {
                object: None,
                method,
                arguments: args,
            },
        ))
    }

    pub fn binary(&self, op: NodeType, left: Expr, right: Expr) -> Result<Expr> {
        use NodeType::*;

        if op.category() != NodeCategory::Binary {
            return Err(BuildError::WrongCategory(op, NodeCategory::Binary));
        }
        let mismatch = |l: &Expr, r: &Expr| BuildError::OperandMismatch {
            op,
            left: l.ty.to_string(),
            right: r.ty.to_string(),
        };

        let (left, right, ty, method) = match op {
            AndAlso | OrElse => {
                let boolean = self.catalog.primitive(Primitive::Boolean)?;
                if !left.ty.is_primitive(Primitive::Boolean)
                    || !right.ty.is_primitive(Primitive::Boolean)
                {
                    return Err(mismatch(&left, &right));
                }
                (left, right, boolean, None)
            }
            Coalesce => {
                if !left.ty.admits_null() {
                    return Err(mismatch(&left, &right));
                }
                let ty = match left.ty.element() {
                    Some(inner) if left.ty.is_nullable() && right.ty.descriptor() == inner => {
                        right.ty.clone()
                    }
                    _ if right.ty.descriptor() == left.ty.descriptor() => left.ty.clone(),
                    _ => return Err(mismatch(&left, &right)),
                };
                (left, right, ty, None)
            }
            ArrayIndex => {
                let element = match (left.ty.kind(), left.ty.element()) {
                    (TypeKind::Array, Some(e)) if right.ty.is_primitive(Primitive::Int32) => {
                        self.catalog.resolve_type(e, None)?
                    }
                    _ => return Err(mismatch(&left, &right)),
                };
                (left, right, element, None)
            }
            LeftShift | RightShift => {
                let integral = left.ty.primitive().is_some_and(Primitive::is_integral);
                if !integral || !right.ty.is_primitive(Primitive::Int32) {
                    return Err(mismatch(&left, &right));
                }
                let ty = left.ty.clone();
                (left, right, ty, None)
            }
            Add if left.ty.is_primitive(Primitive::String)
                && right.ty.is_primitive(Primitive::String) =>
            {
                let string = left.ty.clone();
                let concat = self.overload(
                    &string,
                    "Concat",
                    MemberKind::Method,
                    true,
                    &[],
                    &[left.clone(), right.clone()],
                )?;
                (left, right, string, Some(concat))
            }
            _ => {
                let (left, right) = self.unify(op, left, right)?;
                let operand = left.ty.underlying_primitive();
                let valid = match op {
                    Equal | NotEqual => true,
                    LessThan | LessThanOrEqual | GreaterThan | GreaterThanOrEqual => operand
                        .is_some_and(|p| p.is_numeric() || p == Primitive::DateTime),
                    And | Or | ExclusiveOr => operand
                        .is_some_and(|p| p.is_integral() || p == Primitive::Boolean),
                    Power => operand == Some(Primitive::Double),
                    _ => operand.is_some_and(Primitive::is_numeric),
                };
                if !valid {
                    return Err(mismatch(&left, &right));
                }
                let ty = if op.is_comparison() {
                    self.catalog.primitive(Primitive::Boolean)?
                } else {
                    left.ty.clone()
                };
                (left, right, ty, None)
            }
        };

        Ok(Expr::new(
            op,
            ty,
            ExprKind::Binary {
                left: Box::new(left),
                right: Box::new(right),
                method,
                conversion: None,
                lift_to_null: false,
            },
        ))
    }

    pub fn eq(&self, left: Expr, right: Expr) -> Result<Expr> {
        self.binary(NodeType::Equal, left, right)
    }

    pub fn ne(&self, left: Expr, right: Expr) -> Result<Expr> {
        self.binary(NodeType::NotEqual, left, right)
    }

    pub fn gt(&self, left: Expr, right: Expr) -> Result<Expr> {
        self.binary(NodeType::GreaterThan, left, right)
    }

    pub fn ge(&self, left: Expr, right: Expr) -> Result<Expr> {
        self.binary(NodeType::GreaterThanOrEqual, left, right)
    }

    pub fn lt(&self, left: Expr, right: Expr) -> Result<Expr> {
        self.binary(NodeType::LessThan, left, right)
    }

    pub fn le(&self, left: Expr, right: Expr) -> Result<Expr> {
        self.binary(NodeType::LessThanOrEqual, left, right)
    }

    pub fn and_also(&self, left: Expr, right: Expr) -> Result<Expr> {
        self.binary(NodeType::AndAlso, left, right)
    }

    pub fn or_else(&self, left: Expr, right: Expr) -> Result<Expr> {
        self.binary(NodeType::OrElse, left, right)
    }

    pub fn add(&self, left: Expr, right: Expr) -> Result<Expr> {
        self.binary(NodeType::Add, left, right)
    }

    pub fn sub(&self, left: Expr, right: Expr) -> Result<Expr> {
        self.binary(NodeType::Subtract, left, right)
    }

    pub fn not(&self, operand: Expr) -> Result<Expr> {
        let ok = operand
            .ty
            .underlying_primitive()
            .is_some_and(|p| p == Primitive::Boolean || p.is_integral());
        self.unary(NodeType::Not, operand, ok)
    }

    pub fn negate(&self, operand: Expr) -> Result<Expr> {
        let ok = operand
            .ty
            .underlying_primitive()
            .is_some_and(Primitive::is_numeric);
        self.unary(NodeType::Negate, operand, ok)
    }

    pub fn is_true(&self, operand: Expr) -> Result<Expr> {
        let ok = operand.ty.underlying_primitive() == Some(Primitive::Boolean);
        self.unary(NodeType::IsTrue, operand, ok)
    }

    pub fn is_false(&self, operand: Expr) -> Result<Expr> {
        let ok = operand.ty.underlying_primitive() == Some(Primitive::Boolean);
        self.unary(NodeType::IsFalse, operand, ok)
    }

    /// Unchecked conversion to `ty`.
    pub fn convert(&self, operand: Expr, ty: &Type) -> Expr {
        if operand.ty.descriptor() == ty.descriptor() {
            return operand;
        }
        Expr::new(
            NodeType::Convert,
            ty.clone(),
            ExprKind::Unary {
                operand: Box::new(operand),
                method: None,
            },
        )
    }

    /// `operand as ty`; `ty` must admit null.
    pub fn type_as(&self, operand: Expr, ty: &Type) -> Result<Expr> {
        if !ty.admits_null() {
            return Err(BuildError::InvalidOperand {
                op: NodeType::TypeAs,
                operand: ty.to_string(),
            });
        }
        Ok(Expr::new(
            NodeType::TypeAs,
            ty.clone(),
            ExprKind::Unary {
                operand: Box::new(operand),
                method: None,
            },
        ))
    }

    pub fn array_length(&self, operand: Expr) -> Result<Expr> {
        if operand.ty.kind() != &TypeKind::Array {
            return Err(BuildError::InvalidOperand {
                op: NodeType::ArrayLength,
                operand: operand.ty.to_string(),
            });
        }
        let int32 = self.catalog.primitive(Primitive::Int32)?;
        Ok(Expr::new(
            NodeType::ArrayLength,
            int32,
            ExprKind::Unary {
                operand: Box::new(operand),
                method: None,
            },
        ))
    }

    pub fn quote(&self, lambda: Lambda) -> Expr {
        let ty = lambda.ty.clone();
        Expr::new(
            NodeType::Quote,
            ty,
            ExprKind::Unary {
                operand: Box::new(Expr::lambda(lambda)),
                method: None,
            },
        )
    }

    pub fn conditional(&self, test: Expr, if_true: Expr, if_false: Expr) -> Result<Expr> {
        if !test.ty.is_primitive(Primitive::Boolean) {
            return Err(BuildError::InvalidOperand {
                op: NodeType::Conditional,
                operand: test.ty.to_string(),
            });
        }
        if if_true.ty.descriptor() != if_false.ty.descriptor() {
            return Err(BuildError::OperandMismatch {
                op: NodeType::Conditional,
                left: if_true.ty.to_string(),
                right: if_false.ty.to_string(),
            });
        }
        let ty = if_true.ty.clone();
        Ok(Expr::new(
            NodeType::Conditional,
            ty,
            ExprKind::Conditional {
                test: Box::new(test),
                if_true: Box::new(if_true),
                if_false: Box::new(if_false),
            },
        ))
    }

    /// `expression is type_operand`.
    pub fn type_is(&self, expression: Expr, type_operand: &Type) -> Result<Expr> {
        self.type_test(NodeType::TypeIs, expression, type_operand)
    }

    /// Exact runtime type equality.
    pub fn type_equal(&self, expression: Expr, type_operand: &Type) -> Result<Expr> {
        self.type_test(NodeType::TypeEqual, expression, type_operand)
    }

    pub fn default(&self, ty: &Type) -> Expr {
        Expr::new(NodeType::Default, ty.clone(), ExprKind::Default)
    }

    /// `new T[] { items... }`.
    pub fn new_array(&self, element: &Type, items: Vec<Expr>) -> Result<Expr> {
        if let Some(bad) = items.iter().find(|e| !accepts(element, &e.ty)) {
            return Err(BuildError::OperandMismatch {
                op: NodeType::NewArrayInit,
                left: element.to_string(),
                right: bad.ty.to_string(),
            });
        }
        let ty = self.catalog.array(element)?;
        Ok(Expr::new(
            NodeType::NewArrayInit,
            ty,
            ExprKind::NewArray {
                element_type: element.clone(),
                expressions: items,
            },
        ))
    }

    /// `new T[bound]`.
    pub fn new_array_bounds(&self, element: &Type, bounds: Vec<Expr>) -> Result<Expr> {
        if let Some(bad) = bounds
            .iter()
            .find(|e| !e.ty.primitive().is_some_and(Primitive::is_integral))
        {
            return Err(BuildError::InvalidOperand {
                op: NodeType::NewArrayBounds,
                operand: bad.ty.to_string(),
            });
        }
        let ty = self.catalog.array(element)?;
        Ok(Expr::new(
            NodeType::NewArrayBounds,
            ty,
            ExprKind::NewArray {
                element_type: element.clone(),
                expressions: bounds,
            },
        ))
    }

    pub fn new_object(&self, ty: &Type, args: Vec<Expr>) -> Result<Expr> {
        let constructor = self.overload(ty, ".ctor", MemberKind::Constructor, true, &[], &args)?;
        Ok(Expr::new(
            NodeType::New,
            ty.clone(),
            ExprKind::NewObject {
                constructor,
                arguments: args,
                members: Vec::new(),
            },
        ))
    }

    /// Indexed read: an array element or an `Item[...]` property.
    pub fn index(&self, object: Expr, args: Vec<Expr>) -> Result<Expr> {
        if object.ty.kind() == &TypeKind::Array {
            let element = match (object.ty.element(), args.as_slice()) {
                (Some(e), [i]) if i.ty.is_primitive(Primitive::Int32) => {
                    self.catalog.resolve_type(e, None)?
                }
                _ => return Err(self.no_overload(&object.ty, "Item", &args)),
            };
            return Ok(Expr::new(
                NodeType::Index,
                element,
                ExprKind::Index {
                    object: Box::new(object),
                    indexer: None,
                    arguments: args,
                },
            ));
        }

        let indexer = object
            .ty
            .indexer()
            .cloned()
            .ok_or_else(|| BuildError::NoIndexer(object.ty.to_string()))?;
        if !self.applicable(&indexer, &args)? {
            return Err(self.no_overload(&object.ty, "Item", &args));
        }
        let ty = self.catalog.value_type_of(&indexer)?;
        Ok(Expr::new(
            NodeType::Index,
            ty,
            ExprKind::Index {
                object: Box::new(object),
                indexer: Some(indexer),
                arguments: args,
            },
        ))
    }

    /// Call a function-typed value.
    pub fn invoke(&self, target: Expr, args: Vec<Expr>) -> Result<Expr> {
        let Some((params, ret)) = target.ty.function_signature() else {
            return Err(BuildError::NotInvocable(target.ty.to_string()));
        };
        if params.len() != args.len()
            || params.iter().zip(&args).any(|(p, a)| p != a.ty.descriptor())
        {
            return Err(self.no_overload(&target.ty, "Invoke", &args));
        }
        let ty = self.catalog.resolve_type(ret, None)?;
        Ok(Expr::new(
            NodeType::Invoke,
            ty,
            ExprKind::Invocation {
                expression: Box::new(target),
                arguments: args,
            },
        ))
    }

    /// Sequence of expressions; the value is the last one.
    pub fn block(&self, variables: Vec<Param>, expressions: Vec<Expr>) -> Result<Expr> {
        let ty = expressions
            .last()
            .map(|e| e.ty.clone())
            .ok_or(BuildError::EmptyBlock)?;
        Ok(Expr::new(
            NodeType::Block,
            ty,
            ExprKind::Block {
                variables,
                expressions,
            },
        ))
    }

    pub fn runtime_variables(&self, variables: Vec<Param>) -> Result<Expr> {
        let ty = self.catalog.primitive(Primitive::Object)?;
        Ok(Expr::new(
            NodeType::RuntimeVariables,
            ty,
            ExprKind::RuntimeVariables(variables),
        ))
    }

    pub fn lambda(&self, parameters: Vec<Param>, body: Expr) -> Result<Lambda> {
        let param_types: Vec<Type> = parameters.iter().map(|p| p.ty().clone()).collect();
        let ty = self.catalog.function(&param_types, &body.ty)?;
        Ok(Lambda {
            name: None,
            parameters,
            body,
            tail_call: false,
            ty,
        })
    }

    pub fn lambda_expr(&self, parameters: Vec<Param>, body: Expr) -> Result<Expr> {
        Ok(Expr::lambda(self.lambda(parameters, body)?))
    }

    fn unary(&self, op: NodeType, operand: Expr, valid: bool) -> Result<Expr> {
        if !valid {
            return Err(BuildError::InvalidOperand {
                op,
                operand: operand.ty.to_string(),
            });
        }
        let ty = if matches!(op, NodeType::IsTrue | NodeType::IsFalse) {
            self.catalog.primitive(Primitive::Boolean)?
        } else {
            operand.ty.clone()
        };
        Ok(Expr::new(
            op,
            ty,
            ExprKind::Unary {
                operand: Box::new(operand),
                method: None,
            },
        ))
    }

    fn type_test(&self, op: NodeType, expression: Expr, type_operand: &Type) -> Result<Expr> {
        let boolean = self.catalog.primitive(Primitive::Boolean)?;
        Ok(Expr::new(
            op,
            boolean,
            ExprKind::TypeTest {
                expression: Box::new(expression),
                type_operand: type_operand.clone(),
            },
        ))
    }

    /// Bring both operands to one type: numeric widening, then nullable lifting.
    fn unify(&self, op: NodeType, left: Expr, right: Expr) -> Result<(Expr, Expr)> {
        if left.ty.descriptor() == right.ty.descriptor() {
            return Ok((left, right));
        }
        let mismatch = || BuildError::OperandMismatch {
            op,
            left: left.ty.to_string(),
            right: right.ty.to_string(),
        };
        let (Some(lp), Some(rp)) = (
            left.ty.underlying_primitive(),
            right.ty.underlying_primitive(),
        ) else {
            return Err(mismatch());
        };
        let target = match (lp, rp) {
            _ if lp == rp => lp,
            _ if lp.is_numeric() && rp.is_numeric() => wider(lp, rp),
            _ => return Err(mismatch()),
        };

        let mut ty = self.catalog.primitive(target)?;
        if left.ty.is_nullable() || right.ty.is_nullable() {
            ty = self.catalog.nullable(&ty)?;
        }
        Ok((self.convert(left, &ty), self.convert(right, &ty)))
    }

    fn find_member(&self, owner: &Type, name: &str, is_static: bool) -> Result<Member> {
        owner
            .members_named(name, MemberKind::Property)
            .find(|m| m.parameters().is_empty() && m.is_static() == is_static)
            .or_else(|| {
                owner
                    .members_named(name, MemberKind::Field)
                    .find(|m| m.is_static() == is_static)
            })
            .cloned()
            .ok_or_else(|| BuildError::MemberNotFound {
                ty: owner.to_string(),
                name: name.to_owned(),
            })
    }

    fn overload(
        &self,
        owner: &Type,
        name: &str,
        kind: MemberKind,
        is_static: bool,
        generic: &[Type],
        args: &[Expr],
    ) -> Result<Member> {
        let generic_args: Vec<_> = generic.iter().map(|t| t.descriptor().clone()).collect();

        for candidate in owner
            .members_named(name, kind)
            .filter(|m| m.is_static() == is_static)
        {
            let candidate = match (candidate.is_generic_definition(), generic.is_empty()) {
                (true, false) => {
                    let desc = self
                        .catalog
                        .describe_symbol(candidate)
                        .with_generic_arguments(generic_args.clone());
                    self.catalog.resolve_symbol(&desc, None)?
                }
                (false, true) => candidate.clone(),
                _ => continue,
            };
            if self.applicable(&candidate, args)? {
                return Ok(candidate);
            }
        }
        Err(self.no_overload(owner, name, args))
    }

    fn applicable(&self, member: &Member, args: &[Expr]) -> Result<bool> {
        let params = self.catalog.parameter_types_of(member)?;
        Ok(params.len() == args.len() && params.iter().zip(args).all(|(p, a)| accepts(p, &a.ty)))
    }

    fn no_overload(&self, owner: &Type, name: &str, args: &[Expr]) -> BuildError {
        BuildError::NoOverload {
            ty: owner.to_string(),
            name: name.to_owned(),
            args: args
                .iter()
                .map(|a| a.ty.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn accepts(param: &Type, arg: &Type) -> bool {
    Arc::ptr_eq(param, arg)
        || param.descriptor() == arg.descriptor()
        || param.is_primitive(Primitive::Object)
}

fn wider(a: Primitive, b: Primitive) -> Primitive {
    const RANK: [Primitive; 6] = [
        Primitive::Byte,
        Primitive::Int16,
        Primitive::Int32,
        Primitive::Int64,
        Primitive::Single,
        Primitive::Double,
    ];
    let rank = |p| RANK.iter().position(|r| *r == p).unwrap_or(0);
    if rank(a) >= rank(b) { a } else { b }
}
