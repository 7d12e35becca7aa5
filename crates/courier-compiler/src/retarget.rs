//! Rebinding a decoded predicate to another record type.
//!
//! The free variable is replaced by a fresh one of the target type, and
//! every member read directly off it is rebound to the target's public
//! property of the same name. Deeper chains are rejected rather than
//! approximated.

use std::sync::Arc;

use courier_core::{
    Expr, ExprKind, Lambda, Member, MemberKind, NodeType, Param, SymbolCatalog, Type,
};

use crate::error::RetargetError;

type Result<T> = std::result::Result<T, RetargetError>;

/// Rebind `lambda`'s parameter to `target`.
///
/// Property types are not checked against the original; a target whose
/// property has a different type yields a predicate with that type.
#[tracing::instrument(skip_all, fields(target = %target))]
pub fn retarget(
    lambda: &Lambda,
    target: &Type,
    catalog: &dyn SymbolCatalog,
) -> Result<Lambda> {
    if !lambda.is_predicate() {
        return Err(RetargetError::InvalidShape(
            "expected one parameter and a Boolean body".into(),
        ));
    }
    let old = &lambda.parameters[0];
    let new = match old.name() {
        Some(name) => Param::new(name, target.clone()),
        None => Param::unnamed(target.clone()),
    };

    let body = Rebinder {
        old,
        new: &new,
        target,
        catalog,
    }
    .rewrite(&lambda.body)?;

    let func = lambda
        .ty
        .descriptor()
        .definition()
        .with_args(vec![target.descriptor().clone(), body.ty.descriptor().clone()]);
    let ty = catalog.resolve_type(&func, None)?;

    Ok(Lambda {
        name: lambda.name.clone(),
        parameters: vec![new],
        body,
        tail_call: lambda.tail_call,
        ty,
    })
}

struct Rebinder<'a> {
    old: &'a Param,
    new: &'a Param,
    target: &'a Type,
    catalog: &'a dyn SymbolCatalog,
}

impl Rebinder<'_> {
    fn rewrite(&self, expr: &Expr) -> Result<Expr> {
        match &expr.kind {
            ExprKind::Parameter(p) if p.same(self.old) => Ok(Expr::parameter(self.new)),
            ExprKind::RuntimeVariables(vars) => Ok(Expr::new(
                expr.node_type,
                expr.ty.clone(),
                ExprKind::RuntimeVariables(
                    vars.iter()
                        .map(|v| if v.same(self.old) { self.new.clone() } else { v.clone() })
                        .collect(),
                ),
            )),
            ExprKind::MemberAccess {
                expression: Some(inner),
                member,
            } => {
                if self.is_old(inner) {
                    return self.rebind(member);
                }
                if let Some(path) = self.deep_path(expr) {
                    return Err(RetargetError::UnsupportedDeepAccess { path });
                }
                self.descend(expr)
            }
            ExprKind::MethodCall {
                object: Some(object),
                method,
                ..
            } if self.is_old(object) => Err(RetargetError::UnsupportedReceiver(
                method.signature().to_owned(),
            )),
            ExprKind::Index {
                object, indexer, ..
            } if self.is_old(object) => Err(RetargetError::UnsupportedReceiver(
                indexer
                    .as_ref()
                    .map_or_else(|| NodeType::Index.to_string(), |m| m.signature().to_owned()),
            )),
            _ => self.descend(expr),
        }
    }

    fn descend(&self, expr: &Expr) -> Result<Expr> {
        expr.try_map_children(&mut |child| self.rewrite(child))
    }

    fn is_old(&self, expr: &Expr) -> bool {
        expr.as_parameter().is_some_and(|p| p.same(self.old))
    }

    /// `x.A.B` style path when `expr` is a member chain at least two deep off the parameter.
    fn deep_path(&self, expr: &Expr) -> Option<String> {
        let mut names = Vec::new();
        let mut current = expr;
        while let ExprKind::MemberAccess {
            expression: Some(inner),
            member,
        } = &current.kind
        {
            names.push(member.name());
            current = inner;
        }
        if names.len() < 2 || !self.is_old(current) {
            return None;
        }
        let root = self.old.name().unwrap_or("_");
        names.reverse();
        Some(format!("{root}.{}", names.join(".")))
    }

    fn rebind(&self, member: &Member) -> Result<Expr> {
        let name = member.name();
        if member.kind() != MemberKind::Property {
            return Err(self.unsupported_kind(member.declaring_type().to_string(), member));
        }
        let Some(property) = self.target.property(name) else {
            if let Some(field) = self.target.field(name) {
                return Err(self.unsupported_kind(self.target.to_string(), field));
            }
            return Err(RetargetError::MemberNotFound {
                ty: self.target.to_string(),
                name: name.to_owned(),
            });
        };
        let ty = self
            .catalog
            .resolve_type(property.value_type(), Some(self.target.module()))?;
        Ok(Expr::new(
            NodeType::MemberAccess,
            ty,
            ExprKind::MemberAccess {
                expression: Some(Box::new(Expr::parameter(self.new))),
                member: Arc::clone(property),
            },
        ))
    }

    fn unsupported_kind(&self, ty: String, member: &Member) -> RetargetError {
        RetargetError::UnsupportedMemberKind {
            ty,
            name: member.name().to_owned(),
            kind: member.kind(),
        }
    }
}
