//! Constant folding of free-variable-independent subtrees.
//!
//! A subtree is foldable when walking down its carrier chain (the receiver
//! of a member read or call, the last expression of a block, the body of a
//! lambda, the target of an invocation, the object of an index, the test of
//! a conditional) ends at a constant. Foldable subtrees are evaluated on the
//! spot and replaced by a constant of the same static type, so closed-over
//! values travel as literals.

use std::collections::HashMap;

use courier_core::{Expr, ExprKind, Lambda, Param, Primitive};
use courier_vm::{Evaluator, FuelLimits};

use crate::error::EncodeError;

type Result<T> = std::result::Result<T, EncodeError>;

/// Fold every foldable subtree of a predicate. The root lambda itself is kept.
pub fn fold(lambda: &Lambda) -> Result<Lambda> {
    ConstantFolder::new(FuelLimits::folding()).fold(lambda)
}

/// Per-call folding state. Not shared between calls.
pub struct ConstantFolder {
    limits: FuelLimits,
    /// Foldability by node address.
    memo: HashMap<usize, bool>,
}

impl ConstantFolder {
    pub fn new(limits: FuelLimits) -> Self {
        Self {
            limits,
            memo: HashMap::new(),
        }
    }

    pub fn fold(&mut self, lambda: &Lambda) -> Result<Lambda> {
        if !lambda.is_predicate() {
            return Err(EncodeError::InvalidShape(
                "expected one parameter and a Boolean body".into(),
            ));
        }
        let param = &lambda.parameters[0];
        let body = self.fold_expr(&lambda.body, param)?;
        Ok(Lambda {
            body,
            ..lambda.clone()
        })
    }

    fn fold_expr(&mut self, expr: &Expr, param: &Param) -> Result<Expr> {
        if let ExprKind::MethodCall {
            method, arguments, ..
        } = &expr.kind
            && arguments.iter().any(|a| a.as_parameter() == Some(param))
        {
            return Err(EncodeError::UnsupportedCapture {
                method: method.signature().to_owned(),
                parameter: param.name().unwrap_or("_").to_owned(),
            });
        }

        if !matches!(expr.kind, ExprKind::Constant(_)) && self.is_foldable(expr, param) {
            let value = Evaluator::with_limits(self.limits).evaluate(expr)?;
            tracing::trace!(node_type = %expr.node_type, %value, "folded");
            return Ok(Expr::constant(value, expr.ty.clone()));
        }

        expr.try_map_children(&mut |child| self.fold_expr(child, param))
    }

    /// Whether `expr` can be replaced by its value without changing the predicate.
    pub fn is_foldable(&mut self, expr: &Expr, param: &Param) -> bool {
        let key = expr as *const Expr as usize;
        if let Some(&hit) = self.memo.get(&key) {
            return hit;
        }
        let foldable = !expr.ty.is_function()
            && !expr.ty.is_primitive(Primitive::Void)
            && !expr.references(param)
            && is_closed(expr, &mut Vec::new())
            && self.reaches_constant(expr, param);
        self.memo.insert(key, foldable);
        foldable
    }

    fn reaches_constant(&mut self, expr: &Expr, param: &Param) -> bool {
        match &expr.kind {
            ExprKind::Constant(_) => true,
            ExprKind::MemberAccess { expression, member } => {
                if expr.ty.is_collection() || member.is_static() {
                    return false;
                }
                expression
                    .as_deref()
                    .is_some_and(|e| self.reaches_constant(e, param))
            }
            ExprKind::MethodCall {
                object: Some(object),
                arguments,
                ..
            } => {
                arguments.iter().all(|a| self.is_foldable(a, param))
                    && self.reaches_constant(object, param)
            }
            ExprKind::MethodCall {
                object: None,
                arguments,
                ..
            } => !arguments.is_empty() && arguments.iter().all(|a| self.is_foldable(a, param)),
            ExprKind::Block { expressions, .. } => expressions
                .last()
                .is_some_and(|e| self.reaches_constant(e, param)),
            ExprKind::Lambda(l) => self.reaches_constant(&l.body, param),
            ExprKind::Invocation { expression, .. } => self.reaches_constant(expression, param),
            ExprKind::Index { object, .. } => self.reaches_constant(object, param),
            ExprKind::Conditional { test, .. } => self.reaches_constant(test, param),
            _ => false,
        }
    }
}

/// No parameter is referenced outside the lambda or block that declares it.
fn is_closed(expr: &Expr, bound: &mut Vec<Param>) -> bool {
    match &expr.kind {
        ExprKind::Parameter(p) => bound.contains(p),
        ExprKind::RuntimeVariables(vars) => vars.iter().all(|v| bound.contains(v)),
        ExprKind::Lambda(l) => with_bound(bound, &l.parameters, |b| is_closed(&l.body, b)),
        ExprKind::Block {
            variables,
            expressions,
        } => with_bound(bound, variables, |b| {
            expressions.iter().all(|e| is_closed(e, b))
        }),
        ExprKind::Binary {
            left,
            right,
            conversion,
            ..
        } => {
            is_closed(left, bound)
                && is_closed(right, bound)
                && conversion.as_ref().is_none_or(|c| {
                    with_bound(bound, &c.parameters, |b| is_closed(&c.body, b))
                })
        }
        _ => expr.children().into_iter().all(|c| is_closed(c, bound)),
    }
}

fn with_bound(bound: &mut Vec<Param>, params: &[Param], f: impl FnOnce(&mut Vec<Param>) -> bool) -> bool {
    let mark = bound.len();
    bound.extend_from_slice(params);
    let closed = f(bound);
    bound.truncate(mark);
    closed
}
