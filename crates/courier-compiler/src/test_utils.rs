//! Sample predicates shared by the pass tests.

use courier_core::{Catalog, Expr, ExprBuilder, ExprKind, Lambda, Param, Type, Value};
use courier_wire::{NodeBody, PortableNode, PortableTree};

/// `x => x.Age > 18 || x.Birthday != null`
pub fn age_or_birthday(catalog: &Catalog, ty: &Type) -> Lambda {
    let b = ExprBuilder::new(catalog);
    let x = b.param("x", ty);
    let age = b.member(b.parameter(&x), "Age").unwrap();
    let adult = b.gt(age, b.literal(18).unwrap()).unwrap();
    let birthday = b.member(b.parameter(&x), "Birthday").unwrap();
    let null = b.null(&birthday.ty);
    let known = b.ne(birthday, null).unwrap();
    b.lambda(vec![x], b.or_else(adult, known).unwrap()).unwrap()
}

/// `x => x.Name.Contains(capture.name)` with `capture` a closure record constant.
pub fn name_contains_capture(catalog: &Catalog, ty: &Type, capture: Value) -> Lambda {
    let b = ExprBuilder::new(catalog);
    let x = b.param("x", ty);
    let capture_ty = courier_core::fixtures::capture(catalog);
    let needle = b.member(b.constant(capture, &capture_ty), "name").unwrap();
    let name = b.member(b.parameter(&x), "Name").unwrap();
    let body = b.call(name, "Contains", vec![needle]).unwrap();
    b.lambda(vec![x], body).unwrap()
}

/// `x => <member> > threshold` over a single member of `ty`.
pub fn member_gt(catalog: &Catalog, ty: &Type, member: &str, threshold: i32) -> Lambda {
    let b = ExprBuilder::new(catalog);
    let x = b.param("x", ty);
    let read = b.member(b.parameter(&x), member).unwrap();
    let body = b.gt(read, b.literal(threshold).unwrap()).unwrap();
    b.lambda(vec![x], body).unwrap()
}

/// Every parameter reference in `expr`, nested lambdas included.
pub fn parameter_refs(expr: &Expr) -> Vec<Param> {
    let mut out = Vec::new();
    collect_params(expr, &mut out);
    out
}

fn collect_params(expr: &Expr, out: &mut Vec<Param>) {
    if let ExprKind::Parameter(p) = &expr.kind {
        out.push(p.clone());
    }
    for child in expr.children() {
        collect_params(child, out);
    }
}

/// Names of every `parameter` node in a portable tree, in walk order.
pub fn wire_parameter_names(tree: &PortableTree) -> Vec<String> {
    let mut out = Vec::new();
    collect_wire_names(&tree.root, &mut out);
    out
}

fn collect_wire_names(node: &PortableNode, out: &mut Vec<String>) {
    if let NodeBody::Parameter { name: Some(name) } = &node.body {
        out.push(name.clone());
    }
    for child in node.children() {
        collect_wire_names(child, out);
    }
}

/// The body node of a portable predicate.
pub fn wire_body(tree: &mut PortableTree) -> &mut PortableNode {
    match &mut tree.root.body {
        NodeBody::Lambda { body, .. } => body,
        other => panic!("root is not a lambda: {other:?}"),
    }
}
