use courier_core::fixtures;
use courier_core::{ExprBuilder, ExprKind, Primitive, Record, Value};
use courier_vm::RuntimeError;

use crate::encode::encode;
use crate::error::EncodeError;
use crate::fold::fold;
use crate::test_utils::{age_or_birthday, name_contains_capture};

#[test]
fn captured_member_becomes_constant() {
    let catalog = fixtures::catalog();
    let view = fixtures::person_view(&catalog);
    let capture = fixtures::capture_record(&catalog, "Ada", &[], 0);

    let folded = fold(&name_contains_capture(&catalog, &view, capture)).unwrap();

    let ExprKind::MethodCall {
        object, arguments, ..
    } = &folded.body.kind
    else {
        panic!("expected a call, got {:?}", folded.body.kind);
    };
    assert_eq!(arguments[0].as_constant(), Some(&Value::from("Ada")));
    assert!(arguments[0].ty.is_primitive(Primitive::String));
    assert!(matches!(object.as_deref().unwrap().kind, ExprKind::MemberAccess { .. }));
}

#[test]
fn parameter_dependent_tree_is_unchanged() {
    let catalog = fixtures::catalog();
    let view = fixtures::person_view(&catalog);
    let lambda = age_or_birthday(&catalog, &view);

    let folded = fold(&lambda).unwrap();

    assert_eq!(
        encode(&folded, catalog.as_ref()).unwrap(),
        encode(&lambda, catalog.as_ref()).unwrap()
    );
}

#[test]
fn folding_is_idempotent() {
    let catalog = fixtures::catalog();
    let view = fixtures::person_view(&catalog);
    let capture = fixtures::capture_record(&catalog, "Ada", &["a"], 3);
    let once = fold(&name_contains_capture(&catalog, &view, capture)).unwrap();

    let twice = fold(&once).unwrap();

    assert_eq!(
        encode(&twice, catalog.as_ref()).unwrap(),
        encode(&once, catalog.as_ref()).unwrap()
    );
}

#[test]
fn static_call_over_closed_arguments_folds() {
    let catalog = fixtures::catalog();
    let b = ExprBuilder::new(&catalog);
    let view = fixtures::person_view(&catalog);
    let capture_ty = fixtures::capture(&catalog);
    let capture = fixtures::capture_record(&catalog, "Ada", &[], 7);
    let x = b.param("x", &view);

    let limit = b.member(b.constant(capture, &capture_ty), "limit").unwrap();
    let math = catalog.std_type("Math").unwrap();
    let max = b
        .call_static(&math, "Max", &[], vec![limit, b.literal(3).unwrap()])
        .unwrap();
    let age = b.member(b.parameter(&x), "Age").unwrap();
    let lambda = b.lambda(vec![x], b.gt(age, max).unwrap()).unwrap();

    let folded = fold(&lambda).unwrap();

    let ExprKind::Binary { right, .. } = &folded.body.kind else {
        panic!("expected a comparison");
    };
    assert_eq!(right.as_constant(), Some(&Value::Int32(7)));
}

#[test]
fn collection_member_is_not_inlined() {
    let catalog = fixtures::catalog();
    let b = ExprBuilder::new(&catalog);
    let view = fixtures::person_view(&catalog);
    let capture_ty = fixtures::capture(&catalog);
    let capture = fixtures::capture_record(&catalog, "Ada", &["Ada", "Grace"], 0);
    let string = catalog.primitive(Primitive::String).unwrap();
    let enumerable = catalog.std_type("Enumerable").unwrap();
    let x = b.param("x", &view);

    let names = b.member(b.constant(capture, &capture_ty), "names").unwrap();
    let name = b.member(b.parameter(&x), "Name").unwrap();
    let body = b
        .call_static(&enumerable, "Contains", &[string], vec![names, name])
        .unwrap();
    let lambda = b.lambda(vec![x], body).unwrap();

    let folded = fold(&lambda).unwrap();

    let ExprKind::MethodCall { arguments, .. } = &folded.body.kind else {
        panic!("expected a call");
    };
    assert!(matches!(arguments[0].kind, ExprKind::MemberAccess { .. }));
}

#[test]
fn parameter_passed_to_call_is_rejected() {
    let catalog = fixtures::catalog();
    let b = ExprBuilder::new(&catalog);
    let view = fixtures::person_view(&catalog);
    let enumerable = catalog.std_type("Enumerable").unwrap();
    let x = b.param("x", &view);

    let views = b.constant(Value::Array(Vec::new()), &catalog.array(&view).unwrap());
    let body = b
        .call_static(&enumerable, "Contains", &[view.clone()], vec![views, b.parameter(&x)])
        .unwrap();
    let lambda = b.lambda(vec![x], body).unwrap();

    let err = fold(&lambda).unwrap_err();

    assert_eq!(
        err,
        EncodeError::UnsupportedCapture {
            method: "Boolean Contains<T>(Array<T>, T)".into(),
            parameter: "x".into(),
        }
    );
}

#[test]
fn failing_fold_is_reported() {
    let catalog = fixtures::catalog();
    let b = ExprBuilder::new(&catalog);
    let view = fixtures::person_view(&catalog);
    let capture_ty = fixtures::capture(&catalog);
    let capture = Record::new(&capture_ty).with("name", Value::Null);
    let x = b.param("x", &view);

    let captured = b.member(b.constant(capture, &capture_ty), "name").unwrap();
    let upper = b.call(captured, "ToUpper", vec![]).unwrap();
    let name = b.member(b.parameter(&x), "Name").unwrap();
    let lambda = b.lambda(vec![x], b.eq(name, upper).unwrap()).unwrap();

    let err = fold(&lambda).unwrap_err();

    assert_eq!(err, EncodeError::FoldEvaluation(RuntimeError::NullReference));
}

#[test]
fn non_predicate_is_rejected() {
    let catalog = fixtures::catalog();
    let b = ExprBuilder::new(&catalog);
    let x = b.param("x", &fixtures::person_view(&catalog));
    let lambda = b
        .lambda(vec![x.clone()], b.member(b.parameter(&x), "Age").unwrap())
        .unwrap();

    let err = fold(&lambda).unwrap_err();

    assert!(matches!(err, EncodeError::InvalidShape(_)));
}
