use std::sync::Arc;

use chrono::NaiveDate;
use courier_core::{
    Catalog, Expr, ExprBuilder, Lambda, NodeType, Param, Primitive, Type, Value, fixtures,
};
use courier_vm::Predicate;
use courier_wire::NodeBody;
use proptest::prelude::*;

use crate::error::{Error, ErrorKind};
use crate::transcoder::Transcoder;

const SECRET: &str = "4-S3cr3t-v4lu3";

fn transcoder(catalog: &Arc<Catalog>) -> Transcoder {
    Transcoder::builder(Arc::clone(catalog)).secret(SECRET).build()
}

/// `x => x.Age > 18 || x.Birthday != null`
fn age_or_birthday(catalog: &Catalog, ty: &Type) -> Lambda {
    let b = ExprBuilder::new(catalog);
    let x = b.param("x", ty);
    let age = b.member(b.parameter(&x), "Age").unwrap();
    let adult = b.gt(age, b.literal(18).unwrap()).unwrap();
    let birthday = b.member(b.parameter(&x), "Birthday").unwrap();
    let null = b.null(&birthday.ty);
    let known = b.ne(birthday, null).unwrap();
    b.lambda(vec![x], b.or_else(adult, known).unwrap()).unwrap()
}

/// `x => x.Address.City == "Paris"`
fn city_is_paris(catalog: &Catalog, ty: &Type) -> Lambda {
    let b = ExprBuilder::new(catalog);
    let x = b.param("x", ty);
    let address = b.member(b.parameter(&x), "Address").unwrap();
    let city = b.member(address, "City").unwrap();
    let body = b.eq(city, b.literal("Paris").unwrap()).unwrap();
    b.lambda(vec![x], body).unwrap()
}

#[test]
fn predicate_crosses_to_server_type() {
    let catalog = fixtures::catalog();
    let view = fixtures::person_view(&catalog);
    let person = fixtures::person(&catalog);
    let transcoder = transcoder(&catalog);

    let ciphertext = transcoder
        .serialize(&age_or_birthday(&catalog, &view))
        .unwrap();
    let rebuilt = transcoder.deserialize(&ciphertext, &view, &person).unwrap();

    let predicate = Predicate::new(rebuilt).unwrap();
    let record = |age, birthday| fixtures::person_record(&person, age, birthday);
    assert!(predicate.evaluate(&record(25, None)).unwrap());
    assert!(!predicate.evaluate(&record(10, None)).unwrap());
    assert!(
        predicate
            .evaluate(&record(10, Some(fixtures::date(2015, 6, 1))))
            .unwrap()
    );
}

#[test]
fn captured_argument_travels_as_constant() {
    let catalog = fixtures::catalog();
    let b = ExprBuilder::new(&catalog);
    let view = fixtures::person_view(&catalog);
    let capture_ty = fixtures::capture(&catalog);
    let capture = fixtures::capture_record(&catalog, "Love", &[], 0);
    let x = b.param("x", &view);
    let needle = b.member(b.constant(capture, &capture_ty), "name").unwrap();
    let name = b.member(b.parameter(&x), "Name").unwrap();
    let lambda = b
        .lambda(vec![x], b.call(name, "Contains", vec![needle]).unwrap())
        .unwrap();
    let transcoder = transcoder(&catalog);

    let ciphertext = transcoder.serialize(&lambda).unwrap();

    let tree = transcoder.decrypt_tree(&ciphertext).unwrap();
    let NodeBody::Lambda { body, .. } = &tree.root.body else {
        panic!("root is not a lambda");
    };
    let NodeBody::MethodCall { arguments, .. } = &body.body else {
        panic!("expected a call, got {}", body.kind_name());
    };
    let NodeBody::Constant { value: Some(value) } = &arguments[0].body else {
        panic!("argument was not folded: {}", arguments[0].kind_name());
    };
    assert_eq!(arguments[0].node_type, NodeType::Constant);
    assert_eq!(value.value, serde_json::json!("Love"));

    let person = fixtures::person(&catalog);
    let rebuilt = transcoder.deserialize(&ciphertext, &view, &person).unwrap();
    let predicate = Predicate::new(rebuilt).unwrap();
    assert!(predicate.evaluate(&fixtures::person_record(&person, 1, None)).unwrap());
}

#[test]
fn deep_access_is_reported_or_dropped() {
    let catalog = fixtures::catalog();
    let view = fixtures::person_view(&catalog);
    let person = fixtures::person(&catalog);
    let transcoder = transcoder(&catalog);
    let ciphertext = transcoder.serialize(&city_is_paris(&catalog, &view)).unwrap();

    let err = transcoder
        .deserialize(&ciphertext, &view, &person)
        .unwrap_err();
    assert!(matches!(err, Error::Retarget(_)));
    assert_eq!(err.kind(), ErrorKind::UnsupportedConstruct);

    assert!(
        transcoder
            .try_deserialize(&ciphertext, &view, &person)
            .unwrap()
            .is_none()
    );
}

#[test]
fn same_type_still_rejects_deep_access() {
    let catalog = fixtures::catalog();
    let view = fixtures::person_view(&catalog);
    let transcoder = transcoder(&catalog);
    let ciphertext = transcoder.serialize(&city_is_paris(&catalog, &view)).unwrap();

    let err = transcoder.deserialize(&ciphertext, &view, &view).unwrap_err();

    assert_eq!(
        err.to_string(),
        "retarget failed: unsupported deep access `x.Address.City`: only direct members of the parameter can be rebound"
    );
    assert!(
        transcoder
            .try_deserialize(&ciphertext, &view, &view)
            .unwrap()
            .is_none()
    );
}

#[test]
fn same_type_round_trip_keeps_direct_reads() {
    let catalog = fixtures::catalog();
    let view = fixtures::person_view(&catalog);
    let transcoder = transcoder(&catalog);
    let ciphertext = transcoder
        .serialize(&age_or_birthday(&catalog, &view))
        .unwrap();

    let rebuilt = transcoder.deserialize(&ciphertext, &view, &view).unwrap();

    assert_eq!(rebuilt.ty.to_string(), "Func<Sample.PersonView, Boolean>");
    let predicate = Predicate::new(rebuilt).unwrap();
    assert!(predicate.evaluate(&fixtures::person_record(&view, 30, None)).unwrap());
    assert!(!predicate.evaluate(&fixtures::person_record(&view, 3, None)).unwrap());
}

#[test]
fn capture_of_parameter_is_rejected() {
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

    let err = transcoder(&catalog).serialize(&lambda).unwrap_err();

    assert!(matches!(err, Error::Encode(_)));
    assert_eq!(err.kind(), ErrorKind::UnsupportedConstruct);
}

#[test]
fn oversized_array_from_sender_is_an_error() {
    let catalog = fixtures::catalog();
    let b = ExprBuilder::new(&catalog);
    let view = fixtures::person_view(&catalog);
    let person = fixtures::person(&catalog);
    let int32 = catalog.primitive(Primitive::Int32).unwrap();
    let x = b.param("x", &view);
    let huge = b
        .new_array_bounds(&int32, vec![b.literal(i64::MAX).unwrap()])
        .unwrap();
    let length = b.array_length(huge).unwrap();
    let age = b.member(b.parameter(&x), "Age").unwrap();
    let lambda = b.lambda(vec![x], b.gt(length, age).unwrap()).unwrap();
    let transcoder = transcoder(&catalog);

    let ciphertext = transcoder.serialize(&lambda).unwrap();
    let rebuilt = transcoder.deserialize(&ciphertext, &view, &person).unwrap();

    let err = Predicate::new(rebuilt)
        .unwrap()
        .evaluate(&fixtures::person_record(&person, 30, None))
        .unwrap_err();
    assert_eq!(
        err,
        courier_vm::RuntimeError::ArrayTooLarge {
            len: i64::MAX,
            limit: 65_536,
        }
    );
}

#[test]
fn wrong_secret_still_propagates() {
    let catalog = fixtures::catalog();
    let view = fixtures::person_view(&catalog);
    let person = fixtures::person(&catalog);
    let ciphertext = transcoder(&catalog)
        .serialize(&age_or_birthday(&catalog, &view))
        .unwrap();
    let other = Transcoder::builder(Arc::clone(&catalog))
        .secret("An0ther-S3cret")
        .build();

    let err = other
        .try_deserialize(&ciphertext, &view, &person)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cryptographic);
}

#[test]
fn weak_secret_is_a_configuration_error() {
    let catalog = fixtures::catalog();
    let view = fixtures::person_view(&catalog);
    let weak = Transcoder::builder(Arc::clone(&catalog))
        .secret("password")
        .build();

    let err = weak.serialize(&age_or_birthday(&catalog, &view)).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));

    let err = weak.try_deserialize("AAAA", &view, &view).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn missing_secret_variable_is_a_configuration_error() {
    let catalog = fixtures::catalog();
    let transcoder = Transcoder::builder(Arc::clone(&catalog))
        .secret_env("COURIER_SECRET_KEY_THAT_IS_NEVER_SET")
        .build();

    let err = transcoder.secret().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(
        err.to_string(),
        "configuration error: secret variable `COURIER_SECRET_KEY_THAT_IS_NEVER_SET` is not set"
    );
}

#[test]
fn garbage_is_dropped_by_convenience_entry() {
    let catalog = fixtures::catalog();
    let view = fixtures::person_view(&catalog);
    let transcoder = transcoder(&catalog);
    let not_a_tree = courier_cipher::encrypt("{\"version\":1}", SECRET).unwrap();

    assert!(matches!(
        transcoder.deserialize(&not_a_tree, &view, &view),
        Err(Error::Malformed(_))
    ));
    assert!(
        transcoder
            .try_deserialize(&not_a_tree, &view, &view)
            .unwrap()
            .is_none()
    );
    assert!(
        transcoder
            .try_deserialize("%%%", &view, &view)
            .unwrap()
            .is_none()
    );
}

#[test]
fn transcoder_is_shared_across_threads() {
    let catalog = fixtures::catalog();
    let view = fixtures::person_view(&catalog);
    let person = fixtures::person(&catalog);
    let transcoder = transcoder(&catalog);
    let ciphertext = transcoder
        .serialize(&age_or_birthday(&catalog, &view))
        .unwrap();

    std::thread::scope(|scope| {
        for age in [5, 50] {
            let (transcoder, ciphertext) = (&transcoder, &ciphertext);
            let (view, person) = (&view, &person);
            scope.spawn(move || {
                let rebuilt = transcoder.deserialize(ciphertext, view, person).unwrap();
                let predicate = Predicate::new(rebuilt).unwrap();
                let record = fixtures::person_record(person, age, None);
                assert_eq!(predicate.evaluate(&record).unwrap(), age > 18);
            });
        }
    });
}

/// Transcode `x => body(x)` from `PersonView` to `Person` and compare both
/// predicates over a spread of records.
fn assert_transcodes(body: impl Fn(&ExprBuilder<'_>, &Param) -> Expr) {
    let catalog = fixtures::catalog();
    let b = ExprBuilder::new(&catalog);
    let view = fixtures::person_view(&catalog);
    let person = fixtures::person(&catalog);
    let x = b.param("x", &view);
    let original = b.lambda(vec![x.clone()], body(&b, &x)).unwrap();
    let transcoder = transcoder(&catalog);

    let ciphertext = transcoder.serialize(&original).unwrap();
    let rebuilt = transcoder.deserialize(&ciphertext, &view, &person).unwrap();

    let original = Predicate::new(original).unwrap();
    let rebuilt = Predicate::new(rebuilt).unwrap();
    let mut outcomes = Vec::new();
    for age in [-3, 0, 17, 18, 40] {
        for birthday in [None, Some(fixtures::date(1999, 12, 31)), Some(fixtures::date(2010, 2, 1))] {
            let expected = original
                .evaluate(&fixtures::person_record(&view, age, birthday))
                .unwrap();
            let actual = rebuilt
                .evaluate(&fixtures::person_record(&person, age, birthday))
                .unwrap();
            assert_eq!(actual, expected, "age {age}, birthday {birthday:?}");
            outcomes.push(expected);
        }
    }
    assert!(outcomes.contains(&true) && outcomes.contains(&false), "predicate is constant");
}

fn age(b: &ExprBuilder<'_>, x: &Param) -> Expr {
    b.member(b.parameter(x), "Age").unwrap()
}

#[test]
fn conditional_transcodes() {
    // (x.Age > 30 ? x.Age - 30 : 30 - x.Age) > 10
    assert_transcodes(|b, x| {
        let test = b.gt(age(b, x), b.literal(30).unwrap()).unwrap();
        let above = b.sub(age(b, x), b.literal(30).unwrap()).unwrap();
        let below = b.sub(b.literal(30).unwrap(), age(b, x)).unwrap();
        let distance = b.conditional(test, above, below).unwrap();
        b.gt(distance, b.literal(10).unwrap()).unwrap()
    });
}

fn primitive(b: &ExprBuilder<'_>, p: Primitive) -> Type {
    b.catalog().primitive(p).unwrap()
}

#[test]
fn type_tests_transcode() {
    assert_transcodes(|b, x| {
        let birthday = b.member(b.parameter(x), "Birthday").unwrap();
        let known = b.type_is(birthday, &primitive(b, Primitive::DateTime)).unwrap();
        let name = b.member(b.parameter(x), "Name").unwrap();
        let named = b.type_equal(name, &primitive(b, Primitive::String)).unwrap();
        b.and_also(known, named).unwrap()
    });
}

#[test]
fn default_transcodes() {
    assert_transcodes(|b, x| {
        let zero = b.default(&primitive(b, Primitive::Int32));
        b.gt(age(b, x), zero).unwrap()
    });
}

#[test]
fn unary_operators_transcode() {
    assert_transcodes(|b, x| {
        let adult = b.gt(age(b, x), b.literal(18).unwrap()).unwrap();
        let minor = b.not(adult).unwrap();
        let negated = b.gt(b.negate(age(b, x)).unwrap(), b.literal(-20).unwrap()).unwrap();
        b.and_also(minor, negated).unwrap()
    });
    assert_transcodes(|b, x| {
        let wide = b.convert(age(b, x), &primitive(b, Primitive::Int64));
        b.ge(wide, b.literal(18_i64).unwrap()).unwrap()
    });
}

#[test]
fn index_transcodes() {
    // x.Tags[1] == "poetry" && x.Age < 18
    assert_transcodes(|b, x| {
        let tags = b.member(b.parameter(x), "Tags").unwrap();
        let second = b.index(tags, vec![b.literal(1).unwrap()]).unwrap();
        let poetry = b.eq(second, b.literal("poetry").unwrap()).unwrap();
        let minor = b.lt(age(b, x), b.literal(18).unwrap()).unwrap();
        b.and_also(poetry, minor).unwrap()
    });
}

#[test]
fn new_array_transcodes() {
    // Enumerable.Contains(new[] { 0, 17, 40 }, x.Age)
    assert_transcodes(|b, x| {
        let int32 = primitive(b, Primitive::Int32);
        let enumerable = b.catalog().std_type("Enumerable").unwrap();
        let allowed = b
            .new_array(
                &int32,
                vec![b.literal(0).unwrap(), b.literal(17).unwrap(), b.literal(40).unwrap()],
            )
            .unwrap();
        b.call_static(&enumerable, "Contains", &[int32.clone()], vec![allowed, age(b, x)])
            .unwrap()
    });
    // new String[3].Length < x.Age
    assert_transcodes(|b, x| {
        let sized = b
            .new_array_bounds(&primitive(b, Primitive::String), vec![b.literal(3).unwrap()])
            .unwrap();
        b.lt(b.array_length(sized).unwrap(), age(b, x)).unwrap()
    });
}

#[test]
fn new_object_transcodes() {
    // new DateTime(2000, 1, 1) < x.Birthday
    assert_transcodes(|b, x| {
        let millennium = b
            .new_object(
                &primitive(b, Primitive::DateTime),
                vec![b.literal(2000).unwrap(), b.literal(1).unwrap(), b.literal(1).unwrap()],
            )
            .unwrap();
        let birthday = b.member(b.parameter(x), "Birthday").unwrap();
        b.lt(millennium, birthday).unwrap()
    });
}

#[test]
fn block_and_runtime_variables_transcode() {
    // { Int32 floor; x.Age > floor }
    assert_transcodes(|b, x| {
        let floor = b.param("floor", &primitive(b, Primitive::Int32));
        let above = b.gt(age(b, x), b.parameter(&floor)).unwrap();
        b.block(vec![floor], vec![above]).unwrap()
    });
    // { Int32 floor; RuntimeVariables(floor, x) is Object } && x.Age >= 18
    assert_transcodes(|b, x| {
        let floor = b.param("floor", &primitive(b, Primitive::Int32));
        let group = b.runtime_variables(vec![floor.clone(), x.clone()]).unwrap();
        let boxed = b.type_is(group, &primitive(b, Primitive::Object)).unwrap();
        let scoped = b.block(vec![floor], vec![boxed]).unwrap();
        let adult = b.ge(age(b, x), b.literal(18).unwrap()).unwrap();
        b.and_also(scoped, adult).unwrap()
    });
}

const COMPARISONS: [NodeType; 6] = [
    NodeType::Equal,
    NodeType::NotEqual,
    NodeType::LessThan,
    NodeType::LessThanOrEqual,
    NodeType::GreaterThan,
    NodeType::GreaterThanOrEqual,
];

/// `x => x.Age <op> threshold <and|or> x.Birthday != null`
fn comparison(catalog: &Catalog, ty: &Type, op: NodeType, threshold: i32, and: bool) -> Lambda {
    let b = ExprBuilder::new(catalog);
    let x = b.param("x", ty);
    let age = b.member(b.parameter(&x), "Age").unwrap();
    let compared = b.binary(op, age, b.literal(threshold).unwrap()).unwrap();
    let birthday = b.member(b.parameter(&x), "Birthday").unwrap();
    let null = b.null(&birthday.ty);
    let known = b.ne(birthday, null).unwrap();
    let body = if and {
        b.and_also(compared, known)
    } else {
        b.or_else(compared, known)
    }
    .unwrap();
    b.lambda(vec![x], body).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn transcoded_comparison_agrees(
        op in 0..COMPARISONS.len(),
        threshold in -40i32..40,
        and in any::<bool>(),
        age in -40i32..40,
        birthday in proptest::option::of(700_000i32..740_000),
    ) {
        let catalog = fixtures::catalog();
        let view = fixtures::person_view(&catalog);
        let person = fixtures::person(&catalog);
        let transcoder = transcoder(&catalog);
        let original = comparison(&catalog, &view, COMPARISONS[op], threshold, and);
        let birthday = birthday
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .and_then(|d| d.and_hms_opt(0, 0, 0));

        let ciphertext = transcoder.serialize(&original).unwrap();
        let rebuilt = transcoder.deserialize(&ciphertext, &view, &person).unwrap();

        let expected = Predicate::new(original)
            .unwrap()
            .evaluate(&fixtures::person_record(&view, age, birthday))
            .unwrap();
        let actual = Predicate::new(rebuilt)
            .unwrap()
            .evaluate(&fixtures::person_record(&person, age, birthday))
            .unwrap();
        prop_assert_eq!(actual, expected);
    }
}
