use crate::catalog::SymbolError;
use crate::types::{
    Flavor, MemberKind, ModuleBuilder, Primitive, RecordBuilder, TypeDescriptor, TypeKind,
    Universe, module_simple_name, render_signature, simple_type_name,
};

#[test]
fn descriptor_display_renders_generic_arguments() {
    let desc = TypeDescriptor::nullable(TypeDescriptor::std("DateTime"));
    assert_eq!(desc.to_string(), "Nullable<DateTime>");

    let func = TypeDescriptor::std("Func").with_args(vec![
        TypeDescriptor::new("contracts", "Sample.PersonView"),
        TypeDescriptor::std("Boolean"),
    ]);
    assert_eq!(func.to_string(), "Func<Sample.PersonView, Boolean>");
}

#[test]
fn descriptor_equality_is_structural() {
    let a = TypeDescriptor::array(TypeDescriptor::std("String"));
    let b = TypeDescriptor::array(TypeDescriptor::std("String"));
    let c = TypeDescriptor::array(TypeDescriptor::std("Int32"));

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(
        TypeDescriptor::new("contracts", "Sample.Person"),
        TypeDescriptor::new("server", "Sample.Person")
    );
}

#[test]
fn substitute_replaces_nested_placeholders() {
    let open = TypeDescriptor::array(TypeDescriptor::generic_param("T"));
    assert!(open.is_open());

    let closed = open.substitute(&["T".to_owned()], &[TypeDescriptor::std("Int32")]);
    assert_eq!(closed, TypeDescriptor::array(TypeDescriptor::std("Int32")));
    assert!(!closed.is_open());
}

#[test]
fn module_and_type_names_strip_qualifiers() {
    assert_eq!(module_simple_name("contracts, Version=1.2.0"), "contracts");
    assert_eq!(module_simple_name("core"), "core");
    assert_eq!(simple_type_name("Client.Models.Person"), "Person");
    assert_eq!(simple_type_name("Person"), "Person");
}

#[test]
fn signatures_follow_canonical_shapes() {
    let int32 = TypeDescriptor::std("Int32");
    let boolean = TypeDescriptor::std("Boolean");
    let string = TypeDescriptor::std("String");
    let t = TypeDescriptor::generic_param("T");

    assert_eq!(
        render_signature(MemberKind::Property, "Age", &int32, &[], &[]),
        "Int32 Age"
    );
    assert_eq!(
        render_signature(MemberKind::Property, "Item", &t, &[int32.clone()], &[]),
        "T Item[Int32]"
    );
    assert_eq!(
        render_signature(MemberKind::Method, "Contains", &boolean, &[string], &[]),
        "Boolean Contains(String)"
    );
    assert_eq!(
        render_signature(
            MemberKind::Method,
            "Contains",
            &boolean,
            &[TypeDescriptor::array(t.clone()), t],
            &["T".to_owned()],
        ),
        "Boolean Contains<T>(Array<T>, T)"
    );
    assert_eq!(
        render_signature(
            MemberKind::Constructor,
            ".ctor",
            &TypeDescriptor::std("Void"),
            &[int32.clone(), int32.clone(), int32],
            &[],
        ),
        "Void .ctor(Int32, Int32, Int32)"
    );
}

#[test]
fn universe_contains_std_module_per_flavor() {
    let current = Universe::new();
    assert_eq!(current.std_module_id(), "core");
    assert!(current.module("core").is_some());

    let legacy = Universe::with_flavor(Flavor::Legacy);
    assert_eq!(legacy.std_module_id(), "corelib");
    assert!(legacy.module("corelib").is_some());
    assert!(legacy.module("core").is_none());
}

#[test]
fn std_module_has_every_primitive() {
    let universe = Universe::new();
    let std = universe.module("core").unwrap();

    for p in Primitive::ALL {
        let ty = std.get(p.name()).unwrap();
        assert_eq!(ty.kind(), &TypeKind::Primitive(p));
    }
    assert!(std.get("Nullable").unwrap().is_generic_definition());
    assert!(std.get("Func").unwrap().is_generic_definition());
    assert_eq!(std.get("Math").unwrap().kind(), &TypeKind::Static);
}

#[test]
fn module_lookup_ignores_version_qualifier() {
    let universe = Universe::new()
        .with_module(
            ModuleBuilder::new("contracts, Version=1.2.0")
                .record(RecordBuilder::new("Sample.Pet").property("Name", TypeDescriptor::std("String")))
                .build(),
        )
        .unwrap();

    assert!(universe.module("contracts").is_some());
    assert!(universe.module("contracts, Version=9.9.9").is_some());
}

#[test]
fn duplicate_module_is_rejected() {
    let build = || ModuleBuilder::new("contracts").build();
    let err = Universe::new()
        .with_module(build())
        .unwrap()
        .with_module(build())
        .unwrap_err();

    assert_eq!(err, SymbolError::DuplicateModule("contracts".to_owned()));
}

#[test]
fn constructing_generic_substitutes_member_types() {
    let universe = Universe::new();
    let list = universe.module("core").unwrap().get("List").unwrap();

    let constructed = list.construct(vec![TypeDescriptor::std("String")]).unwrap();

    assert_eq!(constructed.descriptor().to_string(), "List<String>");
    let item = constructed.indexer().unwrap();
    assert_eq!(item.signature(), "String Item[Int32]");
    assert_eq!(item.value_type(), &TypeDescriptor::std("String"));
    assert!(!constructed.is_generic_definition());
}

#[test]
fn construct_checks_arity_and_genericity() {
    let universe = Universe::new();
    let std = universe.module("core").unwrap();

    let err = std
        .get("Nullable")
        .unwrap()
        .construct(vec![TypeDescriptor::std("Int32"), TypeDescriptor::std("Int32")])
        .unwrap_err();
    assert!(matches!(err, SymbolError::GenericArity { expected: 1, actual: 2, .. }));

    let err = std
        .get("Int32")
        .unwrap()
        .construct(vec![TypeDescriptor::std("Int32")])
        .unwrap_err();
    assert!(matches!(err, SymbolError::NotGeneric(_)));
}

#[test]
fn generic_method_instantiation_keeps_definition_signature() {
    let universe = Universe::new();
    let enumerable = universe.module("core").unwrap().get("Enumerable").unwrap();
    let contains = enumerable
        .members_named("Contains", MemberKind::Method)
        .next()
        .unwrap();

    let inst = contains
        .instantiate(vec![TypeDescriptor::std("String")])
        .unwrap();

    assert_eq!(inst.signature(), "Boolean Contains<T>(Array<T>, T)");
    assert_eq!(inst.generic_arguments(), &[TypeDescriptor::std("String")]);
    assert_eq!(
        inst.parameters(),
        &[
            TypeDescriptor::array(TypeDescriptor::std("String")),
            TypeDescriptor::std("String")
        ]
    );
}

#[test]
fn record_members_are_slot_backed() {
    let module = ModuleBuilder::new("server")
        .record(
            RecordBuilder::new("Sample.Ledger")
                .field("Age", TypeDescriptor::std("Int32"))
                .property("Name", TypeDescriptor::std("String")),
        )
        .build();
    let ledger = module.get("Sample.Ledger").unwrap();

    assert!(ledger.property("Age").is_none());
    assert!(ledger.field("Age").is_some());
    assert_eq!(ledger.property("Name").unwrap().signature(), "String Name");
    assert!(ledger.is_record());
}

#[test]
fn member_lookup_outlives_the_name() {
    let module = ModuleBuilder::new("server")
        .record(
            RecordBuilder::new("Sample.Ledger")
                .field("Age", TypeDescriptor::std("Int32"))
                .property("Name", TypeDescriptor::std("String")),
        )
        .build();
    let ledger = module.get("Sample.Ledger").unwrap();

    let (name, age) = {
        let requested = ["Na", "me"].concat();
        let field = String::from("Age");
        (
            ledger.property(&requested).unwrap(),
            ledger.field(&field).unwrap(),
        )
    };

    assert_eq!(name.signature(), "String Name");
    assert_eq!(age.signature(), "Int32 Age");
}
