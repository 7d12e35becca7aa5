use courier_core::{MemberKind, NodeType, TypeDescriptor};
use serde_json::json;

use crate::schema::{ConstantValue, MemberRef, MethodRef, NodeBody, PortableNode, PortableTree};
use crate::dump::{Colors, dump};

fn person() -> TypeDescriptor {
    TypeDescriptor::new("contracts", "Sample.PersonView")
}

fn param() -> PortableNode {
    PortableNode::new(
        NodeType::Parameter,
        person(),
        NodeBody::Parameter {
            name: Some("x".into()),
        },
    )
}

fn member(name: &str, ty: TypeDescriptor) -> PortableNode {
    PortableNode::new(
        NodeType::MemberAccess,
        ty.clone(),
        NodeBody::MemberAccess {
            expression: Some(Box::new(param())),
            member: MemberRef {
                owner: person(),
                member_kind: MemberKind::Property,
                name: name.into(),
                signature: format!("{ty} {name}"),
            },
        },
    )
}

fn constant(ty: TypeDescriptor, value: serde_json::Value) -> PortableNode {
    PortableNode::new(
        NodeType::Constant,
        ty.clone(),
        NodeBody::Constant {
            value: Some(ConstantValue { ty, value }),
        },
    )
}

fn predicate(body: PortableNode) -> PortableTree {
    let func = TypeDescriptor::std("Func").with_args(vec![person(), TypeDescriptor::std("Boolean")]);
    PortableTree::new(PortableNode::new(
        NodeType::Lambda,
        func,
        NodeBody::Lambda {
            name: None,
            parameters: vec![param()],
            body: Box::new(body),
            tail_call: false,
        },
    ))
}

#[test]
fn dump_comparison() {
    let body = PortableNode::new(
        NodeType::GreaterThan,
        TypeDescriptor::std("Boolean"),
        NodeBody::BinaryOp {
            left: Box::new(member("Age", TypeDescriptor::std("Int32"))),
            right: Box::new(constant(TypeDescriptor::std("Int32"), json!(18))),
            operator: NodeType::GreaterThan,
            method: None,
            conversion: None,
            lift_to_null: false,
        },
    );

    let res = dump(&predicate(body), Colors::PLAIN);

    insta::assert_snapshot!(res, @r"
    v1
    lambda Lambda : Func<Sample.PersonView, Boolean> (x)
      parameter Parameter : Sample.PersonView x
      binaryOp GreaterThan : Boolean
        memberAccess MemberAccess : Int32 Int32 Age
          parameter Parameter : Sample.PersonView x
        constant Constant : Int32 18
    ");
}

#[test]
fn dump_method_call_and_null() {
    let string = TypeDescriptor::std("String");
    let contains = PortableNode::new(
        NodeType::Call,
        TypeDescriptor::std("Boolean"),
        NodeBody::MethodCall {
            object: Some(Box::new(member("Name", string.clone()))),
            method: MethodRef {
                owner: string.clone(),
                name: "Contains".into(),
                signature: "Boolean Contains(String)".into(),
                generic: Vec::new(),
            },
            arguments: vec![constant(string.clone(), json!("Ada"))],
        },
    );
    let null = PortableNode::new(NodeType::Constant, string, NodeBody::Constant { value: None });
    let body = PortableNode::new(
        NodeType::Conditional,
        TypeDescriptor::std("Boolean"),
        NodeBody::Conditional {
            test: Box::new(contains.clone()),
            if_true: Box::new(contains),
            if_false: Box::new(null),
        },
    );

    let res = dump(&predicate(body), Colors::PLAIN);

    insta::assert_snapshot!(res, @r#"
    v1
    lambda Lambda : Func<Sample.PersonView, Boolean> (x)
      parameter Parameter : Sample.PersonView x
      conditional Conditional : Boolean
        methodCall Call : Boolean Boolean Contains(String)
          memberAccess MemberAccess : String String Name
            parameter Parameter : Sample.PersonView x
          constant Constant : String "Ada"
        methodCall Call : Boolean Boolean Contains(String)
          memberAccess MemberAccess : String String Name
            parameter Parameter : Sample.PersonView x
          constant Constant : String "Ada"
        constant Constant : String null
    "#);
}

#[test]
fn dump_with_colors() {
    let tree = PortableTree::new(param());

    let res = dump(&tree, Colors::ANSI);

    assert_eq!(
        res,
        "\x1b[2mv1\x1b[0m\n\x1b[34mparameter\x1b[0m Parameter \x1b[2m: Sample.PersonView\x1b[0m \x1b[32mx\x1b[0m\n"
    );
}

#[test]
fn palette_follows_the_switch() {
    assert_eq!(Colors::default(), Colors::PLAIN);
    assert_eq!(Colors::new(false), Colors::PLAIN);
    assert_eq!(Colors::new(true).kind, "\x1b[34m");
    assert!(Colors::new(true).is_enabled());

    let tree = PortableTree::new(param());
    assert!(!dump(&tree, Colors::PLAIN).contains('\x1b'));
}
