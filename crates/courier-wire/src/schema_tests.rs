use courier_core::{MemberKind, NodeType, TypeDescriptor};
use indoc::indoc;
use serde_json::{Value, json};

use crate::schema::{ConstantValue, MemberRef, NodeBody, PortableNode, PortableTree};
use crate::{FORMAT_VERSION, WireError, from_json, to_json, to_json_pretty};

fn int32() -> TypeDescriptor {
    TypeDescriptor::std("Int32")
}

fn age_node() -> PortableNode {
    let person = TypeDescriptor::new("contracts", "Sample.PersonView");
    PortableNode::new(
        NodeType::MemberAccess,
        int32(),
        NodeBody::MemberAccess {
            expression: Some(Box::new(PortableNode::new(
                NodeType::Parameter,
                person.clone(),
                NodeBody::Parameter {
                    name: Some("x".into()),
                },
            ))),
            member: MemberRef {
                owner: person,
                member_kind: MemberKind::Property,
                name: "Age".into(),
                signature: "Int32 Age".into(),
            },
        },
    )
}

#[test]
fn node_fields_are_camel_case() {
    let tree = PortableTree::new(age_node());

    let v: Value = serde_json::from_str(&to_json(&tree).unwrap()).unwrap();

    assert_eq!(v["version"], json!(FORMAT_VERSION));
    let root = &v["root"];
    assert_eq!(root["kind"], "memberAccess");
    assert_eq!(root["nodeType"], "MemberAccess");
    assert_eq!(root["type"]["module"], "core");
    assert_eq!(root["type"]["typeName"], "Int32");
    assert_eq!(root["member"]["memberKind"], "property");
    assert_eq!(root["member"]["type"]["typeName"], "Sample.PersonView");
    assert_eq!(root["member"]["signature"], "Int32 Age");
    assert_eq!(root["expression"]["kind"], "parameter");
    assert_eq!(root["expression"]["name"], "x");
}

#[test]
fn null_constant_keeps_value_field() {
    let node = PortableNode::new(NodeType::Constant, int32(), NodeBody::Constant { value: None });

    let v = serde_json::to_value(&node).unwrap();

    assert_eq!(v["kind"], "constant");
    assert_eq!(v["value"], Value::Null);
}

#[test]
fn optional_fields_are_omitted() {
    let node = PortableNode::new(
        NodeType::Equal,
        TypeDescriptor::std("Boolean"),
        NodeBody::BinaryOp {
            left: Box::new(age_node()),
            right: Box::new(age_node()),
            operator: NodeType::Equal,
            method: None,
            conversion: None,
            lift_to_null: false,
        },
    );

    let v = serde_json::to_value(&node).unwrap();

    assert_eq!(v["kind"], "binaryOp");
    assert_eq!(v["operator"], "Equal");
    assert_eq!(v["liftToNull"], false);
    assert!(v.get("method").is_none());
    assert!(v.get("conversion").is_none());
}

#[test]
fn parse_hand_written_tree() {
    let text = indoc! {r#"
        {
          "version": 1,
          "root": {
            "kind": "binaryOp",
            "nodeType": "GreaterThan",
            "type": { "module": "core", "typeName": "Boolean" },
            "operator": "GreaterThan",
            "left": {
              "kind": "constant",
              "nodeType": "Constant",
              "type": { "module": "core", "typeName": "Int32" },
              "value": { "type": { "module": "core", "typeName": "Int32" }, "value": 25 }
            },
            "right": {
              "kind": "constant",
              "nodeType": "Constant",
              "type": { "module": "core", "typeName": "Int32" },
              "value": { "type": { "module": "core", "typeName": "Int32" }, "value": 18 }
            }
          }
        }
    "#};

    let tree = from_json(text).unwrap();

    assert_eq!(tree.version, 1);
    assert_eq!(tree.root.node_type, NodeType::GreaterThan);
    let NodeBody::BinaryOp {
        left, lift_to_null, ..
    } = &tree.root.body
    else {
        panic!("expected binaryOp, got {:?}", tree.root.body);
    };
    assert!(!lift_to_null);
    assert_eq!(
        left.body,
        NodeBody::Constant {
            value: Some(ConstantValue {
                ty: int32(),
                value: json!(25),
            })
        }
    );
    assert_eq!(tree.root.children().len(), 2);
}

#[test]
fn pretty_text_reparses() {
    let tree = PortableTree::new(age_node());

    let text = to_json_pretty(&tree).unwrap();

    assert!(text.contains('\n'));
    assert_eq!(from_json(&text).unwrap(), tree);
}

#[test]
fn unknown_kind_parses_as_unknown() {
    let text = r#"{"version":1,"root":{"kind":"extension","nodeType":"Constant","type":{"module":"core","typeName":"Int32"},"payload":7}}"#;

    let tree = from_json(text).unwrap();

    assert_eq!(tree.root.body, NodeBody::Unknown);
    assert_eq!(tree.root.kind_name(), "unknown");
    assert!(tree.root.children().is_empty());
}

#[test]
fn unknown_node_type_is_malformed() {
    let text = r#"{"version":1,"root":{"kind":"default","nodeType":"Teleport","type":{"module":"core","typeName":"Int32"}}}"#;

    let err = from_json(text).unwrap_err();

    assert!(matches!(err, WireError::Json(_)));
}

#[test]
fn not_json_is_malformed() {
    let err = from_json("{ version: 1").unwrap_err();

    assert!(err.to_string().starts_with("malformed portable tree: "));
}
