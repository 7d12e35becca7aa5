//! Serde schema of the portable tree.
//!
//! Every node is a JSON object with `kind`, `nodeType` and `type` plus the
//! fields of its kind. Field names are camelCase.

use courier_core::{MemberKind, NodeType, TypeDescriptor};
use serde::{Deserialize, Serialize};

/// Version written into every tree and required on read.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortableTree {
    pub version: u32,
    pub root: PortableNode,
}

impl PortableTree {
    pub fn new(root: PortableNode) -> Self {
        Self {
            version: FORMAT_VERSION,
            root,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortableNode {
    pub node_type: NodeType,
    /// Static result type.
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    #[serde(flatten)]
    pub body: NodeBody,
}

impl PortableNode {
    pub fn new(node_type: NodeType, ty: TypeDescriptor, body: NodeBody) -> Self {
        Self {
            node_type,
            ty,
            body,
        }
    }

    /// The `kind` discriminator as written on the wire.
    pub fn kind_name(&self) -> &'static str {
        self.body.kind_name()
    }

    /// Child nodes in field order.
    pub fn children(&self) -> Vec<&PortableNode> {
        let mut out: Vec<&PortableNode> = Vec::new();
        match &self.body {
            NodeBody::BinaryOp {
                left,
                right,
                conversion,
                ..
            } => {
                out.extend([left.as_ref(), right.as_ref()]);
                out.extend(conversion.as_deref());
            }
            NodeBody::UnaryOp { operand, .. } => out.push(operand),
            NodeBody::Conditional {
                test,
                if_true,
                if_false,
            } => out.extend([test.as_ref(), if_true.as_ref(), if_false.as_ref()]),
            NodeBody::Index {
                object, arguments, ..
            } => {
                out.push(object);
                out.extend(arguments);
            }
            NodeBody::Invocation {
                expression,
                arguments,
            } => {
                out.push(expression);
                out.extend(arguments);
            }
            NodeBody::Lambda {
                parameters, body, ..
            } => {
                out.extend(parameters);
                out.push(body);
            }
            NodeBody::MemberAccess { expression, .. } => out.extend(expression.as_deref()),
            NodeBody::MethodCall {
                object, arguments, ..
            } => {
                out.extend(object.as_deref());
                out.extend(arguments);
            }
            NodeBody::NewArray { expressions, .. } => out.extend(expressions),
            NodeBody::NewObject { arguments, .. } => out.extend(arguments),
            NodeBody::RuntimeVariablesGroup { variables } => out.extend(variables),
            NodeBody::TypeTest { expression, .. } => out.push(expression),
            NodeBody::Block {
                expressions,
                variables,
            } => {
                out.extend(variables);
                out.extend(expressions);
            }
            NodeBody::Constant { .. }
            | NodeBody::Default {}
            | NodeBody::Parameter { .. }
            | NodeBody::Unknown => {}
        }
        out
    }
}

/// Kind-specific fields, discriminated by `kind`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum NodeBody {
    BinaryOp {
        left: Box<PortableNode>,
        right: Box<PortableNode>,
        operator: NodeType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<MethodRef>,
        /// Lambda node applied to a non-null `Coalesce` left operand.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        conversion: Option<Box<PortableNode>>,
        #[serde(default)]
        lift_to_null: bool,
    },
    UnaryOp {
        operand: Box<PortableNode>,
        operator: NodeType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<MethodRef>,
    },
    Conditional {
        test: Box<PortableNode>,
        if_true: Box<PortableNode>,
        if_false: Box<PortableNode>,
    },
    Constant {
        /// `None` for the null literal.
        #[serde(default)]
        value: Option<ConstantValue>,
    },
    Default {},
    Index {
        object: Box<PortableNode>,
        /// `None` for array element access.
        #[serde(default)]
        indexer: Option<MemberRef>,
        arguments: Vec<PortableNode>,
    },
    Invocation {
        expression: Box<PortableNode>,
        arguments: Vec<PortableNode>,
    },
    Lambda {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// `parameter` nodes.
        parameters: Vec<PortableNode>,
        body: Box<PortableNode>,
        #[serde(default)]
        tail_call: bool,
    },
    MemberAccess {
        /// `None` for static members.
        #[serde(default)]
        expression: Option<Box<PortableNode>>,
        member: MemberRef,
    },
    MethodCall {
        /// `None` for static methods.
        #[serde(default)]
        object: Option<Box<PortableNode>>,
        method: MethodRef,
        arguments: Vec<PortableNode>,
    },
    NewArray {
        element_type: TypeDescriptor,
        expressions: Vec<PortableNode>,
    },
    NewObject {
        constructor: ConstructorRef,
        arguments: Vec<PortableNode>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        members: Vec<MemberRef>,
    },
    Parameter {
        #[serde(default)]
        name: Option<String>,
    },
    RuntimeVariablesGroup {
        /// `parameter` nodes.
        variables: Vec<PortableNode>,
    },
    TypeTest {
        expression: Box<PortableNode>,
        type_operand: TypeDescriptor,
        test_kind: NodeType,
    },
    Block {
        expressions: Vec<PortableNode>,
        /// `parameter` nodes.
        #[serde(default)]
        variables: Vec<PortableNode>,
    },
    /// Any `kind` this version does not know.
    #[serde(other)]
    Unknown,
}

impl NodeBody {
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeBody::BinaryOp { .. } => "binaryOp",
            NodeBody::UnaryOp { .. } => "unaryOp",
            NodeBody::Conditional { .. } => "conditional",
            NodeBody::Constant { .. } => "constant",
            NodeBody::Default {} => "default",
            NodeBody::Index { .. } => "index",
            NodeBody::Invocation { .. } => "invocation",
            NodeBody::Lambda { .. } => "lambda",
            NodeBody::MemberAccess { .. } => "memberAccess",
            NodeBody::MethodCall { .. } => "methodCall",
            NodeBody::NewArray { .. } => "newArray",
            NodeBody::NewObject { .. } => "newObject",
            NodeBody::Parameter { .. } => "parameter",
            NodeBody::RuntimeVariablesGroup { .. } => "runtimeVariablesGroup",
            NodeBody::TypeTest { .. } => "typeTest",
            NodeBody::Block { .. } => "block",
            NodeBody::Unknown => "unknown",
        }
    }
}

/// Property, field or indexer reference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRef {
    #[serde(rename = "type")]
    pub owner: TypeDescriptor,
    pub member_kind: MemberKind,
    pub name: String,
    pub signature: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodRef {
    #[serde(rename = "type")]
    pub owner: TypeDescriptor,
    pub name: String,
    pub signature: String,
    /// Generic arguments of an instantiated generic method.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic: Vec<TypeDescriptor>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructorRef {
    #[serde(rename = "type")]
    pub owner: TypeDescriptor,
    pub name: String,
    pub signature: String,
}

/// Literal with its type. Records are objects keyed by member name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstantValue {
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    pub value: serde_json::Value,
}
