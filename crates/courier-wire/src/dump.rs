//! Human-readable dump of a portable tree for debugging.
//!
//! One line per node: `kind NodeType : Type detail`, children indented by
//! two spaces beneath their parent.

use std::fmt::Write as _;

use crate::schema::{NodeBody, PortableNode, PortableTree};

/// Escape sequences for the parts of a dump line. The default paints nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Colors {
    /// Node kind, such as `binaryOp`.
    pub kind: &'static str,
    /// Constants, parameter names and member signatures.
    pub detail: &'static str,
    /// Static types and the format version.
    pub ty: &'static str,
    pub reset: &'static str,
}

impl Colors {
    pub const PLAIN: Self = Self {
        kind: "",
        detail: "",
        ty: "",
        reset: "",
    };

    /// Standard 16-color codes: blue kinds, green details, dim types.
    pub const ANSI: Self = Self {
        kind: "\x1b[34m",
        detail: "\x1b[32m",
        ty: "\x1b[2m",
        reset: "\x1b[0m",
    };

    pub fn new(enabled: bool) -> Self {
        if enabled { Self::ANSI } else { Self::PLAIN }
    }

    pub fn is_enabled(&self) -> bool {
        *self != Self::PLAIN
    }
}

/// Generate a human-readable dump of the tree.
pub fn dump(tree: &PortableTree, colors: Colors) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}v{}{}", colors.ty, tree.version, colors.reset);
    dump_node(&mut out, &tree.root, 0, colors);
    out
}

fn dump_node(out: &mut String, node: &PortableNode, depth: usize, colors: Colors) {
    let c = colors;
    let indent = "  ".repeat(depth);
    let _ = write!(
        out,
        "{indent}{}{}{} {:?} {}: {}{}",
        c.kind,
        node.kind_name(),
        c.reset,
        node.node_type,
        c.ty,
        node.ty,
        c.reset
    );
    if let Some(detail) = detail(node) {
        let _ = write!(out, " {}{}{}", c.detail, detail, c.reset);
    }
    out.push('\n');

    for child in node.children() {
        dump_node(out, child, depth + 1, colors);
    }
}

fn detail(node: &PortableNode) -> Option<String> {
    match &node.body {
        NodeBody::Constant { value } => Some(match value {
            Some(v) => v.value.to_string(),
            None => "null".to_string(),
        }),
        NodeBody::Parameter { name } => Some(param_name(name)),
        NodeBody::MemberAccess { member, .. } => Some(member.signature.clone()),
        NodeBody::MethodCall { method, .. } => Some(method.signature.clone()),
        NodeBody::BinaryOp { method, .. } | NodeBody::UnaryOp { method, .. } => {
            method.as_ref().map(|m| m.signature.clone())
        }
        NodeBody::Index { indexer, .. } => indexer.as_ref().map(|m| m.signature.clone()),
        NodeBody::NewObject { constructor, .. } => Some(constructor.signature.clone()),
        NodeBody::NewArray { element_type, .. } => Some(element_type.to_string()),
        NodeBody::TypeTest { type_operand, .. } => Some(type_operand.to_string()),
        NodeBody::Lambda { parameters, .. } => {
            let names: Vec<String> = parameters
                .iter()
                .map(|p| match &p.body {
                    NodeBody::Parameter { name } => param_name(name),
                    _ => "?".to_string(),
                })
                .collect();
            Some(format!("({})", names.join(", ")))
        }
        _ => None,
    }
}

fn param_name(name: &Option<String>) -> String {
    name.clone().unwrap_or_else(|| "_".to_string())
}
