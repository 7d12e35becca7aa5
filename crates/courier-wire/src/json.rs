use crate::error::Result;
use crate::schema::PortableTree;

/// Compact JSON text, the form that gets encrypted.
pub fn to_json(tree: &PortableTree) -> Result<String> {
    Ok(serde_json::to_string(tree)?)
}

pub fn to_json_pretty(tree: &PortableTree) -> Result<String> {
    Ok(serde_json::to_string_pretty(tree)?)
}

/// Parse a tree. Unknown node kinds parse as [`crate::NodeBody::Unknown`].
pub fn from_json(text: &str) -> Result<PortableTree> {
    Ok(serde_json::from_str(text)?)
}
