//! Node handles and per-element storage.

use std::fmt;

/// Generational handle to an element stored in a [`Document`](crate::Document).
///
/// Removing an element bumps the generation of its slot, so handles that outlive
/// the element are detected instead of silently aliasing a newer element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Name without a `prefix:` part
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }
}

pub fn local_name(qualified: &str) -> &str {
    match qualified.rfind(':') {
        Some(pos) => &qualified[pos + 1..],
        None => qualified,
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ElementData {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<NodeId>,
    /// Direct text content. `None` serializes as `<a />`, `Some("")` as `<a></a>`.
    pub text: Option<String>,
    pub parent: Option<NodeId>,
}

impl ElementData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Whether `name` is usable as an element or attribute name
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'))
}
