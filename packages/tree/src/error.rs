use crate::node::NodeId;
use thiserror::Error;

pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Malformed markup at {pos}: {message}")]
    Xml { pos: u64, message: String },

    #[error("Document has no root element")]
    MissingRoot,

    #[error("Document has more than one root element at {pos}")]
    MultipleRoots { pos: u64 },

    #[error("Unexpected end of input, <{element}> is not closed")]
    UnexpectedEof { element: String },

    #[error("Element <{element}> mixes text with child elements")]
    MixedContent { element: String },

    #[error("Text outside of the root element at {pos}")]
    StrayText { pos: u64 },

    #[error("Node {0} was removed from its document")]
    StaleNode(NodeId),

    #[error("Moving {child} under {parent} would create a cycle")]
    CycleDetected { parent: NodeId, child: NodeId },

    #[error("The root element cannot be removed or moved")]
    RootRemoval,

    #[error("Invalid element or attribute name: {0:?}")]
    InvalidName(String),
}

impl TreeError {
    pub fn xml(pos: u64, message: impl Into<String>) -> Self {
        Self::Xml {
            pos,
            message: message.into(),
        }
    }

    pub fn mixed_content(element: impl Into<String>) -> Self {
        Self::MixedContent {
            element: element.into(),
        }
    }
}
