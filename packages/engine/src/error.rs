//! Error types for the engine

use thiserror::Error;
use xdynamic_tree::TreeError;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Object is no longer bound to a live element: {0}")]
    AnchorReleased(String),

    #[error("Internal engine error: {0}")]
    Internal(String),

    #[error("Invalid member path {path:?}: {message}")]
    InvalidPath { path: String, message: String },

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),
}

impl EngineError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn invalid_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }
}
