//! # XDynamic Tree
//!
//! The element tree the projection engine reads from and writes to.
//!
//! Elements live in an arena owned by a [`Document`]; callers address them through
//! generational [`NodeId`]s. Markup text is parsed with `quick-xml` and written
//! back with [`Serializer`].

pub mod document;
pub mod error;
pub mod node;
pub mod parser;
pub mod serializer;


pub use document::{Document, WeakDocument};
pub use error::{TreeError, TreeResult};
pub use node::{is_valid_name, local_name, Attribute, NodeId};
pub use parser::{parse, Parser};
pub use serializer::{serialize, Serializer};
