//! # XDynamic Engine
//!
//! Reads and writes an XML element tree through dynamically typed objects.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ tree: markup text ⇄ Document (arena)        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ engine: XmlObject                           │
//! │  - member cache (per object)                │
//! │  - classifier: element shape                │
//! │  - projector: element → Value               │
//! │  - mutation engine: Value → element         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ dispatch: MemberAccess + member paths       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use xdynamic_engine::{Value, XmlObject};
//!
//! let root = XmlObject::new()?;
//! root.set("Id", 123i32)?;
//! assert_eq!(root.to_xml()?, r#"<root><Id _dataType="System.Int32">123</Id></root>"#);
//!
//! root.set("Id", Value::Null)?;
//! assert_eq!(root.to_xml()?, "<root />");
//! ```

mod cache;
mod classifier;
mod dispatch;
mod error;
mod mutation;
mod options;
mod projector;
mod type_tag;
mod value;
mod wrapper;

pub use cache::{CacheStats, MemberCache};
pub use classifier::{Classifier, ListShape, SingleShape};
pub use dispatch::{MemberAccess, MemberPath, PathSegment};
pub use error::{EngineError, EngineResult};
pub use mutation::{MutationEngine, MutationOutcome};
pub use options::ProjectionOptions;
pub use projector::Projector;
pub use type_tag::{is_list_keyword, PrimitiveKind, DATA_TYPE_ATTRIBUTE, LIST_KEYWORDS, LIST_TAG};
pub use value::{FieldBag, Primitive, Value};
pub use wrapper::XmlObject;

pub use xdynamic_tree::{Document, NodeId, TreeError};
