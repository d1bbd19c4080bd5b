//! # XmlObject
//!
//! A dynamic object bound to one element of a [`Document`].
//!
//! Reads go through the member cache, then the classifier and projector. Writes go
//! through the mutation engine and update the cache entry of the written member.
//!
//! An object created from markup text or a root name owns its document. Objects
//! created from an existing document, and every nested object produced by a read,
//! only hold a weak handle: once the document is dropped or their element removed,
//! every operation fails with [`EngineError::AnchorReleased`].

use crate::cache::{CacheStats, MemberCache};
use crate::error::{EngineError, EngineResult};
use crate::mutation::{MutationEngine, MutationOutcome};
use crate::options::ProjectionOptions;
use crate::projector::Projector;
use crate::value::{FieldBag, Primitive, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::debug;
use xdynamic_tree::{is_valid_name, Document, NodeId, WeakDocument};

#[derive(Clone)]
pub struct XmlObject {
    doc: WeakDocument,
    node: NodeId,
    owner: Option<Document>,
    options: Rc<ProjectionOptions>,
    cache: Rc<RefCell<MemberCache>>,
}

/// Handle the member cache keeps for nested objects. It does not keep the object's
/// own cache alive, so the projection is collected with the last caller handle.
#[derive(Clone)]
pub(crate) struct WeakObject {
    doc: WeakDocument,
    node: NodeId,
    options: Rc<ProjectionOptions>,
    cache: Weak<RefCell<MemberCache>>,
}

impl WeakObject {
    pub(crate) fn upgrade(&self) -> Option<XmlObject> {
        let object = XmlObject {
            doc: self.doc.clone(),
            node: self.node,
            owner: None,
            options: Rc::clone(&self.options),
            cache: self.cache.upgrade()?,
        };
        object.is_alive().then_some(object)
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakObject")
            .field("node", &self.node)
            .field("collected", &(self.cache.strong_count() == 0))
            .finish()
    }
}

impl XmlObject {
    /// Object bound to a fresh `<root />` element
    pub fn new() -> EngineResult<Self> {
        Self::with_options(ProjectionOptions::default())
    }

    /// Object bound to a fresh empty element named `root_name`
    pub fn with_root(root_name: &str) -> EngineResult<Self> {
        Self::create(root_name, ProjectionOptions::default())
    }

    /// Object bound to a fresh element named after `options.default_root_name`
    pub fn with_options(options: ProjectionOptions) -> EngineResult<Self> {
        let root_name = options.default_root_name.clone();
        Self::create(&root_name, options)
    }

    fn create(root_name: &str, options: ProjectionOptions) -> EngineResult<Self> {
        options.validate()?;
        if !is_valid_name(root_name) {
            return Err(EngineError::invalid_argument(format!(
                "{:?} is not a valid root element name",
                root_name
            )));
        }
        let doc = Document::new(root_name)?;
        Ok(Self::owning(doc, Rc::new(options)))
    }

    /// Parse markup text and bind to its root element
    pub fn parse(source: &str) -> EngineResult<Self> {
        Self::parse_with(source, ProjectionOptions::default())
    }

    pub fn parse_with(source: &str, options: ProjectionOptions) -> EngineResult<Self> {
        options.validate()?;
        let doc = Document::parse(source)?;
        Ok(Self::owning(doc, Rc::new(options)))
    }

    /// Bind to the root of an existing document without owning it
    pub fn from_document(doc: &Document) -> Self {
        Self::bound(doc, doc.root(), Rc::new(ProjectionOptions::default()))
    }

    /// Bind to `node` of an existing document without owning it
    pub fn from_node(doc: &Document, node: NodeId) -> EngineResult<Self> {
        Self::from_node_with(doc, node, ProjectionOptions::default())
    }

    pub fn from_node_with(
        doc: &Document,
        node: NodeId,
        options: ProjectionOptions,
    ) -> EngineResult<Self> {
        options.validate()?;
        if !doc.contains(node) {
            return Err(EngineError::invalid_argument(format!(
                "element {} does not exist in the document",
                node
            )));
        }
        Ok(Self::bound(doc, node, Rc::new(options)))
    }

    fn owning(doc: Document, options: Rc<ProjectionOptions>) -> Self {
        let mut object = Self::bound(&doc, doc.root(), options);
        object.owner = Some(doc);
        object
    }

    pub(crate) fn bound(doc: &Document, node: NodeId, options: Rc<ProjectionOptions>) -> Self {
        Self {
            doc: doc.downgrade(),
            node,
            owner: None,
            options,
            cache: Rc::new(RefCell::new(MemberCache::new())),
        }
    }

    pub(crate) fn downgrade(&self) -> WeakObject {
        WeakObject {
            doc: self.doc.clone(),
            node: self.node,
            options: Rc::clone(&self.options),
            cache: Rc::downgrade(&self.cache),
        }
    }

    /// The document this object is bound to, if it is still alive
    pub fn document(&self) -> EngineResult<Document> {
        self.doc
            .upgrade()
            .ok_or_else(|| EngineError::AnchorReleased("document was dropped".to_string()))
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn options(&self) -> &ProjectionOptions {
        &self.options
    }

    /// Whether the document is alive and still contains the bound element
    pub fn is_alive(&self) -> bool {
        self.doc
            .upgrade()
            .map_or(false, |doc| doc.contains(self.node))
    }

    fn anchor(&self) -> EngineResult<Document> {
        let doc = self.document()?;
        if !doc.contains(self.node) {
            return Err(EngineError::AnchorReleased(format!(
                "element {} was removed",
                self.node
            )));
        }
        Ok(doc)
    }

    /// Element name of the bound element
    pub fn name(&self) -> EngineResult<String> {
        Ok(self.anchor()?.name(self.node)?)
    }

    /// Read a member. Unknown members are [`Value::Null`].
    pub fn get(&self, name: &str) -> EngineResult<Value> {
        let doc = self.anchor()?;
        {
            let mut cache = self.cache.borrow_mut();
            cache.sync(doc.revision());
            if let Some(value) = cache.lookup(name) {
                return Ok(value);
            }
        }

        debug!(member = %name, node = %self.node, "Member cache miss");
        let value = Projector::new(&doc, &self.options).project_member(self.node, name)?;
        self.cache.borrow_mut().store(name, value.clone());
        Ok(value)
    }

    /// Write a member. Assigning [`Value::Null`] removes it.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> EngineResult<()> {
        let value = value.into();
        let doc = self.anchor()?;
        self.cache.borrow_mut().sync(doc.revision());

        let outcome =
            MutationEngine::new(&doc, &self.options).set_member(self.node, name, &value)?;

        let mut cache = self.cache.borrow_mut();
        cache.acknowledge(doc.revision());
        match outcome {
            MutationOutcome::Removed => cache.evict(name),
            MutationOutcome::Scalar(primitive) => cache.store(name, Value::Primitive(primitive)),
            MutationOutcome::Restructured { other_members: true } => cache.clear(),
            MutationOutcome::Restructured {
                other_members: false,
            } => cache.evict(name),
        }
        Ok(())
    }

    /// Write a scalar into the `index`-th element named `name`, leaving its siblings
    /// in place. Appends a new element when `index` is past the last one.
    pub fn set_at(&self, name: &str, index: usize, value: impl Into<Primitive>) -> EngineResult<()> {
        let value = value.into();
        let doc = self.anchor()?;
        self.cache.borrow_mut().sync(doc.revision());

        MutationEngine::new(&doc, &self.options).set_scalar(self.node, name, &value, index)?;

        let mut cache = self.cache.borrow_mut();
        cache.acknowledge(doc.revision());
        cache.evict(name);
        Ok(())
    }

    /// Remove every element named `name`. Returns whether anything was removed.
    pub fn remove(&self, name: &str) -> EngineResult<bool> {
        let doc = self.anchor()?;
        self.cache.borrow_mut().sync(doc.revision());

        let removed = MutationEngine::new(&doc, &self.options).remove_member(self.node, name)?;

        let mut cache = self.cache.borrow_mut();
        cache.acknowledge(doc.revision());
        cache.evict(name);
        Ok(removed > 0)
    }

    /// Attribute bag of the bound element itself
    pub fn fields(&self) -> EngineResult<FieldBag> {
        let doc = self.anchor()?;
        Projector::new(&doc, &self.options).fields(self.node)
    }

    /// Distinct child element names, in order of first appearance
    pub fn member_names(&self) -> EngineResult<Vec<String>> {
        let doc = self.anchor()?;
        let mut names: Vec<String> = Vec::new();
        for child in doc.children(self.node)? {
            let name = doc.name(child)?;
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Ok(names)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.borrow().stats()
    }

    /// Compact markup of the bound element and its subtree
    pub fn to_xml(&self) -> EngineResult<String> {
        Ok(self.anchor()?.node_to_string(self.node)?)
    }
}

impl PartialEq for XmlObject {
    fn eq(&self, other: &Self) -> bool {
        self.doc.ptr_eq(&other.doc) && self.node == other.node
    }
}

impl fmt::Debug for XmlObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlObject")
            .field("node", &self.node)
            .field("alive", &self.is_alive())
            .field("owns_document", &self.owner.is_some())
            .finish()
    }
}
