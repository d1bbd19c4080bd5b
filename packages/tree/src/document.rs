//! # Element Document
//!
//! Owns every element of one markup tree in a generational arena.
//!
//! A [`Document`] is a cheap, clonable strong handle. Anything that should not keep
//! the tree alive holds a [`WeakDocument`] plus a [`NodeId`] and re-resolves both
//! on every access:
//!
//! ```text
//! Document ──Rc──▶ Arena { slots, free, root, revision }
//! WeakDocument ──Weak──┘         ▲
//! NodeId { index, generation } ──┘ (checked against the slot generation)
//! ```
//!
//! Every mutation bumps [`Document::revision`], which lets observers detect edits
//! they did not make themselves.

use crate::error::{TreeError, TreeResult};
use crate::node::{is_valid_name, Attribute, ElementData, NodeId};
use crate::serializer::Serializer;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Debug)]
struct Slot {
    generation: u32,
    data: Option<ElementData>,
}

#[derive(Debug)]
pub(crate) struct Arena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    revision: u64,
}

impl Arena {
    fn with_root(root: ElementData) -> Self {
        let mut arena = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId::new(0, 0),
            revision: 0,
        };
        arena.root = arena.alloc(root);
        arena
    }

    fn alloc(&mut self, data: ElementData) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.data = Some(data);
            NodeId::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                data: Some(data),
            });
            NodeId::new(index, 0)
        }
    }

    pub(crate) fn get(&self, id: NodeId) -> TreeResult<&ElementData> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_ref())
            .ok_or(TreeError::StaleNode(id))
    }

    fn get_mut(&mut self, id: NodeId) -> TreeResult<&mut ElementData> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_mut())
            .ok_or(TreeError::StaleNode(id))
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> TreeResult<bool> {
        let mut current = self.get(node)?.parent;
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.get(id)?.parent;
        }
        Ok(false)
    }

    fn detach(&mut self, id: NodeId) -> TreeResult<()> {
        if id == self.root {
            return Err(TreeError::RootRemoval);
        }
        let parent = self.get_mut(id)?.parent.take();
        if let Some(parent) = parent {
            self.get_mut(parent)?.children.retain(|child| *child != id);
        }
        Ok(())
    }

    /// Release a detached subtree, invalidating every handle into it
    fn free_subtree(&mut self, id: NodeId) -> TreeResult<()> {
        self.get(id)?;
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let slot = &mut self.slots[current.index as usize];
            if let Some(data) = slot.data.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                pending.extend(data.children);
            }
        }
        Ok(())
    }

    fn snapshot(&self, id: NodeId) -> TreeResult<ElementSnapshot> {
        let data = self.get(id)?;
        let children = data
            .children
            .iter()
            .map(|child| self.snapshot(*child))
            .collect::<TreeResult<Vec<_>>>()?;
        Ok(ElementSnapshot {
            name: data.name.clone(),
            attributes: data.attributes.clone(),
            text: data.text.clone(),
            children,
        })
    }

    fn instantiate(&mut self, snapshot: ElementSnapshot, parent: Option<NodeId>) -> NodeId {
        let ElementSnapshot {
            name,
            attributes,
            text,
            children,
        } = snapshot;
        let id = self.alloc(ElementData {
            name,
            attributes,
            children: Vec::new(),
            text,
            parent,
        });
        let child_ids: Vec<NodeId> = children
            .into_iter()
            .map(|child| self.instantiate(child, Some(id)))
            .collect();
        if let Some(data) = self.slots[id.index as usize].data.as_mut() {
            data.children = child_ids;
        }
        id
    }
}

/// Owned copy of an element subtree, used while parsing and importing
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ElementSnapshot {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub text: Option<String>,
    pub children: Vec<ElementSnapshot>,
}

/// Strong handle to a markup tree
#[derive(Clone)]
pub struct Document {
    inner: Rc<RefCell<Arena>>,
}

/// Non-owning handle to a markup tree
#[derive(Clone, Debug)]
pub struct WeakDocument {
    inner: Weak<RefCell<Arena>>,
}

impl WeakDocument {
    pub fn upgrade(&self) -> Option<Document> {
        self.inner.upgrade().map(|inner| Document { inner })
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn ptr_eq(&self, other: &WeakDocument) -> bool {
        self.inner.ptr_eq(&other.inner)
    }
}

impl Document {
    /// Create a document holding a single empty root element
    pub fn new(root_name: &str) -> TreeResult<Self> {
        if !is_valid_name(root_name) {
            return Err(TreeError::InvalidName(root_name.to_string()));
        }
        Ok(Self::from_arena(Arena::with_root(ElementData::new(root_name))))
    }

    /// Parse markup text into a document
    pub fn parse(source: &str) -> TreeResult<Self> {
        crate::parser::parse(source)
    }

    pub(crate) fn from_snapshot(root: ElementSnapshot) -> Self {
        let mut arena = Arena::with_root(ElementData::new(root.name.as_str()));
        let root_id = arena.root;
        let children: Vec<NodeId> = root
            .children
            .into_iter()
            .map(|child| arena.instantiate(child, Some(root_id)))
            .collect();
        if let Ok(data) = arena.get_mut(root_id) {
            data.attributes = root.attributes;
            data.text = root.text;
            data.children = children;
        }
        Self::from_arena(arena)
    }

    fn from_arena(arena: Arena) -> Self {
        Self {
            inner: Rc::new(RefCell::new(arena)),
        }
    }

    pub(crate) fn arena(&self) -> std::cell::Ref<'_, Arena> {
        self.inner.borrow()
    }

    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn root(&self) -> NodeId {
        self.inner.borrow().root
    }

    /// Monotonic counter bumped by every mutation
    pub fn revision(&self) -> u64 {
        self.inner.borrow().revision
    }

    /// Whether `id` still refers to a live element
    pub fn contains(&self, id: NodeId) -> bool {
        self.inner.borrow().get(id).is_ok()
    }

    pub fn name(&self, id: NodeId) -> TreeResult<String> {
        Ok(self.inner.borrow().get(id)?.name.clone())
    }

    pub fn rename(&self, id: NodeId, name: &str) -> TreeResult<()> {
        if !is_valid_name(name) {
            return Err(TreeError::InvalidName(name.to_string()));
        }
        let mut arena = self.inner.borrow_mut();
        arena.get_mut(id)?.name = name.to_string();
        arena.touch();
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(self.inner.borrow().get(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> TreeResult<Vec<NodeId>> {
        Ok(self.inner.borrow().get(id)?.children.clone())
    }

    /// Child elements named `name`, in document order
    pub fn children_named(&self, id: NodeId, name: &str) -> TreeResult<Vec<NodeId>> {
        let arena = self.inner.borrow();
        let data = arena.get(id)?;
        let mut named = Vec::new();
        for child in &data.children {
            if arena.get(*child)?.name == name {
                named.push(*child);
            }
        }
        Ok(named)
    }

    pub fn has_children(&self, id: NodeId) -> TreeResult<bool> {
        Ok(!self.inner.borrow().get(id)?.children.is_empty())
    }

    pub fn attributes(&self, id: NodeId) -> TreeResult<Vec<Attribute>> {
        Ok(self.inner.borrow().get(id)?.attributes.clone())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> TreeResult<Option<String>> {
        Ok(self
            .inner
            .borrow()
            .get(id)?
            .attribute(name)
            .map(|a| a.value.clone()))
    }

    /// Set an attribute, keeping its position when it already exists
    pub fn set_attribute(&self, id: NodeId, name: &str, value: &str) -> TreeResult<()> {
        if !is_valid_name(name) {
            return Err(TreeError::InvalidName(name.to_string()));
        }
        let mut arena = self.inner.borrow_mut();
        let data = arena.get_mut(id)?;
        match data.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value.to_string(),
            None => data.attributes.push(Attribute::new(name, value)),
        }
        arena.touch();
        Ok(())
    }

    pub fn remove_attribute(&self, id: NodeId, name: &str) -> TreeResult<Option<String>> {
        let mut arena = self.inner.borrow_mut();
        let data = arena.get_mut(id)?;
        let removed = data
            .attributes
            .iter()
            .position(|a| a.name == name)
            .map(|pos| data.attributes.remove(pos).value);
        if removed.is_some() {
            arena.touch();
        }
        Ok(removed)
    }

    /// Drop every attribute whose name is not listed in `keep`
    pub fn remove_attributes_except(&self, id: NodeId, keep: &[&str]) -> TreeResult<()> {
        let mut arena = self.inner.borrow_mut();
        let data = arena.get_mut(id)?;
        let before = data.attributes.len();
        data.attributes.retain(|a| keep.contains(&a.name.as_str()));
        if data.attributes.len() != before {
            arena.touch();
        }
        Ok(())
    }

    pub fn text(&self, id: NodeId) -> TreeResult<Option<String>> {
        Ok(self.inner.borrow().get(id)?.text.clone())
    }

    /// Replace the element's content with `text`, releasing any child elements
    pub fn set_text(&self, id: NodeId, text: &str) -> TreeResult<()> {
        self.clear_children(id)?;
        let mut arena = self.inner.borrow_mut();
        arena.get_mut(id)?.text = Some(text.to_string());
        arena.touch();
        Ok(())
    }

    pub fn clear_text(&self, id: NodeId) -> TreeResult<()> {
        let mut arena = self.inner.borrow_mut();
        arena.get_mut(id)?.text = None;
        arena.touch();
        Ok(())
    }

    /// Create an element that is not attached to any parent yet
    pub fn create_element(&self, name: &str) -> TreeResult<NodeId> {
        if !is_valid_name(name) {
            return Err(TreeError::InvalidName(name.to_string()));
        }
        let mut arena = self.inner.borrow_mut();
        let id = arena.alloc(ElementData::new(name));
        arena.touch();
        Ok(id)
    }

    /// Append `child` as the last child of `parent`, detaching it from its current parent
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let index = self.inner.borrow().get(parent)?.children.len();
        self.insert_child(parent, index, child)
    }

    /// Insert `child` at `index` among the children of `parent` (clamped to the end)
    pub fn insert_child(&self, parent: NodeId, index: usize, child: NodeId) -> TreeResult<()> {
        let mut arena = self.inner.borrow_mut();
        arena.get(parent)?;
        arena.get(child)?;
        if child == arena.root {
            return Err(TreeError::RootRemoval);
        }
        if child == parent || arena.is_ancestor(child, parent)? {
            return Err(TreeError::CycleDetected { parent, child });
        }
        arena.detach(child)?;
        arena.get_mut(child)?.parent = Some(parent);
        let data = arena.get_mut(parent)?;
        let index = index.min(data.children.len());
        data.children.insert(index, child);
        data.text = None;
        arena.touch();
        Ok(())
    }

    /// Unlink an element from its parent; the element stays alive and can be re-attached
    pub fn detach(&self, id: NodeId) -> TreeResult<()> {
        let mut arena = self.inner.borrow_mut();
        arena.detach(id)?;
        arena.touch();
        Ok(())
    }

    /// Unlink an element and release its whole subtree
    pub fn remove(&self, id: NodeId) -> TreeResult<()> {
        let mut arena = self.inner.borrow_mut();
        arena.detach(id)?;
        arena.free_subtree(id)?;
        arena.touch();
        Ok(())
    }

    /// Release every child element of `id`
    pub fn clear_children(&self, id: NodeId) -> TreeResult<()> {
        let mut arena = self.inner.borrow_mut();
        let children = std::mem::take(&mut arena.get_mut(id)?.children);
        if children.is_empty() {
            return Ok(());
        }
        for child in children {
            arena.get_mut(child)?.parent = None;
            arena.free_subtree(child)?;
        }
        arena.touch();
        Ok(())
    }

    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> TreeResult<bool> {
        self.inner.borrow().is_ancestor(ancestor, node)
    }

    /// Deep-copy `node` from `source` (which may be this document) as a new detached element
    pub fn import(&self, source: &Document, node: NodeId) -> TreeResult<NodeId> {
        let snapshot = source.inner.borrow().snapshot(node)?;
        let mut arena = self.inner.borrow_mut();
        let id = arena.instantiate(snapshot, None);
        arena.touch();
        Ok(id)
    }

    /// Compact markup for the subtree rooted at `id`
    pub fn node_to_string(&self, id: NodeId) -> TreeResult<String> {
        Serializer::new().serialize_node(self, id)
    }

    /// Compact markup for the whole document
    pub fn to_xml_string(&self) -> String {
        Serializer::new().serialize(self)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml_string())
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arena = self.inner.borrow();
        f.debug_struct("Document")
            .field("root", &arena.root)
            .field("revision", &arena.revision)
            .finish()
    }
}
