//! # Member Mutations
//!
//! Applies an assigned [`Value`] to the children of a parent element so that a later
//! projection of the same member reproduces it.
//!
//! ## Semantics
//!
//! ### Null
//! - Removes every child with the member name, subtrees included
//!
//! ### Primitive
//! - Writes the first same-named child (created when missing) as a pure scalar:
//!   no child elements, no attributes except the type tag, literal text
//! - Remaining same-named siblings are removed
//!
//! ### Object
//! - Same document: the bound element is moved under the parent and renamed to the
//!   member name; nothing moves when it is already a direct child
//! - Other document: a deep copy is attached, the source stays untouched
//!
//! ### List
//! - Written into a single container tagged as a list; implicit lists and
//!   unclassifiable elements are replaced, tagged and homogeneous containers reused
//! - Existing items are reused in order, surplus items are removed
//!
//! Every assignment is validated before the tree is touched.

use crate::classifier::{Classifier, ListShape};
use crate::error::{EngineError, EngineResult};
use crate::options::ProjectionOptions;
use crate::value::{Primitive, Value};
use crate::wrapper::XmlObject;
use std::collections::{HashSet, VecDeque};
use tracing::debug;
use xdynamic_tree::{is_valid_name, Document, NodeId};

/// What an applied mutation did, so the caller can keep its cache consistent
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// Every element with the member name was removed
    Removed,
    /// The member now holds this scalar
    Scalar(Primitive),
    /// The member was rebuilt. `other_members` is set when elements were moved or
    /// renamed, so members other than the assigned one may have changed too.
    Restructured { other_members: bool },
}

impl MutationOutcome {
    pub fn affects_other_members(&self) -> bool {
        matches!(self, MutationOutcome::Restructured { other_members: true })
    }
}

/// An object assigned into a list or member, resolved against its document
struct Claim {
    doc: Document,
    node: NodeId,
}

pub struct MutationEngine<'a> {
    doc: &'a Document,
    options: &'a ProjectionOptions,
}

impl<'a> MutationEngine<'a> {
    pub fn new(doc: &'a Document, options: &'a ProjectionOptions) -> Self {
        Self { doc, options }
    }

    pub fn set_member(
        &self,
        parent: NodeId,
        name: &str,
        value: &Value,
    ) -> EngineResult<MutationOutcome> {
        self.validate(parent, name, value)?;
        debug!(member = %name, kind = value.kind_name(), "Setting member");

        match value {
            Value::Null => {
                self.remove_member(parent, name)?;
                Ok(MutationOutcome::Removed)
            }
            Value::Primitive(primitive) => {
                let target = self.set_scalar(parent, name, primitive, 0)?;
                // Re-reading must yield the scalar, not an implicit list (DESIGN.md decision 3)
                for sibling in self.doc.children_named(parent, name)? {
                    if sibling != target {
                        self.doc.remove(sibling)?;
                    }
                }
                Ok(MutationOutcome::Scalar(primitive.clone()))
            }
            Value::Object(object) => self.attach_object(parent, name, object),
            Value::List(items) => self.set_list(parent, name, items),
            Value::Fields(_) => Err(unsupported_fields()),
        }
    }

    /// Remove every child of `parent` named `name`, returning how many were removed
    pub fn remove_member(&self, parent: NodeId, name: &str) -> EngineResult<usize> {
        let elements = self.doc.children_named(parent, name)?;
        for element in &elements {
            self.doc.remove(*element)?;
        }
        Ok(elements.len())
    }

    /// Write `value` into the `index`-th child named `name`, appending a new child
    /// when there are not enough of them
    pub fn set_scalar(
        &self,
        parent: NodeId,
        name: &str,
        value: &Primitive,
        index: usize,
    ) -> EngineResult<NodeId> {
        if !is_valid_name(name) {
            return Err(EngineError::invalid_argument(format!(
                "{:?} is not a valid member name",
                name
            )));
        }

        let target = match self.doc.children_named(parent, name)?.get(index) {
            Some(existing) => *existing,
            None => {
                let created = self.doc.create_element(name)?;
                self.doc.append_child(parent, created)?;
                created
            }
        };

        self.write_scalar(target, value)?;
        Ok(target)
    }

    /// Collapse `node` into a pure scalar holding `value`
    fn write_scalar(&self, node: NodeId, value: &Primitive) -> EngineResult<()> {
        let type_attribute = self.options.type_attribute.as_str();
        self.doc.clear_children(node)?;
        self.doc.remove_attributes_except(node, &[type_attribute])?;
        self.doc
            .set_attribute(node, type_attribute, value.kind().canonical_name())?;
        self.doc.set_text(node, &value.to_literal())?;
        Ok(())
    }

    fn attach_object(
        &self,
        parent: NodeId,
        name: &str,
        object: &XmlObject,
    ) -> EngineResult<MutationOutcome> {
        let claim = self.claim(object)?;

        if !claim.doc.ptr_eq(self.doc) {
            let copy = self.doc.import(&claim.doc, claim.node)?;
            self.remove_member(parent, name)?;
            self.doc.append_child(parent, copy)?;
            self.doc.rename(copy, name)?;
            return Ok(MutationOutcome::Restructured {
                other_members: false,
            });
        }

        let in_place = self.doc.parent(claim.node)? == Some(parent);
        // Already a child under this name, possibly one item of an implicit list
        if in_place && self.doc.name(claim.node)? == name {
            return Ok(MutationOutcome::Restructured {
                other_members: false,
            });
        }
        if !in_place {
            self.doc.detach(claim.node)?;
        }
        for sibling in self.doc.children_named(parent, name)? {
            if sibling != claim.node {
                self.doc.remove(sibling)?;
            }
        }
        if !in_place {
            self.doc.append_child(parent, claim.node)?;
        }
        if self.doc.name(claim.node)? != name {
            self.doc.rename(claim.node, name)?;
        }

        // Moving or renaming the element changes the member it was read under
        Ok(MutationOutcome::Restructured {
            other_members: true,
        })
    }

    fn set_list(&self, parent: NodeId, name: &str, items: &[Value]) -> EngineResult<MutationOutcome> {
        let mut claims = Vec::new();
        collect_objects(items, &mut claims);
        let local: Vec<NodeId> = claims
            .iter()
            .map(|object| self.claim(object))
            .collect::<EngineResult<Vec<_>>>()?
            .into_iter()
            .filter(|claim| claim.doc.ptr_eq(self.doc))
            .map(|claim| claim.node)
            .collect();

        let container = self.existing_container(parent, name)?;
        if let Some(container) = container {
            if local.contains(&container) {
                return Err(EngineError::invalid_argument(format!(
                    "list {:?} cannot contain its own container",
                    name
                )));
            }
        }

        for node in &local {
            if self.doc.parent(*node)?.is_some() {
                self.doc.detach(*node)?;
            }
        }

        let container = match container {
            Some(container) => container,
            None => {
                self.remove_member(parent, name)?;
                let created = self.doc.create_element(name)?;
                self.doc.append_child(parent, created)?;
                created
            }
        };

        self.tag_container(container)?;
        self.write_items(container, items)?;

        Ok(MutationOutcome::Restructured {
            other_members: !local.is_empty(),
        })
    }

    /// The single tagged or homogeneous element that can be reused as the container
    fn existing_container(&self, parent: NodeId, name: &str) -> EngineResult<Option<NodeId>> {
        let elements = self.doc.children_named(parent, name)?;
        if elements.is_empty() {
            return Ok(None);
        }

        let classifier = Classifier::new(self.doc, &self.options.type_attribute);
        match classifier.classify_list(&elements)? {
            Some(ListShape::Tagged) | Some(ListShape::Homogeneous) => match elements.as_slice() {
                [container] => Ok(Some(*container)),
                _ => Err(EngineError::internal(format!(
                    "list container {:?} resolved to {} elements",
                    name,
                    elements.len()
                ))),
            },
            Some(ListShape::Implicit) | None => Ok(None),
        }
    }

    fn tag_container(&self, container: NodeId) -> EngineResult<()> {
        self.doc.set_attribute(
            container,
            &self.options.type_attribute,
            &self.options.list_tag,
        )?;
        if !self.doc.has_children(container)? {
            self.doc.clear_text(container)?;
        }
        Ok(())
    }

    /// Replace the children of `container` with `items`, reusing existing children
    fn write_items(&self, container: NodeId, items: &[Value]) -> EngineResult<()> {
        let mut pool: VecDeque<NodeId> = self.doc.children(container)?.into();
        let item_name = match pool.front() {
            Some(first) => self.doc.name(*first)?,
            None => self.options.list_item_name.clone(),
        };

        let mut ordered = Vec::with_capacity(items.len());
        for item in items {
            let node = match item {
                Value::Primitive(primitive) => {
                    let node = self.reuse_or_create(&mut pool, &item_name)?;
                    self.write_scalar(node, primitive)?;
                    node
                }
                Value::List(nested) => {
                    let node = self.reuse_or_create(&mut pool, &item_name)?;
                    self.doc
                        .remove_attributes_except(node, &[self.options.type_attribute.as_str()])?;
                    self.tag_container(node)?;
                    self.write_items(node, nested)?;
                    node
                }
                Value::Object(object) => {
                    let claim = self.claim(object)?;
                    if claim.doc.ptr_eq(self.doc) {
                        claim.node
                    } else {
                        self.doc.import(&claim.doc, claim.node)?
                    }
                }
                Value::Null | Value::Fields(_) => {
                    return Err(EngineError::internal(format!(
                        "unvalidated {} list item",
                        item.kind_name()
                    )))
                }
            };
            ordered.push(node);
        }

        for leftover in pool {
            self.doc.remove(leftover)?;
        }
        for node in ordered {
            self.doc.append_child(container, node)?;
        }
        if items.is_empty() {
            self.doc.clear_text(container)?;
        }
        Ok(())
    }

    fn reuse_or_create(&self, pool: &mut VecDeque<NodeId>, name: &str) -> EngineResult<NodeId> {
        match pool.pop_front() {
            Some(node) => {
                if self.doc.name(node)? != name {
                    self.doc.rename(node, name)?;
                }
                Ok(node)
            }
            None => Ok(self.doc.create_element(name)?),
        }
    }

    fn claim(&self, object: &XmlObject) -> EngineResult<Claim> {
        let doc = object.document()?;
        let node = object.node();
        if !doc.contains(node) {
            return Err(EngineError::AnchorReleased(format!(
                "element {} was removed",
                node
            )));
        }
        Ok(Claim { doc, node })
    }

    /// Reject assignments that cannot be written, before anything is modified
    pub fn validate(&self, parent: NodeId, name: &str, value: &Value) -> EngineResult<()> {
        if !is_valid_name(name) {
            return Err(EngineError::invalid_argument(format!(
                "{:?} is not a valid member name",
                name
            )));
        }
        if !self.doc.contains(parent) {
            return Err(EngineError::AnchorReleased(format!(
                "element {} was removed",
                parent
            )));
        }

        match value {
            Value::Null | Value::Primitive(_) => Ok(()),
            Value::Fields(_) => Err(unsupported_fields()),
            Value::Object(object) => self.validate_object(parent, object),
            Value::List(items) => {
                self.validate_items(items)?;
                let mut objects = Vec::new();
                collect_objects(items, &mut objects);
                let mut seen = HashSet::new();
                for object in objects {
                    self.validate_object(parent, object)?;
                    let claim = self.claim(object)?;
                    if claim.doc.ptr_eq(self.doc) && !seen.insert(claim.node) {
                        return Err(EngineError::invalid_argument(format!(
                            "element {} appears more than once in list {:?}",
                            claim.node, name
                        )));
                    }
                }
                Ok(())
            }
        }
    }

    fn validate_items(&self, items: &[Value]) -> EngineResult<()> {
        for item in items {
            match item {
                Value::Null => {
                    return Err(EngineError::invalid_argument(
                        "null cannot be stored as a list item",
                    ))
                }
                Value::Fields(_) => return Err(unsupported_fields()),
                Value::List(nested) => self.validate_items(nested)?,
                Value::Primitive(_) | Value::Object(_) => {}
            }
        }
        Ok(())
    }

    fn validate_object(&self, parent: NodeId, object: &XmlObject) -> EngineResult<()> {
        let claim = self.claim(object)?;
        if !claim.doc.ptr_eq(self.doc) {
            return Ok(());
        }
        if claim.node == parent || self.doc.is_ancestor(claim.node, parent)? {
            return Err(EngineError::invalid_argument(format!(
                "element {} cannot be attached below itself",
                claim.node
            )));
        }
        Ok(())
    }
}

fn collect_objects<'v>(items: &'v [Value], out: &mut Vec<&'v XmlObject>) {
    for item in items {
        match item {
            Value::Object(object) => out.push(object),
            Value::List(nested) => collect_objects(nested, out),
            Value::Null | Value::Primitive(_) | Value::Fields(_) => {}
        }
    }
}

fn unsupported_fields() -> EngineError {
    EngineError::invalid_argument("attribute bags cannot be assigned to a member")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_apply(source: &str, name: &str, value: Value) -> EngineResult<String> {
        let doc = Document::parse(source).unwrap();
        let options = ProjectionOptions::default();
        MutationEngine::new(&doc, &options).set_member(doc.root(), name, &value)?;
        Ok(doc.to_xml_string())
    }

    #[test]
    fn test_scalar_write_collapses_target() {
        let xml = engine_apply(
            r#"<root a="d"><Id type="1" _atr="3" _dataType="System.Int32">123</Id></root>"#,
            "Id",
            Value::from(456i64),
        )
        .unwrap();
        assert_eq!(xml, r#"<root a="d"><Id _dataType="System.Int64">456</Id></root>"#);
    }

    #[test]
    fn test_scalar_write_drops_extra_siblings() {
        let xml = engine_apply("<r><a>1</a><a>2</a><b /></r>", "a", Value::from(true)).unwrap();
        assert_eq!(xml, r#"<r><a _dataType="System.Boolean">True</a><b /></r>"#);
    }

    #[test]
    fn test_null_removes_all() {
        let xml = engine_apply("<r><a>1</a><b /><a><c /></a></r>", "a", Value::Null).unwrap();
        assert_eq!(xml, "<r><b /></r>");
    }

    #[test]
    fn test_set_scalar_at_index() {
        let doc = Document::parse("<r><a>1</a><a>2</a></r>").unwrap();
        let options = ProjectionOptions::default();
        let engine = MutationEngine::new(&doc, &options);
        engine
            .set_scalar(doc.root(), "a", &Primitive::I32(5), 1)
            .unwrap();
        engine
            .set_scalar(doc.root(), "a", &Primitive::I32(9), 7)
            .unwrap();
        assert_eq!(
            doc.to_xml_string(),
            r#"<r><a>1</a><a _dataType="System.Int32">5</a><a _dataType="System.Int32">9</a></r>"#
        );
    }

    #[test]
    fn test_list_creates_tagged_container() {
        let xml = engine_apply("<r />", "Ids", Value::from(vec![1i32, 2])).unwrap();
        assert_eq!(
            xml,
            r#"<r><Ids _dataType="list"><Item _dataType="System.Int32">1</Item><Item _dataType="System.Int32">2</Item></Ids></r>"#
        );
    }

    #[test]
    fn test_list_replaces_implicit_siblings() {
        let xml = engine_apply("<r><a>1</a><b /><a>2</a></r>", "a", Value::from(vec!["x"])).unwrap();
        assert_eq!(
            xml,
            r#"<r><b /><a _dataType="list"><Item _dataType="System.String">x</Item></a></r>"#
        );
    }

    #[test]
    fn test_list_reuses_homogeneous_container() {
        let xml = engine_apply(
            "<r><L><v>1</v><v>2</v><v>3</v></L></r>",
            "L",
            Value::from(vec![7u8, 8]),
        )
        .unwrap();
        assert_eq!(
            xml,
            r#"<r><L _dataType="list"><v _dataType="System.Byte">7</v><v _dataType="System.Byte">8</v></L></r>"#
        );
    }

    #[test]
    fn test_empty_list_keeps_tag() {
        let xml = engine_apply(r#"<r><L _dataType="array"><v>1</v></L></r>"#, "L", Value::List(vec![]))
            .unwrap();
        assert_eq!(xml, r#"<r><L _dataType="list" /></r>"#);
    }

    #[test]
    fn test_nested_list() {
        let value = Value::List(vec![Value::from(vec![1i32]), Value::from("s")]);
        let xml = engine_apply("<r />", "L", value).unwrap();
        assert_eq!(
            xml,
            r#"<r><L _dataType="list"><Item _dataType="list"><Item _dataType="System.Int32">1</Item></Item><Item _dataType="System.String">s</Item></L></r>"#
        );
    }

    #[test]
    fn test_unsupported_values_leave_tree_untouched() {
        let source = "<r><a>1</a></r>";
        let err = engine_apply(source, "a", Value::Fields(Default::default())).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));

        let err = engine_apply(source, "a", Value::List(vec![Value::from(1i32), Value::Null]))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn test_invalid_member_name() {
        let err = engine_apply("<r />", "not valid", Value::from(1i32)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }
}
