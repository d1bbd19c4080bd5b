//! # Node Classifier
//!
//! Decides which shape an element (or a run of same-named siblings) has. Pure: it
//! only reads the tree.
//!
//! ## List shapes
//!
//! ```text
//! Implicit      <Address/><Address/>            siblings are the items
//! Tagged        <L _dataType="list">...</L>     children of the container are the items
//! Homogeneous   <L><A/><A/></L>                 same as Tagged, detected by child names
//! ```
//!
//! Sibling count wins over everything else: two same-named siblings are always an
//! implicit list, even if one of them looks like a tagged container.

use crate::error::{EngineError, EngineResult};
use crate::type_tag::is_list_keyword;
use std::collections::HashSet;
use xdynamic_tree::{Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape {
    Implicit,
    Tagged,
    Homogeneous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleShape {
    /// Literal text (possibly empty)
    Text,
    /// Text restored through the type tag
    TypedPrimitive,
    /// Attributes only
    AttributeBag,
    /// Has child elements
    NestedObject,
}

pub struct Classifier<'a> {
    doc: &'a Document,
    type_attribute: &'a str,
}

impl<'a> Classifier<'a> {
    pub fn new(doc: &'a Document, type_attribute: &'a str) -> Self {
        Self { doc, type_attribute }
    }

    /// Classify a non-empty run of same-named siblings as a list, if it is one
    pub fn classify_list(&self, elements: &[NodeId]) -> EngineResult<Option<ListShape>> {
        let element = match elements {
            [] => return Err(EngineError::internal("classify_list called without elements")),
            [single] => *single,
            _ => return Ok(Some(ListShape::Implicit)),
        };

        if let Some(tag) = self.doc.attribute(element, self.type_attribute)? {
            return Ok(is_list_keyword(&tag).then_some(ListShape::Tagged));
        }

        let children = self.doc.children(element)?;
        if children.len() < 2 {
            return Ok(None);
        }

        let mut names = HashSet::new();
        for child in &children {
            names.insert(self.doc.name(*child)?);
            if names.len() > 1 {
                return Ok(None);
            }
        }
        Ok(Some(ListShape::Homogeneous))
    }

    pub fn classify_single(&self, element: NodeId) -> EngineResult<SingleShape> {
        if self.doc.has_children(element)? {
            return Ok(SingleShape::NestedObject);
        }

        let has_text = self
            .doc
            .text(element)?
            .map_or(false, |text| !text.is_empty());
        let attributes = self.doc.attributes(element)?;
        let tagged = attributes.iter().any(|a| a.name == self.type_attribute);

        if has_text {
            return Ok(if tagged {
                SingleShape::TypedPrimitive
            } else {
                SingleShape::Text
            });
        }

        if attributes.iter().any(|a| a.name != self.type_attribute) {
            return Ok(SingleShape::AttributeBag);
        }

        Ok(SingleShape::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_tag::DATA_TYPE_ATTRIBUTE;

    fn first(doc: &Document, name: &str) -> Vec<NodeId> {
        doc.children_named(doc.root(), name).unwrap()
    }

    fn list_shape(source: &str, name: &str) -> Option<ListShape> {
        let doc = Document::parse(source).unwrap();
        let classifier = Classifier::new(&doc, DATA_TYPE_ATTRIBUTE);
        classifier.classify_list(&first(&doc, name)).unwrap()
    }

    fn single_shape(source: &str, name: &str) -> SingleShape {
        let doc = Document::parse(source).unwrap();
        let classifier = Classifier::new(&doc, DATA_TYPE_ATTRIBUTE);
        classifier.classify_single(first(&doc, name)[0]).unwrap()
    }

    #[test]
    fn test_repeated_siblings_are_implicit() {
        assert_eq!(
            list_shape("<r><a>1</a><a>2</a></r>", "a"),
            Some(ListShape::Implicit)
        );
    }

    #[test]
    fn test_sibling_count_beats_tag() {
        let source = r#"<r><a _dataType="list"><i/><i/></a><a>2</a></r>"#;
        assert_eq!(list_shape(source, "a"), Some(ListShape::Implicit));
    }

    #[test]
    fn test_tag_keywords_case_insensitive() {
        assert_eq!(
            list_shape(r#"<r><a _dataType="LIST"><x/></a></r>"#, "a"),
            Some(ListShape::Tagged)
        );
        assert_eq!(
            list_shape(r#"<r><a _dataType="array" /></r>"#, "a"),
            Some(ListShape::Tagged)
        );
    }

    #[test]
    fn test_other_tag_is_not_a_list() {
        let source = r#"<r><a _dataType="System.Int32"><x/><x/></a></r>"#;
        assert_eq!(list_shape(source, "a"), None);
    }

    #[test]
    fn test_homogeneous_children() {
        assert_eq!(
            list_shape("<r><l><i>1</i><i>2</i></l></r>", "l"),
            Some(ListShape::Homogeneous)
        );
        assert_eq!(list_shape("<r><l><i>1</i></l></r>", "l"), None);
        assert_eq!(list_shape("<r><l><i>1</i><j>2</j></l></r>", "l"), None);
    }

    #[test]
    fn test_empty_input_is_internal_error() {
        let doc = Document::new("r").unwrap();
        let classifier = Classifier::new(&doc, DATA_TYPE_ATTRIBUTE);
        assert!(matches!(
            classifier.classify_list(&[]),
            Err(EngineError::Internal(_))
        ));
    }

    #[test]
    fn test_single_shapes() {
        assert_eq!(single_shape("<r><a><b/></a></r>", "a"), SingleShape::NestedObject);
        assert_eq!(single_shape("<r><a>text</a></r>", "a"), SingleShape::Text);
        assert_eq!(
            single_shape(r#"<r><a _dataType="System.Int32">1</a></r>"#, "a"),
            SingleShape::TypedPrimitive
        );
        assert_eq!(
            single_shape(r#"<r><a id="1" name="x" /></r>"#, "a"),
            SingleShape::AttributeBag
        );
        assert_eq!(
            single_shape(r#"<r><a _dataType="System.String"></a></r>"#, "a"),
            SingleShape::Text
        );
        assert_eq!(single_shape("<r><a /></r>", "a"), SingleShape::Text);
    }

    #[test]
    fn test_text_wins_over_attributes() {
        assert_eq!(
            single_shape(r#"<r><a id="1">text</a></r>"#, "a"),
            SingleShape::Text
        );
    }
}
