//! # Value Projector
//!
//! Turns classified elements into [`Value`]s. Nested objects are bound to the
//! element they were projected from without owning the document.

use crate::classifier::{Classifier, ListShape, SingleShape};
use crate::error::{EngineError, EngineResult};
use crate::options::ProjectionOptions;
use crate::type_tag::PrimitiveKind;
use crate::value::{FieldBag, Primitive, Value};
use crate::wrapper::XmlObject;
use std::rc::Rc;
use tracing::{debug, warn};
use xdynamic_tree::{local_name, Document, NodeId};

pub struct Projector<'a> {
    doc: &'a Document,
    options: &'a Rc<ProjectionOptions>,
}

impl<'a> Projector<'a> {
    pub fn new(doc: &'a Document, options: &'a Rc<ProjectionOptions>) -> Self {
        Self { doc, options }
    }

    fn classifier(&self) -> Classifier<'_> {
        Classifier::new(self.doc, &self.options.type_attribute)
    }

    /// Resolve `name` against the children of `parent`, falling back to an attribute
    /// of `parent` when no child element has that name
    pub fn project_member(&self, parent: NodeId, name: &str) -> EngineResult<Value> {
        let elements = self.doc.children_named(parent, name)?;

        if elements.is_empty() {
            return self.project_attribute(parent, name);
        }

        let value = match self.classifier().classify_list(&elements)? {
            Some(shape) => self.project_list(&elements, shape)?,
            None => self.project_single(elements[0])?,
        };

        debug!(member = %name, kind = value.kind_name(), "Projected member");
        Ok(value)
    }

    fn project_attribute(&self, parent: NodeId, name: &str) -> EngineResult<Value> {
        if !self.options.attribute_fallback || name == self.options.type_attribute {
            return Ok(Value::Null);
        }

        Ok(self
            .doc
            .attribute(parent, name)?
            .map(|text| Value::Primitive(Primitive::String(text)))
            .unwrap_or(Value::Null))
    }

    pub fn project_single(&self, element: NodeId) -> EngineResult<Value> {
        let value = match self.classifier().classify_single(element)? {
            SingleShape::Text => {
                let text = self.doc.text(element)?.unwrap_or_default();
                Value::Primitive(Primitive::String(text))
            }
            SingleShape::TypedPrimitive => self.project_typed(element)?,
            SingleShape::AttributeBag => Value::Fields(self.fields(element)?),
            SingleShape::NestedObject => Value::Object(XmlObject::bound(
                self.doc,
                element,
                Rc::clone(self.options),
            )),
        };
        Ok(value)
    }

    fn project_typed(&self, element: NodeId) -> EngineResult<Value> {
        let text = self.doc.text(element)?.unwrap_or_default();
        let tag = self
            .doc
            .attribute(element, &self.options.type_attribute)?
            .unwrap_or_default();

        match PrimitiveKind::resolve(&tag).and_then(|kind| kind.parse_literal(&text)) {
            Some(primitive) => Ok(Value::Primitive(primitive)),
            None => {
                warn!(tag = %tag, text = %text, "Unresolvable type tag, returning raw text");
                Ok(Value::Primitive(Primitive::String(text)))
            }
        }
    }

    pub fn project_list(&self, elements: &[NodeId], shape: ListShape) -> EngineResult<Value> {
        let items = match shape {
            ListShape::Implicit => elements.to_vec(),
            ListShape::Tagged | ListShape::Homogeneous => match elements {
                [container] => self.doc.children(*container)?,
                _ => {
                    return Err(EngineError::internal(format!(
                        "{:?} list resolved to {} containers",
                        shape,
                        elements.len()
                    )))
                }
            },
        };

        items
            .into_iter()
            .map(|item| self.project_single(item))
            .collect::<EngineResult<Vec<_>>>()
            .map(Value::List)
    }

    /// Attribute bag of `element`: every attribute except the type tag, keyed by
    /// its local name with the configured prefix
    pub fn fields(&self, element: NodeId) -> EngineResult<FieldBag> {
        let mut bag = FieldBag::new();
        for attribute in self.doc.attributes(element)? {
            if attribute.name == self.options.type_attribute {
                continue;
            }
            bag.insert(
                format!("{}{}", self.options.field_prefix, local_name(&attribute.name)),
                attribute.value,
            );
        }
        Ok(bag)
    }
}
