//! Markup text → [`Document`], built on `quick-xml`.
//!
//! Only the element structure is kept: declarations, comments, processing
//! instructions and doctypes are skipped, and whitespace-only text between child
//! elements is dropped.

use crate::document::{Document, ElementSnapshot};
use crate::error::{TreeError, TreeResult};
use crate::node::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

pub fn parse(source: &str) -> TreeResult<Document> {
    Parser::new(source).parse()
}

pub struct Parser<'a> {
    reader: Reader<&'a [u8]>,
    stack: Vec<ElementSnapshot>,
    root: Option<ElementSnapshot>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            reader: Reader::from_str(source),
            stack: Vec::new(),
            root: None,
        }
    }

    pub fn parse(mut self) -> TreeResult<Document> {
        loop {
            let pos = self.position();
            let event = self
                .reader
                .read_event()
                .map_err(|e| TreeError::xml(pos, e.to_string()))?;

            match event {
                Event::Start(start) => {
                    let element = self.open_element(&start)?;
                    self.stack.push(element);
                }
                Event::Empty(start) => {
                    let element = self.open_element(&start)?;
                    self.close_element(element)?;
                }
                Event::End(_) => {
                    let mut element = self
                        .stack
                        .pop()
                        .ok_or_else(|| TreeError::xml(pos, "closing tag without an open element"))?;
                    if element.text.is_none() && element.children.is_empty() {
                        element.text = Some(String::new());
                    }
                    self.close_element(element)?;
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| TreeError::xml(pos, e.to_string()))?;
                    self.push_text(&text, pos)?;
                }
                Event::CData(cdata) => {
                    let bytes = cdata.into_inner();
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|e| TreeError::xml(pos, e.to_string()))?;
                    self.push_text(text, pos)?;
                }
                Event::Eof => break,
                Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {}
            }
        }

        if let Some(open) = self.stack.pop() {
            return Err(TreeError::UnexpectedEof { element: open.name });
        }

        let root = self.root.ok_or(TreeError::MissingRoot)?;
        debug!(root = %root.name, "Parsed document");
        Ok(Document::from_snapshot(root))
    }

    fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    fn open_element(&self, start: &BytesStart<'_>) -> TreeResult<ElementSnapshot> {
        let pos = self.position();
        if self.stack.is_empty() && self.root.is_some() {
            return Err(TreeError::MultipleRoots { pos });
        }

        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| TreeError::xml(pos, e.to_string()))?
            .to_string();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| TreeError::xml(pos, e.to_string()))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| TreeError::xml(pos, e.to_string()))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| TreeError::xml(pos, e.to_string()))?;
            attributes.push(Attribute::new(key, value.into_owned()));
        }

        Ok(ElementSnapshot {
            name,
            attributes,
            text: None,
            children: Vec::new(),
        })
    }

    fn close_element(&mut self, mut element: ElementSnapshot) -> TreeResult<()> {
        if !element.children.is_empty() {
            match element.text.take() {
                Some(text) if !text.trim().is_empty() => {
                    return Err(TreeError::mixed_content(element.name));
                }
                _ => {}
            }
        }

        match self.stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None => self.root = Some(element),
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str, pos: u64) -> TreeResult<()> {
        match self.stack.last_mut() {
            Some(current) => {
                current.text.get_or_insert_with(String::new).push_str(text);
                Ok(())
            }
            None if text.trim().is_empty() => Ok(()),
            None => Err(TreeError::StrayText { pos }),
        }
    }
}
