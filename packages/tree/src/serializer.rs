use crate::document::{Arena, Document};
use crate::error::TreeResult;
use crate::node::NodeId;

/// Serializer converts a document (or one of its subtrees) back to markup text
///
/// The compact form writes no whitespace between elements, matching what the
/// engine tests compare against. An indented form is available for display.
pub struct Serializer {
    indent_level: usize,
    indent_string: Option<String>,
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_string: None,
        }
    }

    pub fn with_indent(indent: &str) -> Self {
        Self {
            indent_level: 0,
            indent_string: Some(indent.to_string()),
        }
    }

    /// Serialize the whole document
    pub fn serialize(&mut self, doc: &Document) -> String {
        let arena = doc.arena();
        let mut output = String::new();
        self.serialize_element(&arena, arena.root(), &mut output)
            .expect("root element slot is never released");
        output
    }

    /// Serialize the subtree rooted at `node`
    pub fn serialize_node(&mut self, doc: &Document, node: NodeId) -> TreeResult<String> {
        let arena = doc.arena();
        let mut output = String::new();
        self.serialize_element(&arena, node, &mut output)?;
        Ok(output)
    }

    fn serialize_element(&mut self, arena: &Arena, id: NodeId, output: &mut String) -> TreeResult<()> {
        let data = arena.get(id)?;

        output.push('<');
        output.push_str(&data.name);
        for attr in &data.attributes {
            output.push(' ');
            output.push_str(&attr.name);
            output.push_str("=\"");
            escape_attribute(&attr.value, output);
            output.push('"');
        }

        if data.children.is_empty() {
            match &data.text {
                Some(text) => {
                    output.push('>');
                    escape_text(text, output);
                    self.close_tag(&data.name, output);
                }
                None => output.push_str(" />"),
            }
            return Ok(());
        }

        output.push('>');
        self.indent_level += 1;
        for child in &data.children {
            self.newline(output);
            self.serialize_element(arena, *child, output)?;
        }
        self.indent_level -= 1;
        self.newline(output);
        self.close_tag(&data.name, output);
        Ok(())
    }

    fn close_tag(&self, name: &str, output: &mut String) {
        output.push_str("</");
        output.push_str(name);
        output.push('>');
    }

    fn newline(&self, output: &mut String) {
        if let Some(indent) = &self.indent_string {
            output.push('\n');
            for _ in 0..self.indent_level {
                output.push_str(indent);
            }
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function for compact serialization
pub fn serialize(doc: &Document) -> String {
    Serializer::new().serialize(doc)
}

fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\r' => output.push_str("&#xD;"),
            _ => output.push(c),
        }
    }
}

fn escape_attribute(value: &str, output: &mut String) {
    for c in value.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\n' => output.push_str("&#xA;"),
            '\r' => output.push_str("&#xD;"),
            '\t' => output.push_str("&#x9;"),
            _ => output.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        let mut out = String::new();
        escape_text("a < b & c > d", &mut out);
        assert_eq!(out, "a &lt; b &amp; c &gt; d");
    }

    #[test]
    fn test_escape_attribute() {
        let mut out = String::new();
        escape_attribute("say \"hi\"\n", &mut out);
        assert_eq!(out, "say &quot;hi&quot;&#xA;");
    }

    #[test]
    fn test_indented_output() {
        let doc = Document::parse("<a><b>1</b><c><d /></c></a>").unwrap();
        let pretty = Serializer::with_indent("  ").serialize(&doc);
        assert_eq!(pretty, "<a>\n  <b>1</b>\n  <c>\n    <d />\n  </c>\n</a>");
    }

    #[test]
    fn test_serialize_after_removing_children() {
        let doc = Document::parse("<a><b>1</b><c><d /></c></a>").unwrap();
        let root = doc.root();
        let b = doc.children(root).unwrap()[0];
        doc.remove(b).unwrap();

        let whole = Serializer::new().serialize(&doc);
        assert_eq!(whole, "<a><c><d /></c></a>");
        assert_eq!(whole, Serializer::new().serialize_node(&doc, root).unwrap());
    }
}
