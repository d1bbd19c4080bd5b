pub mod get;
pub mod init;
pub mod remove;
pub mod set;
pub mod show;

pub use get::{get, GetArgs};
pub use init::{init, InitArgs};
pub use remove::{remove, RemoveArgs};
pub use set::{set, SetArgs};
pub use show::{show, ShowArgs};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use xdynamic_engine::{Primitive, ProjectionOptions, Value, XmlObject};
use xdynamic_tree::Serializer;

const INDENT: &str = "  ";

/// A markup file opened as an object
pub struct XmlFile {
    pub path: PathBuf,
    pub root: XmlObject,
}

impl XmlFile {
    pub fn open(cwd: &Path, file: &Path, options: ProjectionOptions) -> Result<Self> {
        let path = cwd.join(file);
        let source = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        let root = XmlObject::parse_with(&source, options)
            .with_context(|| format!("Cannot load {}", path.display()))?;
        Ok(Self { path, root })
    }

    /// Markup of the whole document, indented when `pretty` is set
    pub fn render(&self, pretty: bool) -> Result<String> {
        let doc = self.root.document()?;
        Ok(if pretty {
            Serializer::with_indent(INDENT).serialize(&doc)
        } else {
            doc.to_xml_string()
        })
    }

    pub fn save(&self, pretty: bool) -> Result<()> {
        fs::write(&self.path, self.render(pretty)?)
            .with_context(|| format!("Cannot write {}", self.path.display()))
    }
}

/// Human-readable rendering of a projected value
pub fn render_value(value: &Value) -> Result<String> {
    Ok(match value {
        Value::Null => "null".to_string(),
        Value::Primitive(primitive) => primitive.to_literal(),
        Value::Fields(fields) => fields
            .iter()
            .map(|(key, value)| format!("{} = {:?}", key, value))
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(object) => {
            let doc = object.document()?;
            Serializer::with_indent(INDENT).serialize_node(&doc, object.node())?
        }
        Value::List(items) => {
            let mut lines = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                lines.push(format!("[{}] {}", index, render_value(item)?));
            }
            lines.join("\n")
        }
    })
}

/// JSON rendering of a projected value; objects expand into their members
pub fn value_to_json(value: &Value) -> Result<serde_json::Value> {
    use serde_json::{json, Map};

    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Primitive(primitive) => primitive_to_json(primitive),
        Value::Fields(fields) => {
            let map: Map<String, serde_json::Value> = fields
                .iter()
                .map(|(key, value)| (key.to_string(), json!(value)))
                .collect();
            serde_json::Value::Object(map)
        }
        Value::Object(object) => {
            let mut map = Map::new();
            for (key, value) in object.fields()?.iter() {
                map.insert(key.to_string(), json!(value));
            }
            for name in object.member_names()? {
                let member = object.get(&name)?;
                map.insert(name, value_to_json(&member)?);
            }
            serde_json::Value::Object(map)
        }
        Value::List(items) => serde_json::Value::Array(
            items
                .iter()
                .map(value_to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
    })
}

fn primitive_to_json(primitive: &Primitive) -> serde_json::Value {
    use serde_json::json;

    match primitive {
        Primitive::Bool(b) => json!(b),
        Primitive::I8(n) => json!(n),
        Primitive::I16(n) => json!(n),
        Primitive::I32(n) => json!(n),
        Primitive::I64(n) => json!(n),
        Primitive::U8(n) => json!(n),
        Primitive::U16(n) => json!(n),
        Primitive::U32(n) => json!(n),
        Primitive::U64(n) => json!(n),
        // Non-finite floats have no JSON number form
        Primitive::F32(n) if n.is_finite() => json!(n),
        Primitive::F64(n) if n.is_finite() => json!(n),
        other => json!(other.to_literal()),
    }
}
