use crate::error::{EngineError, EngineResult};
use crate::type_tag::{is_list_keyword, DATA_TYPE_ATTRIBUTE, LIST_TAG};
use serde::{Deserialize, Serialize};
use xdynamic_tree::is_valid_name;

/// Projection settings shared by an object and every object projected from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectionOptions {
    /// Reserved attribute holding the type tag
    pub type_attribute: String,

    /// Prefix added to attribute-bag keys
    pub field_prefix: String,

    /// Tag value written on list containers
    pub list_tag: String,

    /// Element name for items of a newly created list container
    pub list_item_name: String,

    /// Root element name used by `XmlObject::new`
    pub default_root_name: String,

    /// Resolve a member with no child element against an attribute of the same name
    pub attribute_fallback: bool,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            type_attribute: DATA_TYPE_ATTRIBUTE.to_string(),
            field_prefix: "_".to_string(),
            list_tag: LIST_TAG.to_string(),
            list_item_name: "Item".to_string(),
            default_root_name: "root".to_string(),
            attribute_fallback: true,
        }
    }
}

impl ProjectionOptions {
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let options: ProjectionOptions = serde_json::from_str(json)
            .map_err(|e| EngineError::invalid_argument(format!("projection options: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Reject settings that would make written trees unreadable
    pub fn validate(&self) -> EngineResult<()> {
        for (field, name) in [
            ("typeAttribute", &self.type_attribute),
            ("listItemName", &self.list_item_name),
            ("defaultRootName", &self.default_root_name),
        ] {
            if !is_valid_name(name) {
                return Err(EngineError::invalid_argument(format!(
                    "{} {:?} is not a valid XML name",
                    field, name
                )));
            }
        }
        if !is_list_keyword(&self.list_tag) {
            return Err(EngineError::invalid_argument(format!(
                "listTag {:?} is not a recognized list keyword",
                self.list_tag
            )));
        }
        Ok(())
    }
}
