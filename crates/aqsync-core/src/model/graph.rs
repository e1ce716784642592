//! Declared graph: what the caller wants the remote workspaces to contain.
//!
//! Every entity carries a `customId`, the only key used to match it against
//! remote state. Custom field values travel in an open map that is merged
//! into the wire payload at the call boundary.

use aqsync_api::types::FieldType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Custom field values keyed by field name.
pub type CustomFields = Map<String, Value>;

/// Flat declared graph, as loaded from a graph file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub components: Vec<DeclaredComponent>,
    #[serde(default)]
    pub references: Vec<DeclaredReference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredComponent {
    /// Workspace name; must be a key of the workspace table.
    pub workspace: String,
    pub custom_id: String,
    /// Component type name, created in the workspace model when missing.
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
    /// `customId` of the parent component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub fields: CustomFields,
}

/// Directed edge between two declared components. Lives in the workspace
/// of its source component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredReference {
    pub custom_id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// `customId` of the source component.
    pub source: String,
    /// `customId` of the target component.
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub fields: CustomFields,
}

/// Custom field the remote models must define.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub name: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDefinition {
    /// Name of the attribute that carries the reconciliation key.
    pub const CUSTOM_ID: &'static str = "customId";

    /// The tracking field every synced model carries, so users of the
    /// service can see which entities are managed.
    pub fn custom_id() -> Self {
        Self {
            field_type: FieldType::Text,
            name: Self::CUSTOM_ID.into(),
            label: "Integration entity id".into(),
            description: Some("Used by Integration Util to track entities".into()),
        }
    }
}

/// Turn a caller-typed struct into a custom field map.
///
/// The value must serialize to a JSON object.
pub fn custom_fields<T: Serialize>(value: &T) -> Result<CustomFields, CoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(other) => Err(CoreError::ValidationFailed {
            message: format!("custom fields must serialize to an object, got {other}"),
        }),
        Err(e) => Err(CoreError::ValidationFailed {
            message: format!("custom fields are not serializable: {e}"),
        }),
    }
}
