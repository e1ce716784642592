// Ardoq REST API wire types
//
// Persisted entities model the attributes the sync engine reads or writes
// explicitly; everything else (custom field values included) lands in the
// flattened `extra` map so a full-record PUT echoes it back untouched.
// Service-managed metadata is optional because the service omits it on
// some projections.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Remote object id (`_id`).
pub type AqId = String;

// ── Shared metadata ──────────────────────────────────────────────────

/// The `ardoq` bookkeeping block attached to persisted entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityMeta {
    #[serde(rename = "entity-type", default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(
        rename = "incomingReferenceCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub incoming_reference_count: Option<i64>,
    #[serde(
        rename = "outgoingReferenceCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub outgoing_reference_count: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Components ───────────────────────────────────────────────────────

/// Persisted component, as returned inside an aggregated workspace and
/// accepted by `PUT component/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(rename = "_id")]
    pub id: AqId,
    #[serde(rename = "_version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(rename = "rootWorkspace")]
    pub root_workspace: AqId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Component type name.
    #[serde(rename = "type", default)]
    pub type_name: String,
    #[serde(rename = "typeId", default)]
    pub type_id: String,
    #[serde(default)]
    pub parent: Option<AqId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<AqId>,
    /// Integration key echoed by the service. Entities without one are
    /// invisible to the sync engine.
    #[serde(rename = "customId", default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(rename = "_order", default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(rename = "component-key", default, skip_serializing_if = "Option::is_none")]
    pub component_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(rename = "last-updated", default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(rename = "created-by", default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<AqId>,
    #[serde(rename = "last-modified-by", default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<AqId>,
    #[serde(rename = "createdByName", default, skip_serializing_if = "Option::is_none")]
    pub created_by_name: Option<String>,
    #[serde(rename = "createdByEmail", default, skip_serializing_if = "Option::is_none")]
    pub created_by_email: Option<String>,
    #[serde(rename = "lastModifiedByName", default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by_name: Option<String>,
    #[serde(rename = "lastModifiedByEmail", default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ardoq: Option<EntityMeta>,
    /// Custom field values and any attribute not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Component {
    /// Wire keys bound to a modeled attribute. Never part of `extra`.
    pub const MODELED_KEYS: &'static [&'static str] = &[
        "_id",
        "_version",
        "rootWorkspace",
        "name",
        "description",
        "type",
        "typeId",
        "parent",
        "model",
        "customId",
        "_order",
        "component-key",
        "created",
        "last-updated",
        "created-by",
        "last-modified-by",
        "createdByName",
        "createdByEmail",
        "lastModifiedByName",
        "lastModifiedByEmail",
        "ardoq",
    ];
}

// ── References ───────────────────────────────────────────────────────

/// Persisted reference (directed edge between two components).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_id")]
    pub id: AqId,
    #[serde(rename = "_version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    /// Reference type id within the source workspace's model.
    #[serde(rename = "type")]
    pub type_id: i64,
    #[serde(rename = "rootWorkspace")]
    pub root_workspace: AqId,
    #[serde(rename = "targetWorkspace")]
    pub target_workspace: AqId,
    pub source: AqId,
    pub target: AqId,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "customId", default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    /// Server-assigned; never required from the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(rename = "last-updated", default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(rename = "created-by", default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<AqId>,
    #[serde(rename = "last-modified-by", default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<AqId>,
    #[serde(rename = "createdByName", default, skip_serializing_if = "Option::is_none")]
    pub created_by_name: Option<String>,
    #[serde(rename = "createdByEmail", default, skip_serializing_if = "Option::is_none")]
    pub created_by_email: Option<String>,
    #[serde(rename = "lastModifiedByName", default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by_name: Option<String>,
    #[serde(rename = "lastModifiedByEmail", default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ardoq: Option<EntityMeta>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Reference {
    /// Wire keys bound to a modeled attribute. Never part of `extra`.
    pub const MODELED_KEYS: &'static [&'static str] = &[
        "_id",
        "_version",
        "type",
        "rootWorkspace",
        "targetWorkspace",
        "source",
        "target",
        "description",
        "customId",
        "order",
        "created",
        "last-updated",
        "created-by",
        "last-modified-by",
        "createdByName",
        "createdByEmail",
        "lastModifiedByName",
        "lastModifiedByEmail",
        "ardoq",
    ];
}

// ── Models ───────────────────────────────────────────────────────────

/// Component type node. Types nest: `children` holds subtypes keyed by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelComponentType {
    pub id: String,
    #[serde(default)]
    pub index: i64,
    pub name: String,
    #[serde(default = "default_level")]
    pub level: i64,
    #[serde(default)]
    pub children: IndexMap<String, ModelComponentType>,
    #[serde(default)]
    pub returns_value: Option<bool>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub shape: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub standard: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_level() -> i64 {
    1
}

impl ModelComponentType {
    /// Root-level type with neutral styling, as minted for a name the
    /// model does not know yet.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            index: 0,
            name: name.into(),
            level: 1,
            children: IndexMap::new(),
            returns_value: None,
            color: None,
            icon: None,
            shape: None,
            image: None,
            standard: None,
            extra: Map::new(),
        }
    }
}

/// Reference type. Ids are small integers unique within one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelReferenceType {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_line")]
    pub line: String,
    #[serde(default = "default_line_ending")]
    pub line_ending: String,
    #[serde(default)]
    pub returns_value: Option<bool>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub svg_style: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_line() -> String {
    "solid".into()
}

fn default_line_ending() -> String {
    "both".into()
}

impl ModelReferenceType {
    /// Solid, double-ended reference type with neutral styling.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            line: default_line(),
            line_ending: default_line_ending(),
            returns_value: None,
            color: None,
            svg_style: None,
            extra: Map::new(),
        }
    }
}

/// Workspace model (type taxonomy). `GET`/`PUT model/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(rename = "_id")]
    pub id: AqId,
    #[serde(rename = "_version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Component type tree keyed by type id.
    #[serde(default)]
    pub root: IndexMap<String, ModelComponentType>,
    /// Flat reference type table keyed by the stringified type id.
    #[serde(rename = "referenceTypes", default)]
    pub reference_types: IndexMap<String, ModelReferenceType>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Fields ───────────────────────────────────────────────────────────

/// Custom field data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Text,
    Checkbox,
    List,
    Url,
    Number,
    TextArea,
    Email,
    User,
    DateTime,
    SelectMultipleList,
    /// Any type this client does not model (calculated fields etc.)
    #[serde(other)]
    Other,
}

/// Custom field definition (`GET field`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(rename = "_id")]
    pub id: AqId,
    /// Machine name (lisp-case) used as the attribute key on entities.
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Owning model id.
    pub model: AqId,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "defaultValue", default)]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub global: Option<bool>,
    #[serde(default)]
    pub globalref: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `POST field` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewField {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub name: String,
    pub label: String,
    pub model: AqId,
    pub description: Option<String>,
    /// Visible on every component type.
    pub global: bool,
    /// Visible on every reference type.
    pub globalref: bool,
}

// ── Workspaces ───────────────────────────────────────────────────────

/// Workspace with its full component and reference lists inlined (`GET
/// workspace/{id}/aggregated`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedWorkspace {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AqId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Id of the model this workspace is bound to.
    #[serde(rename = "componentModel")]
    pub component_model: AqId,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub references: Vec<Reference>,
}

// ── Batch ────────────────────────────────────────────────────────────

/// Batch operation discriminator. Only creation is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchOp {
    Create,
}

/// `POST batch` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRequest {
    pub op: BatchOp,
    pub options: Map<String, Value>,
    pub data: BatchData,
}

impl BatchRequest {
    pub fn create(components: Vec<BatchComponent>, references: Vec<BatchReference>) -> Self {
        Self {
            op: BatchOp::Create,
            options: Map::new(),
            data: BatchData {
                components,
                references,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.components.is_empty() && self.data.references.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchData {
    pub components: Vec<BatchComponent>,
    pub references: Vec<BatchReference>,
}

/// Component to create. `parent` may name a remote id or the `batch_id`
/// of another component in the same request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchComponent {
    #[serde(rename = "batchId")]
    pub batch_id: String,
    #[serde(rename = "customId")]
    pub custom_id: String,
    #[serde(rename = "rootWorkspace")]
    pub root_workspace: AqId,
    #[serde(rename = "typeId")]
    pub type_id: String,
    pub name: String,
    pub description: Option<String>,
    pub parent: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Reference to create. `source`/`target` may be remote ids or batch ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReference {
    #[serde(rename = "batchId")]
    pub batch_id: String,
    #[serde(rename = "customId")]
    pub custom_id: String,
    #[serde(rename = "rootWorkspace")]
    pub root_workspace: AqId,
    #[serde(rename = "targetWorkspace")]
    pub target_workspace: AqId,
    pub source: String,
    pub target: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub type_id: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// `POST batch` response: batch id → assigned remote id.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BatchResponse {
    #[serde(default)]
    pub components: BTreeMap<String, AqId>,
    #[serde(default)]
    pub references: BTreeMap<String, AqId>,
}

// ── Bulk delete ──────────────────────────────────────────────────────

/// `DELETE component` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkDeleteRequest {
    #[serde(rename = "componentIds")]
    pub component_ids: Vec<AqId>,
    /// Client correlation id echoed back as `clientRequestId`.
    #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// What the service removed, including references deleted by cascade.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BulkDeleteResponse {
    #[serde(rename = "clientRequestId", default)]
    pub client_request_id: Option<String>,
    #[serde(rename = "componentIds", default)]
    pub component_ids: Vec<AqId>,
    #[serde(rename = "referenceIds", default)]
    pub reference_ids: Vec<AqId>,
    #[serde(rename = "updatedTags", default)]
    pub updated_tags: Vec<Value>,
}
