//! Normalized state: declared and remote graphs partitioned by workspace
//! name and indexed by `customId`, plus the remote model index.
//!
//! `BTreeMap` everywhere so iteration (and therefore diff output) is
//! deterministic.

use std::collections::{BTreeMap, BTreeSet};

use aqsync_api::types::{Component, Field, Reference};
use serde::Serialize;

use super::graph::{CustomFields, DeclaredComponent};
use super::{CustomId, WorkspaceName};

/// Declared reference with both endpoint workspaces resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalReference {
    pub custom_id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "CustomFields::is_empty")]
    pub fields: CustomFields,
    pub source_workspace: WorkspaceName,
    pub target_workspace: WorkspaceName,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalGraph {
    pub components: BTreeMap<WorkspaceName, BTreeMap<CustomId, DeclaredComponent>>,
    /// Keyed by the source component's workspace.
    pub references: BTreeMap<WorkspaceName, BTreeMap<CustomId, LocalReference>>,
    pub component_types: BTreeMap<WorkspaceName, BTreeSet<String>>,
    pub reference_types: BTreeMap<WorkspaceName, BTreeSet<String>>,
    /// Declared workspace of every component, by `customId`.
    pub component_workspaces: BTreeMap<CustomId, WorkspaceName>,
}

impl LocalGraph {
    /// Workspace a declared component lives in.
    pub fn workspace_of(&self, custom_id: &str) -> Option<&str> {
        self.component_workspaces.get(custom_id).map(String::as_str)
    }
}

/// Remote entities carrying a `customId`, by workspace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteGraph {
    pub components: BTreeMap<WorkspaceName, BTreeMap<CustomId, Component>>,
    pub references: BTreeMap<WorkspaceName, BTreeMap<CustomId, Reference>>,
}

/// What one workspace's model already defines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceModel {
    pub model_id: String,
    /// Every component type name in the (flattened) type tree.
    pub component_types: BTreeSet<String>,
    pub reference_types: BTreeSet<String>,
    /// Fields attached to the model, by field name.
    pub fields: BTreeMap<String, Field>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteModel {
    pub workspaces: BTreeMap<WorkspaceName, WorkspaceModel>,
}

impl RemoteModel {
    pub fn workspace(&self, name: &str) -> Option<&WorkspaceModel> {
        self.workspaces.get(name)
    }
}
