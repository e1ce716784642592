// ── Domain model ──
//
// Declared (caller-side) graph types and the normalized, workspace-indexed
// views the diff engine compares.

pub mod graph;
pub mod state;

use serde::Serialize;
use strum::{Display, EnumString};

pub use graph::{
    CustomFields, DeclaredComponent, DeclaredReference, FieldDefinition, Graph, custom_fields,
};
pub use state::{LocalGraph, LocalReference, RemoteGraph, RemoteModel, WorkspaceModel};

/// Workspace name as used in the declared graph and the workspace table.
pub type WorkspaceName = String;

/// Caller-chosen reconciliation key.
pub type CustomId = String;

/// Graph entity kind, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Component,
    Reference,
}
