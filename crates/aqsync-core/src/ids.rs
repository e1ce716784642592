// ── Identifier resolution ──
//
// Bidirectional bookkeeping between declared identifiers (`customId`s and
// type names) and remote identifiers. Rebuilt from scratch at plan time,
// then refreshed after types are minted and extended after the batch
// create assigns component ids.

use std::collections::BTreeMap;

use aqsync_api::types::{Model, ModelComponentType, ModelReferenceType};
use indexmap::IndexMap;
use strum::Display;
use tracing::debug;

use crate::error::CoreError;
use crate::model::{CustomId, LocalGraph, RemoteGraph, WorkspaceName};

/// What an unresolved identifier was supposed to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum IdKind {
    #[strum(serialize = "component")]
    Component,
    #[strum(serialize = "component type")]
    ComponentType,
    #[strum(serialize = "reference type")]
    ReferenceType,
    #[strum(serialize = "workspace")]
    Workspace,
}

/// Component type name → type id, depth-first over the type tree.
///
/// Descendants are visited before their ancestor is recorded, so on a
/// name collision the shallower type wins.
pub fn collect_component_types(
    root: &IndexMap<String, ModelComponentType>,
) -> BTreeMap<String, String> {
    fn walk(node: &IndexMap<String, ModelComponentType>, out: &mut BTreeMap<String, String>) {
        for ty in node.values() {
            walk(&ty.children, out);
            out.insert(ty.name.clone(), ty.id.clone());
        }
    }

    let mut out = BTreeMap::new();
    walk(root, &mut out);
    out
}

/// Reference type name → type id.
pub fn collect_reference_types(
    reference_types: &IndexMap<String, ModelReferenceType>,
) -> BTreeMap<String, i64> {
    reference_types
        .values()
        .map(|ty| (ty.name.clone(), ty.id))
        .collect()
}

/// Identifier map threaded through the apply phases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdMap {
    component_types: BTreeMap<WorkspaceName, BTreeMap<String, String>>,
    reference_types: BTreeMap<WorkspaceName, BTreeMap<String, i64>>,
    /// `customId` → remote id, or the `customId` itself while the component
    /// has no remote id yet (doubles as its batch correlation id).
    components: BTreeMap<CustomId, String>,
    /// `customId` → remote workspace id of every declared component.
    component_workspaces: BTreeMap<CustomId, String>,
}

impl IdMap {
    /// Build the map for one run.
    ///
    /// Every declared component gets a placeholder entry. Remote components
    /// override it with their `_id` unless they were moved: declared in a
    /// different workspace than the one they live in remotely. Moved
    /// components keep the placeholder until the batch create mints them
    /// anew in their declared workspace.
    pub fn build(
        models: &BTreeMap<WorkspaceName, Model>,
        local: &LocalGraph,
        remote: &RemoteGraph,
        workspace_ids: &BTreeMap<WorkspaceName, String>,
    ) -> Result<Self, CoreError> {
        let mut map = Self::default();
        map.refresh_types(models);

        for (workspace, components) in &local.components {
            let workspace_id = workspace_ids.get(workspace).ok_or_else(|| {
                CoreError::unresolved(IdKind::Workspace, workspace.clone(), None)
            })?;
            for custom_id in components.keys() {
                map.components.insert(custom_id.clone(), custom_id.clone());
                map.component_workspaces
                    .insert(custom_id.clone(), workspace_id.clone());
            }
        }

        for (workspace, components) in &remote.components {
            for (custom_id, component) in components {
                match local.workspace_of(custom_id) {
                    Some(declared) if declared != workspace => {
                        debug!(
                            custom_id = %custom_id,
                            from = %workspace,
                            to = %declared,
                            "component moved between workspaces"
                        );
                    }
                    _ => {
                        map.components
                            .insert(custom_id.clone(), component.id.clone());
                    }
                }
            }
        }

        Ok(map)
    }

    /// Recompute the type maps from (updated) models.
    pub fn refresh_types(&mut self, models: &BTreeMap<WorkspaceName, Model>) {
        self.component_types = models
            .iter()
            .map(|(ws, model)| (ws.clone(), collect_component_types(&model.root)))
            .collect();
        self.reference_types = models
            .iter()
            .map(|(ws, model)| (ws.clone(), collect_reference_types(&model.reference_types)))
            .collect();
    }

    /// Record remote ids assigned by a batch create (batch id → `_id`).
    pub fn extend_components(&mut self, assigned: &BTreeMap<String, String>) {
        for (batch_id, id) in assigned {
            self.components.insert(batch_id.clone(), id.clone());
        }
    }

    // ── Strict lookups ───────────────────────────────────────────────

    pub fn component_id(&self, custom_id: &str) -> Result<&str, CoreError> {
        self.components
            .get(custom_id)
            .map(String::as_str)
            .ok_or_else(|| CoreError::unresolved(IdKind::Component, custom_id, None))
    }

    /// Like [`component_id`](Self::component_id), but a placeholder is an
    /// error: the value is about to be written into a persisted record.
    pub fn remote_component_id(&self, custom_id: &str) -> Result<&str, CoreError> {
        let id = self.component_id(custom_id)?;
        if id == custom_id {
            Err(CoreError::unresolved(IdKind::Component, custom_id, None))
        } else {
            Ok(id)
        }
    }

    /// Remote workspace id of a declared component.
    pub fn workspace_id(&self, custom_id: &str) -> Result<&str, CoreError> {
        self.component_workspaces
            .get(custom_id)
            .map(String::as_str)
            .ok_or_else(|| CoreError::unresolved(IdKind::Workspace, custom_id, None))
    }

    pub fn component_type_id(&self, workspace: &str, name: &str) -> Result<&str, CoreError> {
        self.component_types
            .get(workspace)
            .and_then(|types| types.get(name))
            .map(String::as_str)
            .ok_or_else(|| CoreError::unresolved(IdKind::ComponentType, name, Some(workspace)))
    }

    pub fn reference_type_id(&self, workspace: &str, name: &str) -> Result<i64, CoreError> {
        self.try_reference_type_id(workspace, name)
            .ok_or_else(|| CoreError::unresolved(IdKind::ReferenceType, name, Some(workspace)))
    }

    // ── Lenient lookups (diffing against not-yet-minted types) ───────

    pub fn try_reference_type_id(&self, workspace: &str, name: &str) -> Option<i64> {
        self.reference_types
            .get(workspace)
            .and_then(|types| types.get(name))
            .copied()
    }
}
