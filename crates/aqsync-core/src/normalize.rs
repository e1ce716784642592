// ── Graph normalization ──
//
// Pure transforms from flat inputs (declared graph, aggregated workspaces,
// models, field list) into the workspace-partitioned, customId-indexed maps
// the diff engine compares.

use std::collections::{BTreeMap, BTreeSet};

use aqsync_api::types::{AggregatedWorkspace, Component, Field, Model, Reference};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::ids::{IdKind, collect_component_types};
use crate::model::{
    CustomFields, EntityKind, Graph, LocalGraph, LocalReference, RemoteGraph, RemoteModel,
    WorkspaceModel, WorkspaceName,
};

/// Partition the declared graph by workspace.
///
/// References are filed under their source component's workspace. Fails on
/// duplicate `customId`s, components in workspaces missing from the
/// table, parents/sources/targets that name no declared component, and
/// custom fields named like an attribute the wire record already carries.
pub fn normalize_local(
    graph: &Graph,
    workspace_ids: &BTreeMap<WorkspaceName, String>,
) -> Result<LocalGraph, CoreError> {
    let mut local = LocalGraph::default();
    let mut component_workspace: BTreeMap<&str, &str> = BTreeMap::new();

    for component in &graph.components {
        if !workspace_ids.contains_key(&component.workspace) {
            return Err(CoreError::UnknownWorkspace {
                kind: EntityKind::Component,
                custom_id: component.custom_id.clone(),
                workspace: component.workspace.clone(),
            });
        }
        reject_modeled_keys(
            EntityKind::Component,
            &component.custom_id,
            &component.fields,
            Component::MODELED_KEYS,
        )?;
        if component_workspace
            .insert(&component.custom_id, &component.workspace)
            .is_some()
        {
            return Err(CoreError::DuplicateCustomId {
                kind: EntityKind::Component,
                custom_id: component.custom_id.clone(),
            });
        }

        local
            .component_types
            .entry(component.workspace.clone())
            .or_default()
            .insert(component.type_name.clone());
        local
            .components
            .entry(component.workspace.clone())
            .or_default()
            .insert(component.custom_id.clone(), component.clone());
    }

    for component in &graph.components {
        let dangling = component
            .parent
            .as_deref()
            .filter(|parent| !component_workspace.contains_key(parent));
        if let Some(parent) = dangling {
            return Err(CoreError::unresolved(
                IdKind::Component,
                parent,
                Some(&component.workspace),
            ));
        }
    }

    let mut seen_references = BTreeSet::new();
    for reference in &graph.references {
        if !seen_references.insert(reference.custom_id.as_str()) {
            return Err(CoreError::DuplicateCustomId {
                kind: EntityKind::Reference,
                custom_id: reference.custom_id.clone(),
            });
        }
        reject_modeled_keys(
            EntityKind::Reference,
            &reference.custom_id,
            &reference.fields,
            Reference::MODELED_KEYS,
        )?;

        let endpoint = |custom_id: &str| {
            component_workspace
                .get(custom_id)
                .map(|ws| (*ws).to_owned())
                .ok_or_else(|| CoreError::unresolved(IdKind::Component, custom_id, None))
        };
        let source_workspace = endpoint(&reference.source)?;
        let target_workspace = endpoint(&reference.target)?;

        local
            .reference_types
            .entry(source_workspace.clone())
            .or_default()
            .insert(reference.type_name.clone());
        local
            .references
            .entry(source_workspace.clone())
            .or_default()
            .insert(
                reference.custom_id.clone(),
                LocalReference {
                    custom_id: reference.custom_id.clone(),
                    type_name: reference.type_name.clone(),
                    source: reference.source.clone(),
                    target: reference.target.clone(),
                    description: reference.description.clone(),
                    fields: reference.fields.clone(),
                    source_workspace,
                    target_workspace,
                },
            );
    }

    local.component_workspaces = component_workspace
        .into_iter()
        .map(|(custom_id, workspace)| (custom_id.to_owned(), workspace.to_owned()))
        .collect();
    Ok(local)
}

/// A custom field sharing a key with a modeled attribute would be read back
/// into that attribute, never into the custom field map.
fn reject_modeled_keys(
    kind: EntityKind,
    custom_id: &str,
    fields: &CustomFields,
    modeled: &[&str],
) -> Result<(), CoreError> {
    match fields.keys().find(|name| modeled.contains(&name.as_str())) {
        Some(name) => Err(CoreError::ValidationFailed {
            message: format!("{kind} '{custom_id}' declares reserved field '{name}'"),
        }),
        None => Ok(()),
    }
}

/// Index fetched workspaces by `customId`, dropping unmanaged entities.
pub fn normalize_remote(workspaces: &BTreeMap<WorkspaceName, AggregatedWorkspace>) -> RemoteGraph {
    let mut remote = RemoteGraph::default();

    for (name, workspace) in workspaces {
        let components = remote.components.entry(name.clone()).or_default();
        let mut unmanaged = 0usize;
        for component in &workspace.components {
            let Some(custom_id) = &component.custom_id else {
                unmanaged += 1;
                continue;
            };
            if components
                .insert(custom_id.clone(), component.clone())
                .is_some()
            {
                warn!(
                    workspace = %name,
                    custom_id = %custom_id,
                    "duplicate remote component customId; keeping the last one"
                );
            }
        }

        let references = remote.references.entry(name.clone()).or_default();
        for reference in &workspace.references {
            let Some(custom_id) = &reference.custom_id else {
                unmanaged += 1;
                continue;
            };
            if references
                .insert(custom_id.clone(), reference.clone())
                .is_some()
            {
                warn!(
                    workspace = %name,
                    custom_id = %custom_id,
                    "duplicate remote reference customId; keeping the last one"
                );
            }
        }

        if unmanaged > 0 {
            debug!(workspace = %name, count = unmanaged, "ignoring entities without customId");
        }
    }

    remote
}

/// Summarize what each workspace's model already defines.
pub fn index_models(models: &BTreeMap<WorkspaceName, Model>, fields: &[Field]) -> RemoteModel {
    let mut fields_by_model: BTreeMap<&str, BTreeMap<String, Field>> = BTreeMap::new();
    for field in fields {
        fields_by_model
            .entry(field.model.as_str())
            .or_default()
            .insert(field.name.clone(), field.clone());
    }

    let workspaces = models
        .iter()
        .map(|(name, model)| {
            let indexed = WorkspaceModel {
                model_id: model.id.clone(),
                component_types: collect_component_types(&model.root).into_keys().collect(),
                reference_types: model
                    .reference_types
                    .values()
                    .map(|ty| ty.name.clone())
                    .collect(),
                fields: fields_by_model
                    .get(model.id.as_str())
                    .cloned()
                    .unwrap_or_default(),
            };
            (name.clone(), indexed)
        })
        .collect();

    RemoteModel { workspaces }
}
