// ── Apply engine ──
//
// Executes a diff in dependency order:
//
//   1. types    merge new component/reference types into models, persist
//   2. fields   create missing fields (concurrently with 3-5)
//   3. create   one batch request for every new component and reference
//   4. update   full-record replace of changed entities
//   5. delete   bulk component delete, then leftover refs
//
// 5 starts only after 4 completes: the bulk delete removes descendants and
// attached references, which may be entities 4 still has to update.
//
// The identifier map is owned here and threaded through the phases: types
// are refreshed after 1, batch-assigned component ids are added after 3.
// The first remote failure aborts the run; nothing is rolled back.

use std::collections::{BTreeMap, BTreeSet};

use aqsync_api::types::{
    BatchComponent, BatchReference, BatchRequest, BulkDeleteRequest, Component, Model,
    ModelComponentType, ModelReferenceType, NewField, Reference,
};
use futures_util::future::{try_join, try_join_all};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::diff::Diff;
use crate::error::CoreError;
use crate::ids::IdMap;
use crate::model::{DeclaredComponent, LocalReference, WorkspaceName};
use crate::remote::RemoteService;

/// What an apply run did, per phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub models_updated: usize,
    pub component_types_created: usize,
    pub reference_types_created: usize,
    pub fields_created: usize,
    pub components_created: usize,
    pub references_created: usize,
    pub components_updated: usize,
    pub references_updated: usize,
    pub components_deleted: usize,
    pub references_deleted: usize,
    /// References the server removed along with their deleted endpoints.
    pub references_cascaded: usize,
}

/// Applies a [`Diff`] against a [`RemoteService`].
pub struct Consolidator<'a, R> {
    remote: &'a R,
    request_id: Option<String>,
}

impl<'a, R: RemoteService> Consolidator<'a, R> {
    pub fn new(remote: &'a R) -> Self {
        Self {
            remote,
            request_id: None,
        }
    }

    /// Correlation id sent with the bulk delete.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Run all phases.
    ///
    /// `models` are the fetched models by workspace name; `ids` is the map
    /// built at plan time from the same snapshot.
    pub async fn apply(
        &self,
        diff: &Diff,
        models: BTreeMap<WorkspaceName, Model>,
        mut ids: IdMap,
    ) -> Result<ApplyReport, CoreError> {
        let mut types = ApplyReport::default();
        let models = self.apply_types(diff, models, &mut types).await?;
        ids.refresh_types(&models);

        let (fields_created, mut report) =
            try_join(self.apply_fields(diff, &models), self.apply_graph(diff, ids)).await?;

        report.models_updated = types.models_updated;
        report.component_types_created = types.component_types_created;
        report.reference_types_created = types.reference_types_created;
        report.fields_created = fields_created;
        Ok(report)
    }

    // ── Phase 1: types ───────────────────────────────────────────────

    async fn apply_types(
        &self,
        diff: &Diff,
        models: BTreeMap<WorkspaceName, Model>,
        report: &mut ApplyReport,
    ) -> Result<BTreeMap<WorkspaceName, Model>, CoreError> {
        // Workspaces sharing a model collapse into one update.
        let mut pending: BTreeMap<String, Model> = BTreeMap::new();
        for (workspace, model) in &models {
            let new_components = diff
                .component_types
                .get(workspace)
                .map(|d| d.new.as_slice())
                .unwrap_or_default();
            let new_references = diff
                .reference_types
                .get(workspace)
                .map(|d| d.new.as_slice())
                .unwrap_or_default();
            if new_components.is_empty() && new_references.is_empty() {
                continue;
            }

            let merged = pending
                .entry(model.id.clone())
                .or_insert_with(|| model.clone());
            report.component_types_created += add_component_types(merged, new_components);
            report.reference_types_created += add_reference_types(merged, new_references);
        }

        if pending.is_empty() {
            return Ok(models);
        }

        let stored = try_join_all(pending.values().map(|m| self.remote.update_model(m))).await?;
        report.models_updated = stored.len();
        info!(
            models = stored.len(),
            component_types = report.component_types_created,
            reference_types = report.reference_types_created,
            "created missing types"
        );

        let by_id: BTreeMap<String, Model> =
            stored.into_iter().map(|m| (m.id.clone(), m)).collect();
        Ok(models
            .into_iter()
            .map(|(workspace, model)| {
                let model = by_id.get(&model.id).cloned().unwrap_or(model);
                (workspace, model)
            })
            .collect())
    }

    // ── Phase 2: fields ──────────────────────────────────────────────

    async fn apply_fields(
        &self,
        diff: &Diff,
        models: &BTreeMap<WorkspaceName, Model>,
    ) -> Result<usize, CoreError> {
        let mut seen = BTreeSet::new();
        let mut new_fields = Vec::new();
        for (workspace, fields) in &diff.fields {
            if fields.new.is_empty() {
                continue;
            }
            let model = models.get(workspace).ok_or_else(|| {
                CoreError::Internal(format!("no model fetched for workspace '{workspace}'"))
            })?;
            for def in &fields.new {
                if !seen.insert((model.id.as_str(), def.name.as_str())) {
                    continue;
                }
                new_fields.push(NewField {
                    field_type: def.field_type,
                    name: def.name.clone(),
                    label: def.label.clone(),
                    model: model.id.clone(),
                    description: def.description.clone(),
                    global: true,
                    globalref: true,
                });
            }
        }

        if new_fields.is_empty() {
            return Ok(0);
        }
        let created = try_join_all(new_fields.iter().map(|f| self.remote.create_field(f))).await?;
        info!(count = created.len(), "created fields");
        Ok(created.len())
    }

    // ── Phases 3-5: graph ────────────────────────────────────────────

    async fn apply_graph(&self, diff: &Diff, mut ids: IdMap) -> Result<ApplyReport, CoreError> {
        let mut report = ApplyReport::default();

        // Resolved up front: an unresolvable payload fails the run before
        // the graph is touched.
        let batch = build_batch(diff, &ids)?;
        if batch.is_empty() {
            debug!("nothing to create; skipping batch");
        } else {
            let created = self.remote.batch_create(&batch).await?;
            report.components_created = created.components.len();
            report.references_created = created.references.len();
            info!(
                components = report.components_created,
                references = report.references_created,
                "created graph entities"
            );
            ids.extend_components(&created.components);
        }

        let (components, references) = build_updates(diff, &ids)?;
        let (updated_components, updated_references) =
            self.update_graph(&components, &references).await?;
        let deleted = self.delete_graph(diff).await?;

        report.components_updated = updated_components;
        report.references_updated = updated_references;
        report.components_deleted = deleted.components;
        report.references_deleted = deleted.references;
        report.references_cascaded = deleted.cascaded;
        Ok(report)
    }

    async fn update_graph(
        &self,
        components: &[Component],
        references: &[Reference],
    ) -> Result<(usize, usize), CoreError> {
        let (components, references) = try_join(
            try_join_all(components.iter().map(|c| self.remote.update_component(c))),
            try_join_all(references.iter().map(|r| self.remote.update_reference(r))),
        )
        .await?;
        if !components.is_empty() || !references.is_empty() {
            info!(
                components = components.len(),
                references = references.len(),
                "updated graph entities"
            );
        }
        Ok((components.len(), references.len()))
    }

    async fn delete_graph(&self, diff: &Diff) -> Result<Deleted, CoreError> {
        let component_ids: Vec<String> = diff
            .components
            .values()
            .flat_map(|d| d.deleted.iter().map(|c| c.id.clone()))
            .collect();
        let components = component_ids.len();

        let cascaded: BTreeSet<String> = if component_ids.is_empty() {
            BTreeSet::new()
        } else {
            let request = BulkDeleteRequest {
                component_ids,
                request_id: self.request_id.clone(),
            };
            let response = self.remote.bulk_delete_components(&request).await?;
            response.reference_ids.into_iter().collect()
        };

        let deleted_references: Vec<&Reference> = diff
            .references
            .values()
            .flat_map(|d| d.deleted.iter())
            .collect();
        let (cascade, explicit): (Vec<&Reference>, Vec<&Reference>) = deleted_references
            .into_iter()
            .partition(|r| cascaded.contains(&r.id));

        try_join_all(explicit.iter().map(|r| self.remote.delete_reference(&r.id))).await?;

        if components > 0 || !explicit.is_empty() {
            info!(
                components,
                references = explicit.len(),
                cascaded = cascade.len(),
                "deleted graph entities"
            );
        }
        Ok(Deleted {
            components,
            references: explicit.len(),
            cascaded: cascade.len(),
        })
    }
}

struct Deleted {
    components: usize,
    references: usize,
    cascaded: usize,
}

// ── Model merging ────────────────────────────────────────────────────

/// Add root-level component types for names the model does not have.
fn add_component_types(model: &mut Model, names: &[String]) -> usize {
    let known: BTreeSet<String> = crate::ids::collect_component_types(&model.root)
        .into_keys()
        .collect();
    let mut added = 0;
    for name in names.iter().filter(|n| !known.contains(*n)) {
        let id = format!("p{}", Uuid::new_v4().simple());
        model
            .root
            .insert(id.clone(), ModelComponentType::new(id, name.clone()));
        added += 1;
    }
    added
}

/// Add reference types, numbering on from the highest existing id.
fn add_reference_types(model: &mut Model, names: &[String]) -> usize {
    let known: BTreeSet<&str> = model
        .reference_types
        .values()
        .map(|t| t.name.as_str())
        .collect();
    let fresh: Vec<String> = names
        .iter()
        .filter(|n| !known.contains(n.as_str()))
        .cloned()
        .collect();

    let mut next = model
        .reference_types
        .values()
        .map(|t| t.id)
        .max()
        .map_or(1, |max| max + 1);
    for name in &fresh {
        model
            .reference_types
            .insert(next.to_string(), ModelReferenceType::new(next, name.clone()));
        next += 1;
    }
    fresh.len()
}

// ── Payload construction ─────────────────────────────────────────────

fn non_empty(description: Option<&String>) -> Option<String> {
    description.filter(|d| !d.is_empty()).cloned()
}

/// Batch payload for every new component and reference. Ids that are
/// still placeholders are batch ids of entities in the same request.
fn build_batch(diff: &Diff, ids: &IdMap) -> Result<BatchRequest, CoreError> {
    let mut components = Vec::new();
    for (workspace, d) in &diff.components {
        for comp in &d.new {
            components.push(BatchComponent {
                batch_id: comp.custom_id.clone(),
                custom_id: comp.custom_id.clone(),
                root_workspace: ids.workspace_id(&comp.custom_id)?.to_owned(),
                type_id: ids.component_type_id(workspace, &comp.type_name)?.to_owned(),
                name: comp.name.clone(),
                description: non_empty(comp.description.as_ref()),
                parent: comp
                    .parent
                    .as_deref()
                    .map(|p| ids.component_id(p).map(str::to_owned))
                    .transpose()?,
                fields: comp.fields.clone(),
            });
        }
    }

    let mut references = Vec::new();
    for (workspace, d) in &diff.references {
        for reference in &d.new {
            references.push(BatchReference {
                batch_id: reference.custom_id.clone(),
                custom_id: reference.custom_id.clone(),
                root_workspace: ids.workspace_id(&reference.source)?.to_owned(),
                target_workspace: ids.workspace_id(&reference.target)?.to_owned(),
                source: ids.component_id(&reference.source)?.to_owned(),
                target: ids.component_id(&reference.target)?.to_owned(),
                description: non_empty(reference.description.as_ref()),
                type_id: ids.reference_type_id(workspace, &reference.type_name)?,
                fields: reference.fields.clone(),
            });
        }
    }

    Ok(BatchRequest::create(components, references))
}

/// Full-record update payloads: the remote record with local values laid
/// over it. Runs after the batch, so every endpoint must have a real id.
fn build_updates(diff: &Diff, ids: &IdMap) -> Result<(Vec<Component>, Vec<Reference>), CoreError> {
    let mut components = Vec::new();
    for (workspace, d) in &diff.components {
        for (remote, local) in &d.updated {
            components.push(overlay_component(ids, workspace, remote, local)?);
        }
    }

    let mut references = Vec::new();
    for (workspace, d) in &diff.references {
        for (remote, local) in &d.updated {
            references.push(overlay_reference(ids, workspace, remote, local)?);
        }
    }

    Ok((components, references))
}

fn overlay_component(
    ids: &IdMap,
    workspace: &str,
    remote: &Component,
    local: &DeclaredComponent,
) -> Result<Component, CoreError> {
    let mut component = remote.clone();
    component.name.clone_from(&local.name);
    component.description = non_empty(local.description.as_ref());
    component.type_id = ids
        .component_type_id(workspace, &local.type_name)?
        .to_owned();
    component.type_name.clone_from(&local.type_name);
    component.parent = local
        .parent
        .as_deref()
        .map(|p| ids.remote_component_id(p).map(str::to_owned))
        .transpose()?;
    for (name, value) in &local.fields {
        component.extra.insert(name.clone(), value.clone());
    }
    Ok(component)
}

fn overlay_reference(
    ids: &IdMap,
    workspace: &str,
    remote: &Reference,
    local: &LocalReference,
) -> Result<Reference, CoreError> {
    let mut reference = remote.clone();
    reference.description = non_empty(local.description.as_ref());
    reference.type_id = ids.reference_type_id(workspace, &local.type_name)?;
    reference.source = ids.remote_component_id(&local.source)?.to_owned();
    reference.target = ids.remote_component_id(&local.target)?.to_owned();
    reference.root_workspace = ids.workspace_id(&local.source)?.to_owned();
    reference.target_workspace = ids.workspace_id(&local.target)?.to_owned();
    for (name, value) in &local.fields {
        reference.extra.insert(name.clone(), value.clone());
    }
    Ok(reference)
}
