// ── Diff engine ──
//
// Compares normalized local and remote state per workspace across five
// facets. Types and fields are additive only; components and references
// are partitioned into new / updated / deleted by `customId`.

use std::collections::{BTreeMap, BTreeSet};

use aqsync_api::types::{Component, Reference};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::ids::IdMap;
use crate::model::{
    DeclaredComponent, FieldDefinition, LocalGraph, LocalReference, RemoteGraph, RemoteModel,
    WorkspaceName,
};

// ── Diff types ───────────────────────────────────────────────────────

/// Classification of one entity kind within one workspace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityDiff<R, L> {
    pub new: Vec<L>,
    /// `(remote, local)` pairs whose local side differs.
    pub updated: Vec<(R, L)>,
    pub deleted: Vec<R>,
}

impl<R, L> Default for EntityDiff<R, L> {
    fn default() -> Self {
        Self {
            new: Vec::new(),
            updated: Vec::new(),
            deleted: Vec::new(),
        }
    }
}

impl<R, L> EntityDiff<R, L> {
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    pub fn counts(&self) -> ChangeCounts {
        ChangeCounts {
            new: self.new.len(),
            updated: self.updated.len(),
            deleted: self.deleted.len(),
        }
    }
}

/// Facet value keyed by workspace name.
pub type ByWorkspace<T> = BTreeMap<WorkspaceName, T>;

pub type ComponentDiff = EntityDiff<Component, DeclaredComponent>;
pub type ReferenceDiff = EntityDiff<Reference, LocalReference>;

/// Type names to create in one workspace's model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeDiff {
    pub new: Vec<String>,
}

/// Field definitions to create on one workspace's model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldDiff {
    pub new: Vec<FieldDefinition>,
}

/// Everything a run would change, by facet then workspace name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diff {
    pub component_types: ByWorkspace<TypeDiff>,
    pub reference_types: ByWorkspace<TypeDiff>,
    pub fields: ByWorkspace<FieldDiff>,
    pub components: ByWorkspace<ComponentDiff>,
    pub references: ByWorkspace<ReferenceDiff>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeCounts {
    pub new: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl ChangeCounts {
    fn add(self, other: Self) -> Self {
        Self {
            new: self.new + other.new,
            updated: self.updated + other.updated,
            deleted: self.deleted + other.deleted,
        }
    }
}

/// Per-facet totals across all workspaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub component_types: usize,
    pub reference_types: usize,
    pub fields: usize,
    pub components: ChangeCounts,
    pub references: ChangeCounts,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.component_types.values().all(|d| d.new.is_empty())
            && self.reference_types.values().all(|d| d.new.is_empty())
            && self.fields.values().all(|d| d.new.is_empty())
            && self.components.values().all(EntityDiff::is_empty)
            && self.references.values().all(EntityDiff::is_empty)
    }

    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            component_types: self.component_types.values().map(|d| d.new.len()).sum(),
            reference_types: self.reference_types.values().map(|d| d.new.len()).sum(),
            fields: self.fields.values().map(|d| d.new.len()).sum(),
            components: self
                .components
                .values()
                .map(EntityDiff::counts)
                .fold(ChangeCounts::default(), ChangeCounts::add),
            references: self
                .references
                .values()
                .map(EntityDiff::counts)
                .fold(ChangeCounts::default(), ChangeCounts::add),
        }
    }
}

// ── Facets ───────────────────────────────────────────────────────────

/// New component and reference type names per workspace.
pub fn diff_types(
    workspaces: &BTreeMap<WorkspaceName, String>,
    local: &LocalGraph,
    model: &RemoteModel,
) -> (ByWorkspace<TypeDiff>, ByWorkspace<TypeDiff>) {
    let mut component_types = BTreeMap::new();
    let mut reference_types = BTreeMap::new();

    for workspace in workspaces.keys() {
        let remote = model.workspace(workspace);
        component_types.insert(
            workspace.clone(),
            missing_types(
                local.component_types.get(workspace),
                remote.map(|m| &m.component_types),
            ),
        );
        reference_types.insert(
            workspace.clone(),
            missing_types(
                local.reference_types.get(workspace),
                remote.map(|m| &m.reference_types),
            ),
        );
    }

    (component_types, reference_types)
}

fn missing_types(
    declared: Option<&BTreeSet<String>>,
    known: Option<&BTreeSet<String>>,
) -> TypeDiff {
    let new = match (declared, known) {
        (None, _) => Vec::new(),
        (Some(declared), None) => declared.iter().cloned().collect(),
        (Some(declared), Some(known)) => declared.difference(known).cloned().collect(),
    };
    TypeDiff { new }
}

/// Field definitions not yet present on each workspace's model.
pub fn diff_fields(
    workspaces: &BTreeMap<WorkspaceName, String>,
    definitions: &[FieldDefinition],
    model: &RemoteModel,
) -> ByWorkspace<FieldDiff> {
    workspaces
        .keys()
        .map(|workspace| {
            let existing = model.workspace(workspace).map(|m| &m.fields);
            let mut seen = BTreeSet::new();
            let new = definitions
                .iter()
                .filter(|def| seen.insert(def.name.as_str()))
                .filter(|def| existing.is_none_or(|fields| !fields.contains_key(&def.name)))
                .cloned()
                .collect();
            (workspace.clone(), FieldDiff { new })
        })
        .collect()
}

/// Components and references per workspace.
pub fn diff_graph(
    workspaces: &BTreeMap<WorkspaceName, String>,
    local: &LocalGraph,
    remote: &RemoteGraph,
    ids: &IdMap,
) -> Result<(ByWorkspace<ComponentDiff>, ByWorkspace<ReferenceDiff>), CoreError> {
    let mut components = BTreeMap::new();
    let mut references = BTreeMap::new();

    for workspace in workspaces.keys() {
        let diff = partition(
            local.components.get(workspace),
            remote.components.get(workspace),
            |local, remote| component_changed(ids, local, remote),
        )?;
        components.insert(workspace.clone(), diff);

        let diff = partition(
            local.references.get(workspace),
            remote.references.get(workspace),
            |local, remote| reference_changed(ids, workspace, local, remote),
        )?;
        references.insert(workspace.clone(), diff);
    }

    Ok((components, references))
}

/// Assemble all five facets.
pub fn calculate_diff(
    workspaces: &BTreeMap<WorkspaceName, String>,
    local: &LocalGraph,
    remote: &RemoteGraph,
    model: &RemoteModel,
    ids: &IdMap,
    definitions: &[FieldDefinition],
) -> Result<Diff, CoreError> {
    let (component_types, reference_types) = diff_types(workspaces, local, model);
    let fields = diff_fields(workspaces, definitions, model);
    let (components, references) = diff_graph(workspaces, local, remote, ids)?;

    Ok(Diff {
        component_types,
        reference_types,
        fields,
        components,
        references,
    })
}

// ── Set partition ────────────────────────────────────────────────────

fn partition<R: Clone, L: Clone>(
    local: Option<&BTreeMap<String, L>>,
    remote: Option<&BTreeMap<String, R>>,
    mut changed: impl FnMut(&L, &R) -> Result<bool, CoreError>,
) -> Result<EntityDiff<R, L>, CoreError> {
    let empty_local = BTreeMap::new();
    let empty_remote = BTreeMap::new();
    let local = local.unwrap_or(&empty_local);
    let remote = remote.unwrap_or(&empty_remote);

    let mut diff = EntityDiff::default();
    for (custom_id, local_entity) in local {
        match remote.get(custom_id) {
            None => diff.new.push(local_entity.clone()),
            Some(remote_entity) => {
                if changed(local_entity, remote_entity)? {
                    diff.updated
                        .push((remote_entity.clone(), local_entity.clone()));
                }
            }
        }
    }
    diff.deleted = remote
        .iter()
        .filter(|(custom_id, _)| !local.contains_key(*custom_id))
        .map(|(_, entity)| entity.clone())
        .collect();

    Ok(diff)
}

// ── Change detection ─────────────────────────────────────────────────

fn component_changed(
    ids: &IdMap,
    local: &DeclaredComponent,
    remote: &Component,
) -> Result<bool, CoreError> {
    if local.name != remote.name || local.type_name != remote.type_name {
        return Ok(true);
    }
    if description_differs(local.description.as_deref(), remote.description.as_deref()) {
        return Ok(true);
    }

    let local_parent = local
        .parent
        .as_deref()
        .map(|parent| ids.component_id(parent))
        .transpose()?;
    let remote_parent = remote.parent.as_deref().filter(|p| !p.is_empty());
    if local_parent != remote_parent {
        return Ok(true);
    }

    Ok(fields_differ(&local.fields, &remote.extra))
}

fn reference_changed(
    ids: &IdMap,
    workspace: &str,
    local: &LocalReference,
    remote: &Reference,
) -> Result<bool, CoreError> {
    if description_differs(local.description.as_deref(), remote.description.as_deref()) {
        return Ok(true);
    }
    if ids.try_reference_type_id(workspace, &local.type_name) != Some(remote.type_id) {
        return Ok(true);
    }
    if ids.component_id(&local.source)? != remote.source
        || ids.component_id(&local.target)? != remote.target
    {
        return Ok(true);
    }
    if ids.workspace_id(&local.source)? != remote.root_workspace
        || ids.workspace_id(&local.target)? != remote.target_workspace
    {
        return Ok(true);
    }

    Ok(fields_differ(&local.fields, &remote.extra))
}

/// Empty and absent descriptions are the same description.
fn description_differs(local: Option<&str>, remote: Option<&str>) -> bool {
    local.unwrap_or_default() != remote.unwrap_or_default()
}

/// One-directional: only fields declared locally are compared; a field
/// missing remotely compares as `null`.
fn fields_differ(local: &Map<String, Value>, remote: &Map<String, Value>) -> bool {
    local
        .iter()
        .any(|(name, value)| remote.get(name).unwrap_or(&Value::Null) != value)
}
