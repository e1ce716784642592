// Fixtures shared by the inline unit tests.
//
// Remote ids follow one convention so expectations stay readable:
// component `cid#<customId>`, reference `rid#<customId>`, workspace
// `wid#<name>`, component type `tid#<type>`.

use std::collections::BTreeMap;

use aqsync_api::types::{
    AggregatedWorkspace, Component, Model, ModelComponentType, ModelReferenceType, Reference,
};
use indexmap::IndexMap;
use serde_json::Map;

use crate::model::{DeclaredComponent, DeclaredReference, LocalReference, WorkspaceName};

pub(crate) fn workspace_ids(names: &[&str]) -> BTreeMap<WorkspaceName, String> {
    names
        .iter()
        .map(|name| ((*name).to_owned(), format!("wid#{name}")))
        .collect()
}

pub(crate) fn declared(workspace: &str, custom_id: &str, type_name: &str) -> DeclaredComponent {
    DeclaredComponent {
        workspace: workspace.into(),
        custom_id: custom_id.into(),
        type_name: type_name.into(),
        name: capitalize(custom_id),
        parent: None,
        description: None,
        fields: Map::new(),
    }
}

pub(crate) fn declared_reference(
    custom_id: &str,
    type_name: &str,
    source: &str,
    target: &str,
) -> DeclaredReference {
    DeclaredReference {
        custom_id: custom_id.into(),
        type_name: type_name.into(),
        source: source.into(),
        target: target.into(),
        description: None,
        fields: Map::new(),
    }
}

pub(crate) fn local_reference(
    declared: &DeclaredReference,
    source_workspace: &str,
    target_workspace: &str,
) -> LocalReference {
    LocalReference {
        custom_id: declared.custom_id.clone(),
        type_name: declared.type_name.clone(),
        source: declared.source.clone(),
        target: declared.target.clone(),
        description: declared.description.clone(),
        fields: declared.fields.clone(),
        source_workspace: source_workspace.into(),
        target_workspace: target_workspace.into(),
    }
}

/// Remote twin of `declared(workspace, custom_id, type_name)`.
pub(crate) fn remote_component(workspace: &str, custom_id: &str, type_name: &str) -> Component {
    Component {
        id: format!("cid#{custom_id}"),
        version: Some(1),
        root_workspace: format!("wid#{workspace}"),
        name: capitalize(custom_id),
        description: None,
        type_name: type_name.into(),
        type_id: format!("tid#{type_name}"),
        parent: None,
        model: Some("mid".into()),
        custom_id: Some(custom_id.into()),
        order: Some(0),
        component_key: Some(custom_id.into()),
        created: None,
        last_updated: None,
        created_by: Some("uid#".into()),
        last_modified_by: Some("uid#".into()),
        created_by_name: Some("Example User".into()),
        created_by_email: Some("example@example.com".into()),
        last_modified_by_name: Some("Example User".into()),
        last_modified_by_email: Some("example@example.com".into()),
        ardoq: None,
        extra: Map::new(),
    }
}

/// Remote twin of a local reference, with the given reference type id.
pub(crate) fn remote_reference(local: &LocalReference, type_id: i64) -> Reference {
    Reference {
        id: format!("rid#{}", local.custom_id),
        version: Some(1),
        type_id,
        root_workspace: format!("wid#{}", local.source_workspace),
        target_workspace: format!("wid#{}", local.target_workspace),
        source: format!("cid#{}", local.source),
        target: format!("cid#{}", local.target),
        description: None,
        custom_id: Some(local.custom_id.clone()),
        order: None,
        created: None,
        last_updated: None,
        created_by: None,
        last_modified_by: None,
        created_by_name: None,
        created_by_email: None,
        last_modified_by_name: None,
        last_modified_by_email: None,
        ardoq: None,
        extra: Map::new(),
    }
}

pub(crate) fn model(
    id: &str,
    component_types: &[(&str, &str)],
    reference_types: &[(i64, &str)],
) -> Model {
    let root: IndexMap<String, ModelComponentType> = component_types
        .iter()
        .map(|(id, name)| ((*id).to_owned(), ModelComponentType::new(*id, *name)))
        .collect();
    let reference_types: IndexMap<String, ModelReferenceType> = reference_types
        .iter()
        .map(|(id, name)| (id.to_string(), ModelReferenceType::new(*id, *name)))
        .collect();
    Model {
        id: id.into(),
        version: Some(1),
        name: format!("Model {id}"),
        description: None,
        root,
        reference_types,
        extra: Map::new(),
    }
}

pub(crate) fn aggregated(
    model_id: &str,
    components: Vec<Component>,
    references: Vec<Reference>,
) -> AggregatedWorkspace {
    AggregatedWorkspace {
        id: None,
        name: "workspace".into(),
        description: None,
        component_model: model_id.into(),
        components,
        references,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
