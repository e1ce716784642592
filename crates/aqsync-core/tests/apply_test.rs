#![allow(clippy::unwrap_used)]

// Apply engine tests against a recording in-memory remote.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use aqsync_api::types::{
    AggregatedWorkspace, BatchRequest, BatchResponse, BulkDeleteRequest, BulkDeleteResponse,
    Component, Field, FieldType, Model, NewField, Reference,
};
use aqsync_core::{
    CoreError, DeclaredComponent, DeclaredReference, FieldDefinition, Graph, IdKind, Syncer,
};
use aqsync_core::remote::RemoteService;
use pretty_assertions::assert_eq;
use serde_json::{Map, json};

// ── Recording fake ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Call {
    UpdateModel(Model),
    CreateField(NewField),
    Batch(BatchRequest),
    UpdateComponent(Component),
    UpdateReference(Reference),
    BulkDelete(BulkDeleteRequest),
    DeleteReference(String),
}

struct FakeRemote {
    workspaces: BTreeMap<String, AggregatedWorkspace>,
    models: Mutex<BTreeMap<String, Model>>,
    fields: Vec<Field>,
    /// Reference ids the bulk delete reports as removed by cascade.
    cascade: Vec<String>,
    /// When false, `update_model` acknowledges but keeps the old model.
    persist_models: bool,
    /// Ids removed by a bulk delete, cascaded references included.
    removed: Mutex<BTreeSet<String>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeRemote {
    fn new() -> Self {
        Self {
            workspaces: BTreeMap::new(),
            models: Mutex::new(BTreeMap::new()),
            fields: Vec::new(),
            cascade: Vec::new(),
            persist_models: true,
            removed: Mutex::new(BTreeSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn with_workspace(
        mut self,
        id: &str,
        model: Model,
        components: Vec<Component>,
        references: Vec<Reference>,
    ) -> Self {
        self.workspaces.insert(
            id.to_owned(),
            AggregatedWorkspace {
                id: Some(id.to_owned()),
                name: id.to_owned(),
                description: None,
                component_model: model.id.clone(),
                components,
                references,
            },
        );
        self.models.lock().unwrap().insert(model.id.clone(), model);
        self
    }

    fn with_tracking_field(mut self, model_id: &str) -> Self {
        self.fields.push(
            serde_json::from_value(json!({
                "_id": format!("f-{model_id}"),
                "name": "customId",
                "label": "Integration entity id",
                "type": "Text",
                "model": model_id
            }))
            .unwrap(),
        );
        self
    }

    fn with_cascade(mut self, reference_ids: &[&str]) -> Self {
        self.cascade = reference_ids.iter().map(|id| (*id).to_owned()).collect();
        self
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Updates land after one scheduler turn and fail on removed entities.
    async fn put(&self, id: &str) -> Result<(), aqsync_api::Error> {
        tokio::task::yield_now().await;
        if self.removed.lock().unwrap().contains(id) {
            return Err(not_found("PUT", id));
        }
        Ok(())
    }
}

fn not_found(method: &str, url: &str) -> aqsync_api::Error {
    aqsync_api::Error::Api {
        method: method.into(),
        url: url.into(),
        status: 404,
        request_body: None,
        response_body: "{}".into(),
    }
}

impl RemoteService for FakeRemote {
    async fn get_aggregated_workspace(
        &self,
        workspace_id: &str,
    ) -> Result<AggregatedWorkspace, aqsync_api::Error> {
        self.workspaces
            .get(workspace_id)
            .cloned()
            .ok_or_else(|| not_found("GET", workspace_id))
    }

    async fn get_model(&self, model_id: &str) -> Result<Model, aqsync_api::Error> {
        self.models
            .lock()
            .unwrap()
            .get(model_id)
            .cloned()
            .ok_or_else(|| not_found("GET", model_id))
    }

    async fn update_model(&self, model: &Model) -> Result<Model, aqsync_api::Error> {
        self.record(Call::UpdateModel(model.clone()));
        let mut models = self.models.lock().unwrap();
        if self.persist_models {
            let mut stored = model.clone();
            stored.version = stored.version.map(|v| v + 1);
            models.insert(stored.id.clone(), stored);
        }
        models.get(&model.id).cloned().ok_or_else(|| not_found("PUT", &model.id))
    }

    async fn get_fields(&self) -> Result<Vec<Field>, aqsync_api::Error> {
        Ok(self.fields.clone())
    }

    async fn create_field(&self, field: &NewField) -> Result<Field, aqsync_api::Error> {
        self.record(Call::CreateField(field.clone()));
        Ok(serde_json::from_value(json!({
            "_id": format!("f-{}", field.name),
            "name": field.name,
            "label": field.label,
            "type": field.field_type,
            "model": field.model
        }))
        .unwrap())
    }

    async fn batch_create(
        &self,
        request: &BatchRequest,
    ) -> Result<BatchResponse, aqsync_api::Error> {
        self.record(Call::Batch(request.clone()));
        Ok(BatchResponse {
            components: request
                .data
                .components
                .iter()
                .map(|c| (c.batch_id.clone(), format!("new-{}", c.batch_id)))
                .collect(),
            references: request
                .data
                .references
                .iter()
                .map(|r| (r.batch_id.clone(), format!("new-{}", r.batch_id)))
                .collect(),
        })
    }

    async fn update_component(
        &self,
        component: &Component,
    ) -> Result<Component, aqsync_api::Error> {
        self.record(Call::UpdateComponent(component.clone()));
        self.put(&component.id).await?;
        Ok(component.clone())
    }

    async fn update_reference(
        &self,
        reference: &Reference,
    ) -> Result<Reference, aqsync_api::Error> {
        self.record(Call::UpdateReference(reference.clone()));
        self.put(&reference.id).await?;
        Ok(reference.clone())
    }

    async fn bulk_delete_components(
        &self,
        request: &BulkDeleteRequest,
    ) -> Result<BulkDeleteResponse, aqsync_api::Error> {
        self.record(Call::BulkDelete(request.clone()));
        self.removed.lock().unwrap().extend(
            request
                .component_ids
                .iter()
                .chain(&self.cascade)
                .cloned(),
        );
        Ok(BulkDeleteResponse {
            client_request_id: request.request_id.clone(),
            component_ids: request.component_ids.clone(),
            reference_ids: self.cascade.clone(),
            updated_tags: Vec::new(),
        })
    }

    async fn delete_reference(&self, reference_id: &str) -> Result<(), aqsync_api::Error> {
        self.record(Call::DeleteReference(reference_id.to_owned()));
        Ok(())
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

fn model(id: &str, reference_types: serde_json::Value) -> Model {
    serde_json::from_value(json!({
        "_id": id,
        "_version": 1,
        "name": format!("Model {id}"),
        "root": { "p-node": { "id": "p-node", "name": "Node" } },
        "referenceTypes": reference_types
    }))
    .unwrap()
}

fn calls_model(id: &str) -> Model {
    model(id, json!({ "1": { "id": 1, "name": "Calls" } }))
}

fn component(workspace_id: &str, custom_id: &str) -> Component {
    serde_json::from_value(json!({
        "_id": format!("c-{custom_id}"),
        "_version": 1,
        "rootWorkspace": workspace_id,
        "name": custom_id,
        "description": null,
        "type": "Node",
        "typeId": "p-node",
        "parent": null,
        "customId": custom_id
    }))
    .unwrap()
}

fn reference(workspace_id: &str, custom_id: &str, source: &str, target: &str) -> Reference {
    serde_json::from_value(json!({
        "_id": format!("r-{custom_id}"),
        "type": 1,
        "rootWorkspace": workspace_id,
        "targetWorkspace": workspace_id,
        "source": format!("c-{source}"),
        "target": format!("c-{target}"),
        "customId": custom_id
    }))
    .unwrap()
}

fn declared(workspace: &str, custom_id: &str) -> DeclaredComponent {
    DeclaredComponent {
        workspace: workspace.into(),
        custom_id: custom_id.into(),
        type_name: "Node".into(),
        name: custom_id.into(),
        parent: None,
        description: None,
        fields: Map::new(),
    }
}

fn declared_reference(custom_id: &str, source: &str, target: &str) -> DeclaredReference {
    DeclaredReference {
        custom_id: custom_id.into(),
        type_name: "Calls".into(),
        source: source.into(),
        target: target.into(),
        description: None,
        fields: Map::new(),
    }
}

fn table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(name, id)| ((*name).to_owned(), (*id).to_owned()))
        .collect()
}

/// ws1 holding alpha --sigma--> bravo, fully managed.
fn single_workspace() -> FakeRemote {
    FakeRemote::new()
        .with_workspace(
            "wid-1",
            calls_model("m1"),
            vec![component("wid-1", "alpha"), component("wid-1", "bravo")],
            vec![reference("wid-1", "sigma", "alpha", "bravo")],
        )
        .with_tracking_field("m1")
}

fn matching_graph() -> Graph {
    Graph {
        components: vec![declared("ws1", "alpha"), declared("ws1", "bravo")],
        references: vec![declared_reference("sigma", "alpha", "bravo")],
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn matching_graph_makes_no_mutations() {
    let syncer = Syncer::new(single_workspace(), table(&[("ws1", "wid-1")]));

    let (diff, report) = syncer.sync(&matching_graph(), &[]).await.unwrap();

    assert!(diff.is_empty(), "diff: {diff:#?}");
    assert_eq!(report, aqsync_core::ApplyReport::default());
    assert_eq!(syncer.remote().calls(), vec![]);
}

#[tokio::test]
async fn batch_is_skipped_when_nothing_is_new() {
    let syncer = Syncer::new(single_workspace(), table(&[("ws1", "wid-1")]));
    let mut graph = matching_graph();
    graph.components[0].name = "Alpha Service".into();

    let (_, report) = syncer.sync(&graph, &[]).await.unwrap();

    let calls = syncer.remote().calls();
    assert_eq!(calls.len(), 1, "calls: {calls:#?}");
    assert!(matches!(&calls[0], Call::UpdateComponent(c) if c.name == "Alpha Service"));
    assert_eq!(report.components_updated, 1);
    assert_eq!(report.components_created, 0);
}

#[tokio::test]
async fn cascade_deleted_references_are_not_deleted_again() {
    let remote = FakeRemote::new()
        .with_workspace(
            "wid-1",
            calls_model("m1"),
            vec![
                component("wid-1", "alpha"),
                component("wid-1", "bravo"),
                component("wid-1", "charlie"),
            ],
            vec![
                reference("wid-1", "sigma", "alpha", "bravo"),
                reference("wid-1", "tau", "bravo", "charlie"),
                reference("wid-1", "rho", "alpha", "bravo"),
            ],
        )
        .with_tracking_field("m1")
        .with_cascade(&["r-tau"]);
    let syncer = Syncer::new(remote, table(&[("ws1", "wid-1")]));

    let (_, report) = syncer.sync(&matching_graph(), &[]).await.unwrap();

    let calls = syncer.remote().calls();
    assert_eq!(calls.len(), 2, "calls: {calls:#?}");
    match &calls[0] {
        Call::BulkDelete(request) => {
            assert_eq!(request.component_ids, vec!["c-charlie"]);
            assert!(request.request_id.is_some());
        }
        other => panic!("expected bulk delete first, got: {other:?}"),
    }
    assert_eq!(calls[1], Call::DeleteReference("r-rho".into()));

    assert_eq!(report.components_deleted, 1);
    assert_eq!(report.references_deleted, 1);
    assert_eq!(report.references_cascaded, 1);
}

#[tokio::test]
async fn new_reference_type_continues_from_highest_id() {
    let remote = FakeRemote::new()
        .with_workspace(
            "wid-1",
            model(
                "m1",
                json!({
                    "1": { "id": 1, "name": "Calls" },
                    "4": { "id": 4, "name": "Owns" }
                }),
            ),
            vec![component("wid-1", "alpha"), component("wid-1", "bravo")],
            vec![reference("wid-1", "sigma", "alpha", "bravo")],
        )
        .with_tracking_field("m1");
    let syncer = Syncer::new(remote, table(&[("ws1", "wid-1")]));
    let mut graph = matching_graph();
    graph.references[0].type_name = "Reads".into();

    let (_, report) = syncer.sync(&graph, &[]).await.unwrap();

    let calls = syncer.remote().calls();
    assert_eq!(calls.len(), 2, "calls: {calls:#?}");
    let Call::UpdateModel(stored) = &calls[0] else {
        panic!("expected model update first, got: {:?}", calls[0]);
    };
    let reads = &stored.reference_types["5"];
    assert_eq!(reads.name, "Reads");
    assert_eq!(reads.line, "solid");
    assert_eq!(reads.line_ending, "both");

    let Call::UpdateReference(sigma) = &calls[1] else {
        panic!("expected reference update, got: {:?}", calls[1]);
    };
    assert_eq!(sigma.id, "r-sigma");
    assert_eq!(sigma.type_id, 5);
    assert_eq!(report.reference_types_created, 1);
    assert_eq!(report.models_updated, 1);
}

#[tokio::test]
async fn update_overlays_local_values_on_remote_record() {
    let mut alpha = component("wid-1", "alpha");
    alpha.version = Some(7);
    alpha.created_by_name = Some("Jo".into());
    alpha.extra.insert("owner".into(), json!("ops"));
    alpha.extra.insert("tier".into(), json!(1));
    alpha.description = Some("old".into());

    let remote = FakeRemote::new()
        .with_workspace(
            "wid-1",
            calls_model("m1"),
            vec![alpha, component("wid-1", "bravo")],
            vec![reference("wid-1", "sigma", "alpha", "bravo")],
        )
        .with_tracking_field("m1");
    let syncer = Syncer::new(remote, table(&[("ws1", "wid-1")]));

    let mut graph = matching_graph();
    graph.components[0].name = "Alpha Service".into();
    graph.components[0].description = Some(String::new());
    graph.components[0].fields.insert("tier".into(), json!(2));

    syncer.sync(&graph, &[]).await.unwrap();

    let calls = syncer.remote().calls();
    let Some(Call::UpdateComponent(updated)) = calls.first() else {
        panic!("expected component update, got: {calls:?}");
    };
    assert_eq!(updated.id, "c-alpha");
    assert_eq!(updated.version, Some(7));
    assert_eq!(updated.name, "Alpha Service");
    assert_eq!(updated.description, None);
    assert_eq!(updated.type_id, "p-node");
    assert_eq!(updated.created_by_name.as_deref(), Some("Jo"));
    assert_eq!(updated.extra.get("owner"), Some(&json!("ops")));
    assert_eq!(updated.extra.get("tier"), Some(&json!(2)));
}

#[tokio::test]
async fn unresolved_type_fails_before_graph_is_touched() {
    let mut remote = FakeRemote::new()
        .with_workspace(
            "wid-1",
            calls_model("m1"),
            vec![
                component("wid-1", "alpha"),
                component("wid-1", "bravo"),
                component("wid-1", "charlie"),
            ],
            vec![reference("wid-1", "sigma", "alpha", "bravo")],
        )
        .with_tracking_field("m1");
    remote.persist_models = false;
    let syncer = Syncer::new(remote, table(&[("ws1", "wid-1")]));

    let mut graph = matching_graph();
    let mut delta = declared("ws1", "delta");
    delta.type_name = "Queue".into();
    graph.components.push(delta);

    let err = syncer.sync(&graph, &[]).await.unwrap_err();
    match err {
        CoreError::Unresolved {
            kind,
            identifier,
            workspace,
        } => {
            assert_eq!(kind, IdKind::ComponentType);
            assert_eq!(identifier, "Queue");
            assert_eq!(workspace.as_deref(), Some("ws1"));
        }
        other => panic!("expected Unresolved, got: {other:?}"),
    }

    let calls = syncer.remote().calls();
    assert_eq!(calls.len(), 1, "calls: {calls:#?}");
    assert!(matches!(calls[0], Call::UpdateModel(_)));
}

#[tokio::test]
async fn moved_component_is_recreated_in_declared_workspace() {
    let remote = FakeRemote::new()
        .with_workspace(
            "wid-1",
            calls_model("m1"),
            vec![component("wid-1", "alpha"), component("wid-1", "bravo")],
            vec![reference("wid-1", "sigma", "alpha", "bravo")],
        )
        .with_workspace("wid-2", calls_model("m2"), vec![], vec![])
        .with_tracking_field("m1")
        .with_tracking_field("m2")
        .with_cascade(&["r-sigma"]);
    let syncer = Syncer::new(remote, table(&[("ws1", "wid-1"), ("ws2", "wid-2")]));

    let mut graph = matching_graph();
    graph.components[0].workspace = "ws2".into();

    let (diff, report) = syncer.sync(&graph, &[]).await.unwrap();
    assert_eq!(diff.components["ws1"].deleted[0].id, "c-alpha");
    assert_eq!(diff.references["ws1"].deleted[0].id, "r-sigma");

    let calls = syncer.remote().calls();
    assert_eq!(calls.len(), 2, "calls: {calls:#?}");
    let Call::Batch(batch) = &calls[0] else {
        panic!("expected batch first, got: {:?}", calls[0]);
    };
    let created = &batch.data.components[0];
    assert_eq!(created.custom_id, "alpha");
    assert_eq!(created.root_workspace, "wid-2");

    let sigma = &batch.data.references[0];
    assert_eq!(sigma.source, "alpha");
    assert_eq!(sigma.target, "c-bravo");
    assert_eq!(sigma.root_workspace, "wid-2");
    assert_eq!(sigma.target_workspace, "wid-1");
    assert_eq!(sigma.type_id, 1);

    assert!(matches!(&calls[1], Call::BulkDelete(r) if r.component_ids == vec!["c-alpha"]));
    assert_eq!(report.components_created, 1);
    assert_eq!(report.references_created, 1);
    assert_eq!(report.references_deleted, 0);
    assert_eq!(report.references_cascaded, 1);
}

#[tokio::test]
async fn target_only_move_updates_reference_before_bulk_delete() {
    let remote = FakeRemote::new()
        .with_workspace(
            "wid-1",
            calls_model("m1"),
            vec![component("wid-1", "alpha"), component("wid-1", "bravo")],
            vec![reference("wid-1", "sigma", "alpha", "bravo")],
        )
        .with_workspace("wid-2", calls_model("m2"), vec![], vec![])
        .with_tracking_field("m1")
        .with_tracking_field("m2")
        .with_cascade(&["r-sigma"]);
    let syncer = Syncer::new(remote, table(&[("ws1", "wid-1"), ("ws2", "wid-2")]));

    let mut graph = matching_graph();
    graph.components[1].workspace = "ws2".into();

    let (diff, report) = syncer.sync(&graph, &[]).await.unwrap();
    assert_eq!(diff.references["ws1"].updated.len(), 1);
    assert!(diff.references["ws1"].deleted.is_empty());

    let calls = syncer.remote().calls();
    assert_eq!(calls.len(), 3, "calls: {calls:#?}");
    let Call::Batch(batch) = &calls[0] else {
        panic!("expected batch first, got: {:?}", calls[0]);
    };
    assert_eq!(batch.data.components[0].custom_id, "bravo");
    assert_eq!(batch.data.components[0].root_workspace, "wid-2");

    let Call::UpdateReference(sigma) = &calls[1] else {
        panic!("expected reference update before delete, got: {:?}", calls[1]);
    };
    assert_eq!(sigma.id, "r-sigma");
    assert_eq!(sigma.source, "c-alpha");
    assert_eq!(sigma.target, "new-bravo");
    assert_eq!(sigma.root_workspace, "wid-1");
    assert_eq!(sigma.target_workspace, "wid-2");

    assert!(matches!(&calls[2], Call::BulkDelete(r) if r.component_ids == vec!["c-bravo"]));
    assert_eq!(report.references_updated, 1);
    assert_eq!(report.components_deleted, 1);
    assert_eq!(report.references_cascaded, 0);
}

#[tokio::test]
async fn child_moved_off_deleted_parent_is_updated_first() {
    let mut bravo = component("wid-1", "bravo");
    bravo.parent = Some("c-charlie".into());
    let remote = FakeRemote::new()
        .with_workspace(
            "wid-1",
            calls_model("m1"),
            vec![
                component("wid-1", "alpha"),
                bravo,
                component("wid-1", "charlie"),
            ],
            vec![reference("wid-1", "sigma", "alpha", "bravo")],
        )
        .with_tracking_field("m1");
    let syncer = Syncer::new(remote, table(&[("ws1", "wid-1")]));

    let mut graph = matching_graph();
    graph.components[1].parent = Some("alpha".into());

    syncer.sync(&graph, &[]).await.unwrap();

    let calls = syncer.remote().calls();
    assert_eq!(calls.len(), 2, "calls: {calls:#?}");
    assert!(
        matches!(&calls[0], Call::UpdateComponent(c) if c.parent.as_deref() == Some("c-alpha"))
    );
    assert!(matches!(&calls[1], Call::BulkDelete(r) if r.component_ids == vec!["c-charlie"]));
}

#[tokio::test]
async fn custom_field_shadowing_reference_order_is_rejected() {
    let mut sigma = reference("wid-1", "sigma", "alpha", "bravo");
    sigma.order = Some(3);
    let remote = FakeRemote::new()
        .with_workspace(
            "wid-1",
            calls_model("m1"),
            vec![component("wid-1", "alpha"), component("wid-1", "bravo")],
            vec![sigma],
        )
        .with_tracking_field("m1");
    let syncer = Syncer::new(remote, table(&[("ws1", "wid-1")]));

    let mut graph = matching_graph();
    graph.references[0].fields.insert("order".into(), json!(3));

    let err = syncer.sync(&graph, &[]).await.unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }), "{err:?}");
    assert_eq!(syncer.remote().calls(), vec![]);
}

#[tokio::test]
async fn new_parents_resolve_through_batch_ids() {
    let syncer = Syncer::new(single_workspace(), table(&[("ws1", "wid-1")]));
    let mut graph = matching_graph();
    let mut child = declared("ws1", "child");
    child.parent = Some("parent".into());
    graph.components.push(declared("ws1", "parent"));
    graph.components.push(child);
    graph.components[0].parent = Some("parent".into());

    syncer.sync(&graph, &[]).await.unwrap();

    let calls = syncer.remote().calls();
    let Call::Batch(batch) = &calls[0] else {
        panic!("expected batch first, got: {:?}", calls[0]);
    };
    let child = batch
        .data
        .components
        .iter()
        .find(|c| c.custom_id == "child")
        .unwrap();
    assert_eq!(child.parent.as_deref(), Some("parent"));

    let Call::UpdateComponent(alpha) = &calls[1] else {
        panic!("expected component update, got: {:?}", calls[1]);
    };
    assert_eq!(alpha.parent.as_deref(), Some("new-parent"));
}

#[tokio::test]
async fn shared_model_is_updated_once() {
    let remote = FakeRemote::new()
        .with_workspace("wid-1", calls_model("m1"), vec![], vec![])
        .with_workspace("wid-2", calls_model("m1"), vec![], vec![])
        .with_tracking_field("m1");
    let syncer = Syncer::new(remote, table(&[("ws1", "wid-1"), ("ws2", "wid-2")]));

    let mut delta = declared("ws1", "delta");
    delta.type_name = "Queue".into();
    let mut echo = declared("ws2", "echo");
    echo.type_name = "Queue".into();
    let graph = Graph {
        components: vec![delta, echo],
        references: vec![],
    };

    let (_, report) = syncer.sync(&graph, &[]).await.unwrap();

    let calls = syncer.remote().calls();
    let updates: Vec<&Model> = calls
        .iter()
        .filter_map(|c| match c {
            Call::UpdateModel(m) => Some(m),
            _ => None,
        })
        .collect();
    assert_eq!(updates.len(), 1);
    assert_eq!(
        updates[0].root.values().filter(|t| t.name == "Queue").count(),
        1
    );
    assert_eq!(report.component_types_created, 1);

    let batch = calls
        .iter()
        .find_map(|c| match c {
            Call::Batch(b) => Some(b),
            _ => None,
        })
        .unwrap();
    let type_ids: Vec<&str> = batch
        .data
        .components
        .iter()
        .map(|c| c.type_id.as_str())
        .collect();
    assert_eq!(type_ids.len(), 2);
    assert_eq!(type_ids[0], type_ids[1]);
    assert!(type_ids[0].starts_with('p'));
}

#[tokio::test]
async fn missing_fields_are_created_once_per_model() {
    let remote = FakeRemote::new()
        .with_workspace("wid-1", calls_model("m1"), vec![], vec![])
        .with_workspace("wid-2", calls_model("m1"), vec![], vec![]);
    let syncer = Syncer::new(remote, table(&[("ws1", "wid-1"), ("ws2", "wid-2")]));
    let tier = FieldDefinition {
        field_type: FieldType::Number,
        name: "tier".into(),
        label: "Tier".into(),
        description: None,
    };

    let (_, report) = syncer.sync(&Graph::default(), &[tier]).await.unwrap();

    let mut created: Vec<NewField> = syncer
        .remote()
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::CreateField(f) => Some(f),
            _ => None,
        })
        .collect();
    created.sort_by(|a, b| a.name.cmp(&b.name));

    assert_eq!(
        created.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
        vec!["customId", "tier"]
    );
    assert!(created.iter().all(|f| f.global && f.globalref && f.model == "m1"));
    assert_eq!(created[0].field_type, FieldType::Text);
    assert_eq!(report.fields_created, 2);
}

#[tokio::test]
async fn plan_requires_a_workspace_table() {
    let syncer = Syncer::new(FakeRemote::new(), BTreeMap::new());
    let err = syncer.plan(&Graph::default(), &[]).await.unwrap_err();
    assert!(matches!(err, CoreError::Config { .. }));
}
