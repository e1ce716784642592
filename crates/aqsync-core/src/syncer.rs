// ── Sync facade ──
//
// Plan/apply lifecycle over one workspace table:
//   fetch  → aggregated workspaces, their models and the field list
//   plan   → normalize, resolve identifiers, diff
//   apply  → hand the diff to the consolidator

use std::collections::{BTreeMap, BTreeSet};

use aqsync_api::ArdoqClient;
use aqsync_api::types::{AggregatedWorkspace, Field, Model};
use futures_util::future::{try_join, try_join_all};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::apply::{ApplyReport, Consolidator};
use crate::config::SyncConfig;
use crate::diff::{Diff, calculate_diff};
use crate::error::CoreError;
use crate::ids::IdMap;
use crate::model::{FieldDefinition, Graph, WorkspaceName};
use crate::normalize::{index_models, normalize_local, normalize_remote};
use crate::remote::RemoteService;

/// Remote state as fetched for one plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub workspaces: BTreeMap<WorkspaceName, AggregatedWorkspace>,
    /// Model bound to each workspace (shared models appear once per
    /// workspace).
    pub models: BTreeMap<WorkspaceName, Model>,
    pub fields: Vec<Field>,
}

/// A computed diff plus the state needed to apply it.
#[derive(Debug, Clone)]
pub struct Plan {
    pub diff: Diff,
    models: BTreeMap<WorkspaceName, Model>,
    ids: IdMap,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.diff.is_empty()
    }
}

/// Entry point: reconciles declared graphs against one workspace table.
#[derive(Debug)]
pub struct Syncer<R> {
    remote: R,
    workspaces: BTreeMap<WorkspaceName, String>,
}

impl Syncer<ArdoqClient> {
    /// Build the HTTP client for `config`. Does not talk to the service.
    pub fn connect(config: &SyncConfig) -> Result<Self, CoreError> {
        let client = ArdoqClient::from_token(
            config.url.as_str(),
            &config.org,
            &config.token,
            &config.transport(),
        )?;
        debug!(
            url = %client.base_url(),
            org = %config.org,
            workspaces = config.workspaces.len(),
            "sync target configured"
        );
        Ok(Self::new(client, config.workspaces.clone()))
    }
}

impl<R: RemoteService> Syncer<R> {
    pub fn new(remote: R, workspaces: BTreeMap<WorkspaceName, String>) -> Self {
        Self { remote, workspaces }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Workspace name → remote workspace id.
    pub fn workspaces(&self) -> &BTreeMap<WorkspaceName, String> {
        &self.workspaces
    }

    /// Fetch every configured workspace and its model, plus the field list.
    ///
    /// Workspaces are fetched concurrently, then each distinct model once;
    /// the field list is fetched alongside.
    pub async fn fetch(&self) -> Result<Snapshot, CoreError> {
        if self.workspaces.is_empty() {
            return Err(CoreError::Config {
                message: "no workspaces configured".into(),
            });
        }

        let graph = async {
            let workspaces = try_join_all(self.workspaces.iter().map(|(name, id)| async move {
                let workspace = self.remote.get_aggregated_workspace(id).await?;
                Ok::<_, CoreError>((name.clone(), workspace))
            }))
            .await?;
            let workspaces: BTreeMap<WorkspaceName, AggregatedWorkspace> =
                workspaces.into_iter().collect();

            let model_ids: BTreeSet<&str> = workspaces
                .values()
                .map(|ws| ws.component_model.as_str())
                .collect();
            let fetched = try_join_all(model_ids.iter().map(|id| self.remote.get_model(id))).await?;
            let by_id: BTreeMap<&str, &Model> = fetched.iter().map(|m| (m.id.as_str(), m)).collect();

            let models = workspaces
                .iter()
                .map(|(name, ws)| {
                    by_id
                        .get(ws.component_model.as_str())
                        .map(|model| (name.clone(), (*model).clone()))
                        .ok_or_else(|| CoreError::UnexpectedResponse {
                            message: format!(
                                "model '{}' of workspace '{name}' was not returned",
                                ws.component_model
                            ),
                        })
                })
                .collect::<Result<BTreeMap<_, _>, _>>()?;

            Ok::<_, CoreError>((workspaces, models))
        };
        let fields = async { Ok::<_, CoreError>(self.remote.get_fields().await?) };

        let ((workspaces, models), fields) = try_join(graph, fields).await?;
        debug!(
            workspaces = workspaces.len(),
            fields = fields.len(),
            "fetched remote state"
        );
        Ok(Snapshot {
            workspaces,
            models,
            fields,
        })
    }

    /// Fetch remote state and diff `graph` against it.
    ///
    /// The `customId` tracking field is always added to `fields`.
    pub async fn plan(&self, graph: &Graph, fields: &[FieldDefinition]) -> Result<Plan, CoreError> {
        let snapshot = self.fetch().await?;
        self.plan_against(graph, fields, snapshot)
    }

    /// Diff `graph` against an already fetched snapshot.
    pub fn plan_against(
        &self,
        graph: &Graph,
        fields: &[FieldDefinition],
        snapshot: Snapshot,
    ) -> Result<Plan, CoreError> {
        let local = normalize_local(graph, &self.workspaces)?;
        let remote = normalize_remote(&snapshot.workspaces);
        let indexed = index_models(&snapshot.models, &snapshot.fields);
        let ids = IdMap::build(&snapshot.models, &local, &remote, &self.workspaces)?;

        let mut definitions = fields.to_vec();
        definitions.push(FieldDefinition::custom_id());

        let diff = calculate_diff(&self.workspaces, &local, &remote, &indexed, &ids, &definitions)?;
        let summary = diff.summary();
        info!(
            component_types = summary.component_types,
            reference_types = summary.reference_types,
            fields = summary.fields,
            components_new = summary.components.new,
            components_updated = summary.components.updated,
            components_deleted = summary.components.deleted,
            references_new = summary.references.new,
            references_updated = summary.references.updated,
            references_deleted = summary.references.deleted,
            "planned changes"
        );

        Ok(Plan {
            diff,
            models: snapshot.models,
            ids,
        })
    }

    /// Apply a plan. An empty plan makes no remote calls.
    pub async fn apply(&self, plan: Plan) -> Result<ApplyReport, CoreError> {
        if plan.is_empty() {
            info!("remote state already matches; nothing to apply");
            return Ok(ApplyReport::default());
        }

        Consolidator::new(&self.remote)
            .with_request_id(Uuid::new_v4().to_string())
            .apply(&plan.diff, plan.models, plan.ids)
            .await
    }

    /// Plan and apply in one go; returns the applied diff alongside the
    /// report.
    pub async fn sync(
        &self,
        graph: &Graph,
        fields: &[FieldDefinition],
    ) -> Result<(Diff, ApplyReport), CoreError> {
        let plan = self.plan(graph, fields).await?;
        let diff = plan.diff.clone();
        let report = self.apply(plan).await?;
        Ok((diff, report))
    }
}
