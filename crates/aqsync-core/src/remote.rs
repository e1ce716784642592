// ── Remote service seam ──
//
// The engine only talks to the service through this trait so it can be
// driven against a recording fake in tests. `ArdoqClient` is the production
// implementation; errors come back as `aqsync_api::Error` and are mapped
// into `CoreError` by the callers.

use std::future::Future;

use aqsync_api::ArdoqClient;
use aqsync_api::Error;
use aqsync_api::types::{
    AggregatedWorkspace, BatchRequest, BatchResponse, BulkDeleteRequest, BulkDeleteResponse,
    Component, Field, Model, NewField, Reference,
};

/// Typed remote operations the sync engine needs.
pub trait RemoteService: Send + Sync {
    fn get_aggregated_workspace(
        &self,
        workspace_id: &str,
    ) -> impl Future<Output = Result<AggregatedWorkspace, Error>> + Send;

    fn get_model(&self, model_id: &str) -> impl Future<Output = Result<Model, Error>> + Send;

    /// Persist a model; returns the stored version.
    fn update_model(&self, model: &Model) -> impl Future<Output = Result<Model, Error>> + Send;

    fn get_fields(&self) -> impl Future<Output = Result<Vec<Field>, Error>> + Send;

    fn create_field(&self, field: &NewField) -> impl Future<Output = Result<Field, Error>> + Send;

    fn batch_create(
        &self,
        request: &BatchRequest,
    ) -> impl Future<Output = Result<BatchResponse, Error>> + Send;

    fn update_component(
        &self,
        component: &Component,
    ) -> impl Future<Output = Result<Component, Error>> + Send;

    fn update_reference(
        &self,
        reference: &Reference,
    ) -> impl Future<Output = Result<Reference, Error>> + Send;

    /// Deletes the components and, server-side, everything hanging off them.
    fn bulk_delete_components(
        &self,
        request: &BulkDeleteRequest,
    ) -> impl Future<Output = Result<BulkDeleteResponse, Error>> + Send;

    fn delete_reference(&self, reference_id: &str) -> impl Future<Output = Result<(), Error>> + Send;
}

impl RemoteService for ArdoqClient {
    async fn get_aggregated_workspace(
        &self,
        workspace_id: &str,
    ) -> Result<AggregatedWorkspace, Error> {
        ArdoqClient::get_aggregated_workspace(self, workspace_id).await
    }

    async fn get_model(&self, model_id: &str) -> Result<Model, Error> {
        ArdoqClient::get_model(self, model_id).await
    }

    async fn update_model(&self, model: &Model) -> Result<Model, Error> {
        ArdoqClient::update_model(self, model).await
    }

    async fn get_fields(&self) -> Result<Vec<Field>, Error> {
        ArdoqClient::get_fields(self).await
    }

    async fn create_field(&self, field: &NewField) -> Result<Field, Error> {
        ArdoqClient::create_field(self, field).await
    }

    async fn batch_create(&self, request: &BatchRequest) -> Result<BatchResponse, Error> {
        ArdoqClient::batch_create(self, request).await
    }

    async fn update_component(&self, component: &Component) -> Result<Component, Error> {
        ArdoqClient::update_component(self, component).await
    }

    async fn update_reference(&self, reference: &Reference) -> Result<Reference, Error> {
        ArdoqClient::update_reference(self, reference).await
    }

    async fn bulk_delete_components(
        &self,
        request: &BulkDeleteRequest,
    ) -> Result<BulkDeleteResponse, Error> {
        ArdoqClient::bulk_delete_components(self, request).await
    }

    async fn delete_reference(&self, reference_id: &str) -> Result<(), Error> {
        ArdoqClient::delete_reference(self, reference_id).await
    }
}
