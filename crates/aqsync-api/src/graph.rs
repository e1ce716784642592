// Component and reference endpoints, batch create and bulk delete

use crate::ArdoqClient;
use crate::error::Error;
use crate::types::{
    BatchRequest, BatchResponse, BulkDeleteRequest, BulkDeleteResponse, Component, Reference,
};

impl ArdoqClient {
    // ── Batch ────────────────────────────────────────────────────────

    /// Create components and references in one call. Entries refer to each
    /// other by `batchId`; the response maps each batch id to its new `_id`.
    ///
    /// `POST /api/batch`
    pub async fn batch_create(&self, request: &BatchRequest) -> Result<BatchResponse, Error> {
        self.post("batch", request).await
    }

    // ── Components ───────────────────────────────────────────────────

    /// Full-record replace of a component.
    ///
    /// `PUT /api/component/{id}`
    pub async fn update_component(&self, component: &Component) -> Result<Component, Error> {
        self.put(&format!("component/{}", component.id), component)
            .await
    }

    /// Delete several components at once. The server also deletes their
    /// descendants and every attached reference; the response lists them.
    ///
    /// `DELETE /api/component` (JSON body)
    pub async fn bulk_delete_components(
        &self,
        request: &BulkDeleteRequest,
    ) -> Result<BulkDeleteResponse, Error> {
        self.delete_with_body("component", request).await
    }

    // ── References ───────────────────────────────────────────────────

    /// Full-record replace of a reference.
    ///
    /// `PUT /api/reference/{id}`
    pub async fn update_reference(&self, reference: &Reference) -> Result<Reference, Error> {
        self.put(&format!("reference/{}", reference.id), reference)
            .await
    }

    /// `DELETE /api/reference/{id}`
    pub async fn delete_reference(&self, reference_id: &str) -> Result<(), Error> {
        self.delete(&format!("reference/{reference_id}")).await
    }
}
