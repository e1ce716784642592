// Workspace endpoints

use tracing::debug;

use crate::ArdoqClient;
use crate::error::Error;
use crate::types::AggregatedWorkspace;

impl ArdoqClient {
    /// Fetch a workspace with every component and reference inlined.
    ///
    /// `GET /api/workspace/{id}/aggregated`
    pub async fn get_aggregated_workspace(
        &self,
        workspace_id: &str,
    ) -> Result<AggregatedWorkspace, Error> {
        let ws: AggregatedWorkspace = self
            .get(&format!("workspace/{workspace_id}/aggregated"), &[])
            .await?;
        debug!(
            workspace = %ws.name,
            components = ws.components.len(),
            references = ws.references.len(),
            "fetched aggregated workspace"
        );
        Ok(ws)
    }
}
