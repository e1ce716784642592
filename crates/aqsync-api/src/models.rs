// Model (type taxonomy) endpoints

use crate::ArdoqClient;
use crate::error::Error;
use crate::types::Model;

impl ArdoqClient {
    /// Fetch a workspace model.
    ///
    /// `GET /api/model/{id}`
    pub async fn get_model(&self, model_id: &str) -> Result<Model, Error> {
        self.get(&format!("model/{model_id}"), &[]).await
    }

    /// Replace a model (type trees included). Returns the stored model.
    ///
    /// `PUT /api/model/{id}`
    pub async fn update_model(&self, model: &Model) -> Result<Model, Error> {
        self.put(&format!("model/{}", model.id), model).await
    }
}
