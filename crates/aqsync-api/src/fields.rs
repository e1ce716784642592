// Custom field endpoints

use crate::ArdoqClient;
use crate::error::Error;
use crate::types::{Field, NewField};

impl ArdoqClient {
    /// List every field visible to the organization, common fields included.
    ///
    /// `GET /api/field?includeCommon=true`
    pub async fn get_fields(&self) -> Result<Vec<Field>, Error> {
        self.get("field", &[("includeCommon", "true")]).await
    }

    /// Create a field definition on a model.
    ///
    /// `POST /api/field`
    pub async fn create_field(&self, field: &NewField) -> Result<Field, Error> {
        self.post("field", field).await
    }
}
