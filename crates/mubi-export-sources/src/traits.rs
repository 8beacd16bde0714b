use async_trait::async_trait;
use mubi_export_models::Dataset;
use serde_json::Value;

use crate::error::FetchError;

/// A service that can list every item of a user's data set
#[async_trait]
pub trait ListSource: Send + Sync {
    fn source_name(&self) -> &str;

    /// Fetch all items of `dataset`, in service order, across every page
    async fn fetch_all(&self, dataset: Dataset) -> Result<Vec<Value>, FetchError>;
}
