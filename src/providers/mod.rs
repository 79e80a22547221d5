pub mod google;
use crate::window::DatasetId;
use async_trait::async_trait;
use google::fitness_v1_types::{DataPoint, DataSource};

#[async_trait]
pub trait Provider: Send + Sync {
    /// Returns every data source registered for the user, in the order the service lists them.
    async fn list_data_sources(&self) -> anyhow::Result<Vec<DataSource>>;

    /// Returns the points of `data_source_id` inside the range `dataset_id` selects.
    /// Implementations follow pagination themselves and return pages concatenated in order.
    async fn dataset_points(
        &self,
        data_source_id: &str,
        dataset_id: &DatasetId,
    ) -> anyhow::Result<Vec<DataPoint>>;
}
