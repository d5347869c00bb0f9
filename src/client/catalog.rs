//! Fetch job history, schedule configs, brands and the data dictionary.

use serde_json::Value;

use super::Client;
use crate::error::Result;
use crate::models::{
    Brand, BrandSet, Dataset, FetchJob, Record, RecordList, ScheduleConfig, ScheduleConfigRequest,
};

impl Client {
    /// The most recently created fetch job matching `query`.
    #[tracing::instrument(skip(self))]
    pub async fn latest_fetch_job(&self, query: &[(&str, &str)]) -> Result<FetchJob> {
        let record: Record<FetchJob> = self.secure_get("analytics/fetch_job/latest", query).await?;
        Ok(record.record)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_fetch_jobs(&self, query: &[(&str, &str)]) -> Result<RecordList<FetchJob>> {
        self.secure_get("analytics/fetch_job", query).await
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn create_schedule_config(
        &self,
        request: &ScheduleConfigRequest,
    ) -> Result<ScheduleConfig> {
        let record: Record<ScheduleConfig> =
            self.secure_post("analytics/schedule_config", request).await?;
        Ok(record.record)
    }

    #[tracing::instrument(skip(self))]
    pub async fn show_schedule_config(&self, schedule_config_id: u64) -> Result<ScheduleConfig> {
        let record: Record<ScheduleConfig> = self
            .secure_get(&format!("analytics/schedule_config/{}", schedule_config_id), &[])
            .await?;
        Ok(record.record)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_schedule_configs(
        &self,
        query: &[(&str, &str)],
    ) -> Result<RecordList<ScheduleConfig>> {
        self.secure_get("analytics/schedule_config", query).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_brand(&self, brand_id: u64, query: &[(&str, &str)]) -> Result<Brand> {
        let record: Record<Brand> = self
            .secure_get(&format!("brand_views/{}", brand_id), query)
            .await?;
        Ok(record.record)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_brands(&self, query: &[(&str, &str)]) -> Result<RecordList<Brand>> {
        self.secure_get("brand_views", query).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_brand_set(&self, brand_set_id: u64) -> Result<BrandSet> {
        let record: Record<BrandSet> = self
            .secure_get(&format!("brand_view_sets/{}", brand_set_id), &[])
            .await?;
        Ok(record.record)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_brand_sets(&self, query: &[(&str, &str)]) -> Result<RecordList<BrandSet>> {
        self.secure_get("brand_view_sets", query).await
    }

    /// Dataset metadata including its field definitions.
    #[tracing::instrument(skip(self))]
    pub async fn get_dataset(&self, dataset_id: &str) -> Result<Dataset> {
        let record: Record<Dataset> = self
            .secure_get(&format!("dictionary/datasets/{}", dataset_id), &[])
            .await?;
        Ok(record.record)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_datasets(&self) -> Result<RecordList<Dataset>> {
        self.secure_get("dictionary/datasets", &[]).await
    }

    /// Possible values of a listable field, e.g. `field=lfm.brand.name`.
    ///
    /// The response shape depends on the field, so it is returned undecoded.
    #[tracing::instrument(skip(self))]
    pub async fn get_field_values(&self, query: &[(&str, &str)]) -> Result<Value> {
        self.secure_get("dictionary/field_values", query).await
    }
}
