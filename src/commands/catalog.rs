use anyhow::Result;
use log::info;
use std::path::Path;

use super::{Query, config::Config, load_fetch_params, print_json};
use crate::{models::ScheduleConfigRequest, runtime::Runtime};

#[tracing::instrument(skip(config))]
pub async fn schedule_show<R: Runtime>(config: &Config<R>, schedule_config_id: u64) -> Result<()> {
    let schedule = config.client.show_schedule_config(schedule_config_id).await?;
    print_json(&schedule)
}

#[tracing::instrument(skip(config))]
pub async fn schedule_list<R: Runtime>(config: &Config<R>, query: &Query) -> Result<()> {
    let schedules = config.client.list_schedule_configs(&query.pairs()).await?;
    print_json(&schedules)
}

/// Creates a recurring fetch job from a query file and a cron expression.
#[tracing::instrument(skip(config))]
pub async fn schedule_create<R: Runtime>(
    config: &Config<R>,
    params_path: &Path,
    cron_expression: &str,
    client_context: Option<String>,
    num_times: Option<u32>,
    emails: Vec<String>,
) -> Result<()> {
    let request = ScheduleConfigRequest {
        fetch_params: load_fetch_params(&config.runtime, params_path)?,
        cron_expression: cron_expression.to_string(),
        client_context,
        num_times,
        email_to: (!emails.is_empty()).then_some(emails),
    };
    let schedule = config.client.create_schedule_config(&request).await?;
    info!("Created schedule config {}", schedule.id);
    print_json(&schedule)
}

#[tracing::instrument(skip(config))]
pub async fn brand_show<R: Runtime>(config: &Config<R>, brand_id: u64, query: &Query) -> Result<()> {
    let brand = config.client.get_brand(brand_id, &query.pairs()).await?;
    print_json(&brand)
}

#[tracing::instrument(skip(config))]
pub async fn brand_list<R: Runtime>(config: &Config<R>, query: &Query) -> Result<()> {
    let brands = config.client.list_brands(&query.pairs()).await?;
    print_json(&brands)
}

#[tracing::instrument(skip(config))]
pub async fn brand_set_show<R: Runtime>(config: &Config<R>, brand_set_id: u64) -> Result<()> {
    let brand_set = config.client.get_brand_set(brand_set_id).await?;
    print_json(&brand_set)
}

#[tracing::instrument(skip(config))]
pub async fn brand_set_list<R: Runtime>(config: &Config<R>, query: &Query) -> Result<()> {
    let brand_sets = config.client.list_brand_sets(&query.pairs()).await?;
    print_json(&brand_sets)
}

#[tracing::instrument(skip(config))]
pub async fn dataset_show<R: Runtime>(config: &Config<R>, dataset_id: &str) -> Result<()> {
    let dataset = config.client.get_dataset(dataset_id).await?;
    print_json(&dataset)
}

#[tracing::instrument(skip(config))]
pub async fn dataset_list<R: Runtime>(config: &Config<R>) -> Result<()> {
    let datasets = config.client.list_datasets().await?;
    print_json(&datasets)
}

#[tracing::instrument(skip(config))]
pub async fn field_values<R: Runtime>(config: &Config<R>, field: &str) -> Result<()> {
    let values = config.client.get_field_values(&[("field", field)]).await?;
    print_json(&values)
}
