use anyhow::Result;
use std::path::Path;

use super::{Query, config::Config, export::write_pages, print_json};
use crate::{client::AnalyticsApi, models::LabelMode, runtime::Runtime};

#[tracing::instrument(skip(config))]
pub async fn job_show<R: Runtime>(config: &Config<R>, job_id: u64) -> Result<()> {
    let job = config.client.show_fetch_job(job_id).await?;
    print_json(&job)
}

#[tracing::instrument(skip(config))]
pub async fn job_latest<R: Runtime>(config: &Config<R>, query: &Query) -> Result<()> {
    let job = config.client.latest_fetch_job(&query.pairs()).await?;
    print_json(&job)
}

#[tracing::instrument(skip(config))]
pub async fn job_list<R: Runtime>(config: &Config<R>, query: &Query) -> Result<()> {
    let jobs = config.client.list_fetch_jobs(&query.pairs()).await?;
    print_json(&jobs)
}

/// Waits for a job to finish and prints its final state.
#[tracing::instrument(skip(config))]
pub async fn job_poll<R: Runtime>(config: &Config<R>, job_id: u64) -> Result<()> {
    let job = config.client.poll_fetch_job(job_id).await?;
    print_json(&job)
}

/// Downloads the pages of a completed job.
#[tracing::instrument(skip(config))]
pub async fn job_pages<R: Runtime>(
    config: &Config<R>,
    job_id: u64,
    output: Option<&Path>,
    concurrency: usize,
    labels: LabelMode,
) -> Result<()> {
    let job = config.client.show_fetch_job(job_id).await?;
    let pages = config.client.download_pages(&job, concurrency);
    write_pages(&config.runtime, pages, output, labels).await?;
    Ok(())
}
