use anyhow::Result;
use log::info;
use std::path::{Path, PathBuf};

use super::{config::Config, export::write_pages, load_fetch_params, print_json};
use crate::{
    client::AnalyticsApi,
    models::{FetchJobRequest, LabelMode},
    paging::AsyncQueryOptions,
    runtime::Runtime,
};

/// Options of the `fetch-job` command.
#[derive(Debug, Clone, Default)]
pub struct FetchJobOptions {
    pub client_context: Option<String>,
    pub max_rows: Option<u64>,
    pub emails: Vec<String>,
    /// Wait for the job and download its pages instead of printing the new job.
    pub wait: bool,
    pub output: Option<PathBuf>,
    pub concurrency: usize,
    pub labels: LabelMode,
}

/// Runs a synchronous query, printing rows page by page.
#[tracing::instrument(skip(config))]
pub async fn fetch<R: Runtime>(
    config: &Config<R>,
    params_path: &Path,
    per_page: Option<u32>,
    max_pages: Option<u32>,
    labels: LabelMode,
) -> Result<()> {
    let params = load_fetch_params(&config.runtime, params_path)?;
    let pages = config.client.sync_analytic_query(params, per_page, max_pages);
    write_pages(&config.runtime, pages, None, labels).await?;
    Ok(())
}

/// Submits a fetch job. With `wait`, polls it and writes its pages.
#[tracing::instrument(skip(config, options))]
pub async fn fetch_job<R: Runtime>(
    config: &Config<R>,
    params_path: &Path,
    options: FetchJobOptions,
) -> Result<()> {
    let params = load_fetch_params(&config.runtime, params_path)?;
    let emails = (!options.emails.is_empty()).then_some(options.emails);

    if !options.wait {
        let request = FetchJobRequest {
            fetch_params: params,
            client_context: options.client_context,
            max_rows: options.max_rows,
            email_to: emails,
        };
        let job = config.client.create_fetch_job(&request).await?;
        info!("Created fetch job {}", job.id);
        return print_json(&job);
    }

    let query_options = AsyncQueryOptions {
        client_context: options.client_context,
        max_rows: options.max_rows,
        emails,
        concurrency: options.concurrency,
        poll_policy: config.client.poll_policy().clone(),
    };
    let pages = config.client.async_analytic_query(params, query_options);
    write_pages(
        &config.runtime,
        pages,
        options.output.as_deref(),
        options.labels,
    )
    .await?;
    Ok(())
}
