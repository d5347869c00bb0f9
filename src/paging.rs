//! Lazy page streams over synchronous queries and fetch jobs.
//!
//! Nothing is requested until the stream is polled, and dropping the stream
//! stops any further requests.

use futures_util::future;
use futures_util::stream::{self, Stream, StreamExt, TryStreamExt};
use log::{debug, info};

use crate::client::AnalyticsApi;
use crate::error::{LfError, Result};
use crate::models::{AnalyticResponse, FetchJob, FetchJobRequest, FetchParams};
use crate::poller::FetchJobPoller;
use crate::retry::RetryPolicy;

/// Options for [`async_pages`].
#[derive(Debug, Clone)]
pub struct AsyncQueryOptions {
    pub client_context: Option<String>,
    pub max_rows: Option<u64>,
    /// Addresses notified by the server when the job finishes.
    pub emails: Option<Vec<String>>,
    /// Page downloads in flight at once. Pages are still yielded in order.
    pub concurrency: usize,
    pub poll_policy: RetryPolicy,
}

impl Default for AsyncQueryOptions {
    fn default() -> Self {
        Self {
            client_context: None,
            max_rows: None,
            emails: None,
            concurrency: 1,
            poll_policy: RetryPolicy::job_polling(),
        }
    }
}

/// Pages through a synchronous query, starting at page 1.
///
/// Stops after the page reporting no more pages, after `max_pages` pages, or
/// after the first error.
pub fn sync_pages<'a, A>(
    api: &'a A,
    query: FetchParams,
    per_page: Option<u32>,
    max_pages: Option<u32>,
) -> impl Stream<Item = Result<AnalyticResponse>> + 'a
where
    A: AnalyticsApi + ?Sized,
{
    stream::try_unfold(Some(1u32), move |next| {
        let query = query.clone();
        async move {
            match next {
                Some(page) if max_pages.is_none_or(|max| page <= max) => {
                    fetch_page(api, &query, page, per_page).await.map(Some)
                }
                Some(_) => {
                    debug!("Reached page limit of {:?}", max_pages);
                    Ok(None)
                }
                None => Ok(None),
            }
        }
    })
}

/// Fetches one page and works out which page, if any, comes next.
async fn fetch_page<A>(
    api: &A,
    query: &FetchParams,
    page: u32,
    per_page: Option<u32>,
) -> Result<(AnalyticResponse, Option<u32>)>
where
    A: AnalyticsApi + ?Sized,
{
    debug!("Fetching page {} of {}", page, query.dataset_id);
    let response = api.fetch(&query.for_page(page, per_page)).await?;
    let next = if response.is_last_page() {
        None
    } else {
        Some(page + 1)
    };
    Ok((response, next))
}

/// Runs the query as a fetch job and yields the pages of its result.
///
/// The job is created and polled when the stream is first polled. A failed
/// job yields a single [`LfError::JobFailed`].
pub fn async_pages<'a, A>(
    api: &'a A,
    query: FetchParams,
    options: AsyncQueryOptions,
) -> impl Stream<Item = Result<AnalyticResponse>> + 'a
where
    A: AnalyticsApi + ?Sized,
{
    let concurrency = options.concurrency;
    download(api, completed_job_urls(api, query, options), concurrency)
}

/// Yields the pages of a job that has already completed.
pub fn job_pages<'a, A>(
    api: &'a A,
    job: &FetchJob,
    concurrency: usize,
) -> impl Stream<Item = Result<AnalyticResponse>> + use<'a, A>
where
    A: AnalyticsApi + ?Sized,
{
    let urls = page_urls(job);
    download(api, future::ready(urls), concurrency)
}

/// Page urls of a completed job.
pub fn page_urls(job: &FetchJob) -> Result<Vec<String>> {
    if !job.is_completed() {
        return Err(LfError::JobNotCompleted { job_id: job.id });
    }
    job.page_urls
        .clone()
        .ok_or(LfError::MissingPageUrls { job_id: job.id })
}

async fn completed_job_urls<A>(
    api: &A,
    query: FetchParams,
    options: AsyncQueryOptions,
) -> Result<Vec<String>>
where
    A: AnalyticsApi + ?Sized,
{
    let request = FetchJobRequest {
        fetch_params: query,
        client_context: options.client_context,
        max_rows: options.max_rows,
        email_to: options.emails,
    };

    let job = api.create_fetch_job(&request).await?;
    info!("Created fetch job {}, waiting for it to finish...", job.id);

    let job = FetchJobPoller::new(api)
        .with_policy(options.poll_policy)
        .poll(job.id)
        .await?;
    if job.is_failed() {
        return Err(LfError::JobFailed { job_id: job.id });
    }

    let urls = page_urls(&job)?;
    info!("Fetch job {} has {} page(s)", job.id, urls.len());
    Ok(urls)
}

fn download<'a, A, F>(
    api: &'a A,
    urls: F,
    concurrency: usize,
) -> impl Stream<Item = Result<AnalyticResponse>> + 'a
where
    A: AnalyticsApi + ?Sized,
    F: Future<Output = Result<Vec<String>>> + 'a,
{
    let concurrency = concurrency.max(1);
    stream::once(urls)
        .map_ok(move |urls| {
            stream::iter(urls)
                .map(move |url| async move { api.download_page(&url).await })
                .buffered(concurrency)
        })
        .try_flatten()
}
