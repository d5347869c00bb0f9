//! Waits for a fetch job to finish.

use log::info;

use crate::client::AnalyticsApi;
use crate::error::Result;
use crate::models::FetchJob;
use crate::retry::{RetryPolicy, execute};

/// Re-reads a fetch job until it reaches a terminal state.
///
/// A `failed` job is a normal result here; callers decide what it means.
pub struct FetchJobPoller<'a, A: ?Sized> {
    api: &'a A,
    policy: RetryPolicy,
}

impl<'a, A: AnalyticsApi + ?Sized> FetchJobPoller<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            policy: RetryPolicy::job_polling(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[tracing::instrument(skip(self))]
    pub async fn poll(&self, job_id: u64) -> Result<FetchJob> {
        let job = execute(
            "Polling fetch job",
            &self.policy,
            || self.api.show_fetch_job(job_id),
            Some(|job: &FetchJob| !job.is_terminal()),
        )
        .await?;

        info!("Fetch job {} is {}", job.id, job.state);
        Ok(job)
    }
}
