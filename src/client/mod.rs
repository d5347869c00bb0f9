//! ListenFirst API client.
//!
//! [`AnalyticsApi`] is the narrow surface the poller and the paging streams
//! depend on; [`Client`] implements it against the versioned REST API and
//! adds the catalog endpoints on top.

mod catalog;

use async_trait::async_trait;
use futures_util::Stream;
use log::debug;
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::auth::{ClientCredentials, TokenProvider};
use crate::config::{DEFAULT_API_HOST, Profile};
use crate::error::{LfError, Result};
use crate::http::{HttpClient, decode_json};
use crate::models::{AnalyticResponse, FetchJob, FetchJobRequest, FetchParams, Record};
use crate::paging::{self, AsyncQueryOptions};
use crate::poller::FetchJobPoller;
use crate::retry::{RetryPolicy, with_retry};

pub const API_VERSION: &str = "v20200626";

const CLIENT_LIBRARY: &str = "Rust SDK";
const CLIENT_VERSION: &str = env!("LFAPI_VERSION");

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsApi: Send + Sync {
    /// Runs a synchronous query and returns one page of data.
    async fn fetch(&self, params: &FetchParams) -> Result<AnalyticResponse>;
    async fn create_fetch_job(&self, request: &FetchJobRequest) -> Result<FetchJob>;
    async fn show_fetch_job(&self, job_id: u64) -> Result<FetchJob>;
    /// Downloads one page of a completed fetch job. Page urls are pre-signed,
    /// so no credentials are sent.
    async fn download_page(&self, url: &str) -> Result<AnalyticResponse>;
}

pub struct Client {
    http_client: HttpClient,
    tokens: Arc<dyn TokenProvider>,
    api_key: String,
    account_id: Option<String>,
    api_host: String,
    download_policy: RetryPolicy,
    poll_policy: RetryPolicy,
}

impl Client {
    pub fn new(api_key: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http_client: HttpClient::default(),
            tokens,
            api_key: api_key.into(),
            account_id: None,
            api_host: DEFAULT_API_HOST.to_string(),
            download_policy: RetryPolicy::default(),
            poll_policy: RetryPolicy::job_polling(),
        }
    }

    /// Builds a client authenticating with the profile's client credentials.
    pub fn from_profile(profile: &Profile) -> Self {
        Self::from_profile_with(profile, HttpClient::default())
    }

    /// Like [`Client::from_profile`], sharing `http_client` between the API
    /// and the token endpoint.
    pub fn from_profile_with(profile: &Profile, http_client: HttpClient) -> Self {
        let tokens = ClientCredentials::new(
            http_client.clone(),
            profile.client_id.clone(),
            profile.client_secret.clone(),
            Some(profile.auth_host()),
        );

        let mut client = Client::new(profile.api_key.clone(), Arc::new(tokens))
            .with_http_client(http_client)
            .with_api_host(profile.api_host())
            .with_account_id(profile.account_id.clone());
        if let Some(policy) = &profile.retry {
            client = client.with_download_policy(policy.clone());
        }
        if let Some(policy) = &profile.poll {
            client = client.with_poll_policy(policy.clone());
        }
        client
    }

    pub fn with_http_client(mut self, http_client: HttpClient) -> Self {
        self.http_client = http_client;
        self
    }

    /// Acts on behalf of another account (sent as `lfm-acting-account`).
    pub fn with_account_id(mut self, account_id: Option<String>) -> Self {
        self.account_id = account_id;
        self
    }

    pub fn with_api_host(mut self, api_host: impl Into<String>) -> Self {
        self.api_host = api_host.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_download_policy(mut self, policy: RetryPolicy) -> Self {
        self.download_policy = policy;
        self
    }

    pub fn with_poll_policy(mut self, policy: RetryPolicy) -> Self {
        self.poll_policy = policy;
        self
    }

    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    pub fn poll_policy(&self) -> &RetryPolicy {
        &self.poll_policy
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}/{}", self.api_host, API_VERSION, endpoint)
    }

    fn headers(&self, token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            header_value("authorization", &format!("Bearer {}", token))?,
        );
        headers.insert("x-api-key", header_value("x-api-key", &self.api_key)?);
        headers.insert("lf-client-library", HeaderValue::from_static(CLIENT_LIBRARY));
        headers.insert("lf-client-version", HeaderValue::from_static(CLIENT_VERSION));
        if let Some(account_id) = &self.account_id {
            headers.insert(
                "lfm-acting-account",
                header_value("lfm-acting-account", account_id)?,
            );
        }
        Ok(headers)
    }

    async fn secure_request<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let token = self.tokens.access_token().await?;
        let url = self.endpoint_url(endpoint);
        let response = self
            .http_client
            .request(method, &url, self.headers(&token)?, query, body)
            .await?;
        decode_json(response).await
    }

    pub async fn secure_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        self.secure_request::<T, ()>(Method::GET, endpoint, query, None)
            .await
    }

    pub async fn secure_post<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        self.secure_request(Method::POST, endpoint, &[], Some(body))
            .await
    }

    /// Waits for a fetch job to reach `completed` or `failed`.
    pub async fn poll_fetch_job(&self, job_id: u64) -> Result<FetchJob> {
        FetchJobPoller::new(self)
            .with_policy(self.poll_policy.clone())
            .poll(job_id)
            .await
    }

    /// Pages through a synchronous query. See [`paging::sync_pages`].
    pub fn sync_analytic_query(
        &self,
        params: FetchParams,
        per_page: Option<u32>,
        max_pages: Option<u32>,
    ) -> impl Stream<Item = Result<AnalyticResponse>> + '_ {
        paging::sync_pages(self, params, per_page, max_pages)
    }

    /// Runs a query as a fetch job and streams its pages. See [`paging::async_pages`].
    pub fn async_analytic_query(
        &self,
        params: FetchParams,
        options: AsyncQueryOptions,
    ) -> impl Stream<Item = Result<AnalyticResponse>> + '_ {
        paging::async_pages(self, params, options)
    }

    /// Streams the pages of an already completed fetch job.
    pub fn download_pages<'a>(
        &'a self,
        job: &FetchJob,
        concurrency: usize,
    ) -> impl Stream<Item = Result<AnalyticResponse>> + use<'a> {
        paging::job_pages(self, job, concurrency)
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| LfError::InvalidHeader(name))
}

#[async_trait]
impl AnalyticsApi for Client {
    #[tracing::instrument(skip(self, params))]
    async fn fetch(&self, params: &FetchParams) -> Result<AnalyticResponse> {
        debug!("Fetching page {:?} of {}", params.page, params.dataset_id);
        self.secure_post("analytics/fetch", params).await
    }

    #[tracing::instrument(skip(self, request))]
    async fn create_fetch_job(&self, request: &FetchJobRequest) -> Result<FetchJob> {
        let record: Record<FetchJob> = self.secure_post("analytics/fetch_job", request).await?;
        debug!("Created fetch job {}", record.record.id);
        Ok(record.record)
    }

    #[tracing::instrument(skip(self))]
    async fn show_fetch_job(&self, job_id: u64) -> Result<FetchJob> {
        let record: Record<FetchJob> = self
            .secure_get(&format!("analytics/fetch_job/{}", job_id), &[])
            .await?;
        Ok(record.record)
    }

    #[tracing::instrument(skip(self))]
    async fn download_page(&self, url: &str) -> Result<AnalyticResponse> {
        with_retry("Downloading fetch job page", &self.download_policy, || {
            self.http_client.get_json::<AnalyticResponse>(url)
        })
        .await
    }
}
