use anyhow::Result;
use log::debug;
use reqwest::Client as ReqwestClient;
use std::path::PathBuf;

use crate::{client::Client, config::Profile, http::HttpClient, runtime::Runtime};

const USER_AGENT: &str = concat!("lfapi-cli/", env!("LFAPI_VERSION"));

pub struct Config<R: Runtime> {
    pub runtime: R,
    pub client: Client,
}

impl<R: Runtime> Config<R> {
    /// Resolves the profile and builds an API client from it.
    ///
    /// `api_host` overrides the host named in the profile.
    pub fn new(runtime: R, profile_path: Option<PathBuf>, api_host: Option<String>) -> Result<Self> {
        let mut profile = Profile::resolve(&runtime, profile_path.as_deref())?;
        if let Some(api_host) = api_host {
            profile.api_host = Some(api_host);
        }
        debug!(
            "Using API host {} and auth host {}",
            profile.api_host(),
            profile.auth_host()
        );

        let http = ReqwestClient::builder().user_agent(USER_AGENT).build()?;
        let client = Client::from_profile_with(&profile, HttpClient::new(http));

        Ok(Self { runtime, client })
    }
}
