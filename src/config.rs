//! Client profile: credentials and endpoints, loaded from JSON or the environment.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::retry::RetryPolicy;
use crate::runtime::Runtime;

pub const DEFAULT_API_HOST: &str = "https://listenfirst.io";
pub const DEFAULT_AUTH_HOST: &str = "https://auth.listenfirstmedia.com";

/// Environment variable naming a profile file.
pub const PROFILE_ENV: &str = "LF_PROFILE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub api_key: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_host: Option<String>,
    /// Policy for page downloads; defaults to three attempts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryPolicy>,
    /// Policy for waiting on fetch jobs; defaults to 90 minutes of polling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll: Option<RetryPolicy>,
}

impl Profile {
    pub fn api_host(&self) -> &str {
        self.api_host.as_deref().unwrap_or(DEFAULT_API_HOST)
    }

    pub fn auth_host(&self) -> &str {
        self.auth_host.as_deref().unwrap_or(DEFAULT_AUTH_HOST)
    }

    /// Loads a profile from a JSON file.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime.read_to_string(path)?;
        let profile: Profile = serde_json::from_str(&content)
            .with_context(|| format!("Invalid profile in {:?}", path))?;
        Ok(profile)
    }

    /// Builds a profile from `LF_API_KEY`, `LF_CLIENT_ID` and `LF_CLIENT_SECRET`,
    /// plus the optional `LF_ACCOUNT_ID`, `LF_API_HOST` and `LF_AUTH_HOST`.
    ///
    /// Returns `None` when any of the required variables is missing.
    pub fn from_env<R: Runtime>(runtime: &R) -> Option<Self> {
        let var = |key: &str| runtime.env_var(key).ok().filter(|v| !v.is_empty());

        Some(Self {
            api_key: var("LF_API_KEY")?,
            client_id: var("LF_CLIENT_ID")?,
            client_secret: var("LF_CLIENT_SECRET")?,
            account_id: var("LF_ACCOUNT_ID"),
            api_host: var("LF_API_HOST"),
            auth_host: var("LF_AUTH_HOST"),
            retry: None,
            poll: None,
        })
    }

    /// Resolves the profile to use.
    ///
    /// Order: the explicit path, then the file named by `LF_PROFILE`, then the
    /// `LF_*` credential variables, then `<config dir>/lfapi/profile.json`.
    #[tracing::instrument(skip(runtime))]
    pub fn resolve<R: Runtime>(runtime: &R, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            debug!("Using profile from {:?}", path);
            return Self::load(runtime, path);
        }

        if let Ok(path) = runtime.env_var(PROFILE_ENV) {
            debug!("Using profile from {}={}", PROFILE_ENV, path);
            return Self::load(runtime, Path::new(&path));
        }

        if let Some(profile) = Self::from_env(runtime) {
            debug!("Using profile from LF_* environment variables");
            return Ok(profile);
        }

        let path = default_profile_path(runtime)?;
        if !runtime.exists(&path) {
            anyhow::bail!(
                "No profile found. Pass --profile, set {} or LF_API_KEY/LF_CLIENT_ID/LF_CLIENT_SECRET, or create {:?}.",
                PROFILE_ENV,
                path
            );
        }
        debug!("Using default profile at {:?}", path);
        Self::load(runtime, &path)
    }
}

pub fn default_profile_path<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let base = runtime
        .config_dir()
        .or_else(|| runtime.home_dir().map(|home| home.join(".config")))
        .context("Could not determine a configuration directory")?;
    Ok(base.join("lfapi").join("profile.json"))
}
