//! Command-line operations. Each command prints JSON on stdout.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

use crate::{models::FetchParams, runtime::Runtime};

pub mod config;
mod catalog;
mod export;
mod job;
mod query;

pub use catalog::{
    brand_list, brand_set_list, brand_set_show, brand_show, dataset_list, dataset_show,
    field_values, schedule_create, schedule_list, schedule_show,
};
pub use job::{job_latest, job_list, job_pages, job_poll, job_show};
pub use query::{FetchJobOptions, fetch, fetch_job};

/// Query string parameters for list endpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query(Vec<(String, String)>);

impl Query {
    pub fn new(page: Option<u32>, per_page: Option<u32>, params: Vec<(String, String)>) -> Self {
        let mut pairs = Vec::new();
        if let Some(page) = page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(per_page) = per_page {
            pairs.push(("per_page".to_string(), per_page.to_string()));
        }
        pairs.extend(params);
        Self(pairs)
    }

    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }
}

/// Parses `KEY=VALUE` as given to `--param`.
pub fn parse_key_value(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .with_context(|| format!("Invalid parameter '{}': expected KEY=VALUE", s))?;
    if key.is_empty() {
        anyhow::bail!("Invalid parameter '{}': empty key", s);
    }
    Ok((key.to_string(), value.to_string()))
}

/// Reads query parameters from a JSON file.
pub(crate) fn load_fetch_params<R: Runtime>(runtime: &R, path: &Path) -> Result<FetchParams> {
    let content = runtime.read_to_string(path)?;
    serde_json::from_str(&content).with_context(|| format!("Invalid fetch params in {:?}", path))
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
