//! Client for the ListenFirst analytics API.
//!
//! Synchronous queries are paged lazily with [`paging::sync_pages`]; large
//! queries run as server-side fetch jobs that are polled with
//! [`poller::FetchJobPoller`] and downloaded with [`paging::async_pages`].
//! Every wait goes through the retry envelope in [`retry`].

pub mod auth;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod paging;
pub mod poller;
pub mod retry;
pub mod runtime;

pub use client::{AnalyticsApi, Client};
pub use error::{LfError, Result};
