//! HTTP transport: sends requests and maps non-2xx responses to typed errors.

mod client;

pub use client::HttpClient;
pub(crate) use client::{check_status, decode_json};
