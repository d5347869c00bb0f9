use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Lifecycle state of a fetch job as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchJobState {
    Pending,
    InProgress,
    Running,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl FetchJobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FetchJobState::Completed | FetchJobState::Failed)
    }
}

impl fmt::Display for FetchJobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchJobState::Pending => "pending",
            FetchJobState::InProgress => "in_progress",
            FetchJobState::Running => "running",
            FetchJobState::Completed => "completed",
            FetchJobState::Failed => "failed",
            FetchJobState::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Snapshot of a server-side asynchronous query.
///
/// A snapshot is never updated in place; fetch a new one with
/// `show_fetch_job` or wait for a terminal one with the poller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchJob {
    pub id: u64,
    pub state: FetchJobState,
    pub created_at: String,
    pub updated_at: String,
    pub client_context: Option<String>,
    pub schedule_config_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_cost: Option<Value>,
}

impl FetchJob {
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn is_completed(&self) -> bool {
        self.state == FetchJobState::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.state == FetchJobState::Failed
    }
}
