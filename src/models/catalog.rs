use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A recurring fetch job definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub id: u64,
    pub state: String,
    pub created_at: String,
    pub updated_at: String,
    pub client_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_times: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_params: Option<Value>,
}

/// A brand view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub dimensions: Value,
}

/// A named set of brand views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandSet {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    pub description: String,
    pub analysis_type: String,
    pub dataset_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Value>,
}
