use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameters of an analytic query.
///
/// `dataset_id`, `start_date`, `end_date` and `filters` are required by the
/// API. Keys this struct doesn't model are kept in `extra` and sent as is.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FetchParams {
    pub dataset_id: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meta_dimensions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FetchParams {
    pub fn new(
        dataset_id: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            ..Self::default()
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn metric(mut self, metric: impl Into<String>) -> Self {
        self.metrics.push(metric.into());
        self
    }

    pub fn group_by(mut self, field: impl Into<String>) -> Self {
        self.group_by.push(field.into());
        self
    }

    pub fn meta_dimension(mut self, field: impl Into<String>) -> Self {
        self.meta_dimensions.push(field.into());
        self
    }

    pub fn sort(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    /// Copy of these parameters addressed at a specific page.
    pub fn for_page(&self, page: u32, per_page: Option<u32>) -> Self {
        let mut params = self.clone();
        params.page = Some(page);
        if per_page.is_some() {
            params.per_page = per_page;
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub operator: String,
    pub values: Vec<Value>,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            values,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: String,
    pub dir: SortDirection,
}

/// Body of a fetch job creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchJobRequest {
    pub fetch_params: FetchParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_to: Option<Vec<String>>,
}

impl FetchJobRequest {
    pub fn new(fetch_params: FetchParams) -> Self {
        Self {
            fetch_params,
            client_context: None,
            max_rows: None,
            email_to: None,
        }
    }
}

/// Body of a schedule config creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfigRequest {
    pub fetch_params: FetchParams,
    pub cron_expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_times: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_to: Option<Vec<String>>,
}
