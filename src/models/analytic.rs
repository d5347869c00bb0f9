use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::error::{LfError, Result};

/// A row keyed by column label.
pub type Row = Map<String, Value>;

/// Column metadata for analytic data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub name: String,
    pub class: String,
    pub data_type: String,
}

/// Which column attribute labels a row's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelMode {
    #[default]
    Id,
    Name,
}

impl FromStr for LabelMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(LabelMode::Id),
            "name" => Ok(LabelMode::Name),
            _ => anyhow::bail!("Unexpected label mode: {}. Expected id or name.", s),
        }
    }
}

/// One page of analytic data: column metadata plus positional records.
///
/// Returned by synchronous fetches and by each page url of a completed fetch job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticResponse {
    columns: Vec<Column>,
    records: Vec<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    has_more_pages: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    per_page: Option<u32>,
}

impl AnalyticResponse {
    pub fn new(columns: Vec<Column>, records: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            records,
            has_more_pages: None,
            page: None,
            per_page: None,
        }
    }

    pub fn with_more_pages(mut self, has_more_pages: bool) -> Self {
        self.has_more_pages = Some(has_more_pages);
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn records(&self) -> &[Vec<Value>] {
        &self.records
    }

    pub fn page(&self) -> Option<u32> {
        self.page
    }

    pub fn per_page(&self) -> Option<u32> {
        self.per_page
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Pages that don't report `has_more_pages` are treated as the last one.
    pub fn is_last_page(&self) -> bool {
        !self.has_more_pages.unwrap_or(false)
    }

    pub fn labels(&self, mode: LabelMode) -> Vec<&str> {
        self.columns
            .iter()
            .map(|c| match mode {
                LabelMode::Id => c.id.as_str(),
                LabelMode::Name => c.name.as_str(),
            })
            .collect()
    }

    /// Records as maps from column label to value, in column order.
    pub fn rows(&self, mode: LabelMode) -> Vec<Row> {
        let labels = self.labels(mode);
        self.records
            .iter()
            .map(|record| {
                labels
                    .iter()
                    .zip(record)
                    .map(|(label, value)| (label.to_string(), value.clone()))
                    .collect()
            })
            .collect()
    }

    /// Joins two pages with the same schema. Paging metadata is dropped.
    pub fn concat(&self, other: &AnalyticResponse) -> Result<AnalyticResponse> {
        if self.columns != other.columns {
            return Err(LfError::SchemaMismatch);
        }

        let mut records = self.records.clone();
        records.extend(other.records.iter().cloned());
        Ok(AnalyticResponse::new(self.columns.clone(), records))
    }
}
