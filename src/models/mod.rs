//! Typed views over ListenFirst API response bodies.
//!
//! Single-object endpoints wrap their payload as `{"record": {...}}` and list
//! endpoints as `{"records": [...], ...}`. Analytic data (synchronous fetches
//! and fetch job pages) is returned unwrapped as an [`AnalyticResponse`].

mod analytic;
mod catalog;
mod fetch_job;
mod query;

use serde::{Deserialize, Serialize};

pub use analytic::{AnalyticResponse, Column, LabelMode, Row};
pub use catalog::{Brand, BrandSet, Dataset, ScheduleConfig};
pub use fetch_job::{FetchJob, FetchJobState};
pub use query::{
    FetchJobRequest, FetchParams, Filter, ScheduleConfigRequest, SortDirection, SortOrder,
};

/// Envelope for endpoints returning a single object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub record: T,
}

/// Envelope for endpoints returning a list of objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordList<T> {
    pub records: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_more_pages: Option<bool>,
}

impl<T> RecordList<T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_last_page(&self) -> bool {
        !self.has_more_pages.unwrap_or(false)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    /// Appends the records of `other`, keeping the paging metadata of `self`.
    pub fn concat(mut self, other: RecordList<T>) -> Self {
        self.records.extend(other.records);
        self
    }
}

impl<T> IntoIterator for RecordList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_list_envelope() {
        let list: RecordList<BrandSet> = serde_json::from_str(
            r#"{
                "records": [{"id": 1, "name": "My Brands"}, {"id": 2, "name": "Rivals"}],
                "page": 1,
                "per_page": 2,
                "has_more_pages": true
            }"#,
        )
        .unwrap();

        assert_eq!(list.len(), 2);
        assert!(!list.is_last_page());
        assert_eq!(list.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_record_list_without_paging_is_last_page() {
        let list: RecordList<BrandSet> = serde_json::from_str(r#"{"records": []}"#).unwrap();
        assert!(list.is_empty());
        assert!(list.is_last_page());
    }

    #[test]
    fn test_record_list_requires_records() {
        let result: Result<RecordList<BrandSet>, _> = serde_json::from_str(r#"{"page": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_record_list_concat() {
        let a: RecordList<BrandSet> =
            serde_json::from_str(r#"{"records": [{"id": 1, "name": "a"}]}"#).unwrap();
        let b: RecordList<BrandSet> =
            serde_json::from_str(r#"{"records": [{"id": 2, "name": "b"}]}"#).unwrap();

        let joined = a.concat(b);
        let names: Vec<String> = joined.into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
