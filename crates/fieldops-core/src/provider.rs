//! Contracts for the remote data sources the selection controls consume.
//!
//! Each trait is a thin async seam: the HTTP clients in `fieldops-api`
//! implement them for production, tests implement them with in-memory fakes.

use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::items::ListItem;

/// One page request against a paginated, searchable list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    /// Trimmed search text; `None` means unfiltered.
    pub search: Option<String>,
    /// Caller-supplied static filters appended verbatim.
    pub filters: BTreeMap<String, String>,
}

impl ListRequest {
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            search: None,
            filters: BTreeMap::new(),
        }
    }

    /// Sets the search term, dropping it when it trims to nothing.
    #[must_use]
    pub fn with_search(mut self, search: &str) -> Self {
        let trimmed = search.trim();
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }

    #[must_use]
    pub fn with_filters(mut self, filters: &BTreeMap<String, String>) -> Self {
        self.filters.extend(filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Query-string pairs in wire order: `page`, `limit`, `search`, then filters.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_owned(), self.page.to_string()),
            ("limit".to_owned(), self.limit.to_string()),
        ];
        if let Some(search) = &self.search {
            pairs.push(("search".to_owned(), search.clone()));
        }
        pairs.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }
}

/// Response envelope of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ListPage<T> {
    #[must_use]
    pub fn ok(data: Vec<T>, total: Option<u64>) -> Self {
        Self {
            success: true,
            data,
            total,
            message: None,
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Vec::new(),
            total: None,
            message: Some(message.into()),
        }
    }

    /// Total record count across all pages.
    ///
    /// Falls back to the size of this page when the endpoint omits `total`
    /// (or reports zero alongside data), which under-counts on non-final pages.
    #[must_use]
    pub fn total_or_len(&self) -> u64 {
        match self.total {
            Some(total) if total > 0 => total,
            _ => self.data.len() as u64,
        }
    }
}

/// A paginated, searchable remote list.
pub trait ListProvider: Send + Sync + 'static {
    type Item: ListItem;
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch_page(
        &self,
        request: ListRequest,
    ) -> impl Future<Output = Result<ListPage<Self::Item>, Self::Error>> + Send;
}

/// One candidate returned by a pincode lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PincodeRecord {
    #[serde(alias = "districtName", alias = "District")]
    pub district: String,
    #[serde(alias = "stateName", alias = "State")]
    pub state: String,
}

/// Resolves a 6-digit postal code to candidate district/state records.
///
/// An empty vector means the pincode is unknown.
pub trait PincodeLookup: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn lookup(
        &self,
        pincode: &str,
    ) -> impl Future<Output = Result<Vec<PincodeRecord>, Self::Error>> + Send;
}

/// A free-text place search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    pub id: String,
    /// Short name committed as the area text when chosen.
    pub name: String,
    pub display_name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Country-restricted free-text place search.
pub trait PlaceSearch: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<PlaceSuggestion>, Self::Error>> + Send;
}
