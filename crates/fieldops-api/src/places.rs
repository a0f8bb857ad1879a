//! Free-text place search against a Nominatim-compatible endpoint.

use std::time::Duration;

use fieldops_core::{PlaceSearch, PlaceSuggestion};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::client::normalise_base_url;
use crate::error::ApiError;

/// One hit of `GET /search?format=jsonv2`. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    place_id: u64,
    #[serde(default)]
    name: String,
    display_name: String,
    lat: String,
    lon: String,
}

impl NominatimPlace {
    fn into_suggestion(self) -> PlaceSuggestion {
        // Unnamed features (roads, postcodes) fall back to the first
        // component of the display name.
        let name = if self.name.trim().is_empty() {
            self.display_name
                .split(',')
                .next()
                .unwrap_or_default()
                .trim()
                .to_owned()
        } else {
            self.name
        };
        PlaceSuggestion {
            id: self.place_id.to_string(),
            name,
            display_name: self.display_name,
            lat: self.lat.parse().unwrap_or_default(),
            lon: self.lon.parse().unwrap_or_default(),
        }
    }
}

pub struct PlaceSearchClient {
    client: Client,
    base_url: Url,
    country: String,
}

impl PlaceSearchClient {
    /// `country` is an ISO 3166-1 alpha-2 code restricting results (e.g. `"in"`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`ApiError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        country: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: normalise_base_url(base_url)?,
            country: country.to_lowercase(),
        })
    }

    fn search_url(&self, query: &str, limit: usize) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join("search")
            .map_err(|e| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "jsonv2")
            .append_pair("countrycodes", &self.country)
            .append_pair("limit", &limit.to_string());
        Ok(url)
    }

    /// Searches for places matching `query`, at most `limit` results.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] on network failure or non-2xx status.
    /// - [`ApiError::Deserialize`] if the body is not a list of places.
    pub async fn find(&self, query: &str, limit: usize) -> Result<Vec<PlaceSuggestion>, ApiError> {
        let url = self.search_url(query, limit)?;
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        let places: Vec<NominatimPlace> =
            serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
                context: format!("place search '{query}'"),
                source: e,
            })?;

        Ok(places
            .into_iter()
            .take(limit)
            .map(NominatimPlace::into_suggestion)
            .collect())
    }
}

impl PlaceSearch for PlaceSearchClient {
    type Error = ApiError;

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<PlaceSuggestion>, ApiError> {
        self.find(query, limit).await
    }
}
