//! HTTP client for the FieldOps backend.
//!
//! Wraps `reqwest` with session headers, envelope interpretation
//! ([`crate::envelope::interpret`]) and transient-error retries. List
//! endpoints are exposed both as inherent methods and as [`ListEndpoint`]
//! values implementing [`ListProvider`] so they can back a search-select control.

use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use fieldops_core::{
    AppConfig, Area, City, ListItem, ListPage, ListProvider, ListRequest, NewArea, Session,
};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::envelope;
use crate::error::ApiError;
use crate::retry::retry_with_backoff;

const CITIES_PATH: &str = "city";
const AREAS_PATH: &str = "areas";

/// Upper bound on pages walked by [`FieldOpsClient::fetch_city_catalog`].
/// Guards against endpoints that keep reporting a larger total than they serve.
const MAX_CATALOG_PAGES: u32 = 200;

/// Acknowledgement returned by write endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Client for the FieldOps REST backend.
///
/// Use [`FieldOpsClient::new`] with an explicit [`Session`]; tests point
/// `base_url` at a wiremock server.
pub struct FieldOpsClient {
    client: Client,
    base_url: Url,
    session: Session,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl FieldOpsClient {
    /// Creates a client for `base_url` speaking on behalf of `session`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot be
    /// constructed, or [`ApiError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(
        base_url: &str,
        session: Session,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: normalise_base_url(base_url)?,
            session,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Builds a client from application configuration.
    ///
    /// # Errors
    ///
    /// Same as [`FieldOpsClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        Self::new(
            &config.api_base_url,
            Session::from_config(config),
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_ms,
        )
    }

    /// Fetches one page from a list endpoint.
    ///
    /// An envelope with `"success": false` is returned as-is, not as an error;
    /// the selection control turns it into its own error state.
    ///
    /// # Errors
    ///
    /// - [`ApiError::SessionRevoked`], [`ApiError::SessionExpired`],
    ///   [`ApiError::AppUpdateRequired`] for the backend's session/version messages.
    /// - [`ApiError::Http`] / [`ApiError::UnexpectedStatus`] after retries are exhausted.
    /// - [`ApiError::Deserialize`] if the envelope does not match `ListPage<T>`.
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        request: &ListRequest,
    ) -> Result<ListPage<T>, ApiError> {
        let url = self.build_url(path, &request.query_pairs())?;
        let context = format!("GET /{path} (page {})", request.page);
        let body = self.get_json(&url, &context).await?;
        serde_json::from_value(body).map_err(|e| ApiError::Deserialize { context, source: e })
    }

    /// Lists cities (`GET /city`).
    ///
    /// # Errors
    ///
    /// See [`FieldOpsClient::list`].
    pub async fn list_cities(&self, request: &ListRequest) -> Result<ListPage<City>, ApiError> {
        self.list(CITIES_PATH, request).await
    }

    /// Lists areas (`GET /areas`). Each area embeds its parent city.
    ///
    /// # Errors
    ///
    /// See [`FieldOpsClient::list`].
    pub async fn list_areas(&self, request: &ListRequest) -> Result<ListPage<Area>, ApiError> {
        self.list(AREAS_PATH, request).await
    }

    /// Creates a new area under a city (`POST /areas`).
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`FieldOpsClient::list`]. An unsuccessful envelope is
    /// returned as an [`Ack`] with `success == false`.
    pub async fn create_area(&self, area: &NewArea) -> Result<Ack, ApiError> {
        let url = self.build_url(AREAS_PATH, &[])?;
        let context = "POST /areas".to_owned();

        // Writes are not retried: a timed-out POST may still have landed.
        let response = self
            .authorized(self.client.post(url))
            .json(area)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        let value = envelope::interpret(status, &body, &context)?;
        serde_json::from_value(value).map_err(|e| ApiError::Deserialize { context, source: e })
    }

    /// Walks `GET /city` page by page and returns every city, de-duplicated by id.
    ///
    /// Stops when a page comes back empty, the reported total is reached, or
    /// [`MAX_CATALOG_PAGES`] pages have been read. An unsuccessful envelope
    /// ends the walk with what was collected so far.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`FieldOpsClient::list_cities`].
    pub async fn fetch_city_catalog(&self, page_size: u32) -> Result<Vec<City>, ApiError> {
        let mut cities: Vec<City> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for page in 1..=MAX_CATALOG_PAGES {
            let response = self
                .list_cities(&ListRequest::new(page, page_size))
                .await?;
            if !response.success {
                tracing::warn!(
                    page,
                    message = response.message.as_deref().unwrap_or(""),
                    "city catalog page rejected; keeping partial catalog"
                );
                break;
            }

            let total = response.total_or_len();
            if response.data.is_empty() {
                break;
            }
            for city in response.data {
                if seen.insert(city.id().to_owned()) {
                    cities.push(city);
                }
            }

            if cities.len() as u64 >= total {
                break;
            }
        }

        tracing::debug!(count = cities.len(), "fetched city catalog");
        Ok(cities)
    }

    /// Returns the city list as a [`ListProvider`].
    #[must_use]
    pub fn cities(self: &Arc<Self>) -> ListEndpoint<City> {
        ListEndpoint::new(Arc::clone(self), CITIES_PATH)
    }

    /// Returns the area list as a [`ListProvider`].
    #[must_use]
    pub fn areas(self: &Arc<Self>) -> ListEndpoint<Area> {
        ListEndpoint::new(Arc::clone(self), AREAS_PATH)
    }

    /// Joins `path` onto the base URL and appends percent-encoded query pairs.
    fn build_url(&self, path: &str, query: &[(String, String)]) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder
            .header(reqwest::header::ACCEPT, "application/json")
            .header("X-App-Version", &self.session.app_version);
        match self.session.bearer() {
            Some(bearer) => builder.header(reqwest::header::AUTHORIZATION, bearer),
            None => builder,
        }
    }

    /// Sends a GET with retries and interprets the envelope.
    async fn get_json(&self, url: &Url, context: &str) -> Result<serde_json::Value, ApiError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self.authorized(self.client.get(url)).send().await?;
                let status = response.status();
                let body = response.text().await?;
                envelope::interpret(status, &body, context)
            }
        })
        .await
    }
}

/// Ensures the base URL ends with exactly one slash so relative joins append
/// rather than replace the last path segment.
pub(crate) fn normalise_base_url(base_url: &str) -> Result<Url, ApiError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| ApiError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })
}

/// A single list endpoint of the backend, usable as a [`ListProvider`].
pub struct ListEndpoint<T> {
    client: Arc<FieldOpsClient>,
    path: &'static str,
    _item: PhantomData<fn() -> T>,
}

impl<T> ListEndpoint<T> {
    #[must_use]
    pub fn new(client: Arc<FieldOpsClient>, path: &'static str) -> Self {
        Self {
            client,
            path,
            _item: PhantomData,
        }
    }
}

impl<T> ListProvider for ListEndpoint<T>
where
    T: ListItem + DeserializeOwned,
{
    type Item = T;
    type Error = ApiError;

    async fn fetch_page(&self, request: ListRequest) -> Result<ListPage<T>, ApiError> {
        self.client.list(self.path, &request).await
    }
}
