//! Pincode lookup against an India Post style endpoint.
//!
//! `GET {base}/pincode/{pin}` answers with a one-element array whose
//! `PostOffice` list holds every post office sharing that pincode:
//!
//! ```text
//! [{"Message": "Number of pincode(s) found:7", "Status": "Success",
//!   "PostOffice": [{"Name": "Shivajinagar", "District": "Pune", "State": "Maharashtra"}]}]
//! ```
//!
//! Unknown pincodes come back as `"Status": "Error"` with `"PostOffice": null`,
//! which this client reports as an empty result rather than an error.

use std::time::Duration;

use fieldops_core::{PincodeLookup, PincodeRecord};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::client::normalise_base_url;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PincodeBatch {
    #[serde(default)]
    status: String,
    #[serde(default)]
    post_office: Option<Vec<PincodeRecord>>,
}

pub struct PincodeClient {
    client: Client,
    base_url: Url,
}

impl PincodeClient {
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`ApiError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: normalise_base_url(base_url)?,
        })
    }

    fn lookup_url(&self, pincode: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(&format!("pincode/{pincode}"))
            .map_err(|e| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Fetches every district/state record for `pincode`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] on network failure or non-2xx status.
    /// - [`ApiError::Deserialize`] if the body is not the expected array shape.
    pub async fn fetch(&self, pincode: &str) -> Result<Vec<PincodeRecord>, ApiError> {
        let url = self.lookup_url(pincode)?;
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        let batches: Vec<PincodeBatch> =
            serde_json::from_str(&body).map_err(|e| ApiError::Deserialize {
                context: format!("pincode lookup {pincode}"),
                source: e,
            })?;

        let records: Vec<PincodeRecord> = batches
            .into_iter()
            .filter(|b| b.status.eq_ignore_ascii_case("success"))
            .filter_map(|b| b.post_office)
            .flatten()
            .collect();

        tracing::debug!(pincode, count = records.len(), "pincode lookup complete");
        Ok(records)
    }
}

impl PincodeLookup for PincodeClient {
    type Error = ApiError;

    async fn lookup(&self, pincode: &str) -> Result<Vec<PincodeRecord>, ApiError> {
        self.fetch(pincode).await
    }
}
