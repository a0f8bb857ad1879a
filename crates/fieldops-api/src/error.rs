use thiserror::Error;

/// Errors returned by the FieldOps HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The token was invalidated by a login on another device.
    #[error("You have logged in on another device")]
    SessionRevoked,

    #[error("Your session has expired")]
    SessionExpired,

    /// The backend refuses this client version.
    #[error("{}", update_notice(.version.as_deref()))]
    AppUpdateRequired { version: Option<String> },

    #[error("unexpected HTTP status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

fn update_notice(version: Option<&str>) -> String {
    match version {
        Some(v) => format!(
            "A newer version ({v}) of the app is available. Please update to continue."
        ),
        None => "A newer version of the app is available. Please update to continue.".to_owned(),
    }
}
