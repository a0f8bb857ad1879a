pub mod app_config;
pub mod catalog;
pub mod config;
pub mod items;
pub mod provider;
pub mod session;
pub mod validate;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use catalog::{load_city_catalog, CityCatalogFile};
pub use config::{load_app_config, load_app_config_from_env};
pub use items::{
    Area, AreaCity, AreaInputError, City, ListItem, LocationData, NewArea, Record,
};
pub use provider::{
    ListPage, ListProvider, ListRequest, PincodeLookup, PincodeRecord, PlaceSearch,
    PlaceSuggestion,
};
pub use session::Session;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read city catalog {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse city catalog: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}
