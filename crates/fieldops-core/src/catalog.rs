use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::items::City;
use crate::ConfigError;

#[derive(Debug, Deserialize)]
pub struct CityCatalogFile {
    pub cities: Vec<City>,
}

/// Load and validate a city catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_city_catalog(path: &Path) -> Result<CityCatalogFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_city_catalog(&content)
}

fn parse_city_catalog(content: &str) -> Result<CityCatalogFile, ConfigError> {
    let catalog: CityCatalogFile = serde_yaml::from_str(content)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

fn validate_catalog(catalog: &CityCatalogFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for city in &catalog.cities {
        if city.id.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "city '{}' has an empty id",
                city.name
            )));
        }

        if city.name.trim().is_empty() || city.state.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "city '{}' must have a non-empty name and state",
                city.id
            )));
        }

        if !seen_ids.insert(city.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate city id: '{}'",
                city.id
            )));
        }
    }

    Ok(())
}
