//! Records served by the FieldOps list endpoints and the form payloads built
//! from them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A remotely fetched record that can appear in a search-select list.
///
/// Only `id` is required. It must be unique within one result set and stable
/// across pages, since it is the de-duplication key when pages are merged.
pub trait ListItem: Clone + Send + 'static {
    fn id(&self) -> &str;

    /// Primary name used by the default label formatter.
    fn name(&self) -> Option<&str> {
        None
    }
}

/// Untyped list record: an `id` plus whatever attributes the endpoint sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    /// String attribute by name; non-string values are ignored.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(serde_json::Value::as_str)
    }
}

impl ListItem for Record {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> Option<&str> {
        self.field("name")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: String,
    pub name: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
}

impl City {
    /// Two-line list label: `"Pune\nMaharashtra"`.
    #[must_use]
    pub fn list_label(&self) -> String {
        format!("{}\n{}", self.name, self.state)
    }
}

impl ListItem for City {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// Parent city as embedded in an area record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaCity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_id: Option<String>,
    pub city: AreaCity,
}

impl Area {
    /// Two-line list label: `"Kothrud\nPune, Maharashtra"`.
    #[must_use]
    pub fn list_label(&self) -> String {
        format!("{}\n{}, {}", self.name, self.city.name, self.city.state)
    }

    /// Single-line label committed to the form once selected.
    #[must_use]
    pub fn composite_label(&self) -> String {
        format!("{}, {}, {}", self.name, self.city.name, self.city.state)
    }
}

impl ListItem for Area {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// Body for `POST /areas`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArea {
    pub name: String,
    pub city_id: String,
}

/// A required field of the add-area form left blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AreaInputError {
    #[error("Please enter area name")]
    MissingName,
    #[error("Please select a city")]
    MissingCity,
}

impl NewArea {
    /// Trims the area name and checks that both fields are filled in.
    ///
    /// # Errors
    ///
    /// Returns the first missing field; its `Display` is the form message.
    pub fn new(name: &str, city_id: &str) -> Result<Self, AreaInputError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AreaInputError::MissingName);
        }
        if city_id.trim().is_empty() {
            return Err(AreaInputError::MissingCity);
        }
        Ok(Self {
            name: name.to_owned(),
            city_id: city_id.to_owned(),
        })
    }
}

/// Address block of the channel registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    pub address: String,
    pub city_id: String,
    pub city_name: String,
    pub pincode: String,
    pub state: String,
}
