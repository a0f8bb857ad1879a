//! Pincode-driven address resolution for the registration form.
//!
//! Each completed 6-digit pincode is looked up and the first record's
//! district and state become the resolved city name and state. The city name
//! is then matched against the catalog (see [`crate::matching`]) to attach a
//! catalog id when one fits.

use fieldops_core::{City, LocationData, PincodeLookup};

use crate::matching::match_city;

pub const PINCODE_LEN: usize = 6;

/// A transient, dismissible message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    fn invalid_pincode() -> Self {
        Self {
            title: "Invalid Pincode".to_owned(),
            message: "The entered pincode is not valid. Please check and try again.".to_owned(),
        }
    }

    fn lookup_failed() -> Self {
        Self {
            title: "Error".to_owned(),
            message: "Failed to validate pincode. Please check your internet connection and try again."
                .to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PincodeOutcome {
    /// Fewer than 6 digits; nothing was looked up.
    Incomplete,
    Resolved,
    /// The lookup returned no records.
    Invalid(Notice),
    /// The lookup itself failed.
    Failed(Notice),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PincodeUpdate {
    /// Sanitized digits to show in the pincode field.
    pub pincode: String,
    pub outcome: PincodeOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationResolution {
    pub pincode: String,
    pub resolved_state: Option<String>,
    pub resolved_city_name: Option<String>,
    pub matched_city_id: Option<String>,
    /// Catalog spelling of the matched city.
    pub matched_city_name: Option<String>,
}

impl LocationResolution {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved_state.is_some()
    }

    fn clear_resolved(&mut self) {
        self.resolved_state = None;
        self.resolved_city_name = None;
        self.matched_city_id = None;
        self.matched_city_name = None;
    }

    /// Writes the resolution into the form's address block.
    ///
    /// The pincode is always copied. State and city are only written once a
    /// lookup resolved; the city id is cleared when no catalog city matched so
    /// a stale id from an earlier pincode is never submitted.
    pub fn apply_to(&self, data: &mut LocationData) {
        data.pincode.clone_from(&self.pincode);
        let Some(state) = &self.resolved_state else {
            return;
        };
        data.state.clone_from(state);
        if let Some(name) = self
            .matched_city_name
            .as_ref()
            .or(self.resolved_city_name.as_ref())
        {
            data.city_name.clone_from(name);
        }
        data.city_id = self.matched_city_id.clone().unwrap_or_default();
    }
}

/// Keeps ASCII digits only, at most six of them.
#[must_use]
pub fn sanitize_pincode(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(PINCODE_LEN)
        .collect()
}

pub struct LocationResolver<L> {
    lookup: L,
    catalog: Vec<City>,
    resolution: LocationResolution,
}

impl<L: PincodeLookup> LocationResolver<L> {
    #[must_use]
    pub fn new(lookup: L, catalog: Vec<City>) -> Self {
        Self {
            lookup,
            catalog,
            resolution: LocationResolution::default(),
        }
    }

    #[must_use]
    pub fn resolution(&self) -> &LocationResolution {
        &self.resolution
    }

    #[must_use]
    pub fn catalog(&self) -> &[City] {
        &self.catalog
    }

    /// Replaces the catalog used for matching. Existing resolutions are kept.
    pub fn set_catalog(&mut self, catalog: Vec<City>) {
        self.catalog = catalog;
    }

    /// Handles an edit of the pincode field.
    ///
    /// Lookup failures never escape: they are reported through the returned
    /// outcome and leave the resolved fields cleared with the digits retained.
    pub async fn on_pincode_changed(&mut self, raw: &str) -> PincodeUpdate {
        let pincode = sanitize_pincode(raw);
        self.resolution.pincode.clone_from(&pincode);
        self.resolution.clear_resolved();

        if pincode.len() < PINCODE_LEN {
            return PincodeUpdate {
                pincode,
                outcome: PincodeOutcome::Incomplete,
            };
        }

        let outcome = match self.lookup.lookup(&pincode).await {
            Ok(records) => match records.into_iter().next() {
                Some(record) => {
                    self.resolve(record.district, record.state);
                    PincodeOutcome::Resolved
                }
                None => {
                    tracing::warn!(%pincode, "pincode lookup returned no records");
                    PincodeOutcome::Invalid(Notice::invalid_pincode())
                }
            },
            Err(error) => {
                tracing::warn!(%pincode, %error, "pincode lookup failed");
                PincodeOutcome::Failed(Notice::lookup_failed())
            }
        };

        PincodeUpdate { pincode, outcome }
    }

    fn resolve(&mut self, city_name: String, state: String) {
        let matched = match_city(&self.catalog, &city_name, &state);
        tracing::debug!(
            pincode = %self.resolution.pincode,
            %city_name,
            %state,
            matched = matched.map(|m| m.city.id.as_str()),
            "pincode resolved"
        );
        self.resolution.matched_city_id = matched.map(|m| m.city.id.clone());
        self.resolution.matched_city_name = matched.map(|m| m.city.name.clone());
        self.resolution.resolved_city_name = Some(city_name);
        self.resolution.resolved_state = Some(state);
    }
}
