//! Input format checks used by the channel registration and bank detail forms.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("valid phone regex"));

static PAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{3}[PCTHFABLGJ][A-Z][0-9]{4}[A-Z]$").expect("valid PAN regex")
});

static GSTIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-3][0-9][A-Z]{3}[PCTHFABLGJ][A-Z][0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$")
        .expect("valid GSTIN regex")
});

#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Ten-digit mobile number, no country prefix.
#[must_use]
pub fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

/// Permanent Account Number. Expects upper-case input.
#[must_use]
pub fn is_valid_pan(value: &str) -> bool {
    PAN_RE.is_match(value)
}

/// GST identification number. Expects upper-case input.
#[must_use]
pub fn is_valid_gstin(value: &str) -> bool {
    GSTIN_RE.is_match(value)
}
