//! `validate` command: offline format checks for registration form fields.

use fieldops_core::validate::{is_valid_email, is_valid_gstin, is_valid_pan, is_valid_phone};

/// Checks each supplied field and prints one line per field.
///
/// # Errors
///
/// Returns an error when no field was supplied or any field is invalid.
pub(crate) fn run_validate(
    phone: Option<&str>,
    email: Option<&str>,
    pan: Option<&str>,
    gstin: Option<&str>,
) -> anyhow::Result<()> {
    let checks: [(&str, Option<&str>, fn(&str) -> bool); 4] = [
        ("phone", phone, is_valid_phone),
        ("email", email, is_valid_email),
        ("pan", pan, is_valid_pan),
        ("gstin", gstin, is_valid_gstin),
    ];

    let results = check_fields(&checks);
    if results.is_empty() {
        anyhow::bail!("nothing to validate; pass --phone, --email, --pan or --gstin");
    }

    let mut invalid = 0;
    for (field, value, ok) in &results {
        println!("{field:<7}{value:<24}{}", if *ok { "valid" } else { "INVALID" });
        if !ok {
            invalid += 1;
        }
    }

    if invalid > 0 {
        anyhow::bail!("{invalid} field(s) invalid");
    }
    Ok(())
}

/// Runs the checks for supplied fields. PAN and GSTIN are upper-cased first.
fn check_fields<'a>(
    checks: &[(&'a str, Option<&'a str>, fn(&str) -> bool)],
) -> Vec<(&'a str, String, bool)> {
    checks
        .iter()
        .filter_map(|(field, value, check)| {
            let value = (*value)?.trim();
            let value = if matches!(*field, "pan" | "gstin") {
                value.to_uppercase()
            } else {
                value.to_owned()
            };
            let ok = check(&value);
            Some((*field, value, ok))
        })
        .collect()
}
