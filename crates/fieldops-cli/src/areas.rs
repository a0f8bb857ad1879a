//! `add-area` command.

use fieldops_api::FieldOpsClient;
use fieldops_core::{AppConfig, NewArea};

/// Create an area under `city_id`.
///
/// When `dry_run` is `true` the request is validated and printed without
/// being sent.
///
/// # Errors
///
/// Returns an error if the input fails validation, the client cannot be
/// built, the request fails, or the backend rejects the area.
pub(crate) async fn run_add_area(
    config: &AppConfig,
    name: &str,
    city_id: &str,
    dry_run: bool,
) -> anyhow::Result<()> {
    let area = NewArea::new(name, city_id)?;

    if dry_run {
        println!("dry-run: would create area '{}' in city {}", area.name, area.city_id);
        return Ok(());
    }

    let client = FieldOpsClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build FieldOps client: {e}"))?;
    let ack = client.create_area(&area).await?;
    if !ack.success {
        anyhow::bail!(
            "area not created: {}",
            ack.message.as_deref().unwrap_or("Failed to create area")
        );
    }

    tracing::info!(area = %area.name, city_id = %area.city_id, "area created");
    println!(
        "{}",
        ack.message.as_deref().unwrap_or("Area created successfully")
    );
    Ok(())
}
