//! `pincode` and `suggest` commands.

use std::path::PathBuf;
use std::sync::Arc;

use fieldops_api::{FieldOpsClient, PincodeClient, PlaceSearchClient};
use fieldops_core::{load_city_catalog, AppConfig, City};
use fieldops_select::{AreaSuggester, LocationResolver, PincodeOutcome, SuggestEvent};

const CATALOG_PAGE_SIZE: u32 = 100;

async fn load_catalog(config: &AppConfig, path: Option<PathBuf>) -> anyhow::Result<Vec<City>> {
    if let Some(path) = path.or_else(|| config.city_catalog_path.clone()) {
        let catalog = load_city_catalog(&path)?;
        tracing::debug!(path = %path.display(), cities = catalog.cities.len(), "loaded city catalog file");
        return Ok(catalog.cities);
    }

    let client = FieldOpsClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build FieldOps client: {e}"))?;
    let cities = client.fetch_city_catalog(CATALOG_PAGE_SIZE).await?;
    tracing::debug!(cities = cities.len(), "fetched city catalog from backend");
    Ok(cities)
}

/// Resolve a pincode and match it against the city catalog.
///
/// An unknown pincode or a failed lookup is reported to the user, not
/// returned as an error.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or the pincode client
/// cannot be built.
pub(crate) async fn run_pincode(
    config: &AppConfig,
    pincode: &str,
    catalog: Option<PathBuf>,
) -> anyhow::Result<()> {
    let cities = load_catalog(config, catalog).await?;
    let lookup = PincodeClient::new(
        &config.pincode_api_url,
        config.request_timeout_secs,
        &config.user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build pincode client: {e}"))?;

    let mut resolver = LocationResolver::new(lookup, cities);
    let update = resolver.on_pincode_changed(pincode).await;

    match update.outcome {
        PincodeOutcome::Incomplete => {
            println!("pincode '{}' is incomplete; 6 digits required", update.pincode);
        }
        PincodeOutcome::Invalid(notice) | PincodeOutcome::Failed(notice) => {
            println!("{}: {}", notice.title, notice.message);
        }
        PincodeOutcome::Resolved => {
            let res = resolver.resolution();
            println!("Pincode: {}", res.pincode);
            println!("State:   {}", res.resolved_state.as_deref().unwrap_or_default());
            println!("City:    {}", res.resolved_city_name.as_deref().unwrap_or_default());
            match (&res.matched_city_id, &res.matched_city_name) {
                (Some(id), Some(name)) => println!("Catalog: {name} ({id})"),
                _ => println!("Catalog: no matching city"),
            }
        }
    }

    Ok(())
}

/// Print area-name suggestions for `text`.
///
/// # Errors
///
/// Returns an error if the place search client cannot be built or the search
/// fails.
pub(crate) async fn run_suggest(config: &AppConfig, text: &str) -> anyhow::Result<()> {
    let search = PlaceSearchClient::new(
        &config.places_api_url,
        &config.places_country,
        config.request_timeout_secs,
        &config.user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build place search client: {e}"))?;

    let mut suggester = AreaSuggester::new(Arc::new(search), config.debounce());
    suggester.set_text(text);
    for event in suggester.settle().await {
        if let SuggestEvent::Failed { message } = event {
            anyhow::bail!("place search failed: {message}");
        }
    }

    if suggester.candidates().is_empty() {
        println!("no suggestions (queries need at least 3 characters)");
        return Ok(());
    }

    println!("{:<14}{:<24}DISPLAY NAME", "ID", "NAME");
    for place in suggester.candidates() {
        println!("{:<14}{:<24}{}", place.id, place.name, place.display_name);
    }

    Ok(())
}
