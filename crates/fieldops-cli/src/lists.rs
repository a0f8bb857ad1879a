//! `cities` and `areas` commands: drive the search-select control against the
//! backend list endpoints and print what it would show.

use std::collections::BTreeMap;
use std::sync::Arc;

use fieldops_api::FieldOpsClient;
use fieldops_core::{AppConfig, Area, City, ListProvider};
use fieldops_select::{ListStatus, SearchSelect, SelectOptions};

fn select_options(
    config: &AppConfig,
    filters: BTreeMap<String, String>,
    no_data_message: &str,
) -> SelectOptions {
    SelectOptions {
        page_size: config.page_size,
        debounce: config.debounce(),
        filters,
        no_data_message: no_data_message.to_owned(),
        ..SelectOptions::default()
    }
}

fn build_client(config: &AppConfig) -> anyhow::Result<Arc<FieldOpsClient>> {
    let client = FieldOpsClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build FieldOps client: {e}"))?;
    Ok(Arc::new(client))
}

/// List cities, optionally searching and paging.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the list ends in the
/// error state.
pub(crate) async fn run_cities(
    config: &AppConfig,
    search: Option<&str>,
    pages: u32,
) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let select = SearchSelect::new(
        Arc::new(client.cities()),
        select_options(config, BTreeMap::new(), "No cities found"),
    )
    .with_formatter(City::list_label);
    browse(select, search, pages).await
}

/// List areas, optionally restricted to one city.
///
/// # Errors
///
/// Same as [`run_cities`].
pub(crate) async fn run_areas(
    config: &AppConfig,
    city_id: Option<&str>,
    search: Option<&str>,
    pages: u32,
) -> anyhow::Result<()> {
    let client = build_client(config)?;
    let mut filters = BTreeMap::new();
    if let Some(city_id) = city_id {
        filters.insert("cityId".to_owned(), city_id.to_owned());
    }
    let select = SearchSelect::new(
        Arc::new(client.areas()),
        select_options(config, filters, "No areas found"),
    )
    .with_formatter(Area::list_label);
    browse(select, search, pages).await
}

async fn browse<P: ListProvider>(
    mut select: SearchSelect<P>,
    search: Option<&str>,
    pages: u32,
) -> anyhow::Result<()> {
    select.open();
    select.settle().await;

    if let Some(search) = search {
        select.set_query(search);
        select.settle().await;
    }

    for _ in 1..pages {
        if !select.load_more() {
            break;
        }
        select.settle().await;
    }

    match select.status() {
        ListStatus::Error(message) => anyhow::bail!("{message}"),
        ListStatus::Empty(message) => {
            println!("{message}");
            return Ok(());
        }
        ListStatus::Loading | ListStatus::Ready | ListStatus::Closed => {}
    }

    println!("{:<28}LABEL", "ID");
    for option in select.options() {
        println!("{:<28}{}", option.id, option.label.replace('\n', " / "));
    }

    println!();
    println!(
        "{} of {} loaded (page {} of {})",
        select.items().len(),
        select.total_count(),
        select.page(),
        select.total_pages()
    );
    if let Some(label) = select.load_more_label() {
        println!("{label}");
    }
    if let Some(error) = select.error_message() {
        println!("last page failed: {error}");
    }

    Ok(())
}
