mod areas;
mod lists;
mod location;
mod validate;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fieldops-cli")]
#[command(about = "FieldOps field-operations command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse the city list through the paginated search-select control
    Cities {
        /// Search text, applied after the debounce delay
        #[arg(long)]
        search: Option<String>,
        /// Number of pages to load
        #[arg(long, default_value = "1")]
        pages: u32,
    },
    /// Browse the area list, optionally restricted to one city
    Areas {
        /// Only list areas of this city
        #[arg(long)]
        city_id: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "1")]
        pages: u32,
    },
    /// Resolve a pincode to state, city and catalog city id
    Pincode {
        pincode: String,
        /// YAML city catalog; falls back to `FIELDOPS_CITY_CATALOG_PATH`,
        /// then to the backend city list
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Suggest area names for free text
    Suggest { text: String },
    /// Create an area under a city
    AddArea {
        #[arg(long)]
        name: String,
        #[arg(long)]
        city_id: String,
        /// Validate and print the request without sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// Check registration form fields
    Validate {
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        pan: Option<String>,
        #[arg(long)]
        gstin: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Cities { search, pages }) => {
            let config = init()?;
            lists::run_cities(&config, search.as_deref(), pages).await?;
        }
        Some(Commands::Areas {
            city_id,
            search,
            pages,
        }) => {
            let config = init()?;
            lists::run_areas(&config, city_id.as_deref(), search.as_deref(), pages).await?;
        }
        Some(Commands::Pincode { pincode, catalog }) => {
            let config = init()?;
            location::run_pincode(&config, &pincode, catalog).await?;
        }
        Some(Commands::Suggest { text }) => {
            let config = init()?;
            location::run_suggest(&config, &text).await?;
        }
        Some(Commands::AddArea {
            name,
            city_id,
            dry_run,
        }) => {
            let config = init()?;
            areas::run_add_area(&config, &name, &city_id, dry_run).await?;
        }
        // Offline; works without a configured backend.
        Some(Commands::Validate {
            phone,
            email,
            pan,
            gstin,
        }) => {
            tracing_subscriber::fmt::init();
            validate::run_validate(
                phone.as_deref(),
                email.as_deref(),
                pan.as_deref(),
                gstin.as_deref(),
            )?;
        }
        None => println!("fieldops-cli ready; run with --help for commands"),
    }

    Ok(())
}

/// Loads configuration and installs the tracing subscriber.
///
/// `RUST_LOG` wins over `FIELDOPS_LOG_LEVEL`.
fn init() -> anyhow::Result<fieldops_core::AppConfig> {
    let config = fieldops_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(config)
}
