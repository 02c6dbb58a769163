//! Coupon store administration
//!
//! Commands:
//! - init: create any missing document with its default contents
//! - reset: clear all claim counters and redemption history
//! - sync-catalog: replace the stored catalog with a local JSON file
//! - show: print the coupons as the API would serve them

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coupon_common::{default_catalog, project_coupons};
use redemption_service::{admin, CatalogRepository, ClaimsRepository, Config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "coupon-admin")]
#[command(about = "Administration for the coupon redemption store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create missing documents (catalog, claim counters, history)
    Init,

    /// Clear every claim counter and the redemption history
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Replace the stored catalog with a local JSON file
    SyncCatalog {
        /// Path to a JSON array of coupon definitions
        #[arg(default_value = "coupons.json")]
        file: PathBuf,
    },

    /// Print coupons with their current claim counts
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    let store = config.open_store().await?;

    match cli.command {
        Commands::Init => {
            let report = admin::initialize(&store, &default_catalog()).await?;
            println!("catalog created:  {}", report.catalog_created);
            println!("claims created:   {}", report.claims_created);
            println!("history created:  {}", report.history_created);
        }
        Commands::Reset { yes } => {
            if !yes {
                anyhow::bail!("Refusing to reset without --yes");
            }
            admin::reset(&store).await?;
            println!("All claim counts and history have been reset");
        }
        Commands::SyncCatalog { file } => {
            let count = admin::sync_catalog(&store, &file).await?;
            println!("Uploaded {} coupons from {}", count, file.display());
        }
        Commands::Show => {
            let catalog = CatalogRepository::new(store.clone(), default_catalog());
            let claims = ClaimsRepository::new(store).get_all().await?;
            let views = project_coupons(&catalog.list_active().await, &claims);
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
    }

    Ok(())
}
