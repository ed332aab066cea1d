use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use gantry::revenue::ShippingPolicy;
use gantry_app::{context::AppContext, settings::PricingSettings};

mod cart;
mod fixture;
mod session;

#[derive(Debug, Parser)]
#[command(name = "gantry-app", about = "Gantry CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Fixture(fixture::FixtureCommand),
    Cart(cart::CartCommand),
    Session(session::SessionCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Fixture(command) => fixture::run(command),
            Commands::Cart(command) => cart::run(command).await,
            Commands::Session(command) => session::run(command).await,
        }
    }
}

/// Catalog fixture and pricing settings shared by the subcommands.
#[derive(Debug, Args)]
pub(crate) struct CatalogArgs {
    /// YAML catalog fixture
    #[arg(long, env = "CATALOG_FIXTURE")]
    fixture: PathBuf,

    /// ISO code of the settlement currency
    #[arg(long, env = "SETTLEMENT_CURRENCY", default_value = "SGD")]
    currency: String,

    /// Shared shipping allocation: even or proportional
    #[arg(long, env = "SHIPPING_SPLIT", default_value = "even")]
    shipping_split: ShippingPolicy,

    /// Bound on every store call, in milliseconds
    #[arg(long, env = "STORE_TIMEOUT_MS", default_value_t = 2_000)]
    store_timeout_ms: u64,
}

impl CatalogArgs {
    pub(crate) fn context(&self) -> Result<AppContext, String> {
        let settings = PricingSettings::new(
            &self.currency,
            self.shipping_split,
            Duration::from_millis(self.store_timeout_ms),
        )
        .map_err(|error| error.to_string())?;

        AppContext::from_fixture(&self.fixture, settings)
            .map_err(|error| format!("{error}: {}", self.fixture.display()))
    }
}
