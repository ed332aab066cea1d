//! Stores Config

use std::{path::PathBuf, time::Duration};

use clap::Args;
use gantry::revenue::ShippingPolicy;
use gantry_app::settings::{PricingSettings, SettingsError};

/// Store backend and pricing settings.
#[derive(Debug, Args)]
pub struct StoresConfig {
    /// YAML catalog fixture served from memory
    #[arg(long, env = "CATALOG_FIXTURE")]
    pub catalog_fixture: PathBuf,

    /// Bound on every store call, in milliseconds
    #[arg(long, env = "STORE_TIMEOUT_MS", default_value_t = 2_000_u64)]
    pub store_timeout_ms: u64,

    /// ISO code of the settlement currency
    #[arg(long, env = "SETTLEMENT_CURRENCY", default_value = "SGD")]
    pub settlement_currency: String,

    /// Shared shipping allocation (even, proportional)
    #[arg(long, env = "SHIPPING_SPLIT", default_value = "even")]
    pub shipping_split: ShippingPolicy,
}

impl StoresConfig {
    /// Pricing settings for the app services.
    ///
    /// # Errors
    ///
    /// Returns an error if the settlement currency is not an ISO currency.
    pub fn pricing_settings(&self) -> Result<PricingSettings, SettingsError> {
        PricingSettings::new(
            &self.settlement_currency,
            self.shipping_split,
            Duration::from_millis(self.store_timeout_ms),
        )
    }
}
