//! App Context

use std::{path::Path, sync::Arc};

use thiserror::Error;

use crate::{
    clock::{Clock, SystemClock},
    domain::{
        carts::{CartsService, StoreCartsService},
        custom_prints::{CustomPrintsService, StoreCustomPrintsService},
        pricing::Pricing,
        sessions::{SessionsService, StoreSessionsService},
    },
    fixtures::{self, FixtureError},
    settings::PricingSettings,
    stores::{MemoryStore, Stores},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to load catalog fixture")]
    Fixture(#[source] FixtureError),
}

#[derive(Clone)]
pub struct AppContext {
    pub carts: Arc<dyn CartsService>,
    pub sessions: Arc<dyn SessionsService>,
    pub custom_prints: Arc<dyn CustomPrintsService>,
}

impl AppContext {
    /// Build application context over the given stores.
    #[must_use]
    pub fn from_stores(stores: Stores, settings: PricingSettings, clock: Arc<dyn Clock>) -> Self {
        let pricing = Pricing::new(stores, settings, clock);

        Self {
            carts: Arc::new(StoreCartsService::new(pricing.clone())),
            sessions: Arc::new(StoreSessionsService::new(pricing.clone())),
            custom_prints: Arc::new(StoreCustomPrintsService::new(pricing)),
        }
    }

    /// Build application context from a YAML catalog fixture, served from memory.
    ///
    /// # Errors
    ///
    /// Returns an error when the fixture cannot be read or converted.
    pub fn from_fixture(
        path: impl AsRef<Path>,
        settings: PricingSettings,
    ) -> Result<Self, AppInitError> {
        let data = fixtures::load(path).map_err(AppInitError::Fixture)?;
        let store = Arc::new(MemoryStore::new(data));

        Ok(Self::from_stores(
            Stores::memory(store),
            settings,
            Arc::new(SystemClock::default()),
        ))
    }
}
