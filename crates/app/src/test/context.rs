//! Test context for service-level tests over the in-memory store.

use std::sync::Arc;

use gantry::{
    cart::Cart,
    custom_print::{CustomPrintRequest, PrintStatus},
};

use crate::{
    clock::FixedClock,
    domain::{
        carts::StoreCartsService, custom_prints::StoreCustomPrintsService, pricing::Pricing,
        sessions::StoreSessionsService,
    },
    settings::PricingSettings,
    stores::{CartStore, CustomPrintStore, MemoryData, MemoryStore, StoreError, Stores},
};

use super::helpers;

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub pricing: Pricing,
    pub carts: StoreCartsService,
    pub sessions: StoreSessionsService,
    pub custom_prints: StoreCustomPrintsService,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_data(helpers::catalog())
    }

    pub fn with_data(data: MemoryData) -> Self {
        let store = Arc::new(MemoryStore::new(data));

        Self::with_stores(store.clone(), Stores::memory(store))
    }

    /// Context whose services use `stores`, typically memory with some stores mocked.
    pub fn with_stores(store: Arc<MemoryStore>, stores: Stores) -> Self {
        let pricing = Pricing::new(
            stores,
            PricingSettings::default(),
            Arc::new(FixedClock::new(helpers::NOW, helpers::TODAY)),
        );

        Self {
            store,
            carts: StoreCartsService::new(pricing.clone()),
            sessions: StoreSessionsService::new(pricing.clone()),
            custom_prints: StoreCustomPrintsService::new(pricing.clone()),
            pricing,
        }
    }

    pub async fn seed_cart(&self, user_id: &str, cart: Cart) -> Result<(), StoreError> {
        self.store.save_cart(user_id, cart).await
    }

    /// Store a request at `status`, quoted for print delivery once it has reached `quoted`.
    pub async fn seed_custom_print(
        &self,
        id: &str,
        owner_id: &str,
        status: PrintStatus,
    ) -> Result<CustomPrintRequest, StoreError> {
        let request = helpers::custom_print(id, owner_id, status);

        self.store.save_custom_print(request.clone()).await?;

        Ok(request)
    }
}
