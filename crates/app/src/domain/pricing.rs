//! Pricing
//!
//! Gathers what one breakdown needs from the stores, immediately before pricing.

use std::sync::Arc;

use gantry::{
    breakdown::{Breakdown, BreakdownError, PricingContext, build_breakdown},
    cart::Cart,
    catalog::CatalogSnapshot,
    discounts::Event,
    products::ProductRef,
};
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::{
    clock::Clock,
    settings::PricingSettings,
    stores::{Stores, StoreError, bounded, fetch_products, models::active_kinds},
};

#[derive(Debug, Error)]
pub enum PricingError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Breakdown(#[from] BreakdownError),
}

/// Store data a breakdown is priced against.
#[derive(Debug, Clone)]
pub struct PricingInputs {
    pub catalog: CatalogSnapshot,
    pub events: Vec<Event>,
    pub active_delivery_types: FxHashSet<String>,
    pub has_address: bool,
}

/// Fetches pricing inputs and builds breakdowns.
#[derive(Debug, Clone)]
pub struct Pricing {
    stores: Stores,
    settings: PricingSettings,
    clock: Arc<dyn Clock>,
}

impl Pricing {
    #[must_use]
    pub fn new(stores: Stores, settings: PricingSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            stores,
            settings,
            clock,
        }
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn settings(&self) -> &PricingSettings {
        &self.settings
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Catalog products, custom-print requests and template referenced by `products`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if any fetch fails or times out.
    pub async fn catalog_for<'a, I>(&self, products: I) -> Result<CatalogSnapshot, StoreError>
    where
        I: IntoIterator<Item = &'a ProductRef>,
    {
        let timeout = self.settings.store_timeout;

        let mut ids = Vec::new();
        let mut request_ids = Vec::new();

        for product in products {
            match product {
                ProductRef::Catalog(id) => ids.push(id.clone()),
                ProductRef::CustomPrint(request_id) => request_ids.push(request_id.clone()),
            }
        }

        let mut catalog = CatalogSnapshot::default();

        for product in fetch_products(self.stores.catalog.as_ref(), &ids, timeout).await? {
            catalog.insert_product(product);
        }

        if request_ids.is_empty() {
            return Ok(catalog);
        }

        request_ids.sort_unstable();
        request_ids.dedup();

        for request_id in &request_ids {
            let request = bounded(
                timeout,
                "custom_prints.get_custom_print",
                self.stores.custom_prints.get_custom_print(request_id),
            )
            .await?;

            if let Some(request) = request {
                catalog.insert_custom_print(request);
            }
        }

        let template = bounded(
            timeout,
            "catalog.get_custom_print_template",
            self.stores.catalog.get_custom_print_template(),
        )
        .await?;

        catalog.set_template(template);

        Ok(catalog)
    }

    /// Fetch everything needed to price `cart` for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if any fetch fails or times out.
    pub async fn inputs(&self, user_id: &str, cart: &Cart) -> Result<PricingInputs, StoreError> {
        let timeout = self.settings.store_timeout;

        let (catalog, events, delivery_types, address) = tokio::try_join!(
            self.catalog_for(cart.lines.iter().map(|line| &line.product)),
            bounded(timeout, "events.list_events", self.stores.events.list_events()),
            bounded(
                timeout,
                "delivery_types.get_active_delivery_types",
                self.stores.delivery_types.get_active_delivery_types(),
            ),
            bounded(
                timeout,
                "addresses.get_user_address",
                self.stores.addresses.get_user_address(user_id),
            ),
        )?;

        Ok(PricingInputs {
            catalog,
            events,
            active_delivery_types: active_kinds(&delivery_types),
            has_address: address.is_some(),
        })
    }

    /// Pricing context over `inputs` for today.
    pub fn context<'a>(&self, inputs: &'a PricingInputs) -> PricingContext<'a> {
        PricingContext {
            catalog: &inputs.catalog,
            events: &inputs.events,
            today: self.clock.today(),
            has_address: inputs.has_address,
            active_delivery_types: Some(&inputs.active_delivery_types),
            currency: self.settings.currency,
        }
    }

    /// Price `cart` for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a store call fails or the breakdown cannot be built.
    pub async fn breakdown(&self, user_id: &str, cart: &Cart) -> Result<Breakdown, PricingError> {
        let inputs = self.inputs(user_id, cart).await?;

        Ok(build_breakdown(cart, &self.context(&inputs))?)
    }
}

#[cfg(test)]
mod tests {
    use gantry::{cart::CartLine, custom_print::PrintStatus, variants::VariantSelector};
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    #[tokio::test]
    async fn catalog_for_fetches_custom_prints_and_template() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.seed_custom_print("req-1", "buyer", PrintStatus::Quoted)
            .await?;

        let products = [ProductRef::from("planter"), ProductRef::from("custom-print:req-1")];

        let catalog = ctx.pricing.catalog_for(&products).await?;

        let snapshot = gantry::catalog::lookup(
            &catalog,
            &ProductRef::from("custom-print:req-1"),
            &VariantSelector::None,
        )?;

        assert_eq!(snapshot.name, "Custom Print");
        assert!(gantry::catalog::CatalogSource::product(&catalog, "planter").is_some());

        Ok(())
    }

    #[tokio::test]
    async fn breakdown_requires_an_address_for_shipped_lines() -> TestResult {
        let ctx = TestContext::new().await;

        let cart = Cart::new(vec![CartLine::new(
            ProductRef::from("planter"),
            VariantSelector::None,
            1,
            "standard",
        )]);

        let result = ctx.pricing.breakdown("no-address", &cart).await;

        assert!(
            matches!(
                result,
                Err(PricingError::Breakdown(BreakdownError::MissingAddress))
            ),
            "expected MissingAddress, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn inactive_delivery_types_are_flagged() -> TestResult {
        let ctx = TestContext::new().await;

        let cart = Cart::new(vec![CartLine::new(
            ProductRef::from("planter"),
            VariantSelector::None,
            1,
            "express",
        )]);

        let breakdown = ctx.pricing.breakdown("buyer", &cart).await?;

        assert!(breakdown.lines.is_empty());
        assert_eq!(breakdown.skipped.len(), 1);

        Ok(())
    }
}
