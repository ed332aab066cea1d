//! Carts service.

use async_trait::async_trait;
use gantry::{
    breakdown::{Breakdown, BreakdownError},
    cart::{Cart, CartLine, QuantityChange, QuantityOutcome},
    catalog::{CatalogSource, LookupError, lookup},
    custom_print::{CustomPrintRequest, PrintStatus, PrintTransition, ensure_checkout_eligible},
    delivery::delivery_fee,
    products::ProductSnapshot,
};
use mockall::automock;
use tracing::{Span, info};

use crate::{
    domain::{
        carts::{
            errors::CartsServiceError,
            models::{CartView, LineKey},
        },
        pricing::{Pricing, PricingError},
    },
    stores::{bounded, models::active_kinds},
};

#[derive(Debug, Clone)]
pub struct StoreCartsService {
    pricing: Pricing,
}

impl StoreCartsService {
    #[must_use]
    pub fn new(pricing: Pricing) -> Self {
        Self { pricing }
    }

    async fn load(&self, user_id: &str) -> Result<Cart, CartsServiceError> {
        let stores = self.pricing.stores();

        Ok(bounded(
            self.pricing.settings().store_timeout,
            "carts.get_cart",
            stores.carts.get_cart(user_id),
        )
        .await?)
    }

    async fn save(&self, user_id: &str, cart: &Cart) -> Result<(), CartsServiceError> {
        let stores = self.pricing.stores();

        Ok(bounded(
            self.pricing.settings().store_timeout,
            "carts.save_cart",
            stores.carts.save_cart(user_id, cart.clone()),
        )
        .await?)
    }

    async fn view(&self, user_id: &str, cart: Cart) -> Result<CartView, CartsServiceError> {
        let breakdown = match self.pricing.breakdown(user_id, &cart).await {
            Ok(breakdown) => Some(breakdown),
            Err(PricingError::Breakdown(BreakdownError::MissingAddress)) => None,
            Err(error) => return Err(error.into()),
        };

        Ok(CartView { cart, breakdown })
    }

    /// Resolve the product a line refers to.
    ///
    /// `None` for custom prints that have not been quoted yet.
    async fn resolve(
        &self,
        user_id: &str,
        key: &LineKey,
    ) -> Result<Option<ProductSnapshot>, CartsServiceError> {
        let catalog = self.pricing.catalog_for([&key.product]).await?;

        if let Some(request_id) = key.product.custom_print_request() {
            let request = catalog
                .custom_print(request_id)
                .filter(|request| request.owner_id == user_id)
                .ok_or_else(|| LookupError::CustomPrintNotFound(request_id.to_string()))?;

            let closed = request.status == PrintStatus::Cancelled
                || request.status > PrintStatus::PaymentPending;

            if closed {
                return Err(CartsServiceError::CustomPrintClosed {
                    request_id: request_id.to_string(),
                    status: request.status,
                });
            }

            if !request.status.is_checkout_eligible() {
                return Ok(None);
            }
        }

        Ok(Some(lookup(&catalog, &key.product, &key.variant)?))
    }

    async fn ensure_deliverable(
        &self,
        snapshot: &ProductSnapshot,
        delivery_type: &str,
    ) -> Result<(), CartsServiceError> {
        let descriptors = bounded(
            self.pricing.settings().store_timeout,
            "delivery_types.get_active_delivery_types",
            self.pricing.stores().delivery_types.get_active_delivery_types(),
        )
        .await?;

        delivery_fee(snapshot, delivery_type, Some(&active_kinds(&descriptors)))?;

        Ok(())
    }

    async fn referenced_custom_prints(
        &self,
        user_id: &str,
        cart: &Cart,
    ) -> Result<Vec<CustomPrintRequest>, CartsServiceError> {
        let mut requests = Vec::new();

        for request_id in cart.custom_print_requests() {
            let request = bounded(
                self.pricing.settings().store_timeout,
                "custom_prints.get_custom_print",
                self.pricing.stores().custom_prints.get_custom_print(request_id),
            )
            .await?
            .filter(|request| request.owner_id == user_id)
            .ok_or_else(|| LookupError::CustomPrintNotFound(request_id.to_string()))?;

            requests.push(request);
        }

        Ok(requests)
    }
}

#[async_trait]
impl CartsService for StoreCartsService {
    #[tracing::instrument(name = "carts.service.get_cart", skip(self), err)]
    async fn get_cart(&self, user_id: &str) -> Result<CartView, CartsServiceError> {
        let cart = self.load(user_id).await?;

        self.view(user_id, cart).await
    }

    #[tracing::instrument(
        name = "carts.service.breakdown",
        skip(self),
        fields(line_count = tracing::field::Empty, skipped = tracing::field::Empty),
        err
    )]
    async fn breakdown(&self, user_id: &str) -> Result<Breakdown, CartsServiceError> {
        let cart = self.load(user_id).await?;
        let breakdown = self.pricing.breakdown(user_id, &cart).await?;

        let span = Span::current();

        span.record("line_count", breakdown.lines.len());
        span.record("skipped", breakdown.skipped.len());

        Ok(breakdown)
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self, line),
        fields(
            product_id = %line.product,
            variant = %line.variant,
            delivery_type = %line.delivery_type
        ),
        err
    )]
    async fn add_item(&self, user_id: &str, line: CartLine) -> Result<CartView, CartsServiceError> {
        let key = LineKey::new(line.product.clone(), line.variant.clone());

        let available = match self.resolve(user_id, &key).await? {
            Some(snapshot) => {
                self.ensure_deliverable(&snapshot, &line.delivery_type).await?;

                snapshot.stock
            }
            None => None,
        };

        let mut cart = self.load(user_id).await?;

        let quantity = cart.add(line, available)?;

        self.save(user_id, &cart).await?;

        info!(quantity, "added cart line");

        self.view(user_id, cart).await
    }

    #[tracing::instrument(
        name = "carts.service.change_quantity",
        skip(self, key),
        fields(product_id = %key.product, variant = %key.variant),
        err
    )]
    async fn change_quantity(
        &self,
        user_id: &str,
        key: LineKey,
        change: QuantityChange,
    ) -> Result<CartView, CartsServiceError> {
        let mut cart = self.load(user_id).await?;

        let grows = cart
            .line(&key.product, &key.variant)
            .is_some_and(|line| {
                !line.is_quantity_locked()
                    && match change {
                        QuantityChange::Increment => true,
                        QuantityChange::Decrement => false,
                        QuantityChange::Set(quantity) => quantity > line.quantity,
                    }
            });

        let available = if grows {
            self.resolve(user_id, &key)
                .await?
                .and_then(|snapshot| snapshot.stock)
        } else {
            None
        };

        let outcome = cart.change_quantity(&key.product, &key.variant, change, available)?;

        if outcome != QuantityOutcome::Locked {
            self.save(user_id, &cart).await?;
        }

        self.view(user_id, cart).await
    }

    #[tracing::instrument(
        name = "carts.service.set_delivery_type",
        skip(self, key),
        fields(product_id = %key.product, variant = %key.variant),
        err
    )]
    async fn set_delivery_type(
        &self,
        user_id: &str,
        key: LineKey,
        delivery_type: String,
    ) -> Result<CartView, CartsServiceError> {
        if let Some(snapshot) = self.resolve(user_id, &key).await? {
            self.ensure_deliverable(&snapshot, &delivery_type).await?;
        }

        let mut cart = self.load(user_id).await?;

        cart.set_delivery_type(&key.product, &key.variant, delivery_type)?;

        self.save(user_id, &cart).await?;

        self.view(user_id, cart).await
    }

    #[tracing::instrument(
        name = "carts.service.set_order_note",
        skip(self, key, note),
        fields(product_id = %key.product, variant = %key.variant),
        err
    )]
    async fn set_order_note(
        &self,
        user_id: &str,
        key: LineKey,
        note: Option<String>,
    ) -> Result<CartView, CartsServiceError> {
        let mut cart = self.load(user_id).await?;

        cart.set_order_note(&key.product, &key.variant, note)?;

        self.save(user_id, &cart).await?;

        self.view(user_id, cart).await
    }

    #[tracing::instrument(
        name = "carts.service.remove_item",
        skip(self, key),
        fields(product_id = %key.product, variant = %key.variant),
        err
    )]
    async fn remove_item(
        &self,
        user_id: &str,
        key: LineKey,
    ) -> Result<CartView, CartsServiceError> {
        let mut cart = self.load(user_id).await?;

        cart.remove(&key.product, &key.variant)?;

        self.save(user_id, &cart).await?;

        self.view(user_id, cart).await
    }

    #[tracing::instrument(
        name = "carts.service.initiate_checkout",
        skip(self),
        fields(grand_total = tracing::field::Empty),
        err
    )]
    async fn initiate_checkout(&self, user_id: &str) -> Result<Breakdown, CartsServiceError> {
        let cart = self.load(user_id).await?;

        if cart.is_empty() {
            return Err(CartsServiceError::EmptyCart);
        }

        let requests = self.referenced_custom_prints(user_id, &cart).await?;

        for request in &requests {
            ensure_checkout_eligible(request).map_err(CartsServiceError::CheckoutBlocked)?;
        }

        let breakdown = self.pricing.breakdown(user_id, &cart).await?;

        if !breakdown.is_clean() {
            return Err(CartsServiceError::UnavailableLines(breakdown.skipped.len()));
        }

        if breakdown.lines.is_empty() {
            return Err(CartsServiceError::EmptyCart);
        }

        for mut request in requests {
            if request.status != PrintStatus::Quoted {
                continue;
            }

            request
                .apply(PrintTransition::RequestPayment)
                .map_err(CartsServiceError::CheckoutBlocked)?;

            bounded(
                self.pricing.settings().store_timeout,
                "custom_prints.save_custom_print",
                self.pricing.stores().custom_prints.save_custom_print(request),
            )
            .await?;
        }

        Span::current().record("grand_total", tracing::field::display(breakdown.grand_total));

        info!("checkout initiated");

        Ok(breakdown)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// The buyer's cart, priced when they have an address.
    async fn get_cart(&self, user_id: &str) -> Result<CartView, CartsServiceError>;

    /// Price the buyer's cart.
    async fn breakdown(&self, user_id: &str) -> Result<Breakdown, CartsServiceError>;

    /// Add a line, merging with an existing line for the same selection.
    async fn add_item(&self, user_id: &str, line: CartLine) -> Result<CartView, CartsServiceError>;

    async fn change_quantity(
        &self,
        user_id: &str,
        key: LineKey,
        change: QuantityChange,
    ) -> Result<CartView, CartsServiceError>;

    async fn set_delivery_type(
        &self,
        user_id: &str,
        key: LineKey,
        delivery_type: String,
    ) -> Result<CartView, CartsServiceError>;

    async fn set_order_note(
        &self,
        user_id: &str,
        key: LineKey,
        note: Option<String>,
    ) -> Result<CartView, CartsServiceError>;

    async fn remove_item(&self, user_id: &str, key: LineKey) -> Result<CartView, CartsServiceError>;

    /// Validate the cart for payment and move quoted custom prints to payment pending.
    async fn initiate_checkout(&self, user_id: &str) -> Result<Breakdown, CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gantry::{
        cart::CartError,
        custom_print::{PrintError, PrintStatus},
        delivery::{DIGITAL, PRINT_DELIVERY},
        products::ProductRef,
        variants::VariantSelector,
    };
    use testresult::TestResult;

    use crate::{
        stores::{CustomPrintStore, MemoryStore, MockCartStore, StoreError, Stores},
        test::{
            TestContext,
            helpers::{catalog, line, sgd},
        },
    };

    use super::*;

    fn key(product: &str) -> LineKey {
        LineKey::new(ProductRef::parse(product), VariantSelector::None)
    }

    #[tokio::test]
    async fn add_item_merges_lines_and_prices_the_cart() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.carts
            .add_item("buyer", line("planter", 1, "standard"))
            .await?;

        let view = ctx
            .carts
            .add_item("buyer", line("planter", 2, "standard"))
            .await?;

        assert_eq!(view.cart.lines.len(), 1);
        assert_eq!(view.cart.lines.first().map(|line| line.quantity), Some(3));

        let breakdown = view.breakdown.ok_or("expected a breakdown")?;

        assert_eq!(breakdown.subtotal, sgd(270_00));
        assert_eq!(breakdown.total_delivery_fee, sgd(15_00));
        assert_eq!(breakdown.grand_total, sgd(285_00));

        Ok(())
    }

    #[tokio::test]
    async fn add_item_beyond_stock_fails() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx.carts.add_item("buyer", line("lamp", 3, "standard")).await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::Cart(CartError::OutOfStock {
                    requested: 3,
                    available: 2,
                    ..
                }))
            ),
            "expected OutOfStock, got {result:?}"
        );

        assert!(ctx.store.snapshot().await.carts.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn add_item_unknown_product_is_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .carts
            .add_item("buyer", line("missing", 1, "standard"))
            .await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::Lookup(LookupError::ProductNotFound(ref id))) if id == "missing"
            ),
            "expected ProductNotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn globally_disabled_delivery_type_is_rejected() {
        let ctx = TestContext::new().await;

        let result = ctx
            .carts
            .add_item("buyer", line("planter", 1, "express"))
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::DeliveryTypeUnavailable(_))),
            "expected DeliveryTypeUnavailable, got {result:?}"
        );
    }

    #[tokio::test]
    async fn digital_line_quantity_is_locked() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.carts.add_item("buyer", line("ebook", 1, DIGITAL)).await?;

        let view = ctx
            .carts
            .change_quantity("buyer", key("ebook"), QuantityChange::Increment)
            .await?;

        assert_eq!(view.cart.lines.first().map(|line| line.quantity), Some(1));

        Ok(())
    }

    #[tokio::test]
    async fn decrement_from_one_removes_the_line() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.carts
            .add_item("buyer", line("lamp", 1, "standard"))
            .await?;

        let view = ctx
            .carts
            .change_quantity("buyer", key("lamp"), QuantityChange::Decrement)
            .await?;

        assert!(view.cart.is_empty());
        assert!(ctx.store.snapshot().await.carts.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn switching_to_digital_pins_quantity() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.carts
            .add_item("buyer", line("planter", 4, "standard"))
            .await?;

        let view = ctx
            .carts
            .set_delivery_type("buyer", key("planter"), DIGITAL.to_string())
            .await?;

        let line = view.cart.lines.first().ok_or("line missing")?;

        assert_eq!(line.quantity, 1);
        assert_eq!(line.delivery_type, DIGITAL);

        let breakdown = view.breakdown.ok_or("expected a breakdown")?;
        assert_eq!(breakdown.total_delivery_fee, sgd(0));

        Ok(())
    }

    #[tokio::test]
    async fn cart_without_address_has_no_breakdown() -> TestResult {
        let ctx = TestContext::new().await;

        let view = ctx
            .carts
            .add_item("no-address", line("planter", 1, "standard"))
            .await?;

        assert_eq!(view.cart.lines.len(), 1);
        assert!(view.breakdown.is_none());

        let result = ctx.carts.breakdown("no-address").await;

        assert!(
            matches!(result, Err(CartsServiceError::MissingAddress)),
            "expected MissingAddress, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn digital_only_cart_needs_no_address() -> TestResult {
        let ctx = TestContext::new().await;

        let view = ctx
            .carts
            .add_item("no-address", line("ebook", 1, DIGITAL))
            .await?;

        let breakdown = view.breakdown.ok_or("expected a breakdown")?;

        assert_eq!(breakdown.grand_total, sgd(12_00));

        Ok(())
    }

    #[tokio::test]
    async fn order_note_is_set_and_cleared() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.carts
            .add_item("buyer", line("lamp", 1, "standard"))
            .await?;

        let view = ctx
            .carts
            .set_order_note("buyer", key("lamp"), Some("Gift wrap".to_string()))
            .await?;

        assert_eq!(
            view.cart.lines.first().and_then(|line| line.order_note.as_deref()),
            Some("Gift wrap")
        );

        let view = ctx
            .carts
            .set_order_note("buyer", key("lamp"), Some("  ".to_string()))
            .await?;

        assert_eq!(view.cart.lines.first().and_then(|line| line.order_note.clone()), None);

        Ok(())
    }

    #[tokio::test]
    async fn remove_unknown_line_fails() {
        let ctx = TestContext::new().await;

        let result = ctx.carts.remove_item("buyer", key("lamp")).await;

        assert!(
            matches!(result, Err(CartsServiceError::Cart(CartError::LineNotFound { .. }))),
            "expected LineNotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn checkout_is_blocked_by_unquoted_custom_print() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.seed_custom_print("req-1", "buyer", PrintStatus::Configured)
            .await?;

        let view = ctx
            .carts
            .add_item("buyer", line("custom-print:req-1", 1, PRINT_DELIVERY))
            .await?;

        assert_eq!(view.cart.lines.len(), 1);

        let result = ctx.carts.initiate_checkout("buyer").await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::CheckoutBlocked(PrintError::CheckoutBlocked {
                    status: PrintStatus::Configured,
                    ..
                }))
            ),
            "expected CheckoutBlocked, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn checkout_moves_quoted_custom_prints_to_payment_pending() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.seed_custom_print("req-1", "buyer", PrintStatus::Quoted)
            .await?;

        ctx.carts
            .add_item("buyer", line("custom-print:req-1", 1, PRINT_DELIVERY))
            .await?;
        ctx.carts
            .add_item("buyer", line("lamp", 1, "standard"))
            .await?;

        let breakdown = ctx.carts.initiate_checkout("buyer").await?;

        // 42.50 + 6.00 print delivery, 50.00 + 5.00 standard
        assert_eq!(breakdown.grand_total, sgd(103_50));

        let request = ctx
            .store
            .get_custom_print("req-1")
            .await?
            .ok_or("request missing")?;

        assert_eq!(request.status, PrintStatus::PaymentPending);

        Ok(())
    }

    #[tokio::test]
    async fn checkout_rejects_carts_with_unpriceable_lines() {
        let mut data = catalog();
        data.carts.insert(
            "buyer".to_string(),
            Cart::new(vec![
                line("lamp", 1, "standard"),
                line("discontinued", 1, "standard"),
            ]),
        );

        let ctx = TestContext::with_data(data);

        let result = ctx.carts.initiate_checkout("buyer").await;

        assert!(
            matches!(result, Err(CartsServiceError::UnavailableLines(1))),
            "expected UnavailableLines, got {result:?}"
        );
    }

    #[tokio::test]
    async fn checkout_of_empty_cart_fails() {
        let ctx = TestContext::new().await;

        let result = ctx.carts.initiate_checkout("buyer").await;

        assert!(
            matches!(result, Err(CartsServiceError::EmptyCart)),
            "expected EmptyCart, got {result:?}"
        );
    }

    #[tokio::test]
    async fn cancelled_custom_print_cannot_be_added() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.seed_custom_print("req-1", "buyer", PrintStatus::Cancelled)
            .await?;

        let result = ctx
            .carts
            .add_item("buyer", line("custom-print:req-1", 1, PRINT_DELIVERY))
            .await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::CustomPrintClosed {
                    status: PrintStatus::Cancelled,
                    ..
                })
            ),
            "expected CustomPrintClosed, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn other_users_custom_prints_are_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.seed_custom_print("req-1", "someone-else", PrintStatus::Quoted)
            .await?;

        let result = ctx
            .carts
            .add_item("buyer", line("custom-print:req-1", 1, PRINT_DELIVERY))
            .await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::Lookup(LookupError::CustomPrintNotFound(_)))
            ),
            "expected CustomPrintNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn cart_store_failures_surface_as_store_errors() {
        let store = Arc::new(MemoryStore::new(catalog()));

        let mut carts = MockCartStore::new();

        carts.expect_get_cart().once().returning(|_| {
            Err(StoreError::Timeout {
                operation: "carts.get_cart",
                timeout_ms: 2_000,
            })
        });
        carts.expect_save_cart().never();

        let stores = Stores {
            carts: Arc::new(carts),
            ..Stores::memory(store.clone())
        };

        let ctx = TestContext::with_stores(store, stores);

        let result = ctx.carts.get_cart("buyer").await;

        assert!(
            matches!(result, Err(CartsServiceError::Store(ref error)) if error.is_retryable()),
            "expected a retryable store error, got {result:?}"
        );
    }
}
