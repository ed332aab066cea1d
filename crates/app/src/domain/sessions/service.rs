//! Checkout sessions service.

use async_trait::async_trait;
use gantry::{
    catalog::{CatalogSnapshot, CatalogSource},
    custom_print::{PrintStatus, PrintTransition},
    delivery::DIGITAL,
    products::ProductRef,
    revenue::{GrantOutcome, SoldItem, split},
};
use mockall::automock;
use rusty_money::iso::Currency;
use tracing::{Span, error, info, warn};

use crate::{
    domain::{
        pricing::Pricing,
        sessions::{
            errors::SessionsServiceError,
            models::{
                CheckoutSession, GrantReceipt, PaidLine, PaymentCaptured, RecordOutcome,
                SessionFilter, SessionUuid,
            },
        },
    },
    stores::bounded,
};

#[derive(Debug, Clone)]
pub struct StoreSessionsService {
    pricing: Pricing,
}

impl StoreSessionsService {
    #[must_use]
    pub fn new(pricing: Pricing) -> Self {
        Self { pricing }
    }

    /// Remove purchased lines from the buyer's cart. Lines already gone are ignored.
    async fn clear_purchased_lines(
        &self,
        payment: &PaymentCaptured,
    ) -> Result<(), SessionsServiceError> {
        let timeout = self.pricing.settings().store_timeout;
        let carts = &self.pricing.stores().carts;

        let mut cart = bounded(timeout, "carts.get_cart", carts.get_cart(&payment.buyer_id)).await?;

        let before = cart.lines.len();

        cart.lines.retain(|line| {
            !payment
                .lines
                .iter()
                .any(|paid| line.matches(&paid.product, &paid.variant))
        });

        if cart.lines.len() != before {
            bounded(
                timeout,
                "carts.save_cart",
                carts.save_cart(&payment.buyer_id, cart),
            )
            .await?;
        }

        Ok(())
    }

    /// Move paid custom-print requests to `paid`.
    ///
    /// Requests that cannot advance are logged and left as they are.
    async fn mark_custom_prints_paid(
        &self,
        payment: &PaymentCaptured,
    ) -> Result<(), SessionsServiceError> {
        let timeout = self.pricing.settings().store_timeout;
        let custom_prints = &self.pricing.stores().custom_prints;

        for request_id in payment
            .lines
            .iter()
            .filter_map(|line| line.product.custom_print_request())
        {
            let Some(mut request) = bounded(
                timeout,
                "custom_prints.get_custom_print",
                custom_prints.get_custom_print(request_id),
            )
            .await?
            else {
                warn!(request_id, "paid custom print request not found");

                continue;
            };

            let transitions = match request.status {
                PrintStatus::Quoted => vec![
                    PrintTransition::RequestPayment,
                    PrintTransition::ConfirmPayment,
                ],
                PrintStatus::PaymentPending => vec![PrintTransition::ConfirmPayment],
                status => {
                    warn!(request_id, %status, "paid custom print request cannot advance");

                    continue;
                }
            };

            for transition in transitions {
                if let Err(error) = request.apply(transition) {
                    warn!(request_id, %error, "failed to advance paid custom print request");
                }
            }

            bounded(
                timeout,
                "custom_prints.save_custom_print",
                custom_prints.save_custom_print(request),
            )
            .await?;
        }

        Ok(())
    }
}

fn validate(
    payment: &PaymentCaptured,
    currency: &'static Currency,
) -> Result<(), SessionsServiceError> {
    if payment.lines.is_empty() {
        return Err(SessionsServiceError::InvalidPayment(
            "payment has no lines".to_string(),
        ));
    }

    if payment.total_amount.currency() != currency {
        return Err(SessionsServiceError::InvalidPayment(format!(
            "captured in {}, settles in {}",
            payment.total_amount.currency().iso_alpha_code,
            currency.iso_alpha_code
        )));
    }

    if payment.total_amount.is_negative()
        || payment
            .shared_shipping
            .is_some_and(|shipping| shipping.is_negative())
    {
        return Err(SessionsServiceError::InvalidPayment(
            "payment amounts must not be negative".to_string(),
        ));
    }

    for line in &payment.lines {
        if line.quantity == 0 {
            return Err(SessionsServiceError::InvalidPayment(format!(
                "line for {} has no quantity",
                line.product
            )));
        }

        if line.unit_price.is_negative() || line.delivery_fee.is_negative() {
            return Err(SessionsServiceError::InvalidPayment(format!(
                "line for {} has a negative amount",
                line.product
            )));
        }
    }

    Ok(())
}

/// Sold item for a paid line, with the creator as the catalog has it right now.
///
/// Products that no longer resolve are recorded without a creator.
fn sold_item(catalog: &CatalogSnapshot, line: &PaidLine) -> SoldItem {
    let product = match &line.product {
        ProductRef::Catalog(id) => catalog.product(id),
        ProductRef::CustomPrint(_) => catalog.custom_print_template(),
    };

    let (name, creator_id, digital_links) = match product {
        Some(product) => (
            product.name.clone(),
            product.creator_id.clone(),
            product.digital_links.clone(),
        ),
        None => (line.product.to_string(), None, Vec::new()),
    };

    SoldItem {
        product_id: line.product.to_string(),
        name,
        creator_id,
        unit_price: line.unit_price,
        quantity: line.quantity,
        delivery_fee: line.delivery_fee,
        delivery_type: line.delivery_type.clone(),
        digital_links: if line.delivery_type == DIGITAL {
            digital_links
        } else {
            Vec::new()
        },
    }
}

#[async_trait]
impl SessionsService for StoreSessionsService {
    #[tracing::instrument(
        name = "sessions.service.record_payment",
        skip(self, payment),
        fields(
            session_uuid = %payment.session,
            buyer_id = %payment.buyer_id,
            needs_reconciliation = tracing::field::Empty
        ),
        err
    )]
    async fn record_payment(
        &self,
        payment: PaymentCaptured,
    ) -> Result<RecordOutcome, SessionsServiceError> {
        let settings = *self.pricing.settings();
        let sessions = &self.pricing.stores().sessions;

        validate(&payment, settings.currency)?;

        let existing = bounded(
            settings.store_timeout,
            "sessions.get_session",
            sessions.get_session(payment.session),
        )
        .await?;

        if let Some(existing) = existing {
            info!("payment already recorded, ignoring replay");

            return Ok(RecordOutcome::Replayed(existing));
        }

        let catalog = self
            .pricing
            .catalog_for(payment.lines.iter().map(|line| &line.product))
            .await?;

        let items: Vec<SoldItem> = payment
            .lines
            .iter()
            .map(|line| sold_item(&catalog, line))
            .collect();

        let split = split(
            &items,
            &payment.buyer_id,
            payment.shared_shipping,
            settings.shipping_policy,
            settings.currency,
        )?;

        let needs_reconciliation = !split.reconciles_with(payment.total_amount)?;

        Span::current().record("needs_reconciliation", needs_reconciliation);

        if needs_reconciliation {
            error!(
                expected = %payment.total_amount,
                split_total = %split.total()?,
                "revenue split does not reconcile with the captured total"
            );
        }

        self.clear_purchased_lines(&payment).await?;
        self.mark_custom_prints_paid(&payment).await?;

        let session = CheckoutSession {
            uuid: payment.session,
            buyer_id: payment.buyer_id,
            total_amount: payment.total_amount,
            shared_shipping: payment.shared_shipping,
            items,
            split,
            processed: false,
            needs_reconciliation,
            created_at: self.pricing.clock().now(),
        };

        let inserted = bounded(
            settings.store_timeout,
            "sessions.insert_session",
            sessions.insert_session(session.clone()),
        )
        .await?;

        if !inserted {
            info!("payment recorded concurrently, ignoring replay");

            let existing = bounded(
                settings.store_timeout,
                "sessions.get_session",
                sessions.get_session(session.uuid),
            )
            .await?;

            return Ok(RecordOutcome::Replayed(existing.unwrap_or(session)));
        }

        info!(
            creators = session.split.creators.len(),
            total = %session.total_amount,
            "recorded checkout session"
        );

        Ok(RecordOutcome::Created(session))
    }

    #[tracing::instrument(name = "sessions.service.get_session", skip(self), err)]
    async fn get_session(
        &self,
        uuid: SessionUuid,
    ) -> Result<CheckoutSession, SessionsServiceError> {
        bounded(
            self.pricing.settings().store_timeout,
            "sessions.get_session",
            self.pricing.stores().sessions.get_session(uuid),
        )
        .await?
        .ok_or(SessionsServiceError::NotFound)
    }

    #[tracing::instrument(name = "sessions.service.list_sessions", skip(self), err)]
    async fn list_sessions(
        &self,
        filter: SessionFilter,
    ) -> Result<Vec<CheckoutSession>, SessionsServiceError> {
        Ok(bounded(
            self.pricing.settings().store_timeout,
            "sessions.list_sessions",
            self.pricing.stores().sessions.list_sessions(filter),
        )
        .await?)
    }

    #[tracing::instrument(name = "sessions.service.set_processed", skip(self), err)]
    async fn set_processed(
        &self,
        uuid: SessionUuid,
        processed: bool,
    ) -> Result<CheckoutSession, SessionsServiceError> {
        let session = bounded(
            self.pricing.settings().store_timeout,
            "sessions.set_processed",
            self.pricing.stores().sessions.set_processed(uuid, processed),
        )
        .await?
        .ok_or(SessionsServiceError::NotFound)?;

        info!("updated session processed flag");

        Ok(session)
    }

    #[tracing::instrument(name = "sessions.service.mark_granted", skip(self), err)]
    async fn mark_granted(
        &self,
        uuid: SessionUuid,
        product_id: &str,
    ) -> Result<GrantReceipt, SessionsServiceError> {
        let mut before = bounded(
            self.pricing.settings().store_timeout,
            "sessions.mark_granted",
            self.pricing.stores().sessions.mark_granted(uuid, product_id),
        )
        .await?
        .ok_or(SessionsServiceError::NotFound)?;

        let grant = before
            .split
            .digital
            .get_mut(product_id)
            .ok_or_else(|| SessionsServiceError::GrantNotFound(product_id.to_string()))?;

        let outcome = grant.mark_granted();

        match outcome {
            GrantOutcome::Granted => info!(links = grant.links.len(), "granted digital product"),
            GrantOutcome::AlreadyGranted => info!("digital product already granted"),
        }

        Ok(GrantReceipt {
            product_id: product_id.to_string(),
            grant: grant.clone(),
            outcome,
        })
    }
}

#[automock]
#[async_trait]
pub trait SessionsService: Send + Sync {
    /// Record a captured payment as a checkout session.
    ///
    /// Replays of an already recorded session are a no-op.
    async fn record_payment(
        &self,
        payment: PaymentCaptured,
    ) -> Result<RecordOutcome, SessionsServiceError>;

    async fn get_session(&self, uuid: SessionUuid) -> Result<CheckoutSession, SessionsServiceError>;

    /// Sessions matching `filter`, oldest first.
    async fn list_sessions(
        &self,
        filter: SessionFilter,
    ) -> Result<Vec<CheckoutSession>, SessionsServiceError>;

    /// Mark a session's payouts as reconciled, or not.
    async fn set_processed(
        &self,
        uuid: SessionUuid,
        processed: bool,
    ) -> Result<CheckoutSession, SessionsServiceError>;

    /// Record that the download links for `product_id` were delivered to the buyer.
    ///
    /// Marking an already delivered grant changes nothing and reports
    /// [`GrantOutcome::AlreadyGranted`].
    async fn mark_granted(
        &self,
        uuid: SessionUuid,
        product_id: &str,
    ) -> Result<GrantReceipt, SessionsServiceError>;
}
