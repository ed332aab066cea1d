//! Cart Breakdown
//!
//! Prices every line of a cart. Per-line failures drop and flag the line while the rest of the
//! cart is still priced; a missing delivery address aborts before any line is looked at, so a
//! caller never sees a total built on the wrong shipping cost.
//!
//! Lines store their delivery fee per unit. Quantities are only applied when totals are summed.

use std::fmt;

use jiff::civil::Date;
use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::warn;

use crate::{
    cart::{Cart, CartLine},
    catalog::{CatalogSource, LookupError, lookup},
    custom_print::PrintStatus,
    delivery::{DeliveryError, delivery_fee, is_indivisible, requires_address},
    discounts::{AppliedDiscount, DiscountError, Event, effective_price},
    money::{self, MoneyCalcError},
    products::{ProductRef, ProductSnapshot},
    revenue::SoldItem,
    variants::VariantSelector,
};

/// Errors that abort a whole breakdown.
#[derive(Debug, Error, PartialEq)]
pub enum BreakdownError {
    /// A line needs shipping but the buyer has no delivery address on file.
    #[error("a delivery address is required to price shipping")]
    MissingAddress,

    /// Summing line totals failed.
    #[error(transparent)]
    Money(#[from] MoneyCalcError),
}

/// Why a cart line was left out of the breakdown.
#[derive(Debug, Error, PartialEq)]
pub enum SkipReason {
    /// The product, variant or custom-print request could not be resolved.
    #[error(transparent)]
    NotFound(#[from] LookupError),

    /// The chosen delivery type cannot be used for this product.
    #[error(transparent)]
    DeliveryUnavailable(#[from] DeliveryError),

    /// The custom-print request cannot be paid for yet.
    #[error("custom print request is {status}")]
    AwaitingQuote {
        /// Current request status
        status: PrintStatus,
    },

    /// The discount could not be applied.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// The product is priced in another currency.
    #[error("product is priced in {found}, cart settles in {expected}")]
    CurrencyMismatch {
        /// Settlement currency code
        expected: &'static str,

        /// Product currency code
        found: &'static str,
    },

    /// Line arithmetic overflowed.
    #[error(transparent)]
    Money(#[from] MoneyCalcError),
}

/// A cart line that was dropped and flagged.
#[derive(Debug, PartialEq)]
pub struct SkippedLine {
    /// Product of the dropped line
    pub product: ProductRef,

    /// Variant of the dropped line
    pub variant: VariantSelector,

    /// Delivery type chosen on the line
    pub delivery_type: String,

    /// Reason the line was dropped
    pub reason: SkipReason,
}

/// One priced cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownLine {
    /// Product
    pub product: ProductRef,

    /// Variant selection
    pub variant: VariantSelector,

    /// Product name
    pub name: String,

    /// Creator who owns the product
    pub creator_id: Option<String>,

    /// Units
    pub quantity: u32,

    /// Unit price after discount
    pub price: Money<'static, Currency>,

    /// Unit price before discount
    pub price_before_discount: Money<'static, Currency>,

    /// Discount that produced `price`
    pub applied_discount: Option<AppliedDiscount>,

    /// Chosen delivery type
    pub delivery_type: String,

    /// Delivery fee per unit
    pub delivery_fee: Money<'static, Currency>,

    /// Note for the creator
    pub order_note: Option<String>,

    /// Download links granted on purchase
    pub digital_links: Vec<String>,
}

impl BreakdownLine {
    /// `price * quantity`.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyCalcError::Overflow`] if the product overflows.
    pub fn line_total(&self) -> Result<Money<'static, Currency>, MoneyCalcError> {
        money::times(self.price, self.quantity)
    }

    /// `delivery_fee * quantity`.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyCalcError::Overflow`] if the product overflows.
    pub fn delivery_total(&self) -> Result<Money<'static, Currency>, MoneyCalcError> {
        money::times(self.delivery_fee, self.quantity)
    }

    /// The line as it would be sold at its current price.
    pub fn to_sold_item(&self) -> SoldItem {
        SoldItem {
            product_id: self.product.to_string(),
            name: self.name.clone(),
            creator_id: self.creator_id.clone(),
            unit_price: self.price,
            quantity: self.quantity,
            delivery_fee: self.delivery_fee,
            delivery_type: self.delivery_type.clone(),
            digital_links: self.digital_links.clone(),
        }
    }
}

/// A priced cart.
#[derive(Debug, PartialEq)]
pub struct Breakdown {
    /// Settlement currency
    pub currency: &'static Currency,

    /// Priced lines, in cart order
    pub lines: Vec<BreakdownLine>,

    /// Lines that were dropped, in cart order
    pub skipped: Vec<SkippedLine>,

    /// `Σ price * quantity`
    pub subtotal: Money<'static, Currency>,

    /// `Σ delivery_fee * quantity`
    pub total_delivery_fee: Money<'static, Currency>,

    /// `subtotal + total_delivery_fee`
    pub grand_total: Money<'static, Currency>,
}

impl Breakdown {
    /// True when nothing was flagged.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Inputs a breakdown is priced against, fetched immediately beforehand.
#[derive(Clone, Copy)]
pub struct PricingContext<'a> {
    /// Catalog, custom-print requests and template
    pub catalog: &'a dyn CatalogSource,

    /// Store-wide discount events
    pub events: &'a [Event],

    /// Date discounts are evaluated on
    pub today: Date,

    /// Whether the buyer has a delivery address on file
    pub has_address: bool,

    /// Admin-enabled delivery types; `None` allows every type
    pub active_delivery_types: Option<&'a FxHashSet<String>>,

    /// Settlement currency
    pub currency: &'static Currency,
}

impl fmt::Debug for PricingContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PricingContext")
            .field("events", &self.events.len())
            .field("today", &self.today)
            .field("has_address", &self.has_address)
            .field("active_delivery_types", &self.active_delivery_types)
            .field("currency", &self.currency.iso_alpha_code)
            .finish_non_exhaustive()
    }
}

/// Price `cart` against `context`.
///
/// # Errors
///
/// Returns [`BreakdownError::MissingAddress`] if any line needs shipping and the buyer has no
/// address, or a money error if the totals overflow.
pub fn build_breakdown(
    cart: &Cart,
    context: &PricingContext<'_>,
) -> Result<Breakdown, BreakdownError> {
    if !context.has_address
        && cart
            .lines
            .iter()
            .any(|line| requires_address(&line.delivery_type))
    {
        return Err(BreakdownError::MissingAddress);
    }

    let mut lines = Vec::with_capacity(cart.lines.len());
    let mut skipped = Vec::new();

    for line in &cart.lines {
        match price_line(line, context) {
            Ok(priced) => lines.push(priced),
            Err(reason) => {
                warn!(
                    product_id = %line.product,
                    variant = %line.variant,
                    delivery_type = %line.delivery_type,
                    %reason,
                    "dropping cart line from breakdown"
                );

                skipped.push(SkippedLine {
                    product: line.product.clone(),
                    variant: line.variant.clone(),
                    delivery_type: line.delivery_type.clone(),
                    reason,
                });
            }
        }
    }

    let subtotal = money::total(
        lines
            .iter()
            .map(BreakdownLine::line_total)
            .collect::<Result<Vec<_>, _>>()?,
        context.currency,
    )?;

    let total_delivery_fee = money::total(
        lines
            .iter()
            .map(BreakdownLine::delivery_total)
            .collect::<Result<Vec<_>, _>>()?,
        context.currency,
    )?;

    let grand_total = subtotal
        .add(total_delivery_fee)
        .map_err(MoneyCalcError::from)?;

    Ok(Breakdown {
        currency: context.currency,
        lines,
        skipped,
        subtotal,
        total_delivery_fee,
        grand_total,
    })
}

fn price_line(
    line: &CartLine,
    context: &PricingContext<'_>,
) -> Result<BreakdownLine, SkipReason> {
    if let Some(request_id) = line.product.custom_print_request() {
        let request = context
            .catalog
            .custom_print(request_id)
            .ok_or_else(|| LookupError::CustomPrintNotFound(request_id.to_string()))?;

        if !request.status.is_checkout_eligible() {
            return Err(SkipReason::AwaitingQuote {
                status: request.status,
            });
        }
    }

    let snapshot = lookup(context.catalog, &line.product, &line.variant)?;

    if snapshot.currency() != context.currency {
        return Err(SkipReason::CurrencyMismatch {
            expected: context.currency.iso_alpha_code,
            found: snapshot.currency().iso_alpha_code,
        });
    }

    let price = effective_price(&snapshot, context.events, context.today)?;

    let fee = delivery_fee(
        &snapshot,
        &line.delivery_type,
        context.active_delivery_types,
    )
    .inspect_err(|error| log_delivery_failure(&snapshot, &line.delivery_type, error))?;

    let quantity = if is_indivisible(&line.delivery_type) {
        1
    } else {
        line.quantity.max(1)
    };

    Ok(BreakdownLine {
        product: snapshot.product,
        variant: snapshot.variant,
        name: snapshot.name,
        creator_id: snapshot.creator_id,
        quantity,
        price: price.price,
        price_before_discount: price.price_before_discount,
        applied_discount: price.applied,
        delivery_type: line.delivery_type.clone(),
        delivery_fee: fee,
        order_note: line.order_note.clone(),
        digital_links: snapshot.digital_links,
    })
}

fn log_delivery_failure(snapshot: &ProductSnapshot, delivery_type: &str, error: &DeliveryError) {
    let dimensions = snapshot
        .dimensions
        .map_or_else(|| "none".to_string(), |dimensions| dimensions.to_string());

    warn!(
        product_id = %snapshot.product,
        delivery_type,
        dimensions = %dimensions,
        %error,
        "delivery fee could not be resolved"
    );
}
