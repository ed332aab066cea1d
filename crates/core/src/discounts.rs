//! Discounts
//!
//! A product is priced with at most one discount: its own product discount, or a store-wide
//! event. Both are only eligible inside their inclusive date window and when the undiscounted
//! unit price meets their minimum price.

use jiff::civil::Date;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    money::{self, MoneyCalcError},
    products::ProductSnapshot,
};

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentages are whole points between 1 and 100.
    #[error("discount percentage {0} is outside 1..=100")]
    InvalidPercentage(u8),

    /// Wrapped money calculation error.
    #[error(transparent)]
    Money(#[from] MoneyCalcError),
}

/// Discount scoped to a single product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDiscount {
    /// Whole percentage points off
    pub percentage: u8,

    /// Unit price the product must reach for the discount to apply
    pub minimum_price: Money<'static, Currency>,

    /// First day the discount applies
    pub start_date: Date,

    /// Last day the discount applies
    pub end_date: Date,
}

/// Store-wide, time-bound discount campaign.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Campaign name
    pub name: String,

    /// Whole percentage points off
    pub percentage: u8,

    /// Unit price a product must reach for the event to apply
    pub minimum_price: Money<'static, Currency>,

    /// First day the event applies
    pub start_date: Date,

    /// Last day the event applies
    pub end_date: Date,

    /// Switched on by staff
    pub is_active: bool,

    /// Applies to every product
    pub is_global: bool,
}

/// The discount that produced an effective price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppliedDiscount {
    /// The product's own discount.
    Product {
        /// Whole percentage points off
        percentage: u8,
    },

    /// A store-wide event.
    Event {
        /// Campaign name
        name: String,

        /// Whole percentage points off
        percentage: u8,
    },
}

impl AppliedDiscount {
    /// Whole percentage points off.
    pub fn percentage(&self) -> u8 {
        match self {
            Self::Product { percentage } | Self::Event { percentage, .. } => *percentage,
        }
    }
}

/// Unit price after discounting.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectivePrice {
    /// Unit price after the applied discount
    pub price: Money<'static, Currency>,

    /// Unit price before any discount
    pub price_before_discount: Money<'static, Currency>,

    /// Discount that was applied, if any
    pub applied: Option<AppliedDiscount>,
}

/// Compute the effective unit price of `snapshot` on `reference_date`.
///
/// An eligible product discount takes precedence over any event. Among eligible events the
/// largest percentage wins, ties going to the alphabetically first name.
///
/// # Errors
///
/// Returns a [`DiscountError`] if the winning discount has an out-of-range percentage or the
/// calculation overflows.
pub fn effective_price(
    snapshot: &ProductSnapshot,
    events: &[Event],
    reference_date: Date,
) -> Result<EffectivePrice, DiscountError> {
    let base = snapshot.unit_price;

    let product_discount = snapshot
        .discount
        .as_ref()
        .filter(|discount| {
            is_eligible(
                base,
                discount.minimum_price,
                discount.start_date,
                discount.end_date,
                reference_date,
            )
        })
        .map(|discount| AppliedDiscount::Product {
            percentage: discount.percentage,
        });

    let applied = product_discount.or_else(|| best_event(base, events, reference_date));

    let Some(applied) = applied else {
        return Ok(EffectivePrice {
            price: base,
            price_before_discount: base,
            applied: None,
        });
    };

    let percentage = applied.percentage();

    if !(1..=100).contains(&percentage) {
        return Err(DiscountError::InvalidPercentage(percentage));
    }

    Ok(EffectivePrice {
        price: money::percent_off(base, percentage)?,
        price_before_discount: base,
        applied: Some(applied),
    })
}

fn best_event(
    base: Money<'static, Currency>,
    events: &[Event],
    reference_date: Date,
) -> Option<AppliedDiscount> {
    events
        .iter()
        .filter(|event| event.is_active && event.is_global)
        .filter(|event| {
            is_eligible(
                base,
                event.minimum_price,
                event.start_date,
                event.end_date,
                reference_date,
            )
        })
        .min_by(|a, b| {
            b.percentage
                .cmp(&a.percentage)
                .then_with(|| a.name.cmp(&b.name))
        })
        .map(|event| AppliedDiscount::Event {
            name: event.name.clone(),
            percentage: event.percentage,
        })
}

fn is_eligible(
    base: Money<'static, Currency>,
    minimum_price: Money<'static, Currency>,
    start_date: Date,
    end_date: Date,
    reference_date: Date,
) -> bool {
    let in_window = start_date <= reference_date && reference_date <= end_date;

    // A threshold in another currency can never be met.
    let meets_minimum = base.currency() == minimum_price.currency()
        && base.to_minor_units() >= minimum_price.to_minor_units();

    in_window && meets_minimum
}
