//! Delivery
//!
//! Per-unit delivery fee resolution. Multiplying by quantity is the breakdown's job, so the
//! resolver stays a pure function of one product snapshot and one delivery type.

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    money,
    products::{Dimensions, ProductSnapshot},
};

/// Delivery type for digital downloads.
pub const DIGITAL: &str = "digital";

/// Delivery type for bespoke print jobs.
pub const PRINT_DELIVERY: &str = "printDelivery";

/// Delivery types whose deliverable cannot be divided, so quantity is pinned to one.
pub fn is_indivisible(kind: &str) -> bool {
    kind == DIGITAL || kind == PRINT_DELIVERY
}

/// Delivery types that need a shipping destination.
pub fn requires_address(kind: &str) -> bool {
    kind != DIGITAL
}

/// Errors raised while resolving a delivery fee.
///
/// Every variant means the chosen delivery type is unavailable for this product.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeliveryError {
    /// The product does not offer the delivery type.
    #[error("delivery type {0} is not offered for this product")]
    NotOffered(String),

    /// The delivery type is offered but switched off.
    #[error("delivery type {0} is inactive")]
    Inactive(String),

    /// Tiered pricing needs dimensions the product does not have.
    #[error("delivery type {0} is tiered but the product has no dimensions")]
    MissingDimensions(String),

    /// The product's dimensions are too large to compute a volume from.
    #[error("dimensions {dimensions} overflow the volume used to price {delivery_type}")]
    VolumeOverflow {
        /// Delivery type
        delivery_type: String,

        /// Product dimensions
        dimensions: Dimensions,
    },

    /// No pricing tier covers the product's weight and volume.
    #[error("no {delivery_type} tier covers weight {weight} and volume {volume}")]
    NoMatchingTier {
        /// Delivery type
        delivery_type: String,

        /// Product weight
        weight: Decimal,

        /// Product volume
        volume: Decimal,
    },
}

/// Inclusive `[min, max]` range of a weight or volume measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasureRange {
    /// Lower bound
    pub min: Decimal,

    /// Upper bound
    pub max: Decimal,
}

impl MeasureRange {
    /// Create a new range.
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// True when `value` lies within the range, bounds included.
    pub fn contains(&self, value: Decimal) -> bool {
        self.min <= value && value <= self.max
    }
}

/// One row of a tiered delivery pricing table.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingTier {
    /// Weight range covered by the tier
    pub weight_range: MeasureRange,

    /// Volume range covered by the tier
    pub volume_range: MeasureRange,

    /// Per-unit fee for the tier
    pub price: Money<'static, Currency>,
}

/// How a delivery type is priced.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryPricing {
    /// Constant per-unit fee.
    Flat(Money<'static, Currency>),

    /// First tier whose weight and volume ranges both match.
    Tiered(Vec<PricingTier>),
}

/// A delivery type offered for a product.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryOption {
    /// Delivery type name, e.g. "standard", "digital"
    pub kind: String,

    /// Pricing rule
    pub pricing: DeliveryPricing,

    /// Whether the option may currently be chosen
    pub is_active: bool,
}

impl DeliveryOption {
    /// An active, flat-priced delivery option.
    pub fn flat(kind: impl Into<String>, price: Money<'static, Currency>) -> Self {
        Self {
            kind: kind.into(),
            pricing: DeliveryPricing::Flat(price),
            is_active: true,
        }
    }

    /// An active digital delivery option.
    pub fn digital(currency: &'static Currency) -> Self {
        Self::flat(DIGITAL, money::zero(currency))
    }
}

/// Resolve the per-unit delivery fee of `snapshot` for `chosen`.
///
/// When `active_types` is given, delivery types missing from it are treated as inactive.
///
/// # Errors
///
/// Returns a [`DeliveryError`] when the delivery type is unavailable for the product.
pub fn delivery_fee(
    snapshot: &ProductSnapshot,
    chosen: &str,
    active_types: Option<&FxHashSet<String>>,
) -> Result<Money<'static, Currency>, DeliveryError> {
    let option = snapshot
        .delivery_type(chosen)
        .ok_or_else(|| DeliveryError::NotOffered(chosen.to_string()))?;

    let globally_active = active_types.is_none_or(|active| active.contains(chosen));

    if !option.is_active || !globally_active {
        return Err(DeliveryError::Inactive(chosen.to_string()));
    }

    if chosen == DIGITAL {
        return Ok(money::zero(snapshot.currency()));
    }

    match &option.pricing {
        DeliveryPricing::Flat(price) => Ok(*price),
        DeliveryPricing::Tiered(tiers) => {
            let dimensions = snapshot
                .dimensions
                .ok_or_else(|| DeliveryError::MissingDimensions(chosen.to_string()))?;

            let weight = dimensions.weight;
            let volume = dimensions.volume().ok_or_else(|| DeliveryError::VolumeOverflow {
                delivery_type: chosen.to_string(),
                dimensions,
            })?;

            tiers
                .iter()
                .find(|tier| {
                    tier.weight_range.contains(weight) && tier.volume_range.contains(volume)
                })
                .map(|tier| tier.price)
                .ok_or_else(|| DeliveryError::NoMatchingTier {
                    delivery_type: chosen.to_string(),
                    weight,
                    volume,
                })
        }
    }
}
