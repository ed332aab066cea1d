//! Cart Models

use gantry::{breakdown::Breakdown, cart::Cart, products::ProductRef, variants::VariantSelector};

/// Identifies one cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub product: ProductRef,
    pub variant: VariantSelector,
}

impl LineKey {
    #[must_use]
    pub fn new(product: ProductRef, variant: VariantSelector) -> Self {
        Self { product, variant }
    }
}

/// A cart with its freshly computed breakdown.
#[derive(Debug, PartialEq)]
pub struct CartView {
    pub cart: Cart,

    /// `None` until the buyer adds a delivery address.
    pub breakdown: Option<Breakdown>,
}
