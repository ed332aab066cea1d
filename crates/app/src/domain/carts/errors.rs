//! Carts service errors.

use gantry::{
    breakdown::BreakdownError,
    cart::CartError,
    catalog::LookupError,
    custom_print::{PrintError, PrintStatus},
    delivery::DeliveryError,
    money::MoneyCalcError,
};
use thiserror::Error;

use crate::{domain::pricing::PricingError, stores::StoreError};

#[derive(Debug, Error)]
pub enum CartsServiceError {
    /// A line needs shipping and the buyer has no address on file.
    #[error("a delivery address is required")]
    MissingAddress,

    /// Product, variant or custom-print request could not be resolved.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The custom-print request can no longer be bought.
    #[error("custom print request {request_id} is {status}")]
    CustomPrintClosed {
        request_id: String,
        status: PrintStatus,
    },

    #[error(transparent)]
    DeliveryTypeUnavailable(#[from] DeliveryError),

    #[error(transparent)]
    Cart(#[from] CartError),

    /// A referenced custom-print request has not been quoted.
    #[error(transparent)]
    CheckoutBlocked(PrintError),

    /// Some lines could not be priced.
    #[error("{0} cart line(s) cannot be priced")]
    UnavailableLines(usize),

    #[error("cart is empty")]
    EmptyCart,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Money(#[from] MoneyCalcError),
}

impl From<PricingError> for CartsServiceError {
    fn from(error: PricingError) -> Self {
        match error {
            PricingError::Store(error) => Self::Store(error),
            PricingError::Breakdown(BreakdownError::MissingAddress) => Self::MissingAddress,
            PricingError::Breakdown(BreakdownError::Money(error)) => Self::Money(error),
        }
    }
}
