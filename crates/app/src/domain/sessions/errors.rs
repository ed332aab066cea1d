//! Sessions service errors.

use gantry::{money::MoneyCalcError, revenue::RevenueError};
use thiserror::Error;

use crate::stores::StoreError;

#[derive(Debug, Error)]
pub enum SessionsServiceError {
    #[error("checkout session not found")]
    NotFound,

    /// The session owes no digital grant for this product.
    #[error("checkout session has no digital grant for {0}")]
    GrantNotFound(String),

    /// The captured payment cannot be recorded as sent.
    #[error("invalid payment: {0}")]
    InvalidPayment(String),

    #[error(transparent)]
    Revenue(#[from] RevenueError),

    #[error(transparent)]
    Money(#[from] MoneyCalcError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
