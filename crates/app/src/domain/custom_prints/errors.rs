//! Custom prints service errors.

use gantry::custom_print::PrintError;
use thiserror::Error;

use crate::stores::StoreError;

#[derive(Debug, Error)]
pub enum CustomPrintsServiceError {
    #[error("custom print request not found")]
    NotFound,

    #[error(transparent)]
    Transition(#[from] PrintError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
