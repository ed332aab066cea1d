//! Errors shared across resources

use gantry_app::stores::StoreError;
use salvo::http::StatusError;
use tracing::{error, warn};

/// Timeouts are retryable and surface as 504; other store failures as 500.
pub(crate) fn store_status_error(error: StoreError) -> StatusError {
    if error.is_retryable() {
        warn!("store call timed out: {error}");

        return StatusError::gateway_timeout()
            .brief("A backing store timed out, retry the request");
    }

    error!("store call failed: {error}");

    StatusError::internal_server_error()
}
