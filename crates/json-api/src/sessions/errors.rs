//! Sessions service error mapping

use gantry_app::domain::sessions::SessionsServiceError;
use salvo::prelude::StatusError;
use tracing::error;

use crate::errors::store_status_error;

pub(crate) fn into_status_error(error: SessionsServiceError) -> StatusError {
    match error {
        SessionsServiceError::NotFound => StatusError::not_found(),
        SessionsServiceError::GrantNotFound(product_id) => {
            StatusError::not_found().brief(format!("no digital grant for {product_id}"))
        }
        SessionsServiceError::InvalidPayment(reason) => {
            StatusError::unprocessable_entity().brief(reason)
        }
        SessionsServiceError::Revenue(source) => {
            StatusError::unprocessable_entity().brief(source.to_string())
        }
        SessionsServiceError::Store(source) => store_status_error(source),
        SessionsServiceError::Money(source) => {
            error!("session arithmetic failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
