//! Errors

use gantry::{cart::CartError, catalog::LookupError};
use gantry_app::domain::carts::CartsServiceError;
use salvo::http::StatusError;
use tracing::error;

use crate::errors::store_status_error;

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::MissingAddress => StatusError::unprocessable_entity()
            .brief("A delivery address is required to price shipping"),
        CartsServiceError::Lookup(LookupError::TemplateMissing) => {
            error!("custom print template is not configured");

            StatusError::internal_server_error()
        }
        CartsServiceError::Lookup(
            source @ (LookupError::VariantRequired(_)
            | LookupError::UnknownVariant { .. }
            | LookupError::UnknownVariantAxis { .. }),
        ) => StatusError::bad_request().brief(source.to_string()),
        CartsServiceError::Lookup(source @ LookupError::NotQuoted(_)) => {
            StatusError::conflict().brief(source.to_string())
        }
        CartsServiceError::Lookup(source) => StatusError::not_found().brief(source.to_string()),
        CartsServiceError::CustomPrintClosed { .. } | CartsServiceError::CheckoutBlocked(_) => {
            StatusError::conflict().brief(error.to_string())
        }
        CartsServiceError::DeliveryTypeUnavailable(source) => {
            StatusError::unprocessable_entity().brief(source.to_string())
        }
        CartsServiceError::Cart(source @ CartError::LineNotFound { .. }) => {
            StatusError::not_found().brief(source.to_string())
        }
        CartsServiceError::Cart(source @ CartError::ZeroQuantity) => {
            StatusError::bad_request().brief(source.to_string())
        }
        CartsServiceError::Cart(source @ CartError::OutOfStock { .. }) => {
            StatusError::conflict().brief(source.to_string())
        }
        CartsServiceError::UnavailableLines(_) | CartsServiceError::EmptyCart => {
            StatusError::unprocessable_entity().brief(error.to_string())
        }
        CartsServiceError::Store(source) => store_status_error(source),
        CartsServiceError::Money(source) => {
            error!("failed to price cart: {source}");

            StatusError::internal_server_error()
        }
    }
}
