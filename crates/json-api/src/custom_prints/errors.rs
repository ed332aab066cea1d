//! Custom prints service error mapping

use gantry::custom_print::PrintError;
use gantry_app::domain::custom_prints::CustomPrintsServiceError;
use salvo::prelude::StatusError;

use crate::errors::store_status_error;

pub(crate) fn into_status_error(error: CustomPrintsServiceError) -> StatusError {
    match error {
        CustomPrintsServiceError::NotFound => StatusError::not_found(),
        CustomPrintsServiceError::Transition(source @ PrintError::NotPermitted { .. }) => {
            StatusError::forbidden().brief(source.to_string())
        }
        CustomPrintsServiceError::Transition(
            source @ (PrintError::InvalidTransition { .. } | PrintError::CheckoutBlocked { .. }),
        ) => StatusError::conflict().brief(source.to_string()),
        CustomPrintsServiceError::Transition(source) => {
            StatusError::unprocessable_entity().brief(source.to_string())
        }
        CustomPrintsServiceError::Store(source) => store_status_error(source),
    }
}
