//! Get Custom Print Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};

use crate::{
    custom_prints::{errors::into_status_error, models::CustomPrintResponse},
    extensions::*,
    state::State,
};

/// Get Custom Print Handler
///
/// Requests owned by another user are reported as not found.
#[endpoint(
    tags("custom-prints"),
    summary = "Get Custom Print Request",
    security(("user_id" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Custom print request"),
        (status_code = StatusCode::NOT_FOUND, description = "Request not found"),
    ),
)]
pub(crate) async fn handler(
    request: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<CustomPrintResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user_id = depot.user_id_or_401()?;

    let request = state
        .app
        .custom_prints
        .get_custom_print(&request.into_inner())
        .await
        .map_err(into_status_error)?;

    if request.owner_id != user_id {
        return Err(StatusError::not_found());
    }

    Ok(Json(request.into()))
}
