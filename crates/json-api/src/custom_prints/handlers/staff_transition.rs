//! Staff Custom Print Transition Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use tracing::info;

use crate::{
    custom_prints::{
        errors::into_status_error,
        models::{CustomPrintResponse, TransitionRequest},
    },
    extensions::*,
    state::State,
};

/// Staff Custom Print Transition Handler
///
/// Quotes, re-offers delivery options and moves a paid request through printing and delivery.
/// Quote amounts default to the settlement currency.
#[endpoint(
    tags("staff"),
    summary = "Apply Staff Transition",
    responses(
        (status_code = StatusCode::OK, description = "Updated request"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Buyer-only transition"),
        (status_code = StatusCode::NOT_FOUND, description = "Request not found"),
        (status_code = StatusCode::CONFLICT, description = "Transition not allowed from current status"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Invalid quote"),
    ),
)]
#[tracing::instrument(
    name = "custom_prints.staff_transition",
    skip(request, json, depot),
    fields(request_id = tracing::field::Empty, transition = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    request: PathParam<String>,
    json: JsonBody<TransitionRequest>,
    depot: &mut Depot,
) -> Result<Json<CustomPrintResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request_id = request.into_inner();
    let transition = json.into_inner().into_transition(state.settings.currency)?;

    let span = tracing::Span::current();

    span.record("request_id", request_id.as_str());
    span.record("transition", transition.name());

    let request = state
        .app
        .custom_prints
        .staff_transition(&request_id, transition)
        .await
        .map_err(into_status_error)?;

    info!(status = %request.status, "custom print request transitioned by staff");

    Ok(Json(request.into()))
}
