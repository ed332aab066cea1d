//! Custom Print Transition Handler

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

/// Custom Print Transition Handler
///
/// Applies a buyer transition (`submit_model`, `configure` or `cancel`) to one of the caller's
/// own requests. Requests owned by another user are reported as not found.
#[endpoint(
    tags("custom-prints"),
    summary = "Transition Custom Print Request",
    security(("user_id" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Updated request"),
        (status_code = StatusCode::FORBIDDEN, description = "Staff-only transition"),
        (status_code = StatusCode::NOT_FOUND, description = "Request not found"),
        (status_code = StatusCode::CONFLICT, description = "Transition not allowed from current status"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Invalid transition payload"),
    ),
)]
#[tracing::instrument(
    name = "custom_prints.transition",
    skip(request, json, depot),
    fields(
        user_id = tracing::field::Empty,
        request_id = tracing::field::Empty,
        transition = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    request: PathParam<String>,
    json: JsonBody<TransitionRequest>,
    depot: &mut Depot,
) -> Result<Json<CustomPrintResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user_id = depot.user_id_or_401()?;
    let request_id = request.into_inner();
    let transition = json.into_inner().into_transition(state.settings.currency)?;

    let span = tracing::Span::current();

    span.record("user_id", user_id);
    span.record("request_id", request_id.as_str());
    span.record("transition", transition.name());

    let request = state
        .app
        .custom_prints
        .transition(user_id, &request_id, transition)
        .await
        .map_err(into_status_error)?;

    info!(status = %request.status, "custom print request transitioned");

    Ok(Json(request.into()))
}
