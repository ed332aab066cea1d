//! Get Session Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    sessions::{errors::into_status_error, models::SessionResponse},
    state::State,
};

/// Get Session Handler
#[endpoint(
    tags("sessions"),
    summary = "Get Checkout Session",
    responses(
        (status_code = StatusCode::OK, description = "Session and revenue split"),
        (status_code = StatusCode::NOT_FOUND, description = "Session not found"),
    ),
)]
pub(crate) async fn handler(
    session: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<SessionResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let session = state
        .app
        .sessions
        .get_session(session.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(session.into()))
}
