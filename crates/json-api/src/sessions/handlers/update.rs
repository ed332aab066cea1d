//! Update Session Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    extensions::*,
    sessions::{
        errors::into_status_error,
        models::{SessionResponse, UpdateSessionRequest},
    },
    state::State,
};

/// Update Session Handler
///
/// Marks a session's payouts as reconciled. No other field of a session can change.
#[endpoint(
    tags("sessions"),
    summary = "Update Checkout Session",
    responses(
        (status_code = StatusCode::OK, description = "Updated session"),
        (status_code = StatusCode::NOT_FOUND, description = "Session not found"),
    ),
)]
pub(crate) async fn handler(
    session: PathParam<Uuid>,
    json: JsonBody<UpdateSessionRequest>,
    depot: &mut Depot,
) -> Result<Json<SessionResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let uuid = session.into_inner();
    let processed = json.into_inner().processed;

    let session = state
        .app
        .sessions
        .set_processed(uuid.into(), processed)
        .await
        .map_err(into_status_error)?;

    info!(session_uuid = %uuid, processed, "session processed flag updated");

    Ok(Json(session.into()))
}
