//! Grant Digital Product Handler

use std::sync::Arc;

use gantry::revenue::GrantOutcome;
use salvo::{oapi::extract::PathParam, prelude::*};
use tracing::info;
use uuid::Uuid;

use crate::{
    extensions::*,
    sessions::{errors::into_status_error, models::GrantResponse},
    state::State,
};

/// Grant Digital Product Handler
///
/// Records that the download links for a purchased digital product were delivered to the
/// buyer. Repeating the call changes nothing and reports `alreadyGranted`.
#[endpoint(
    tags("sessions"),
    summary = "Grant Digital Product",
    responses(
        (status_code = StatusCode::OK, description = "Grant delivered"),
        (status_code = StatusCode::NOT_FOUND, description = "Session or grant not found"),
    ),
)]
#[tracing::instrument(
    name = "sessions.handlers.grant",
    skip(session, product, depot),
    fields(session_uuid = tracing::field::Empty, product_id = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    session: PathParam<Uuid>,
    product: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<GrantResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let uuid = session.into_inner();
    let product_id = product.into_inner();

    let span = tracing::Span::current();
    span.record("session_uuid", tracing::field::display(uuid));
    span.record("product_id", tracing::field::display(&product_id));

    let receipt = state
        .app
        .sessions
        .mark_granted(uuid.into(), &product_id)
        .await
        .map_err(into_status_error)?;

    if receipt.outcome == GrantOutcome::Granted {
        info!("digital product granted");
    }

    Ok(Json(receipt.into()))
}
