//! Set Cart Order Note Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    carts::{
        errors::into_status_error,
        models::{CartResponse, SetNoteRequest},
    },
    extensions::*,
    state::State,
};

/// Set Cart Order Note Handler
///
/// A missing or blank note clears it.
#[endpoint(
    tags("cart"),
    summary = "Set Cart Item Order Note",
    security(("user_id" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Updated cart"),
        (status_code = StatusCode::NOT_FOUND, description = "Line not found"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<SetNoteRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user_id = depot.user_id_or_401()?;

    let SetNoteRequest { line, order_note } = json.into_inner();

    let view = state
        .app
        .carts
        .set_order_note(user_id, line.into(), order_note)
        .await
        .map_err(into_status_error)?;

    Ok(Json(view.into()))
}
