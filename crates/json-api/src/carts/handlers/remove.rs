//! Remove Cart Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    carts::{
        errors::into_status_error,
        models::{CartResponse, LineKeyRequest},
    },
    extensions::*,
    state::State,
};

/// Remove Cart Item Handler
#[endpoint(
    tags("cart"),
    summary = "Remove Cart Item",
    security(("user_id" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Updated cart"),
        (status_code = StatusCode::NOT_FOUND, description = "Line not found"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<LineKeyRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user_id = depot.user_id_or_401()?;

    let view = state
        .app
        .carts
        .remove_item(user_id, json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(view.into()))
}
