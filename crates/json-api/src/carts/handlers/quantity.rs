//! Change Cart Quantity Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    carts::{
        errors::into_status_error,
        models::{CartResponse, ChangeQuantityRequest},
    },
    extensions::*,
    state::State,
};

/// Change Cart Quantity Handler
///
/// Decrementing a line that holds one unit removes it. Digital and custom-print lines stay at
/// one unit.
#[endpoint(
    tags("cart"),
    summary = "Change Cart Item Quantity",
    security(("user_id" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Updated cart"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid quantity"),
        (status_code = StatusCode::NOT_FOUND, description = "Line not found"),
        (status_code = StatusCode::CONFLICT, description = "Out of stock"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ChangeQuantityRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user_id = depot.user_id_or_401()?;

    let (key, change) = json.into_inner().into_parts()?;

    let view = state
        .app
        .carts
        .change_quantity(user_id, key, change)
        .await
        .map_err(into_status_error)?;

    Ok(Json(view.into()))
}
