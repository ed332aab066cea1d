//! Get Cart Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    carts::{errors::into_status_error, models::CartResponse},
    extensions::*,
    state::State,
};

/// Get Cart Handler
///
/// Returns the acting user's cart with its breakdown.
#[endpoint(
    tags("cart"),
    summary = "Get Cart",
    security(("user_id" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart and breakdown"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing user id"),
        (status_code = StatusCode::GATEWAY_TIMEOUT, description = "A store timed out"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user_id = depot.user_id_or_401()?;

    let view = state
        .app
        .carts
        .get_cart(user_id)
        .await
        .map_err(into_status_error)?;

    Ok(Json(view.into()))
}
