//! Set Cart Delivery Type Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    carts::{
        errors::into_status_error,
        models::{CartResponse, SetDeliveryRequest},
    },
    extensions::*,
    state::State,
};

/// Set Cart Delivery Type Handler
#[endpoint(
    tags("cart"),
    summary = "Set Cart Item Delivery Type",
    security(("user_id" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Updated cart"),
        (status_code = StatusCode::NOT_FOUND, description = "Line not found"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Delivery type unavailable"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<SetDeliveryRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user_id = depot.user_id_or_401()?;

    let SetDeliveryRequest {
        line,
        chosen_delivery_type,
    } = json.into_inner();

    let view = state
        .app
        .carts
        .set_delivery_type(user_id, line.into(), chosen_delivery_type)
        .await
        .map_err(into_status_error)?;

    Ok(Json(view.into()))
}
