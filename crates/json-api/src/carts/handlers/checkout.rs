//! Initiate Checkout Handler

use std::sync::Arc;

use salvo::prelude::*;
use tracing::info;

use crate::{
    carts::{errors::into_status_error, models::BreakdownResponse},
    extensions::*,
    state::State,
};

/// Initiate Checkout Handler
///
/// Validates the acting user's cart for payment and returns the amount to charge. Quoted
/// custom-print requests in the cart move to payment pending.
#[endpoint(
    tags("cart"),
    summary = "Initiate Checkout",
    security(("user_id" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart ready for payment"),
        (status_code = StatusCode::CONFLICT, description = "A custom print has not been quoted"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Cart cannot be paid for"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<BreakdownResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user_id = depot.user_id_or_401()?;

    let breakdown = state
        .app
        .carts
        .initiate_checkout(user_id)
        .await
        .map_err(into_status_error)?;

    info!(
        user_id,
        lines = breakdown.lines.len(),
        grand_total = %breakdown.grand_total,
        "checkout initiated"
    );

    Ok(Json(breakdown.into()))
}
