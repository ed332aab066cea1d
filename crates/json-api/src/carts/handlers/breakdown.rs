//! Cart Breakdown Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    carts::{errors::into_status_error, models::BreakdownResponse},
    extensions::*,
    state::State,
};

/// Cart Breakdown Handler
///
/// Prices every line of the acting user's cart. Lines that cannot be priced are listed under
/// `skipped` and left out of the totals.
#[endpoint(
    tags("cart"),
    summary = "Get Cart Breakdown",
    security(("user_id" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Priced cart"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "No delivery address"),
        (status_code = StatusCode::GATEWAY_TIMEOUT, description = "A store timed out"),
    ),
)]
#[tracing::instrument(
    name = "cart.breakdown",
    skip(depot),
    fields(user_id = tracing::field::Empty, skipped = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<BreakdownResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user_id = depot.user_id_or_401()?;

    let span = tracing::Span::current();

    span.record("user_id", user_id);

    let breakdown = state
        .app
        .carts
        .breakdown(user_id)
        .await
        .map_err(into_status_error)?;

    span.record("skipped", breakdown.skipped.len());

    Ok(Json(breakdown.into()))
}
