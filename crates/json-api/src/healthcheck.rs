//! Gantry JSON API Healthcheck Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{extensions::*, state::State};

/// Healthcheck response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Server version
    pub version: String,

    /// ISO code every cart and session settles in
    pub settlement_currency: String,

    /// Shared shipping allocation policy
    pub shipping_split: String,
}

/// Healthcheck handler
///
/// Reports liveness and the pricing settings the server was started with.
#[endpoint(tags("health"), summary = "Health check endpoint")]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<HealthResponse>, StatusError> {
    let settings = depot.obtain_or_500::<Arc<State>>()?.settings;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        settlement_currency: settings.currency.iso_alpha_code.to_string(),
        shipping_split: settings.shipping_policy.to_string(),
    }))
}
