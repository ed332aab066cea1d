//! State

use std::sync::Arc;

use gantry_app::{context::AppContext, settings::PricingSettings};

/// Shared by every handler through the depot.
#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,

    /// Settlement currency and shipping policy the services were built with.
    pub(crate) settings: PricingSettings,
}

impl State {
    #[must_use]
    pub(crate) fn shared(app: AppContext, settings: PricingSettings) -> Arc<Self> {
        Arc::new(Self { app, settings })
    }
}
