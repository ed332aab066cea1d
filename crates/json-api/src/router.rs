//! App Router

use salvo::Router;

use crate::{carts, custom_prints, healthcheck, identity, payments, sessions};

/// Buyer routes act for the user named by the identity header. Staff, session and payment routes
/// are back-office and collaborator surfaces and carry no buyer identity.
pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(
            Router::new()
                .hoop(identity::handler)
                .push(
                    Router::with_path("cart")
                        .get(carts::get::handler)
                        .push(Router::with_path("breakdown").get(carts::breakdown::handler))
                        .push(Router::with_path("checkout").post(carts::checkout::handler))
                        .push(
                            Router::with_path("items")
                                .post(carts::add::handler)
                                .delete(carts::remove::handler)
                                .push(Router::with_path("quantity").put(carts::quantity::handler))
                                .push(Router::with_path("delivery").put(carts::delivery::handler))
                                .push(Router::with_path("note").put(carts::note::handler)),
                        ),
                )
                .push(
                    Router::with_path("custom-prints")
                        .post(custom_prints::create::handler)
                        .push(
                            Router::with_path("{request}")
                                .get(custom_prints::get::handler)
                                .push(
                                    Router::with_path("transitions")
                                        .post(custom_prints::transition::handler),
                                ),
                        ),
                ),
        )
        .push(
            Router::with_path("staff/custom-prints/{request}/transitions")
                .post(custom_prints::staff_transition::handler),
        )
        .push(Router::with_path("payments/captured").post(payments::captured::handler))
        .push(
            Router::with_path("sessions")
                .get(sessions::list::handler)
                .push(
                    Router::with_path("{session}")
                        .get(sessions::get::handler)
                        .patch(sessions::update::handler)
                        .push(
                            Router::with_path("grants/{product}")
                                .post(sessions::grant::handler),
                        ),
                ),
        )
}
