//! Captured Payments

mod handlers;
mod models;

pub(crate) use handlers::*;
