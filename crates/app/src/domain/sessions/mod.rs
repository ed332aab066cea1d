//! Checkout Sessions

pub mod errors;
pub mod models;
pub mod service;

pub use errors::SessionsServiceError;
pub use service::*;
