//! Custom Prints

pub mod errors;
pub mod service;

pub use errors::CustomPrintsServiceError;
pub use service::*;
