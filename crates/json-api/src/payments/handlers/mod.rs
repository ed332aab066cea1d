//! Payment Handlers

pub(crate) mod captured;
