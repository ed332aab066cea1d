//! Checkout Session Handlers

pub(crate) mod get;
pub(crate) mod grant;
pub(crate) mod list;
pub(crate) mod update;
