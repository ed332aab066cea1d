//! Custom Print Handlers

pub(crate) mod create;
pub(crate) mod get;
pub(crate) mod staff_transition;
pub(crate) mod transition;
