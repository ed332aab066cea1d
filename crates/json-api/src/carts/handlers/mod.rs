//! Cart Handlers

pub(crate) mod add;
pub(crate) mod breakdown;
pub(crate) mod checkout;
pub(crate) mod delivery;
pub(crate) mod get;
pub(crate) mod note;
pub(crate) mod quantity;
pub(crate) mod remove;
