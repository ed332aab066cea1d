//! Gantry Domain Concerns

pub mod carts;
pub mod custom_prints;
pub mod pricing;
pub mod sessions;
