//! Gantry
//!
//! Gantry is the pricing core of a creator marketplace storefront: it turns a cart of catalog
//! products, variant selections and bespoke print requests into a priced, delivery-annotated
//! breakdown, gates checkout on the custom-print lifecycle and splits captured revenue between
//! the creators who sold the goods.

pub mod breakdown;
pub mod cart;
pub mod catalog;
pub mod custom_print;
pub mod delivery;
pub mod discounts;
pub mod money;
pub mod prelude;
pub mod products;
pub mod revenue;
pub mod variants;
