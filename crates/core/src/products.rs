//! Products

use std::fmt;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

use crate::{delivery::DeliveryOption, discounts::ProductDiscount, variants::VariantSelector};

/// Prefix of synthetic product ids that reference a custom-print request.
pub const CUSTOM_PRINT_PREFIX: &str = "custom-print:";

/// A product id as it appears on a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProductRef {
    /// Ordinary catalog product.
    Catalog(String),

    /// Synthetic `custom-print:<requestId>` product.
    CustomPrint(String),
}

impl ProductRef {
    /// Parse a raw cart line product id.
    pub fn parse(id: &str) -> Self {
        match id.strip_prefix(CUSTOM_PRINT_PREFIX) {
            Some(request_id) => Self::CustomPrint(request_id.to_string()),
            None => Self::Catalog(id.to_string()),
        }
    }

    /// Custom-print request id, if this references one.
    pub fn custom_print_request(&self) -> Option<&str> {
        match self {
            Self::CustomPrint(request_id) => Some(request_id),
            Self::Catalog(_) => None,
        }
    }
}

impl From<&str> for ProductRef {
    fn from(id: &str) -> Self {
        Self::parse(id)
    }
}

impl fmt::Display for ProductRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog(id) => f.write_str(id),
            Self::CustomPrint(request_id) => write!(f, "{CUSTOM_PRINT_PREFIX}{request_id}"),
        }
    }
}

/// Physical dimensions used for tiered delivery pricing.
///
/// Lengths are in centimetres, weight in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    /// Length
    pub length: Decimal,

    /// Width
    pub width: Decimal,

    /// Height
    pub height: Decimal,

    /// Weight
    pub weight: Decimal,
}

impl Dimensions {
    /// Shipping volume, `length * width * height`, or `None` if it overflows.
    pub fn volume(&self) -> Option<Decimal> {
        self.length
            .checked_mul(self.width)?
            .checked_mul(self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}x{}cm {}kg",
            self.length, self.width, self.height, self.weight
        )
    }
}

/// Legacy single-axis variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    /// Variant id
    pub id: String,

    /// Display name
    pub name: String,

    /// Amount added to the product's base price
    pub additional_fee: Money<'static, Currency>,

    /// Units in stock
    pub stock: u32,
}

/// One option of a multi-axis variant type.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantOption {
    /// Option name
    pub name: String,

    /// Amount added to the product's base price
    pub additional_fee: Money<'static, Currency>,

    /// Units in stock
    pub stock: u32,
}

/// A variant axis, e.g. "size" or "colour".
#[derive(Debug, Clone, PartialEq)]
pub struct VariantType {
    /// Axis name
    pub name: String,

    /// Available options
    pub options: Vec<VariantOption>,
}

impl VariantType {
    /// Find an option by name.
    pub fn option(&self, name: &str) -> Option<&VariantOption> {
        self.options.iter().find(|option| option.name == name)
    }
}

/// Catalog product record.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product id
    pub id: String,

    /// Product name
    pub name: String,

    /// Creator who owns the product
    pub creator_id: Option<String>,

    /// Base price
    pub base_price: Money<'static, Currency>,

    /// Legacy single-axis variants
    pub variants: Vec<Variant>,

    /// Multi-axis variant types
    pub variant_types: Vec<VariantType>,

    /// Delivery types offered for this product
    pub delivery_types: Vec<DeliveryOption>,

    /// Product-scoped discount
    pub discount: Option<ProductDiscount>,

    /// Physical dimensions
    pub dimensions: Option<Dimensions>,

    /// Stock for products without variants; `None` is untracked
    pub stock: Option<u32>,

    /// Download links granted to buyers of a digital product
    pub digital_links: Vec<String>,
}

impl Product {
    /// Find a legacy variant by id.
    pub fn variant(&self, id: &str) -> Option<&Variant> {
        self.variants.iter().find(|variant| variant.id == id)
    }

    /// Find a variant type by axis name.
    pub fn variant_type(&self, name: &str) -> Option<&VariantType> {
        self.variant_types
            .iter()
            .find(|variant_type| variant_type.name == name)
    }
}

/// Priced, delivery-eligible view of a product for one variant selection.
///
/// Immutable for the duration of one breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    /// Product the snapshot was resolved from
    pub product: ProductRef,

    /// Display name
    pub name: String,

    /// Creator who owns the product
    pub creator_id: Option<String>,

    /// Selected variant
    pub variant: VariantSelector,

    /// Base price plus the selected options' additional fees, before discounts
    pub unit_price: Money<'static, Currency>,

    /// Delivery types offered
    pub delivery_types: Vec<DeliveryOption>,

    /// Product-scoped discount
    pub discount: Option<ProductDiscount>,

    /// Physical dimensions
    pub dimensions: Option<Dimensions>,

    /// Units available for the selection; `None` is untracked
    pub stock: Option<u32>,

    /// Download links granted to buyers of a digital product
    pub digital_links: Vec<String>,
}

impl ProductSnapshot {
    /// Settlement currency of the snapshot.
    pub fn currency(&self) -> &'static Currency {
        self.unit_price.currency()
    }

    /// Find an offered delivery type by name.
    pub fn delivery_type(&self, kind: &str) -> Option<&DeliveryOption> {
        self.delivery_types.iter().find(|option| option.kind == kind)
    }
}
