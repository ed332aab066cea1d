//! Product Fixtures

use std::str::FromStr;

use gantry::{
    delivery::{DeliveryOption, DeliveryPricing, MeasureRange, PricingTier},
    discounts::{Event, ProductDiscount},
    products::{Dimensions, Product, Variant, VariantOption, VariantType},
};
use jiff::civil::Date;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Findable, Money, iso::Currency};
use serde::Deserialize;

use crate::fixtures::FixtureError;

/// Catalog product
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    pub name: String,

    #[serde(default)]
    pub creator_id: Option<String>,

    /// Base price, e.g. "100.00 SGD"
    pub price: String,

    #[serde(default)]
    pub stock: Option<u32>,

    #[serde(default)]
    pub variants: Vec<VariantFixture>,

    #[serde(default)]
    pub variant_types: Vec<VariantTypeFixture>,

    #[serde(default)]
    pub delivery_types: Vec<DeliveryFixture>,

    #[serde(default)]
    pub discount: Option<DiscountFixture>,

    #[serde(default)]
    pub dimensions: Option<DimensionsFixture>,

    #[serde(default)]
    pub digital_links: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct VariantFixture {
    pub id: String,
    pub name: String,
    pub additional_fee: String,
    pub stock: u32,
}

#[derive(Debug, Deserialize)]
pub struct VariantTypeFixture {
    pub name: String,
    pub options: Vec<VariantOptionFixture>,
}

#[derive(Debug, Deserialize)]
pub struct VariantOptionFixture {
    pub name: String,
    pub additional_fee: String,
    pub stock: u32,
}

/// Delivery option, flat when `price` is set and tiered when `tiers` is.
///
/// `digital` needs neither.
#[derive(Debug, Deserialize)]
pub struct DeliveryFixture {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub price: Option<String>,

    #[serde(default)]
    pub tiers: Vec<TierFixture>,

    #[serde(default = "active")]
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct TierFixture {
    pub weight: RangeFixture,
    pub volume: RangeFixture,
    pub price: String,
}

#[derive(Debug, Deserialize)]
pub struct RangeFixture {
    pub min: String,
    pub max: String,
}

#[derive(Debug, Deserialize)]
pub struct DiscountFixture {
    pub percentage: u8,
    pub minimum_price: String,
    pub start_date: Date,
    pub end_date: Date,
}

#[derive(Debug, Deserialize)]
pub struct EventFixture {
    pub name: String,
    pub percentage: u8,
    pub minimum_price: String,
    pub start_date: Date,
    pub end_date: Date,

    #[serde(default = "active")]
    pub is_active: bool,

    #[serde(default = "active")]
    pub is_global: bool,
}

/// Dimensions in centimetres and kilograms, as decimal strings.
#[derive(Debug, Deserialize)]
pub struct DimensionsFixture {
    pub length: String,
    pub width: String,
    pub height: String,
    pub weight: String,
}

fn active() -> bool {
    true
}

impl ProductFixture {
    /// Build the product with id `id`.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if a price, measure or delivery option is malformed.
    pub fn into_product(self, id: String) -> Result<Product, FixtureError> {
        let base_price = parse_money(&self.price)?;

        let variants = self
            .variants
            .into_iter()
            .map(|variant| {
                Ok(Variant {
                    id: variant.id,
                    name: variant.name,
                    additional_fee: parse_money(&variant.additional_fee)?,
                    stock: variant.stock,
                })
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        let variant_types = self
            .variant_types
            .into_iter()
            .map(|variant_type| {
                let options = variant_type
                    .options
                    .into_iter()
                    .map(|option| {
                        Ok(VariantOption {
                            name: option.name,
                            additional_fee: parse_money(&option.additional_fee)?,
                            stock: option.stock,
                        })
                    })
                    .collect::<Result<Vec<_>, FixtureError>>()?;

                Ok(VariantType {
                    name: variant_type.name,
                    options,
                })
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        let delivery_types = self
            .delivery_types
            .into_iter()
            .map(|delivery| delivery.into_option(base_price.currency()))
            .collect::<Result<Vec<_>, _>>()?;

        let discount = self
            .discount
            .map(|discount| {
                Ok::<_, FixtureError>(ProductDiscount {
                    percentage: parse_percentage(discount.percentage)?,
                    minimum_price: parse_money(&discount.minimum_price)?,
                    start_date: discount.start_date,
                    end_date: discount.end_date,
                })
            })
            .transpose()?;

        let dimensions = self
            .dimensions
            .map(|dimensions| {
                Ok::<_, FixtureError>(Dimensions {
                    length: parse_decimal(&dimensions.length)?,
                    width: parse_decimal(&dimensions.width)?,
                    height: parse_decimal(&dimensions.height)?,
                    weight: parse_decimal(&dimensions.weight)?,
                })
            })
            .transpose()?;

        Ok(Product {
            id,
            name: self.name,
            creator_id: self.creator_id,
            base_price,
            variants,
            variant_types,
            delivery_types,
            discount,
            dimensions,
            stock: self.stock,
            digital_links: self.digital_links,
        })
    }
}

impl DeliveryFixture {
    fn into_option(self, currency: &'static Currency) -> Result<DeliveryOption, FixtureError> {
        let pricing = match (self.price, self.tiers.is_empty()) {
            (Some(price), true) => DeliveryPricing::Flat(parse_money(&price)?),
            (None, false) => DeliveryPricing::Tiered(
                self.tiers
                    .into_iter()
                    .map(TierFixture::into_tier)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            (None, true) if self.kind == gantry::delivery::DIGITAL => {
                DeliveryPricing::Flat(Money::from_minor(0, currency))
            }
            _ => {
                return Err(FixtureError::InvalidDelivery(format!(
                    "{} needs exactly one of price or tiers",
                    self.kind
                )));
            }
        };

        Ok(DeliveryOption {
            kind: self.kind,
            pricing,
            is_active: self.is_active,
        })
    }
}

impl TierFixture {
    fn into_tier(self) -> Result<PricingTier, FixtureError> {
        Ok(PricingTier {
            weight_range: self.weight.into_range()?,
            volume_range: self.volume.into_range()?,
            price: parse_money(&self.price)?,
        })
    }
}

impl RangeFixture {
    fn into_range(self) -> Result<MeasureRange, FixtureError> {
        Ok(MeasureRange::new(
            parse_decimal(&self.min)?,
            parse_decimal(&self.max)?,
        ))
    }
}

impl EventFixture {
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the percentage or minimum price is malformed.
    pub fn into_event(self) -> Result<Event, FixtureError> {
        Ok(Event {
            name: self.name,
            percentage: parse_percentage(self.percentage)?,
            minimum_price: parse_money(&self.minimum_price)?,
            start_date: self.start_date,
            end_date: self.end_date,
            is_active: self.is_active,
            is_global: self.is_global,
        })
    }
}

/// Parse a price such as "100.00 SGD" or "1500 JPY".
///
/// # Errors
///
/// Returns an error if the string is not "AMOUNT CURRENCY", the currency is unknown, or the
/// amount is finer than the currency's minor unit.
pub fn parse_money(s: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "expected 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency =
        Currency::find(code).ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))?;

    let amount =
        Decimal::from_str(amount).map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let scale = 10_i64
        .checked_pow(currency.exponent)
        .map(Decimal::from)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let minor = amount
        .checked_mul(scale)
        .filter(|minor| minor.fract().is_zero())
        .and_then(|minor| minor.to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok(Money::from_minor(minor, currency))
}

fn parse_decimal(s: &str) -> Result<Decimal, FixtureError> {
    Decimal::from_str(s.trim()).map_err(|_err| FixtureError::InvalidMeasure(s.to_string()))
}

fn parse_percentage(percentage: u8) -> Result<u8, FixtureError> {
    if (1..=100).contains(&percentage) {
        Ok(percentage)
    } else {
        Err(FixtureError::InvalidPercentage(percentage))
    }
}
