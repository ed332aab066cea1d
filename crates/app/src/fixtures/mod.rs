//! Catalog Fixtures
//!
//! YAML catalogs loaded into the in-memory store. Prices are written as "AMOUNT CURRENCY" and
//! must all share one currency.

use std::{collections::BTreeMap, fs, path::Path};

use gantry::{
    cart::{Cart, CartLine},
    custom_print::{CustomPrintRequest, DeliveryQuote, ModelFile, PrintConfiguration, PrintStatus},
    delivery::DeliveryPricing,
    products::{Product, ProductRef},
    variants::VariantSelector,
};
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::stores::{Address, DeliveryTypeDescriptor, MemoryData};

pub mod products;

pub use products::parse_money;

use products::{EventFixture, ProductFixture};

/// Fixture errors.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("invalid price format: {0}")]
    InvalidPrice(String),

    #[error("invalid percentage: {0}")]
    InvalidPercentage(u8),

    #[error("invalid measure: {0}")]
    InvalidMeasure(String),

    #[error("invalid delivery option: {0}")]
    InvalidDelivery(String),

    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    #[error("currency mismatch: expected {expected}, found {found} in {context}")]
    CurrencyMismatch {
        expected: &'static str,
        found: &'static str,
        context: String,
    },

    #[error("invalid cart line: {0}")]
    InvalidCartLine(String),
}

/// Whole catalog file.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogFixture {
    #[serde(default)]
    pub custom_print_template: Option<ProductFixture>,

    #[serde(default)]
    pub products: BTreeMap<String, ProductFixture>,

    #[serde(default)]
    pub events: Vec<EventFixture>,

    #[serde(default)]
    pub delivery_types: Vec<DeliveryTypeDescriptor>,

    #[serde(default)]
    pub addresses: FxHashMap<String, Address>,

    #[serde(default)]
    pub custom_prints: Vec<CustomPrintFixture>,

    #[serde(default)]
    pub carts: BTreeMap<String, Vec<CartLineFixture>>,
}

#[derive(Debug, Deserialize)]
pub struct CustomPrintFixture {
    pub id: String,
    pub owner_id: String,
    pub status: PrintStatus,

    #[serde(default)]
    pub model_file: Option<ModelFileFixture>,

    #[serde(default)]
    pub print_configuration: Option<PrintConfigurationFixture>,

    #[serde(default)]
    pub delivery_types: Vec<DeliveryQuoteFixture>,

    #[serde(default)]
    pub base_price: Option<String>,

    #[serde(default)]
    pub print_fee: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ModelFileFixture {
    pub storage_key: String,
    pub original_name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PrintConfigurationFixture {
    #[serde(default)]
    pub is_configured: bool,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub colour: Option<String>,
    #[serde(default)]
    pub layer_height: Option<u32>,
    #[serde(default)]
    pub infill: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct DeliveryQuoteFixture {
    #[serde(rename = "type")]
    pub kind: String,
    pub price: String,
}

#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    pub product: String,

    #[serde(default)]
    pub variant: Option<String>,

    #[serde(default)]
    pub selected_variants: Option<BTreeMap<String, String>>,

    pub quantity: u32,
    pub delivery_type: String,

    #[serde(default)]
    pub order_note: Option<String>,
}

/// Read and convert the catalog at `path`.
///
/// # Errors
///
/// Returns a [`FixtureError`] if the file cannot be read, parsed or converted.
pub fn load(path: impl AsRef<Path>) -> Result<MemoryData, FixtureError> {
    let contents = fs::read_to_string(path)?;

    parse(&contents)
}

/// Parse and convert a YAML catalog.
///
/// # Errors
///
/// Returns a [`FixtureError`] if the YAML is malformed, a value does not convert, or prices mix
/// currencies.
pub fn parse(yaml: &str) -> Result<MemoryData, FixtureError> {
    let fixture: CatalogFixture = serde_norway::from_str(yaml)?;

    fixture.into_data()
}

impl CatalogFixture {
    /// Convert into store contents.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if a value does not convert or prices mix currencies.
    pub fn into_data(self) -> Result<MemoryData, FixtureError> {
        let mut currency = CurrencyGuard::default();
        let mut data = MemoryData::default();

        for (id, fixture) in self.products {
            let product = fixture.into_product(id)?;

            currency.check_product(&product)?;
            data.insert_product(product);
        }

        if let Some(template) = self.custom_print_template {
            let template = template.into_product("custom-print-template".to_string())?;

            currency.check_product(&template)?;
            data.custom_print_template = Some(template);
        }

        for event in self.events {
            let event = event.into_event()?;

            currency.check(&event.minimum_price, &event.name)?;
            data.events.push(event);
        }

        for request in self.custom_prints {
            let request = request.into_request()?;

            for amount in request
                .base_price
                .iter()
                .chain(request.print_fee.iter())
                .chain(request.delivery_types.iter().map(|quote| &quote.price))
            {
                currency.check(amount, &request.id)?;
            }

            data.insert_custom_print(request);
        }

        for (user_id, lines) in self.carts {
            let mut cart = Cart::default();

            for line in lines {
                cart.add(line.into_line(), None)
                    .map_err(|error| FixtureError::InvalidCartLine(format!("{user_id}: {error}")))?;
            }

            data.carts.insert(user_id, cart);
        }

        data.delivery_types = self.delivery_types;
        data.addresses = self.addresses;

        Ok(data)
    }
}

impl CustomPrintFixture {
    fn into_request(self) -> Result<CustomPrintRequest, FixtureError> {
        let delivery_types = self
            .delivery_types
            .into_iter()
            .map(|quote| {
                Ok(DeliveryQuote {
                    kind: quote.kind,
                    price: parse_money(&quote.price)?,
                })
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        Ok(CustomPrintRequest {
            id: self.id,
            owner_id: self.owner_id,
            status: self.status,
            model_file: self.model_file.map(|file| ModelFile {
                storage_key: file.storage_key,
                original_name: file.original_name,
            }),
            print_configuration: self.print_configuration.map(|config| PrintConfiguration {
                is_configured: config.is_configured,
                material: config.material,
                colour: config.colour,
                layer_height: config.layer_height,
                infill: config.infill,
            }),
            delivery_types,
            base_price: self.base_price.as_deref().map(parse_money).transpose()?,
            print_fee: self.print_fee.as_deref().map(parse_money).transpose()?,
        })
    }
}

impl CartLineFixture {
    fn into_line(self) -> CartLine {
        let mut line = CartLine::new(
            ProductRef::parse(&self.product),
            VariantSelector::from_parts(self.variant, self.selected_variants),
            self.quantity,
            self.delivery_type,
        );

        line.order_note = self.order_note;

        line
    }
}

/// First currency seen, which every later amount must match.
#[derive(Debug, Default)]
struct CurrencyGuard(Option<&'static Currency>);

impl CurrencyGuard {
    fn check(
        &mut self,
        amount: &Money<'static, Currency>,
        context: &str,
    ) -> Result<(), FixtureError> {
        let found = amount.currency();

        match self.0 {
            None => {
                self.0 = Some(found);

                Ok(())
            }
            Some(expected) if expected == found => Ok(()),
            Some(expected) => Err(FixtureError::CurrencyMismatch {
                expected: expected.iso_alpha_code,
                found: found.iso_alpha_code,
                context: context.to_string(),
            }),
        }
    }

    fn check_product(&mut self, product: &Product) -> Result<(), FixtureError> {
        self.check(&product.base_price, &product.id)?;

        for variant in &product.variants {
            self.check(&variant.additional_fee, &product.id)?;
        }

        for option in product
            .variant_types
            .iter()
            .flat_map(|variant_type| &variant_type.options)
        {
            self.check(&option.additional_fee, &product.id)?;
        }

        for option in &product.delivery_types {
            match &option.pricing {
                DeliveryPricing::Flat(price) => self.check(price, &product.id)?,
                DeliveryPricing::Tiered(tiers) => {
                    for tier in tiers {
                        self.check(&tier.price, &product.id)?;
                    }
                }
            }
        }

        if let Some(discount) = &product.discount {
            self.check(&discount.minimum_price, &product.id)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::SGD;
    use testresult::TestResult;

    use super::*;

    const CATALOG: &str = include_str!("../../../../fixtures/catalog.yml");

    #[test]
    fn bundled_catalog_loads() -> TestResult {
        let data = parse(CATALOG)?;

        let planter = data.products.get("planter").ok_or("planter missing")?;

        assert_eq!(planter.base_price, Money::from_minor(100_00, SGD));
        assert_eq!(planter.delivery_types.len(), 3);
        assert!(data.custom_print_template.is_some());
        assert!(!data.events.is_empty());
        assert!(data.addresses.contains_key("buyer-1"));

        let request = data.custom_prints.get("req-quoted").ok_or("request missing")?;
        assert_eq!(request.status, PrintStatus::Quoted);

        let cart = data.carts.get("buyer-1").ok_or("cart missing")?;
        assert!(!cart.is_empty());

        Ok(())
    }

    #[test]
    fn mixed_currencies_are_rejected() {
        let yaml = r#"
products:
  a:
    name: A
    price: "1.00 SGD"
  b:
    name: B
    price: "1.00 USD"
"#;

        assert!(matches!(
            parse(yaml),
            Err(FixtureError::CurrencyMismatch { expected: "SGD", found: "USD", .. })
        ));
    }

    #[test]
    fn cart_lines_merge_and_pin_indivisible_quantities() -> TestResult {
        let yaml = r#"
carts:
  buyer:
    - product: ebook
      quantity: 3
      delivery_type: digital
    - product: lamp
      quantity: 1
      delivery_type: standard
    - product: lamp
      quantity: 2
      delivery_type: standard
"#;

        let data = parse(yaml)?;
        let cart = data.carts.get("buyer").ok_or("cart missing")?;

        let quantities: Vec<u32> = cart.lines.iter().map(|line| line.quantity).collect();

        assert_eq!(quantities, vec![1, 3]);

        Ok(())
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        assert!(matches!(parse("products: ["), Err(FixtureError::Yaml(_))));
    }
}
