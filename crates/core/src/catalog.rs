//! Catalog Lookup
//!
//! Resolves a cart line's product id and variant selection into a [`ProductSnapshot`]. Ordinary
//! products are read from the catalog; `custom-print:<requestId>` ids substitute the shared
//! custom-print template merged with the request's live quote and delivery offer.

use rustc_hash::FxHashMap;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    custom_print::CustomPrintRequest,
    delivery::DeliveryOption,
    products::{Product, ProductRef, ProductSnapshot},
    variants::{VariantKey, VariantSelector},
};

/// Read-only access to the data a lookup needs.
pub trait CatalogSource {
    /// Catalog product by id.
    fn product(&self, id: &str) -> Option<&Product>;

    /// Custom-print request by id.
    fn custom_print(&self, request_id: &str) -> Option<&CustomPrintRequest>;

    /// Shared template product used to price custom prints.
    fn custom_print_template(&self) -> Option<&Product>;
}

/// Catalog data fetched for one request, held in memory.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    products: FxHashMap<String, Product>,
    custom_prints: FxHashMap<String, CustomPrintRequest>,
    template: Option<Product>,
}

impl CatalogSnapshot {
    /// Add a product, replacing any with the same id.
    pub fn insert_product(&mut self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    /// Add a custom-print request, replacing any with the same id.
    pub fn insert_custom_print(&mut self, request: CustomPrintRequest) {
        self.custom_prints.insert(request.id.clone(), request);
    }

    /// Set the custom-print template.
    pub fn set_template(&mut self, template: Option<Product>) {
        self.template = template;
    }

    /// Builder form of [`CatalogSnapshot::insert_product`].
    #[must_use]
    pub fn with_product(mut self, product: Product) -> Self {
        self.insert_product(product);
        self
    }

    /// Builder form of [`CatalogSnapshot::insert_custom_print`].
    #[must_use]
    pub fn with_custom_print(mut self, request: CustomPrintRequest) -> Self {
        self.insert_custom_print(request);
        self
    }

    /// Builder form of [`CatalogSnapshot::set_template`].
    #[must_use]
    pub fn with_template(mut self, template: Product) -> Self {
        self.template = Some(template);
        self
    }
}

impl CatalogSource for CatalogSnapshot {
    fn product(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    fn custom_print(&self, request_id: &str) -> Option<&CustomPrintRequest> {
        self.custom_prints.get(request_id)
    }

    fn custom_print_template(&self) -> Option<&Product> {
        self.template.as_ref()
    }
}

/// Errors raised while resolving a product snapshot.
#[derive(Debug, Error, PartialEq)]
pub enum LookupError {
    /// The catalog has no such product.
    #[error("product {0} not found")]
    ProductNotFound(String),

    /// The custom-print request does not exist.
    #[error("custom print request {0} not found")]
    CustomPrintNotFound(String),

    /// No custom-print template is configured.
    #[error("custom print template is not configured")]
    TemplateMissing,

    /// The custom-print request has no price yet.
    #[error("custom print request {0} has not been quoted")]
    NotQuoted(String),

    /// The product has variants but the line selected none.
    #[error("product {0} requires a variant selection")]
    VariantRequired(String),

    /// The legacy variant id does not exist on the product.
    #[error("product {product} has no variant {variant}")]
    UnknownVariant {
        /// Product id
        product: String,

        /// Requested variant id
        variant: String,
    },

    /// A selected axis does not exist on the product.
    #[error("product {product} has no variant type {axis}")]
    UnknownVariantAxis {
        /// Product id
        product: String,

        /// Requested axis
        axis: String,
    },

    /// A selected option does not exist on its axis.
    #[error("product {product} has no {axis} option {option}")]
    UnknownVariantOption {
        /// Product id
        product: String,

        /// Axis name
        axis: String,

        /// Requested option
        option: String,
    },

    /// Adding variant fees failed.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Resolve a product reference and variant selector against `catalog`.
///
/// # Errors
///
/// Returns a [`LookupError`] when the product, request, template or variant cannot be resolved.
pub fn lookup(
    catalog: &dyn CatalogSource,
    product: &ProductRef,
    selector: &VariantSelector,
) -> Result<ProductSnapshot, LookupError> {
    match product {
        ProductRef::Catalog(id) => {
            let record = catalog
                .product(id)
                .ok_or_else(|| LookupError::ProductNotFound(id.clone()))?;

            resolve_product(record, selector)
        }
        ProductRef::CustomPrint(request_id) => {
            let request = catalog
                .custom_print(request_id)
                .ok_or_else(|| LookupError::CustomPrintNotFound(request_id.clone()))?;

            let template = catalog
                .custom_print_template()
                .ok_or(LookupError::TemplateMissing)?;

            resolve_custom_print(template, request)
        }
    }
}

/// Resolve an ordinary catalog product for a variant selection.
///
/// # Errors
///
/// Returns a [`LookupError`] if the selection does not name a valid variant of `product`.
pub fn resolve_product(
    product: &Product,
    selector: &VariantSelector,
) -> Result<ProductSnapshot, LookupError> {
    let (unit_price, stock) = match selector {
        VariantSelector::None => {
            if !product.variants.is_empty() || !product.variant_types.is_empty() {
                return Err(LookupError::VariantRequired(product.id.clone()));
            }

            (product.base_price, product.stock)
        }
        VariantSelector::Single(variant_id) => {
            let variant =
                product
                    .variant(variant_id)
                    .ok_or_else(|| LookupError::UnknownVariant {
                        product: product.id.clone(),
                        variant: variant_id.clone(),
                    })?;

            (
                product.base_price.add(variant.additional_fee)?,
                Some(variant.stock),
            )
        }
        VariantSelector::Axes(key) => resolve_axes(product, key)?,
    };

    Ok(ProductSnapshot {
        product: ProductRef::Catalog(product.id.clone()),
        name: product.name.clone(),
        creator_id: product.creator_id.clone(),
        variant: selector.clone(),
        unit_price,
        delivery_types: product.delivery_types.clone(),
        discount: product.discount.clone(),
        dimensions: product.dimensions,
        stock,
        digital_links: product.digital_links.clone(),
    })
}

fn resolve_axes(
    product: &Product,
    key: &VariantKey,
) -> Result<(Money<'static, Currency>, Option<u32>), LookupError> {
    let mut unit_price = product.base_price;
    let mut stock: Option<u32> = None;

    for (axis, option_name) in key.iter() {
        let variant_type =
            product
                .variant_type(axis)
                .ok_or_else(|| LookupError::UnknownVariantAxis {
                    product: product.id.clone(),
                    axis: axis.to_string(),
                })?;

        let option =
            variant_type
                .option(option_name)
                .ok_or_else(|| LookupError::UnknownVariantOption {
                    product: product.id.clone(),
                    axis: axis.to_string(),
                    option: option_name.to_string(),
                })?;

        unit_price = unit_price.add(option.additional_fee)?;
        stock = Some(stock.map_or(option.stock, |current| current.min(option.stock)));
    }

    let unselected = product
        .variant_types
        .iter()
        .any(|variant_type| key.option(&variant_type.name).is_none());

    if unselected {
        return Err(LookupError::VariantRequired(product.id.clone()));
    }

    Ok((unit_price, stock))
}

/// Resolve a custom-print request against the shared template product.
///
/// # Errors
///
/// Returns [`LookupError::NotQuoted`] until the request carries both a base price and a print
/// fee.
pub fn resolve_custom_print(
    template: &Product,
    request: &CustomPrintRequest,
) -> Result<ProductSnapshot, LookupError> {
    let quote = request
        .quoted_price()
        .ok_or_else(|| LookupError::NotQuoted(request.id.clone()))??;

    let delivery_types = request
        .delivery_types
        .iter()
        .map(|quote| DeliveryOption::flat(quote.kind.clone(), quote.price))
        .collect();

    Ok(ProductSnapshot {
        product: ProductRef::CustomPrint(request.id.clone()),
        name: template.name.clone(),
        creator_id: template.creator_id.clone(),
        variant: VariantSelector::None,
        unit_price: quote,
        delivery_types,
        discount: template.discount.clone(),
        dimensions: template.dimensions,
        stock: Some(1),
        digital_links: Vec::new(),
    })
}
