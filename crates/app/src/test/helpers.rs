//! Test Helpers

use std::collections::BTreeMap;

use gantry::{
    cart::CartLine,
    custom_print::{
        CustomPrintRequest, DeliveryQuote, ModelFile, PrintConfiguration, PrintStatus,
    },
    delivery::{DIGITAL, DeliveryOption, PRINT_DELIVERY},
    discounts::ProductDiscount,
    products::{Product, ProductRef},
    revenue::RevenueSplit,
    variants::VariantSelector,
};
use jiff::{
    Timestamp,
    civil::{Date, date},
};
use rusty_money::{
    Money,
    iso::{Currency, SGD},
};
use uuid::Uuid;

use crate::{
    domain::sessions::models::{CheckoutSession, SessionUuid},
    stores::{Address, DeliveryTypeDescriptor, MemoryData},
};

pub(crate) const TODAY: Date = date(2026, 10, 16);

pub(crate) const NOW: Timestamp = Timestamp::constant(1_792_141_200, 0);

pub(crate) fn sgd(minor: i64) -> Money<'static, Currency> {
    Money::from_minor(minor, SGD)
}

/// Flat-delivery product with no variants or discount.
pub(crate) fn product(id: &str, creator_id: &str, minor: i64) -> Product {
    Product {
        id: id.to_string(),
        name: id.to_string(),
        creator_id: Some(creator_id.to_string()),
        base_price: sgd(minor),
        variants: Vec::new(),
        variant_types: Vec::new(),
        delivery_types: vec![DeliveryOption::flat("standard", sgd(5_00))],
        discount: None,
        dimensions: None,
        stock: None,
        digital_links: Vec::new(),
    }
}

/// Catalog shared by the service tests.
///
/// - `planter`: 100.00, 10% off today, standard/express/digital delivery
/// - `lamp`: 50.00, two in stock
/// - `ebook`: 12.00, digital only
///
/// `express` is switched off globally. Only `buyer` has an address.
pub(crate) fn catalog() -> MemoryData {
    let mut data = MemoryData::default();

    let mut planter = product("planter", "creator-a", 100_00);
    planter.name = "Hex Planter".to_string();
    planter.delivery_types.push(DeliveryOption::flat("express", sgd(12_00)));
    planter.delivery_types.push(DeliveryOption::digital(SGD));
    planter.discount = Some(ProductDiscount {
        percentage: 10,
        minimum_price: sgd(50_00),
        start_date: TODAY,
        end_date: TODAY,
    });

    let mut lamp = product("lamp", "creator-b", 50_00);
    lamp.stock = Some(2);

    let mut ebook = product("ebook", "creator-b", 12_00);
    ebook.delivery_types = vec![DeliveryOption::digital(SGD)];
    ebook.digital_links = vec!["https://downloads.example.com/ebook.pdf".to_string()];

    let mut template = product("custom-print-template", "print-studio", 0);
    template.name = "Custom Print".to_string();
    template.delivery_types = Vec::new();

    data.insert_product(planter);
    data.insert_product(lamp);
    data.insert_product(ebook);
    data.custom_print_template = Some(template);

    data.delivery_types = vec![
        DeliveryTypeDescriptor::active("standard"),
        DeliveryTypeDescriptor::active(DIGITAL),
        DeliveryTypeDescriptor::active(PRINT_DELIVERY),
        DeliveryTypeDescriptor {
            kind: "express".to_string(),
            is_active: false,
        },
    ];

    data.addresses.insert(
        "buyer".to_string(),
        Address {
            recipient: "Test Buyer".to_string(),
            line1: "1 Harbourfront Walk".to_string(),
            line2: None,
            postal_code: "098585".to_string(),
            country: "SG".to_string(),
        },
    );

    data
}

pub(crate) fn line(product: &str, quantity: u32, delivery_type: &str) -> CartLine {
    CartLine::new(
        ProductRef::parse(product),
        VariantSelector::None,
        quantity,
        delivery_type,
    )
}

/// Request at `status`; quoted at 30.00 + 12.50 with 6.00 print delivery from `quoted` on.
pub(crate) fn custom_print(id: &str, owner_id: &str, status: PrintStatus) -> CustomPrintRequest {
    let mut request = CustomPrintRequest::new(id, owner_id);

    request.status = status;

    if status >= PrintStatus::PendingConfig {
        request.model_file = Some(ModelFile {
            storage_key: format!("uploads/{id}.stl"),
            original_name: "part.stl".to_string(),
        });
    }

    if status >= PrintStatus::Configured {
        request.print_configuration = Some(PrintConfiguration {
            is_configured: true,
            material: Some("PETG".to_string()),
            ..PrintConfiguration::default()
        });
    }

    if status >= PrintStatus::Quoted && status != PrintStatus::Cancelled {
        request.base_price = Some(sgd(30_00));
        request.print_fee = Some(sgd(12_50));
        request.delivery_types = vec![DeliveryQuote {
            kind: PRINT_DELIVERY.to_string(),
            price: sgd(6_00),
        }];
    }

    request
}

pub(crate) fn session(created_at: &str) -> Result<CheckoutSession, jiff::Error> {
    Ok(CheckoutSession {
        uuid: SessionUuid::from_uuid(Uuid::now_v7()),
        buyer_id: "buyer".to_string(),
        total_amount: sgd(50_00),
        shared_shipping: None,
        items: Vec::new(),
        split: RevenueSplit {
            currency: SGD,
            creators: BTreeMap::new(),
            unattributed: None,
            digital: BTreeMap::new(),
        },
        processed: false,
        needs_reconciliation: false,
        created_at: created_at.parse()?,
    })
}
