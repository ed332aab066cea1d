//! Payment capture request models

use gantry_app::{
    domain::{
        carts::models::LineKey,
        sessions::models::{PaidLine, PaymentCaptured},
    },
    settings::settlement_currency,
};
use rusty_money::Money;
use salvo::{oapi::ToSchema, prelude::StatusError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{carts::models::LineKeyRequest, extensions::*};

/// Payment captured event, sent by the payment collaborator. Amounts are in minor units.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentCapturedRequest {
    /// Checkout session id; replays of the same id are ignored
    pub session_id: Uuid,

    pub buyer_id: String,

    /// ISO 4217 code of every amount in the event
    pub currency: String,

    /// Amount captured
    pub total_amount: i64,

    /// Order-level shipping not attached to any line
    #[serde(default)]
    pub shared_shipping: Option<i64>,

    pub lines: Vec<PaidLineRequest>,
}

/// One paid line.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaidLineRequest {
    #[serde(flatten)]
    pub line: LineKeyRequest,

    pub quantity: u32,

    /// Unit price paid
    pub unit_price: i64,

    pub chosen_delivery_type: String,

    /// Delivery fee per unit
    #[serde(default)]
    pub delivery_fee: i64,
}

impl PaymentCapturedRequest {
    pub(crate) fn into_payment(self) -> Result<PaymentCaptured, StatusError> {
        let currency = settlement_currency(&self.currency).or_400("invalid currency")?;

        let lines = self
            .lines
            .into_iter()
            .map(|line| {
                let key = LineKey::from(line.line);

                PaidLine {
                    product: key.product,
                    variant: key.variant,
                    quantity: line.quantity,
                    unit_price: Money::from_minor(line.unit_price, currency),
                    delivery_type: line.chosen_delivery_type,
                    delivery_fee: Money::from_minor(line.delivery_fee, currency),
                }
            })
            .collect();

        Ok(PaymentCaptured {
            session: self.session_id.into(),
            buyer_id: self.buyer_id,
            total_amount: Money::from_minor(self.total_amount, currency),
            shared_shipping: self
                .shared_shipping
                .map(|minor| Money::from_minor(minor, currency)),
            lines,
        })
    }
}
