//! Cart request and response models

use gantry::{
    breakdown::{Breakdown, BreakdownLine, SkipReason, SkippedLine},
    cart::{CartLine, QuantityChange},
    discounts::AppliedDiscount,
    products::ProductRef,
};
use gantry_app::domain::carts::models::{CartView, LineKey};
use salvo::{oapi::ToSchema, prelude::StatusError};
use serde::{Deserialize, Serialize};

use crate::models::{MoneyResponse, VariantFields};

/// Identifies a cart line by product and variant selection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LineKeyRequest {
    /// Catalog product id or `custom-print:<requestId>`
    pub product_id: String,

    #[serde(flatten)]
    pub variant: VariantFields,
}

impl From<LineKeyRequest> for LineKey {
    fn from(request: LineKeyRequest) -> Self {
        LineKey::new(
            ProductRef::parse(&request.product_id),
            request.variant.into_selector(),
        )
    }
}

/// Add Item Request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddItemRequest {
    #[serde(flatten)]
    pub line: LineKeyRequest,

    /// Units to add
    #[serde(default = "one")]
    pub quantity: u32,

    /// Delivery type for the line
    pub chosen_delivery_type: String,

    /// Free-text note for the creator
    #[serde(default)]
    pub order_note: Option<String>,
}

fn one() -> u32 {
    1
}

impl From<AddItemRequest> for CartLine {
    fn from(request: AddItemRequest) -> Self {
        let key = LineKey::from(request.line);

        let mut line = CartLine::new(
            key.product,
            key.variant,
            request.quantity,
            request.chosen_delivery_type,
        );

        line.order_note = request.order_note;

        line
    }
}

/// Quantity adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum QuantityAction {
    Increment,
    Decrement,
    Set,
}

/// Change Quantity Request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChangeQuantityRequest {
    #[serde(flatten)]
    pub line: LineKeyRequest,

    /// How to adjust the quantity
    pub action: QuantityAction,

    /// Target quantity, required for `set`
    #[serde(default)]
    pub quantity: Option<u32>,
}

impl ChangeQuantityRequest {
    pub(crate) fn into_parts(self) -> Result<(LineKey, QuantityChange), StatusError> {
        let change = match (self.action, self.quantity) {
            (QuantityAction::Increment, _) => QuantityChange::Increment,
            (QuantityAction::Decrement, _) => QuantityChange::Decrement,
            (QuantityAction::Set, Some(quantity)) => QuantityChange::Set(quantity),
            (QuantityAction::Set, None) => {
                return Err(StatusError::bad_request().brief("\"set\" requires a quantity"));
            }
        };

        Ok((self.line.into(), change))
    }
}

/// Set Delivery Type Request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SetDeliveryRequest {
    #[serde(flatten)]
    pub line: LineKeyRequest,

    /// New delivery type for the line
    pub chosen_delivery_type: String,
}

/// Set Order Note Request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SetNoteRequest {
    #[serde(flatten)]
    pub line: LineKeyRequest,

    /// Note for the creator; blank or missing clears it
    #[serde(default)]
    pub order_note: Option<String>,
}

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartResponse {
    /// Lines in insertion order
    pub lines: Vec<CartLineResponse>,

    /// Priced cart; absent until the buyer has a delivery address
    pub breakdown: Option<BreakdownResponse>,
}

impl From<CartView> for CartResponse {
    fn from(view: CartView) -> Self {
        Self {
            lines: view.cart.lines.iter().map(CartLineResponse::from).collect(),
            breakdown: view.breakdown.map(BreakdownResponse::from),
        }
    }
}

/// Cart Line Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartLineResponse {
    pub product_id: String,

    #[serde(flatten)]
    pub variant: VariantFields,

    pub quantity: u32,
    pub chosen_delivery_type: String,
    pub order_note: Option<String>,
}

impl From<&CartLine> for CartLineResponse {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.to_string(),
            variant: VariantFields::from(&line.variant),
            quantity: line.quantity,
            chosen_delivery_type: line.delivery_type.clone(),
            order_note: line.order_note.clone(),
        }
    }
}

/// Breakdown Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BreakdownResponse {
    /// Settlement currency
    pub currency: String,

    /// Priced lines
    pub cart_breakdown: Vec<BreakdownLineResponse>,

    /// Lines left out of the totals, with the reason
    pub skipped: Vec<SkippedLineResponse>,

    pub subtotal: MoneyResponse,
    pub total_delivery_fee: MoneyResponse,
    pub grand_total: MoneyResponse,
}

impl From<Breakdown> for BreakdownResponse {
    fn from(breakdown: Breakdown) -> Self {
        Self {
            currency: breakdown.currency.iso_alpha_code.to_string(),
            cart_breakdown: breakdown
                .lines
                .into_iter()
                .map(BreakdownLineResponse::from)
                .collect(),
            skipped: breakdown
                .skipped
                .into_iter()
                .map(SkippedLineResponse::from)
                .collect(),
            subtotal: breakdown.subtotal.into(),
            total_delivery_fee: breakdown.total_delivery_fee.into(),
            grand_total: breakdown.grand_total.into(),
        }
    }
}

/// Priced cart line
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BreakdownLineResponse {
    pub product_id: String,

    #[serde(flatten)]
    pub variant: VariantFields,

    pub name: String,
    pub creator_id: Option<String>,
    pub quantity: u32,

    /// Unit price after discount
    pub price: MoneyResponse,

    /// Unit price before discount
    pub price_before_discount: MoneyResponse,

    pub discount: Option<DiscountResponse>,

    /// Delivery fee per unit
    pub delivery_fee: MoneyResponse,

    pub chosen_delivery_type: String,
    pub order_note: Option<String>,
    pub currency: String,
}

impl From<BreakdownLine> for BreakdownLineResponse {
    fn from(line: BreakdownLine) -> Self {
        Self {
            product_id: line.product.to_string(),
            variant: VariantFields::from(&line.variant),
            name: line.name,
            creator_id: line.creator_id,
            quantity: line.quantity,
            currency: line.price.currency().iso_alpha_code.to_string(),
            price: line.price.into(),
            price_before_discount: line.price_before_discount.into(),
            discount: line.applied_discount.map(DiscountResponse::from),
            delivery_fee: line.delivery_fee.into(),
            chosen_delivery_type: line.delivery_type,
            order_note: line.order_note,
        }
    }
}

/// Discount applied to a line
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum DiscountResponse {
    /// The product's own discount
    Product { percentage: u8 },

    /// A store-wide event
    Event { name: String, percentage: u8 },
}

impl From<AppliedDiscount> for DiscountResponse {
    fn from(discount: AppliedDiscount) -> Self {
        match discount {
            AppliedDiscount::Product { percentage } => Self::Product { percentage },
            AppliedDiscount::Event { name, percentage } => Self::Event { name, percentage },
        }
    }
}

/// Line left out of the breakdown
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SkippedLineResponse {
    pub product_id: String,

    #[serde(flatten)]
    pub variant: VariantFields,

    pub chosen_delivery_type: String,

    /// Machine-readable reason
    pub code: String,

    /// Human-readable reason
    pub reason: String,
}

impl From<SkippedLine> for SkippedLineResponse {
    fn from(line: SkippedLine) -> Self {
        Self {
            product_id: line.product.to_string(),
            variant: VariantFields::from(&line.variant),
            chosen_delivery_type: line.delivery_type,
            code: skip_code(&line.reason).to_string(),
            reason: line.reason.to_string(),
        }
    }
}

fn skip_code(reason: &SkipReason) -> &'static str {
    match reason {
        SkipReason::NotFound(_) => "not_found",
        SkipReason::DeliveryUnavailable(_) => "delivery_type_unavailable",
        SkipReason::AwaitingQuote { .. } => "awaiting_quote",
        SkipReason::Discount(_) => "invalid_discount",
        SkipReason::CurrencyMismatch { .. } => "currency_mismatch",
        SkipReason::Money(_) => "calculation_failed",
    }
}
