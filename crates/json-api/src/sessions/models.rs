//! Checkout session response models

use gantry::revenue::{CreatorRevenue, DigitalGrant, GrantOutcome, SoldItem};
use gantry_app::domain::sessions::models::{
    CheckoutSession, GrantReceipt, RecordOutcome, SessionFilter,
};
use jiff::civil::Date;
use salvo::{
    oapi::{ToParameters, ToSchema},
    prelude::StatusError,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{extensions::*, models::MoneyResponse};

/// Session listing filter. Dates are `YYYY-MM-DD`, inclusive, in UTC.
#[derive(Debug, Default, Deserialize, ToParameters)]
#[salvo(parameters(default_parameter_in = Query, rename_all = "camelCase"))]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionsQuery {
    /// Only sessions with this processed flag
    pub processed: Option<bool>,

    /// Earliest creation date
    pub start_date: Option<String>,

    /// Latest creation date
    pub end_date: Option<String>,
}

impl SessionsQuery {
    pub(crate) fn into_filter(self) -> Result<SessionFilter, StatusError> {
        Ok(SessionFilter {
            processed: self.processed,
            start_date: parse_date(self.start_date, "startDate")?,
            end_date: parse_date(self.end_date, "endDate")?,
        })
    }
}

fn parse_date(value: Option<String>, name: &str) -> Result<Option<Date>, StatusError> {
    value
        .map(|value| value.parse::<Date>())
        .transpose()
        .or_400(&format!("could not parse \"{name}\" query parameter"))
}

/// Checkout Session Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionResponse {
    pub session_id: Uuid,
    pub buyer_id: String,
    pub currency: String,
    pub total_amount: MoneyResponse,

    /// Order-level shipping shared between creators
    pub shared_shipping: Option<MoneyResponse>,

    /// Revenue per creator, ordered by creator id
    pub sales_data: Vec<CreatorRevenueResponse>,

    /// Revenue of items whose product could not be resolved
    pub unattributed: Option<RevenueResponse>,

    /// Download links owed to the buyer, per product
    pub digital_product_data: Vec<DigitalGrantResponse>,

    pub processed: bool,
    pub needs_reconciliation: bool,

    /// RFC 3339 timestamp
    pub created_at: String,
}

impl From<CheckoutSession> for SessionResponse {
    fn from(session: CheckoutSession) -> Self {
        Self {
            session_id: session.uuid.into_uuid(),
            buyer_id: session.buyer_id,
            currency: session.total_amount.currency().iso_alpha_code.to_string(),
            total_amount: session.total_amount.into(),
            shared_shipping: session.shared_shipping.map(MoneyResponse::from),
            sales_data: session
                .split
                .creators
                .into_iter()
                .map(|(creator_id, revenue)| CreatorRevenueResponse {
                    creator_id,
                    revenue: revenue.into(),
                })
                .collect(),
            unattributed: session.split.unattributed.map(RevenueResponse::from),
            digital_product_data: session
                .split
                .digital
                .into_iter()
                .map(|(product_id, grant)| DigitalGrantResponse::new(product_id, grant))
                .collect(),
            processed: session.processed,
            needs_reconciliation: session.needs_reconciliation,
            created_at: session.created_at.to_string(),
        }
    }
}

impl From<RecordOutcome> for SessionResponse {
    fn from(outcome: RecordOutcome) -> Self {
        match outcome {
            RecordOutcome::Created(session) | RecordOutcome::Replayed(session) => session.into(),
        }
    }
}

/// One creator's share of a session.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatorRevenueResponse {
    pub creator_id: String,

    #[serde(flatten)]
    pub revenue: RevenueResponse,
}

/// Revenue Bucket
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RevenueResponse {
    pub product_revenue: MoneyResponse,
    pub shipping_revenue: MoneyResponse,
    pub items: Vec<SoldItemResponse>,
}

impl From<CreatorRevenue> for RevenueResponse {
    fn from(revenue: CreatorRevenue) -> Self {
        Self {
            product_revenue: revenue.product_revenue.into(),
            shipping_revenue: revenue.shipping_revenue.into(),
            items: revenue.items.into_iter().map(SoldItemResponse::from).collect(),
        }
    }
}

/// Sold Item
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SoldItemResponse {
    pub product_id: String,
    pub name: String,
    pub creator_id: Option<String>,
    pub unit_price: MoneyResponse,
    pub quantity: u32,

    /// Per unit
    pub delivery_fee: MoneyResponse,

    pub chosen_delivery_type: String,
}

impl From<SoldItem> for SoldItemResponse {
    fn from(item: SoldItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name,
            creator_id: item.creator_id,
            unit_price: item.unit_price.into(),
            quantity: item.quantity,
            delivery_fee: item.delivery_fee.into(),
            chosen_delivery_type: item.delivery_type,
        }
    }
}

/// Digital Grant
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DigitalGrantResponse {
    pub product_id: String,
    pub buyer_id: String,
    pub links: Vec<String>,
    pub granted: bool,
}

impl DigitalGrantResponse {
    fn new(product_id: String, grant: DigitalGrant) -> Self {
        Self {
            product_id,
            buyer_id: grant.buyer_id,
            links: grant.links,
            granted: grant.granted,
        }
    }
}

/// Grant Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GrantResponse {
    #[serde(flatten)]
    pub grant: DigitalGrantResponse,

    /// The links had already been delivered before this request
    pub already_granted: bool,
}

impl From<GrantReceipt> for GrantResponse {
    fn from(receipt: GrantReceipt) -> Self {
        Self {
            grant: DigitalGrantResponse::new(receipt.product_id, receipt.grant),
            already_granted: receipt.outcome == GrantOutcome::AlreadyGranted,
        }
    }
}

/// Sessions List Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SessionsResponse {
    pub sessions: Vec<SessionResponse>,
}

/// Update Session Request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateSessionRequest {
    /// Whether staff have reconciled the payouts
    pub processed: bool,
}
