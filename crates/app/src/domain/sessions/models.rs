//! Checkout Session Models

use std::fmt;

use gantry::{
    products::ProductRef,
    revenue::{DigitalGrant, GrantOutcome, RevenueSplit, SoldItem},
    variants::VariantSelector,
};
use jiff::{Timestamp, civil::Date, tz::TimeZone};
use rusty_money::{Money, iso::Currency};
use uuid::Uuid;

/// Checkout session id, assigned by the payment collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionUuid(Uuid);

impl SessionUuid {
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub const fn into_uuid(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for SessionUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for SessionUuid {
    fn from(value: Uuid) -> Self {
        Self::from_uuid(value)
    }
}

/// A paid order and its payout ledger.
///
/// Append-only apart from `processed`.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub uuid: SessionUuid,
    pub buyer_id: String,
    pub total_amount: Money<'static, Currency>,
    pub shared_shipping: Option<Money<'static, Currency>>,
    pub items: Vec<SoldItem>,
    pub split: RevenueSplit,

    /// Staff have reconciled the payouts.
    pub processed: bool,

    /// The split did not reconcile with `total_amount` within one minor unit.
    pub needs_reconciliation: bool,

    pub created_at: Timestamp,
}

impl CheckoutSession {
    /// Creation date in UTC, used for date filtering.
    pub fn created_on(&self) -> Date {
        self.created_at.to_zoned(TimeZone::UTC).date()
    }

    pub fn currency(&self) -> &'static Currency {
        self.total_amount.currency()
    }
}

/// Session listing filter. Date bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFilter {
    pub processed: Option<bool>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

impl SessionFilter {
    pub fn matches(&self, session: &CheckoutSession) -> bool {
        let created_on = session.created_on();

        self.processed
            .is_none_or(|processed| processed == session.processed)
            && self.start_date.is_none_or(|start| created_on >= start)
            && self.end_date.is_none_or(|end| created_on <= end)
    }
}

/// One line of a captured payment.
#[derive(Debug, Clone, PartialEq)]
pub struct PaidLine {
    pub product: ProductRef,
    pub variant: VariantSelector,
    pub quantity: u32,
    pub unit_price: Money<'static, Currency>,
    pub delivery_type: String,

    /// Per unit
    pub delivery_fee: Money<'static, Currency>,
}

/// Payment captured event from the payment collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentCaptured {
    pub session: SessionUuid,
    pub buyer_id: String,
    pub total_amount: Money<'static, Currency>,

    /// Order-level shipping not attached to any line.
    pub shared_shipping: Option<Money<'static, Currency>>,

    pub lines: Vec<PaidLine>,
}

/// Outcome of recording a captured payment.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// The session was new and has been stored.
    Created(CheckoutSession),

    /// The session was already recorded; nothing changed.
    Replayed(CheckoutSession),
}

impl RecordOutcome {
    pub fn session(&self) -> &CheckoutSession {
        match self {
            Self::Created(session) | Self::Replayed(session) => session,
        }
    }
}

/// A digital grant after it was marked delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct GrantReceipt {
    pub product_id: String,
    pub grant: DigitalGrant,
    pub outcome: GrantOutcome,
}
