//! Custom Prints
//!
//! Lifecycle of a bespoke 3D-print order, from model upload through delivery. Every status
//! change goes through [`CustomPrintRequest::apply`], and [`PrintStatus::is_checkout_eligible`]
//! is the only place that decides whether a request may be paid for.

use std::{fmt, str::FromStr};

use rusty_money::{Money, MoneyError, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Progress of a custom-print request.
///
/// Declaration order is the order of progress; `Cancelled` is a terminal escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintStatus {
    /// Waiting for the buyer's model file.
    PendingUpload,

    /// Model uploaded, print settings not chosen yet.
    PendingConfig,

    /// Settings chosen, waiting for a staff quote.
    Configured,

    /// Priced and offered delivery types.
    Quoted,

    /// Checkout started.
    PaymentPending,

    /// Payment captured.
    Paid,

    /// On the printer.
    Printing,

    /// Finished printing.
    Printed,

    /// Handed to the carrier.
    Shipped,

    /// Received by the buyer.
    Delivered,

    /// Abandoned before shipping.
    Cancelled,
}

impl PrintStatus {
    /// Wire name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PendingUpload => "pending_upload",
            Self::PendingConfig => "pending_config",
            Self::Configured => "configured",
            Self::Quoted => "quoted",
            Self::PaymentPending => "payment_pending",
            Self::Paid => "paid",
            Self::Printing => "printing",
            Self::Printed => "printed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a cart line referencing a request in this status may enter checkout.
    pub fn is_checkout_eligible(self) -> bool {
        self >= Self::Quoted && self != Self::Cancelled
    }

    /// No further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for PrintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrintStatus {
    type Err = PrintError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let status = match value {
            "pending_upload" => Self::PendingUpload,
            "pending_config" => Self::PendingConfig,
            "configured" => Self::Configured,
            "quoted" => Self::Quoted,
            "payment_pending" => Self::PaymentPending,
            "paid" => Self::Paid,
            "printing" => Self::Printing,
            "printed" => Self::Printed,
            "shipped" => Self::Shipped,
            "delivered" => Self::Delivered,
            "cancelled" => Self::Cancelled,
            other => return Err(PrintError::UnknownStatus(other.to_string())),
        };

        Ok(status)
    }
}

/// Errors raised by custom-print transitions and checkout guards.
#[derive(Debug, Error, PartialEq)]
pub enum PrintError {
    /// The transition is not allowed from the current status.
    #[error("cannot {transition} a custom print request that is {from}")]
    InvalidTransition {
        /// Status before the transition
        from: PrintStatus,

        /// Transition name
        transition: &'static str,
    },

    /// The model file lacks a storage key or original filename.
    #[error("model file requires both a storage key and an original filename")]
    MissingModelFile,

    /// The print configuration is not marked as configured.
    #[error("print configuration is incomplete")]
    NotConfigured,

    /// The quote is malformed.
    #[error("invalid quote: {0}")]
    InvalidQuote(String),

    /// Unrecognised status string.
    #[error("unknown custom print status {0}")]
    UnknownStatus(String),

    /// The acting party may not perform this transition.
    #[error("{actor} may not {transition} a custom print request")]
    NotPermitted {
        /// Transition name
        transition: &'static str,

        /// Party that attempted it
        actor: Actor,
    },

    /// The request has not been quoted, so it cannot be checked out.
    #[error("custom print request {request_id} is {status} and cannot be checked out")]
    CheckoutBlocked {
        /// Request id
        request_id: String,

        /// Current status
        status: PrintStatus,
    },
}

/// Party asking for a transition.
///
/// Payment transitions belong to neither party; checkout and payment capture drive them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actor {
    /// Buyer who owns the request.
    Owner,

    /// Print shop staff.
    Staff,
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Owner => "owner",
            Self::Staff => "staff",
        })
    }
}

/// Uploaded model, referenced by opaque object-storage key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFile {
    /// Object storage key
    pub storage_key: String,

    /// Filename as uploaded
    pub original_name: String,
}

/// Print settings chosen by the buyer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintConfiguration {
    /// Whether every required setting has been chosen
    pub is_configured: bool,

    /// Filament material
    pub material: Option<String>,

    /// Filament colour
    pub colour: Option<String>,

    /// Layer height in microns
    pub layer_height: Option<u32>,

    /// Infill in percentage points
    pub infill: Option<u8>,
}

/// A delivery type offered for a quoted request, with its flat price.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryQuote {
    /// Delivery type name
    pub kind: String,

    /// Flat fee
    pub price: Money<'static, Currency>,
}

/// A bespoke print job.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomPrintRequest {
    /// Request id
    pub id: String,

    /// Buyer who submitted the model
    pub owner_id: String,

    /// Current status
    pub status: PrintStatus,

    /// Uploaded model
    pub model_file: Option<ModelFile>,

    /// Chosen print settings
    pub print_configuration: Option<PrintConfiguration>,

    /// Delivery types offered with the quote
    pub delivery_types: Vec<DeliveryQuote>,

    /// Quoted base price
    pub base_price: Option<Money<'static, Currency>>,

    /// Quoted print fee
    pub print_fee: Option<Money<'static, Currency>>,
}

/// A requested status change.
#[derive(Debug, Clone, PartialEq)]
pub enum PrintTransition {
    /// Attach the uploaded model.
    SubmitModel(ModelFile),

    /// Record the buyer's print settings.
    Configure(PrintConfiguration),

    /// Staff prices the job and offers delivery types.
    Quote {
        /// Base price
        base_price: Money<'static, Currency>,

        /// Print fee
        print_fee: Money<'static, Currency>,

        /// Offered delivery types
        delivery_types: Vec<DeliveryQuote>,
    },

    /// Replace the offered delivery types of a quoted request.
    UpdateDeliveryOptions(Vec<DeliveryQuote>),

    /// Checkout started.
    RequestPayment,

    /// Payment captured.
    ConfirmPayment,

    /// Printing started.
    StartPrinting,

    /// Printing finished.
    FinishPrinting,

    /// Handed to the carrier.
    Ship,

    /// Buyer received the print.
    ConfirmDelivery,

    /// Abandon the request.
    Cancel,
}

impl PrintTransition {
    /// Transition name, as used on the wire and in errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubmitModel(_) => "submit_model",
            Self::Configure(_) => "configure",
            Self::Quote { .. } => "quote",
            Self::UpdateDeliveryOptions(_) => "update_delivery_options",
            Self::RequestPayment => "request_payment",
            Self::ConfirmPayment => "confirm_payment",
            Self::StartPrinting => "start_printing",
            Self::FinishPrinting => "finish_printing",
            Self::Ship => "ship",
            Self::ConfirmDelivery => "confirm_delivery",
            Self::Cancel => "cancel",
        }
    }

    /// Whether `actor` may ask for this transition.
    pub fn is_permitted_for(&self, actor: Actor) -> bool {
        match self {
            Self::SubmitModel(_) | Self::Configure(_) => actor == Actor::Owner,
            Self::Quote { .. }
            | Self::UpdateDeliveryOptions(_)
            | Self::StartPrinting
            | Self::FinishPrinting
            | Self::Ship
            | Self::ConfirmDelivery => actor == Actor::Staff,
            Self::RequestPayment | Self::ConfirmPayment => false,
            Self::Cancel => true,
        }
    }
}

impl CustomPrintRequest {
    /// A new request waiting for its model upload.
    pub fn new(id: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            status: PrintStatus::PendingUpload,
            model_file: None,
            print_configuration: None,
            delivery_types: Vec::new(),
            base_price: None,
            print_fee: None,
        }
    }

    /// `base_price + print_fee`, once both are known.
    pub fn quoted_price(&self) -> Option<Result<Money<'static, Currency>, MoneyError>> {
        match (self.base_price, self.print_fee) {
            (Some(base_price), Some(print_fee)) => Some(base_price.add(print_fee)),
            _ => None,
        }
    }

    /// Apply `transition`, returning the new status.
    ///
    /// The request is left untouched when the transition is rejected.
    ///
    /// # Errors
    ///
    /// Returns a [`PrintError`] if the transition is not allowed from the current status or its
    /// guard fails.
    pub fn apply(&mut self, transition: PrintTransition) -> Result<PrintStatus, PrintError> {
        let from = self.status;
        let invalid = PrintError::InvalidTransition {
            from,
            transition: transition.name(),
        };

        let next = match (from, transition) {
            (PrintStatus::PendingUpload, PrintTransition::SubmitModel(model_file)) => {
                if model_file.storage_key.is_empty() || model_file.original_name.is_empty() {
                    return Err(PrintError::MissingModelFile);
                }

                self.model_file = Some(model_file);

                PrintStatus::PendingConfig
            }
            (PrintStatus::PendingConfig, PrintTransition::Configure(configuration)) => {
                if !configuration.is_configured {
                    return Err(PrintError::NotConfigured);
                }

                self.print_configuration = Some(configuration);

                PrintStatus::Configured
            }
            (
                PrintStatus::Configured,
                PrintTransition::Quote {
                    base_price,
                    print_fee,
                    delivery_types,
                },
            ) => {
                validate_quote(base_price, print_fee, &delivery_types)?;

                self.base_price = Some(base_price);
                self.print_fee = Some(print_fee);
                self.delivery_types = delivery_types;

                PrintStatus::Quoted
            }
            (PrintStatus::Quoted, PrintTransition::UpdateDeliveryOptions(delivery_types)) => {
                if let (Some(base_price), Some(print_fee)) = (self.base_price, self.print_fee) {
                    validate_quote(base_price, print_fee, &delivery_types)?;
                }

                self.delivery_types = delivery_types;

                PrintStatus::Quoted
            }
            (PrintStatus::Quoted, PrintTransition::RequestPayment) => PrintStatus::PaymentPending,
            (PrintStatus::PaymentPending, PrintTransition::ConfirmPayment) => PrintStatus::Paid,
            (PrintStatus::Paid, PrintTransition::StartPrinting) => PrintStatus::Printing,
            (PrintStatus::Printing, PrintTransition::FinishPrinting) => PrintStatus::Printed,
            (PrintStatus::Printed, PrintTransition::Ship) => PrintStatus::Shipped,
            (PrintStatus::Shipped, PrintTransition::ConfirmDelivery) => PrintStatus::Delivered,
            (status, PrintTransition::Cancel)
                if status < PrintStatus::Shipped && status != PrintStatus::Cancelled =>
            {
                PrintStatus::Cancelled
            }
            _ => return Err(invalid),
        };

        self.status = next;

        Ok(next)
    }

    /// Apply `transition` on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// Returns [`PrintError::NotPermitted`] when `actor` may not ask for the transition, otherwise
    /// as [`CustomPrintRequest::apply`].
    pub fn apply_as(
        &mut self,
        actor: Actor,
        transition: PrintTransition,
    ) -> Result<PrintStatus, PrintError> {
        if !transition.is_permitted_for(actor) {
            return Err(PrintError::NotPermitted {
                transition: transition.name(),
                actor,
            });
        }

        self.apply(transition)
    }

    /// Delivery type a cart line should switch to after the offer changed.
    ///
    /// Returns `None` when `current` is still offered or nothing is offered at all.
    pub fn reconcile_delivery_type(&self, current: &str) -> Option<String> {
        reconcile_delivery_type(current, &self.delivery_types)
    }
}

/// Fall back to the first offered delivery type when `current` is no longer offered.
pub fn reconcile_delivery_type(current: &str, offered: &[DeliveryQuote]) -> Option<String> {
    if offered.iter().any(|quote| quote.kind == current) {
        return None;
    }

    offered.first().map(|quote| quote.kind.clone())
}

/// Reject checkout of a request that has not been quoted yet.
///
/// # Errors
///
/// Returns [`PrintError::CheckoutBlocked`] unless the request is checkout-eligible.
pub fn ensure_checkout_eligible(request: &CustomPrintRequest) -> Result<(), PrintError> {
    if request.status.is_checkout_eligible() {
        return Ok(());
    }

    Err(PrintError::CheckoutBlocked {
        request_id: request.id.clone(),
        status: request.status,
    })
}

fn validate_quote(
    base_price: Money<'static, Currency>,
    print_fee: Money<'static, Currency>,
    delivery_types: &[DeliveryQuote],
) -> Result<(), PrintError> {
    let currency = base_price.currency();

    if print_fee.currency() != currency
        || delivery_types
            .iter()
            .any(|quote| quote.price.currency() != currency)
    {
        return Err(PrintError::InvalidQuote(
            "quote amounts must share one currency".to_string(),
        ));
    }

    let negative = base_price.to_minor_units() < 0
        || print_fee.to_minor_units() < 0
        || delivery_types
            .iter()
            .any(|quote| quote.price.to_minor_units() < 0);

    if negative {
        return Err(PrintError::InvalidQuote(
            "quote amounts must not be negative".to_string(),
        ));
    }

    Ok(())
}
