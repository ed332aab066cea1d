//! Custom print request and response models

use gantry::custom_print::{
    CustomPrintRequest, DeliveryQuote, ModelFile, PrintConfiguration, PrintTransition,
};
use gantry_app::settings::settlement_currency;
use rusty_money::{Money, iso::Currency};
use salvo::{oapi::ToSchema, prelude::StatusError};
use serde::{Deserialize, Serialize};

use crate::{extensions::*, models::MoneyResponse};

/// Uploaded model file
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModelFileBody {
    /// Object storage key
    pub s3_key: String,

    /// Filename as uploaded
    pub original_name: String,
}

impl From<ModelFileBody> for ModelFile {
    fn from(body: ModelFileBody) -> Self {
        ModelFile {
            storage_key: body.s3_key,
            original_name: body.original_name,
        }
    }
}

impl From<ModelFile> for ModelFileBody {
    fn from(file: ModelFile) -> Self {
        Self {
            s3_key: file.storage_key,
            original_name: file.original_name,
        }
    }
}

/// Create Custom Print Request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateCustomPrintRequest {
    pub model_file: ModelFileBody,
}

/// Print settings chosen by the buyer
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PrintConfigurationBody {
    /// Every required setting has been chosen
    pub is_configured: bool,

    #[serde(default)]
    pub material: Option<String>,

    #[serde(default)]
    pub colour: Option<String>,

    /// Microns
    #[serde(default)]
    pub layer_height: Option<u32>,

    /// Percentage points
    #[serde(default)]
    pub infill: Option<u8>,
}

impl From<PrintConfigurationBody> for PrintConfiguration {
    fn from(body: PrintConfigurationBody) -> Self {
        PrintConfiguration {
            is_configured: body.is_configured,
            material: body.material,
            colour: body.colour,
            layer_height: body.layer_height,
            infill: body.infill,
        }
    }
}

impl From<PrintConfiguration> for PrintConfigurationBody {
    fn from(configuration: PrintConfiguration) -> Self {
        Self {
            is_configured: configuration.is_configured,
            material: configuration.material,
            colour: configuration.colour,
            layer_height: configuration.layer_height,
            infill: configuration.infill,
        }
    }
}

/// A delivery type offered with a quote, priced in minor units
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeliveryQuoteBody {
    pub kind: String,
    pub price: i64,
}

/// Transition Request
///
/// Amounts are in minor units of `currency`, which defaults to the settlement currency. Payment
/// transitions are driven by checkout and payment capture and are not accepted here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "transition", rename_all = "snake_case")]
pub(crate) enum TransitionRequest {
    SubmitModel {
        #[serde(rename = "modelFile")]
        model_file: ModelFileBody,
    },
    Configure {
        #[serde(rename = "printConfiguration")]
        print_configuration: PrintConfigurationBody,
    },
    Quote {
        #[serde(default)]
        currency: Option<String>,

        #[serde(rename = "basePrice")]
        base_price: i64,

        #[serde(rename = "printFee")]
        print_fee: i64,

        #[serde(rename = "deliveryTypes")]
        delivery_types: Vec<DeliveryQuoteBody>,
    },
    UpdateDeliveryOptions {
        #[serde(default)]
        currency: Option<String>,

        #[serde(rename = "deliveryTypes")]
        delivery_types: Vec<DeliveryQuoteBody>,
    },
    StartPrinting,
    FinishPrinting,
    Ship,
    ConfirmDelivery,
    Cancel,
}

fn quotes(
    delivery_types: Vec<DeliveryQuoteBody>,
    currency: &'static Currency,
) -> Vec<DeliveryQuote> {
    delivery_types
        .into_iter()
        .map(|quote| DeliveryQuote {
            kind: quote.kind,
            price: Money::from_minor(quote.price, currency),
        })
        .collect()
}

fn quote_currency(
    code: Option<String>,
    settlement: &'static Currency,
) -> Result<&'static Currency, StatusError> {
    code.map_or(Ok(settlement), |code| {
        settlement_currency(&code).or_400("invalid currency")
    })
}

impl TransitionRequest {
    pub(crate) fn into_transition(
        self,
        settlement: &'static Currency,
    ) -> Result<PrintTransition, StatusError> {
        let transition = match self {
            Self::SubmitModel { model_file } => PrintTransition::SubmitModel(model_file.into()),
            Self::Configure {
                print_configuration,
            } => PrintTransition::Configure(print_configuration.into()),
            Self::Quote {
                currency,
                base_price,
                print_fee,
                delivery_types,
            } => {
                let currency = quote_currency(currency, settlement)?;

                PrintTransition::Quote {
                    base_price: Money::from_minor(base_price, currency),
                    print_fee: Money::from_minor(print_fee, currency),
                    delivery_types: quotes(delivery_types, currency),
                }
            }
            Self::UpdateDeliveryOptions {
                currency,
                delivery_types,
            } => PrintTransition::UpdateDeliveryOptions(quotes(
                delivery_types,
                quote_currency(currency, settlement)?,
            )),
            Self::StartPrinting => PrintTransition::StartPrinting,
            Self::FinishPrinting => PrintTransition::FinishPrinting,
            Self::Ship => PrintTransition::Ship,
            Self::ConfirmDelivery => PrintTransition::ConfirmDelivery,
            Self::Cancel => PrintTransition::Cancel,
        };

        Ok(transition)
    }
}

/// Offered delivery type
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeliveryQuoteResponse {
    pub kind: String,
    pub price: MoneyResponse,
}

/// Custom Print Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CustomPrintResponse {
    pub id: String,
    pub owner_id: String,

    /// Lifecycle status, e.g. `quoted`
    pub status: String,

    pub model_file: Option<ModelFileBody>,
    pub print_configuration: Option<PrintConfigurationBody>,
    pub delivery_types: Vec<DeliveryQuoteResponse>,
    pub base_price: Option<MoneyResponse>,
    pub print_fee: Option<MoneyResponse>,

    /// Product id to add the request to a cart with
    pub product_id: String,
}

impl From<CustomPrintRequest> for CustomPrintResponse {
    fn from(request: CustomPrintRequest) -> Self {
        Self {
            product_id: format!("custom-print:{}", request.id),
            id: request.id,
            owner_id: request.owner_id,
            status: request.status.to_string(),
            model_file: request.model_file.map(ModelFileBody::from),
            print_configuration: request
                .print_configuration
                .map(PrintConfigurationBody::from),
            delivery_types: request
                .delivery_types
                .into_iter()
                .map(|quote| DeliveryQuoteResponse {
                    kind: quote.kind,
                    price: quote.price.into(),
                })
                .collect(),
            base_price: request.base_price.map(MoneyResponse::from),
            print_fee: request.print_fee.map(MoneyResponse::from),
        }
    }
}
