//! Models shared by several resources

use std::collections::BTreeMap;

use gantry::variants::VariantSelector;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

/// Monetary amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MoneyResponse {
    /// Decimal amount in major units, e.g. `"90.00"`
    pub amount: String,

    /// Amount in minor units
    pub minor_units: i64,

    /// ISO 4217 currency code
    pub currency: String,
}

impl From<Money<'static, Currency>> for MoneyResponse {
    fn from(money: Money<'static, Currency>) -> Self {
        let currency = money.currency();
        let minor_units = money.to_minor_units();

        Self {
            amount: Decimal::new(minor_units, currency.exponent).to_string(),
            minor_units,
            currency: currency.iso_alpha_code.to_string(),
        }
    }
}

/// Variant selection as sent on the wire.
///
/// `selectedVariants` wins over `variantId` when both are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VariantFields {
    /// Legacy single-axis variant id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,

    /// Multi-axis selection, variant type name to option name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_variants: Option<BTreeMap<String, String>>,
}

impl VariantFields {
    pub(crate) fn into_selector(self) -> VariantSelector {
        VariantSelector::from_parts(self.variant_id, self.selected_variants)
    }
}

impl From<&VariantSelector> for VariantFields {
    fn from(selector: &VariantSelector) -> Self {
        Self {
            variant_id: selector.variant_id().map(ToString::to_string),
            selected_variants: selector.key().map(|key| {
                key.iter()
                    .map(|(axis, option)| (axis.to_string(), option.to_string()))
                    .collect()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{JPY, SGD};

    use super::*;

    #[test]
    fn money_renders_with_currency_exponent() {
        assert_eq!(
            MoneyResponse::from(Money::from_minor(9_000, SGD)),
            MoneyResponse {
                amount: "90.00".to_string(),
                minor_units: 9_000,
                currency: "SGD".to_string(),
            }
        );
        assert_eq!(MoneyResponse::from(Money::from_minor(500, JPY)).amount, "500");
    }

    #[test]
    fn selected_variants_take_priority() {
        let fields = VariantFields {
            variant_id: Some("legacy".to_string()),
            selected_variants: Some(BTreeMap::from([
                ("Size".to_string(), "L".to_string()),
                ("Colour".to_string(), "Red".to_string()),
            ])),
        };

        let selector = fields.into_selector();

        assert_eq!(selector.variant_id(), None);
        assert_eq!(
            VariantFields::from(&selector)
                .selected_variants
                .map(|map| map.len()),
            Some(2)
        );
    }

    #[test]
    fn empty_fields_select_nothing() {
        assert_eq!(VariantFields::default().into_selector(), VariantSelector::None);
    }
}
