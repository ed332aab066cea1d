//! Pricing settings shared by the services.

use std::time::Duration;

use gantry::revenue::ShippingPolicy;
use rusty_money::{
    Findable,
    iso::{self, Currency},
};
use thiserror::Error;

/// Bound on a single store call unless configured otherwise.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(2_000);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("unknown currency code {0}")]
    UnknownCurrency(String),
}

/// Settlement currency, shared-shipping policy and store call bound.
#[derive(Debug, Clone, Copy)]
pub struct PricingSettings {
    pub currency: &'static Currency,
    pub shipping_policy: ShippingPolicy,
    pub store_timeout: Duration,
}

impl PricingSettings {
    /// Settings for the currency named by `code`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::UnknownCurrency`] when `code` is not an ISO currency.
    pub fn new(
        code: &str,
        shipping_policy: ShippingPolicy,
        store_timeout: Duration,
    ) -> Result<Self, SettingsError> {
        Ok(Self {
            currency: settlement_currency(code)?,
            shipping_policy,
            store_timeout,
        })
    }
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            currency: iso::SGD,
            shipping_policy: ShippingPolicy::default(),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

/// Look up an ISO currency by its alpha code, ignoring case.
///
/// # Errors
///
/// Returns [`SettingsError::UnknownCurrency`] when no currency matches.
pub fn settlement_currency(code: &str) -> Result<&'static Currency, SettingsError> {
    Currency::find(&code.trim().to_ascii_uppercase())
        .ok_or_else(|| SettingsError::UnknownCurrency(code.to_string()))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn currency_codes_are_case_insensitive() -> TestResult {
        assert_eq!(settlement_currency(" sgd ")?, iso::SGD);
        assert_eq!(settlement_currency("USD")?, iso::USD);

        Ok(())
    }

    #[test]
    fn unknown_currency_is_rejected() {
        assert_eq!(
            settlement_currency("XYZ"),
            Err(SettingsError::UnknownCurrency("XYZ".to_string()))
        );
    }
}
