//! Money

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors raised by money helpers.
#[derive(Debug, Error, PartialEq)]
pub enum MoneyCalcError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Multiplication or summation left the representable range.
    #[error("amount overflowed the representable range")]
    Overflow,

    /// An allocation was requested with no recipients.
    #[error("cannot allocate an amount between zero parties")]
    NoParties,

    /// Allocations only distribute non-negative amounts.
    #[error("cannot allocate a negative amount ({0} minor units)")]
    NegativeAmount(i64),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Zero in the given currency.
pub fn zero(currency: &'static Currency) -> Money<'static, Currency> {
    Money::from_minor(0, currency)
}

/// Build a [`Percentage`] from whole percentage points (e.g. `10` for 10%).
pub fn percentage_points(points: u8) -> Percentage {
    Percentage::from(Decimal::new(i64::from(points), 2))
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// Rounds once, half away from zero.
///
/// # Errors
///
/// Returns [`MoneyCalcError::PercentConversion`] if the calculation overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, MoneyCalcError> {
    let minor = Decimal::from_i64(minor).ok_or(MoneyCalcError::PercentConversion)?;

    ((*percent) * Decimal::ONE)
        .checked_mul(minor)
        .ok_or(MoneyCalcError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(MoneyCalcError::PercentConversion)
}

/// Reduce a price by whole percentage points, rounding to the minor unit at the end.
///
/// # Errors
///
/// Returns an error if the percentage calculation or subtraction fails.
pub fn percent_off<'a>(
    price: Money<'a, Currency>,
    points: u8,
) -> Result<Money<'a, Currency>, MoneyCalcError> {
    let discount_minor = percent_of_minor(&percentage_points(points), price.to_minor_units())?;

    Ok(price.sub(Money::from_minor(discount_minor, price.currency()))?)
}

/// Multiply a unit price by a quantity.
///
/// # Errors
///
/// Returns [`MoneyCalcError::Overflow`] if the result does not fit in minor units.
pub fn times<'a>(
    price: Money<'a, Currency>,
    quantity: u32,
) -> Result<Money<'a, Currency>, MoneyCalcError> {
    let minor = price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(MoneyCalcError::Overflow)?;

    Ok(Money::from_minor(minor, price.currency()))
}

/// Sum a sequence of amounts that all share `currency`.
///
/// # Errors
///
/// Returns a [`MoneyCalcError::Money`] on currency mismatch.
pub fn total<'a, I>(
    amounts: I,
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, MoneyCalcError>
where
    I: IntoIterator<Item = Money<'a, Currency>>,
{
    amounts
        .into_iter()
        .try_fold(Money::from_minor(0, currency), |acc, amount| {
            acc.add(amount).map_err(MoneyCalcError::from)
        })
}

/// Split an amount into `parts` shares that differ by at most one minor unit.
///
/// Leftover minor units go to the earliest shares, so the result always sums to `amount`.
///
/// # Errors
///
/// Returns an error if `parts` is zero or `amount` is negative.
pub fn allocate_evenly<'a>(
    amount: Money<'a, Currency>,
    parts: usize,
) -> Result<Vec<Money<'a, Currency>>, MoneyCalcError> {
    let minor = non_negative_minor(&amount)?;

    if parts == 0 {
        return Err(MoneyCalcError::NoParties);
    }

    let parts_i64 = i64::try_from(parts).map_err(|_overflow| MoneyCalcError::Overflow)?;
    let base = minor / parts_i64;
    let remainder = usize::try_from(minor % parts_i64).map_err(|_sign| MoneyCalcError::Overflow)?;

    Ok((0..parts)
        .map(|index| {
            let extra = i64::from(index < remainder);

            Money::from_minor(base + extra, amount.currency())
        })
        .collect())
}

/// Split an amount in proportion to `weights`, using largest-remainder rounding.
///
/// Falls back to [`allocate_evenly`] when every weight is zero.
///
/// # Errors
///
/// Returns an error if `weights` is empty, `amount` is negative or a weight is negative.
pub fn allocate_proportionally<'a>(
    amount: Money<'a, Currency>,
    weights: &[i64],
) -> Result<Vec<Money<'a, Currency>>, MoneyCalcError> {
    let minor = non_negative_minor(&amount)?;

    if weights.is_empty() {
        return Err(MoneyCalcError::NoParties);
    }

    if let Some(negative) = weights.iter().find(|weight| **weight < 0) {
        return Err(MoneyCalcError::NegativeAmount(*negative));
    }

    let total_weight: i128 = weights.iter().map(|weight| i128::from(*weight)).sum();

    if total_weight == 0 {
        return allocate_evenly(amount, weights.len());
    }

    let mut shares: Vec<i128> = Vec::with_capacity(weights.len());
    let mut remainders: Vec<(usize, i128)> = Vec::with_capacity(weights.len());

    for (index, weight) in weights.iter().enumerate() {
        let scaled = i128::from(minor) * i128::from(*weight);

        shares.push(scaled / total_weight);
        remainders.push((index, scaled % total_weight));
    }

    let allocated: i128 = shares.iter().sum();
    let leftover = usize::try_from(i128::from(minor) - allocated)
        .map_err(|_sign| MoneyCalcError::Overflow)?;

    remainders.sort_by(|(a_index, a_rem), (b_index, b_rem)| {
        b_rem.cmp(a_rem).then_with(|| a_index.cmp(b_index))
    });

    for (index, _remainder) in remainders.into_iter().take(leftover) {
        if let Some(share) = shares.get_mut(index) {
            *share += 1;
        }
    }

    shares
        .into_iter()
        .map(|share| {
            i64::try_from(share)
                .map(|share| Money::from_minor(share, amount.currency()))
                .map_err(|_overflow| MoneyCalcError::Overflow)
        })
        .collect()
}

fn non_negative_minor(amount: &Money<'_, Currency>) -> Result<i64, MoneyCalcError> {
    let minor = amount.to_minor_units();

    if minor < 0 {
        return Err(MoneyCalcError::NegativeAmount(minor));
    }

    Ok(minor)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, SGD, USD};
    use testresult::TestResult;

    use super::*;

    fn minors(amounts: &[Money<'_, Currency>]) -> Vec<i64> {
        amounts.iter().map(Money::to_minor_units).collect()
    }

    #[test]
    fn percent_of_minor_calculates_correctly() -> TestResult {
        assert_eq!(percent_of_minor(&percentage_points(25), 200)?, 50);

        Ok(())
    }

    #[test]
    fn percent_of_minor_overflow_returns_error() {
        let percent = Percentage::from(2.0);
        let result = percent_of_minor(&percent, i64::MAX);

        assert!(matches!(result, Err(MoneyCalcError::PercentConversion)));
    }

    #[test]
    fn percent_off_rounds_once_at_the_end() -> TestResult {
        // 33% off 0.99 is 0.6633, which rounds to 0.66 rather than compounding per step.
        let price = percent_off(Money::from_minor(99, SGD), 33)?;

        assert_eq!(price, Money::from_minor(66, SGD));

        Ok(())
    }

    #[test]
    fn percent_off_full_discount_is_free() -> TestResult {
        assert_eq!(
            percent_off(Money::from_minor(1_999, SGD), 100)?,
            Money::from_minor(0, SGD)
        );

        Ok(())
    }

    #[test]
    fn times_multiplies_minor_units() -> TestResult {
        assert_eq!(
            times(Money::from_minor(500, SGD), 3)?,
            Money::from_minor(1_500, SGD)
        );

        Ok(())
    }

    #[test]
    fn times_overflow_returns_error() {
        let result = times(Money::from_minor(i64::MAX, SGD), 2);

        assert!(matches!(result, Err(MoneyCalcError::Overflow)));
    }

    #[test]
    fn total_of_nothing_is_zero() -> TestResult {
        assert_eq!(total([], GBP)?, Money::from_minor(0, GBP));

        Ok(())
    }

    #[test]
    fn total_with_mixed_currencies_errors() {
        let result = total(
            [Money::from_minor(100, GBP), Money::from_minor(100, USD)],
            GBP,
        );

        assert!(matches!(result, Err(MoneyCalcError::Money(_))));
    }

    #[test]
    fn allocate_evenly_hands_leftovers_to_first_shares() -> TestResult {
        let shares = allocate_evenly(Money::from_minor(100, SGD), 3)?;

        assert_eq!(minors(&shares), vec![34, 33, 33]);

        Ok(())
    }

    #[test]
    fn allocate_evenly_rejects_zero_parts() {
        let result = allocate_evenly(Money::from_minor(100, SGD), 0);

        assert!(matches!(result, Err(MoneyCalcError::NoParties)));
    }

    #[test]
    fn allocate_proportionally_sums_to_amount() -> TestResult {
        let shares = allocate_proportionally(Money::from_minor(1_000, SGD), &[1, 1, 1])?;

        assert_eq!(minors(&shares), vec![334, 333, 333]);

        let shares = allocate_proportionally(Money::from_minor(500, SGD), &[3_000, 1_000])?;

        assert_eq!(minors(&shares), vec![375, 125]);

        Ok(())
    }

    #[test]
    fn allocate_proportionally_with_zero_weights_falls_back_to_even() -> TestResult {
        let shares = allocate_proportionally(Money::from_minor(5, SGD), &[0, 0])?;

        assert_eq!(minors(&shares), vec![3, 2]);

        Ok(())
    }

    #[test]
    fn allocate_rejects_negative_amounts() {
        let result = allocate_proportionally(Money::from_minor(-5, SGD), &[1]);

        assert!(matches!(result, Err(MoneyCalcError::NegativeAmount(-5))));
    }
}
