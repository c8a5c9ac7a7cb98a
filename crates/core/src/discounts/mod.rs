//! Discounts
//!
//! Discount codes entered at checkout, and the percentage arithmetic shared
//! with tax calculation.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError};
use thiserror::Error;

use crate::{
    money::{Price, zero},
    pricing::min_price,
};

/// Errors specific to discount calculations.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// What a discount code takes off the order.
#[derive(Debug, Copy, Clone)]
pub enum DiscountKind {
    /// Percentage off the subtotal (e.g. "15% off merch").
    PercentageOff(Percentage),

    /// Fixed amount off the subtotal (e.g. "$5 off"), never below zero.
    AmountOff(Price),
}

/// A discount code accepted by the store.
#[derive(Debug, Clone)]
pub struct DiscountCode {
    /// Code as typed by the customer, upper-cased.
    pub code: String,

    /// Discount applied.
    pub kind: DiscountKind,

    /// Subtotal required before the code applies.
    pub minimum_subtotal: Option<Price>,
}

impl DiscountCode {
    /// Create a code with no minimum spend.
    pub fn new(code: &str, kind: DiscountKind) -> Self {
        Self {
            code: code.trim().to_ascii_uppercase(),
            kind,
            minimum_subtotal: None,
        }
    }

    /// Require a minimum subtotal.
    #[must_use]
    pub fn with_minimum(mut self, minimum: Price) -> Self {
        self.minimum_subtotal = Some(minimum);
        self
    }

    /// Whether the code applies to this subtotal.
    pub fn applies_to(&self, subtotal: &Price) -> bool {
        self.minimum_subtotal
            .is_none_or(|minimum| subtotal.to_minor_units() >= minimum.to_minor_units())
    }

    /// Amount taken off `subtotal`. Zero when the minimum is not met.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is in another currency or the percentage
    /// cannot be represented in minor units.
    pub fn discount_for(&self, subtotal: &Price) -> Result<Price, DiscountError> {
        if !self.applies_to(subtotal) {
            return Ok(zero(subtotal.currency()));
        }

        match &self.kind {
            DiscountKind::PercentageOff(percent) => {
                let minor = percent_of_minor(percent, subtotal.to_minor_units())?;

                Ok(min_price(Money::from_minor(minor, subtotal.currency()), *subtotal))
            }
            DiscountKind::AmountOff(amount) => {
                let remaining = subtotal.sub(*amount)?;

                if remaining.to_minor_units() < 0 {
                    Ok(*subtotal)
                } else {
                    Ok(*amount)
                }
            }
        }
    }
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// # Errors
///
/// Returns an error if:
/// - The percentage calculation overflows or cannot be safely represented (`DiscountError::PercentConversion`).
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage crate doesn't actually expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn percent_of_minor_overflow_returns_error() {
        let percent = Percentage::from(2.0);
        let result = percent_of_minor(&percent, i64::MAX);

        assert!(matches!(result, Err(DiscountError::PercentConversion)));
    }

    #[test]
    fn percent_of_minor_checked_mul_overflow_returns_error() -> TestResult {
        let percent = Percentage::try_from("100000000000000000000")?;
        let result = percent_of_minor(&percent, i64::MAX);

        assert!(matches!(result, Err(DiscountError::PercentConversion)));

        Ok(())
    }

    #[test]
    fn percent_of_minor_rounds_half_away_from_zero() -> TestResult {
        assert_eq!(percent_of_minor(&Percentage::from(0.25), 200)?, 50);
        assert_eq!(percent_of_minor(&Percentage::from(0.5), 25)?, 13);

        Ok(())
    }

    #[test]
    fn percentage_code_takes_share_of_subtotal() -> TestResult {
        let code = DiscountCode::new(
            " tour15 ",
            DiscountKind::PercentageOff(Percentage::from(0.15)),
        );
        let subtotal = Money::from_minor(80_00, iso::USD);

        assert_eq!(code.code, "TOUR15");
        assert_eq!(
            code.discount_for(&subtotal)?,
            Money::from_minor(12_00, iso::USD)
        );

        Ok(())
    }

    #[test]
    fn amount_code_is_capped_at_subtotal() -> TestResult {
        let code = DiscountCode::new(
            "FIVER",
            DiscountKind::AmountOff(Money::from_minor(5_00, iso::USD)),
        );
        let subtotal = Money::from_minor(3_00, iso::USD);

        assert_eq!(code.discount_for(&subtotal)?, subtotal);

        Ok(())
    }

    #[test]
    fn minimum_subtotal_gates_discount() -> TestResult {
        let code = DiscountCode::new(
            "BIGSPEND",
            DiscountKind::AmountOff(Money::from_minor(10_00, iso::USD)),
        )
        .with_minimum(Money::from_minor(50_00, iso::USD));

        assert_eq!(
            code.discount_for(&Money::from_minor(49_99, iso::USD))?,
            Money::from_minor(0, iso::USD)
        );
        assert_eq!(
            code.discount_for(&Money::from_minor(50_00, iso::USD))?,
            Money::from_minor(10_00, iso::USD)
        );

        Ok(())
    }

    #[test]
    fn amount_code_in_other_currency_errors() {
        let code = DiscountCode::new(
            "QUID",
            DiscountKind::AmountOff(Money::from_minor(5_00, iso::GBP)),
        );

        assert!(matches!(
            code.discount_for(&Money::from_minor(20_00, iso::USD)),
            Err(DiscountError::Money(_))
        ));
    }
}
