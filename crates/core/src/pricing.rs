//! Prices

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    money::{Price, zero},
    products::{Product, ProductVariant},
};

/// Errors that can occur while pricing cart lines.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The sale price plus adjustment went below zero.
    #[error("variant {0} resolves to a negative unit price")]
    NegativePrice(String),

    /// Quantity times unit price does not fit in minor units.
    #[error("line total overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Unit price of a variant: the sale price (or base price) plus the variant
/// adjustment.
///
/// # Errors
///
/// - [`PricingError::Money`]: the adjustment is in another currency.
/// - [`PricingError::NegativePrice`]: the adjusted price is below zero.
pub fn unit_price(product: &Product, variant: &ProductVariant) -> Result<Price, PricingError> {
    let price = product.sale_price.unwrap_or(product.base_price);
    let unit = price.add(variant.price_adjustment)?;

    if unit.to_minor_units() < 0 {
        return Err(PricingError::NegativePrice(variant.sku.clone()));
    }

    Ok(unit)
}

/// Line total for `quantity` units.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] when the product does not fit in `i64` minor units.
pub fn line_total(unit: &Price, quantity: u32) -> Result<Price, PricingError> {
    let minor = unit
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor, unit.currency()))
}

/// Sums amounts in a single currency, starting from zero.
///
/// # Errors
///
/// Returns [`PricingError::Money`] on currency mismatch.
pub fn total_price<'p>(
    currency: &'static Currency,
    amounts: impl IntoIterator<Item = &'p Price>,
) -> Result<Price, PricingError> {
    let total = amounts
        .into_iter()
        .try_fold(zero(currency), |acc, amount| acc.add(*amount))?;

    Ok(total)
}

/// The smaller of two amounts in the same currency.
pub(crate) fn min_price(a: Price, b: Price) -> Price {
    if b.to_minor_units() < a.to_minor_units() {
        b
    } else {
        a
    }
}
