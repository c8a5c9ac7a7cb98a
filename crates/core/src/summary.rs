//! Cart Summary

use decimal_percentage::Percentage;
use rusty_money::MoneyError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::Cart,
    discounts::{DiscountCode, DiscountError},
    money::{Price, minor_units, zero},
    pricing::PricingError,
    shipping::ShippingMethod,
    tax::tax_on,
};

/// Errors raised while deriving cart totals.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Line totals could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The discount or tax could not be computed.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// An amount is in another currency.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Checkout choices that feed into the totals.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryInputs<'a> {
    /// Selected shipping method.
    pub shipping: Option<&'a ShippingMethod>,

    /// Tax rate for the shipping destination.
    pub tax_rate: Option<Percentage>,

    /// Applied discount code.
    pub discount: Option<&'a DiscountCode>,
}

/// Derived cart totals. `total = subtotal - discount + shipping + tax`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    /// Units across all lines.
    pub item_count: u32,

    /// Sum of line totals.
    #[serde(with = "minor_units")]
    pub subtotal: Price,

    /// Amount taken off by the discount code.
    #[serde(with = "minor_units")]
    pub discount: Price,

    /// Shipping charge.
    #[serde(with = "minor_units")]
    pub shipping: Price,

    /// Tax on the discounted subtotal.
    #[serde(with = "minor_units")]
    pub tax: Price,

    /// Amount due.
    #[serde(with = "minor_units")]
    pub total: Price,
}

/// Compute the summary of `cart`.
///
/// An empty cart is never charged shipping. Free-shipping thresholds compare
/// against the subtotal before discounts.
///
/// # Errors
///
/// Returns a [`SummaryError`] on overflow, conversion failure or currency mismatch.
pub fn summarize(cart: &Cart, inputs: &SummaryInputs<'_>) -> Result<CartSummary, SummaryError> {
    let currency = cart.currency();
    let subtotal = cart.subtotal()?;

    let discount = match inputs.discount {
        Some(code) => code.discount_for(&subtotal)?,
        None => zero(currency),
    };

    let shipping = match inputs.shipping {
        Some(method) if !cart.is_empty() => method.cost_for(&subtotal),
        _ => zero(currency),
    };

    let taxable = subtotal.sub(discount)?;

    let tax = match &inputs.tax_rate {
        Some(rate) => tax_on(&taxable, rate)?,
        None => zero(currency),
    };

    let total = taxable.add(shipping)?.add(tax)?;

    Ok(CartSummary {
        item_count: cart.item_count(),
        subtotal,
        discount,
        shipping,
        tax,
        total,
    })
}
