//! Sales tax

use decimal_percentage::Percentage;
use rustc_hash::FxHashMap;
use rusty_money::Money;

use crate::{
    address::{Address, Country},
    discounts::{DiscountError, percent_of_minor},
    money::Price,
};

/// Tax rates keyed by country, optionally narrowed to a state or province.
///
/// A state rate overrides the country rate. Destinations with no entry are
/// untaxed.
#[derive(Debug, Clone, Default)]
pub struct TaxTable {
    rates: FxHashMap<(Country, Option<String>), Percentage>,
}

impl TaxTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rate for a whole country.
    #[must_use]
    pub fn with_country(mut self, country: Country, rate: Percentage) -> Self {
        self.rates.insert((country, None), rate);
        self
    }

    /// Set the rate for a state or province.
    #[must_use]
    pub fn with_region(mut self, country: Country, region: &str, rate: Percentage) -> Self {
        self.rates
            .insert((country, Some(region.trim().to_ascii_uppercase())), rate);
        self
    }

    /// Rate applying to a destination.
    pub fn rate_for(&self, address: &Address) -> Option<Percentage> {
        address
            .state
            .as_ref()
            .and_then(|state| self.rates.get(&(address.country, Some(state.clone()))))
            .or_else(|| self.rates.get(&(address.country, None)))
            .copied()
    }
}

/// Tax due on `taxable` at `rate`, rounded half away from zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] when the amount cannot be
/// represented in minor units.
pub fn tax_on(taxable: &Price, rate: &Percentage) -> Result<Price, DiscountError> {
    let minor = percent_of_minor(rate, taxable.to_minor_units())?;

    Ok(Money::from_minor(minor, taxable.currency()))
}
