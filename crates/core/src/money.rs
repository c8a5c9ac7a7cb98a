//! Money
//!
//! All amounts are [`rusty_money`] values in ISO currencies, carried in minor units.

use rusty_money::{Findable, Money, MoneyError, iso::Currency};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An amount of money in a static ISO currency.
pub type Price = Money<'static, Currency>;

/// Look up an ISO currency by its alpha code (e.g. `"USD"`).
///
/// # Errors
///
/// Returns [`MoneyError::InvalidCurrency`] when the code is unknown.
pub fn currency(code: &str) -> Result<&'static Currency, MoneyError> {
    Currency::find(code.trim()).ok_or(MoneyError::InvalidCurrency)
}

/// Zero in the given currency.
pub fn zero(currency: &'static Currency) -> Price {
    Money::from_minor(0, currency)
}

/// Wire representation of a price: `{ "amount": 2500, "currency": "USD" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinorUnits {
    /// Amount in minor units (cents, pence).
    pub amount: i64,

    /// ISO 4217 alpha code.
    pub currency: String,
}

impl From<&Price> for MinorUnits {
    fn from(price: &Price) -> Self {
        Self {
            amount: price.to_minor_units(),
            currency: price.currency().iso_alpha_code.to_string(),
        }
    }
}

impl TryFrom<MinorUnits> for Price {
    type Error = MoneyError;

    fn try_from(value: MinorUnits) -> Result<Self, Self::Error> {
        Ok(Money::from_minor(value.amount, currency(&value.currency)?))
    }
}

/// `#[serde(with = "...")]` adapter for [`Price`] fields.
pub mod minor_units {
    use super::{Deserialize, Deserializer, MinorUnits, Price, Serialize, Serializer};

    /// Serialize a price as minor units.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(price: &Price, serializer: S) -> Result<S::Ok, S::Error> {
        MinorUnits::from(price).serialize(serializer)
    }

    /// Deserialize a price from minor units.
    ///
    /// # Errors
    ///
    /// Fails when the payload is malformed or the currency is unknown.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Price, D::Error> {
        let units = MinorUnits::deserialize(deserializer)?;
        let code = units.currency.clone();

        Price::try_from(units)
            .map_err(|_err| serde::de::Error::custom(format!("unknown currency: {code}")))
    }
}

/// `#[serde(with = "...")]` adapter for optional [`Price`] fields.
pub mod option_minor_units {
    use super::{Deserialize, Deserializer, MinorUnits, Price, Serialize, Serializer};

    /// Serialize an optional price as minor units.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        price: &Option<Price>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        price.as_ref().map(MinorUnits::from).serialize(serializer)
    }

    /// Deserialize an optional price from minor units.
    ///
    /// # Errors
    ///
    /// Fails when the payload is malformed or the currency is unknown.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Price>, D::Error> {
        let Some(units) = Option::<MinorUnits>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let code = units.currency.clone();

        Price::try_from(units)
            .map(Some)
            .map_err(|_err| serde::de::Error::custom(format!("unknown currency: {code}")))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn currency_lookup_is_case_sensitive_iso_code() -> TestResult {
        assert_eq!(currency("USD")?, iso::USD);
        assert!(matches!(currency("XXQ"), Err(MoneyError::InvalidCurrency)));

        Ok(())
    }

    #[test]
    fn minor_units_converts_both_ways() -> TestResult {
        let price = Money::from_minor(2_500, iso::GBP);
        let units = MinorUnits::from(&price);

        assert_eq!(units.amount, 2_500);
        assert_eq!(units.currency, "GBP");
        assert_eq!(Price::try_from(units)?, price);

        Ok(())
    }
}
