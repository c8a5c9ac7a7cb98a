//! Product Fixtures

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use smallvec::SmallVec;

use crate::{
    fixtures::FixtureError,
    money::{Price, currency},
    products::{
        Inventory, Product, ProductCategory, ProductUuid, ProductVariant, VariantAttribute,
        VariantUuid,
    },
};

/// Product Fixture
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFixture {
    /// Stable product id
    pub uuid: ProductUuid,

    /// Product name
    pub name: String,

    /// URL slug
    pub slug: String,

    /// Shop category
    pub category: ProductCategory,

    /// Product price (e.g., "25.00 USD")
    pub price: String,

    /// Sale price, if discounted
    #[serde(default)]
    pub sale_price: Option<String>,

    /// Image URLs
    #[serde(default)]
    pub images: Vec<String>,

    /// Purchasable variants
    pub variants: Vec<VariantFixture>,
}

/// Variant Fixture
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantFixture {
    /// Stable variant id
    pub uuid: VariantUuid,

    /// Stock keeping unit
    pub sku: String,

    /// Ordered attributes
    #[serde(default)]
    pub attributes: SmallVec<[VariantAttribute; 2]>,

    /// Signed price adjustment (e.g., "2.00 USD")
    #[serde(default)]
    pub adjustment: Option<String>,

    /// Units available
    pub available: u32,

    /// Whether the variant is sold at all
    #[serde(default = "in_stock_default")]
    pub in_stock: bool,
}

fn in_stock_default() -> bool {
    true
}

impl TryFrom<ProductFixture> for Product {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let base_price = price(&fixture.price)?;
        let sale_price = fixture.sale_price.as_deref().map(price).transpose()?;

        let variants = fixture
            .variants
            .into_iter()
            .map(|variant| {
                let price_adjustment = match variant.adjustment.as_deref() {
                    Some(adjustment) => price(adjustment)?,
                    None => Money::from_minor(0, base_price.currency()),
                };

                Ok(ProductVariant {
                    uuid: variant.uuid,
                    sku: variant.sku,
                    attributes: variant.attributes,
                    price_adjustment,
                    inventory: Inventory {
                        in_stock: variant.in_stock,
                        available: variant.available,
                    },
                })
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        Ok(Product {
            uuid: fixture.uuid,
            name: fixture.name,
            slug: fixture.slug,
            category: fixture.category,
            base_price,
            sale_price,
            images: fixture.images,
            variants,
        })
    }
}

/// Parse a price string straight into money.
///
/// # Errors
///
/// See [`parse_price`].
pub fn price(s: &str) -> Result<Price, FixtureError> {
    let (minor_units, currency) = parse_price(s)?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Parse price string (e.g., "2.99 USD") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = currency(currency_code)
        .map_err(|_err| FixtureError::UnknownCurrency((*currency_code).to_string()))?;

    let minor_units = 10_i64
        .checked_pow(currency.exponent)
        .map(Decimal::from)
        .and_then(|scale| amount.checked_mul(scale))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Parse percentage string (e.g., "15%" or "0.15") into a `Percentage`
///
/// Accepts two formats:
/// - Percentage format: "15%" for 15%
/// - Decimal format: "0.15" for 15%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed or if the value is invalid.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        let value = percent_str
            .trim()
            .parse::<f64>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value / 100.0))
    } else {
        let value = trimmed
            .parse::<f64>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{JPY, USD};

    use super::*;

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99USD");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_scales_by_currency_exponent() -> Result<(), FixtureError> {
        let (usd_minor, usd) = parse_price("25.00 USD")?;
        let (yen_minor, yen) = parse_price("3000 JPY")?;
        let (adjustment, _) = parse_price("-2.50 USD")?;

        assert_eq!(usd_minor, 2500);
        assert_eq!(usd, USD);
        assert_eq!(yen_minor, 3000);
        assert_eq!(yen, JPY);
        assert_eq!(adjustment, -250);

        Ok(())
    }

    #[test]
    fn parse_percentage_accepts_both_formats() -> Result<(), FixtureError> {
        assert_eq!(parse_percentage("15%")?, Percentage::from(0.15));
        assert_eq!(parse_percentage("  0.15 ")?, Percentage::from(0.15));

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_invalid_format() {
        let result = parse_percentage("invalid");

        assert!(matches!(result, Err(FixtureError::InvalidPercentage(_))));
    }

    #[test]
    fn variant_defaults_to_no_adjustment() -> Result<(), FixtureError> {
        let fixture: ProductFixture = serde_norway::from_str(
            r#"
uuid: 01906a4c-0000-7000-8000-000000000001
name: Sticker Pack
slug: sticker-pack
category: accessories
price: "5.00 USD"
variants:
  - uuid: 01906a4c-0000-7000-8000-000000000002
    sku: STICK-1
    available: 0
    inStock: false
"#,
        )?;

        let product = Product::try_from(fixture)?;
        let variant = product.variants.first();

        assert_eq!(
            variant.map(|v| v.price_adjustment),
            Some(Money::from_minor(0, USD))
        );
        assert!(!product.is_available());

        Ok(())
    }
}
