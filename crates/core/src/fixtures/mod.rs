//! Fixtures
//!
//! Store data in YAML: the catalog plus the discount codes and tax rates the
//! store applies. Used by tests and by the offline CLI.

use std::{fs, path::PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::{
    address::{Country, UnsupportedCountry},
    catalog::{Catalog, CatalogError},
    discounts::{DiscountCode, DiscountKind},
    money::currency,
    products::Product,
    tax::TaxTable,
};

pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A discount sets both or neither of percent and amount
    #[error("Discount {0} must set exactly one of percent or amount")]
    InvalidDiscount(String),

    /// Tax rate for a country the store does not ship to
    #[error(transparent)]
    Country(#[from] UnsupportedCountry),

    /// Catalog construction error
    #[error("Failed to build catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Store fixture file layout.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreFixture {
    /// ISO code for every price in the file
    pub currency: String,

    /// Products in listing order
    pub products: Vec<products::ProductFixture>,

    /// Discount codes
    #[serde(default)]
    pub discounts: Vec<DiscountFixture>,

    /// Tax rates
    #[serde(default)]
    pub tax_rates: Vec<TaxRateFixture>,
}

/// Discount Fixture
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountFixture {
    /// Code typed at checkout
    pub code: String,

    /// Percentage off (e.g., "15%")
    #[serde(default)]
    pub percent: Option<String>,

    /// Amount off (e.g., "5.00 USD")
    #[serde(default)]
    pub amount: Option<String>,

    /// Minimum subtotal (e.g., "50.00 USD")
    #[serde(default)]
    pub minimum: Option<String>,
}

impl TryFrom<DiscountFixture> for DiscountCode {
    type Error = FixtureError;

    fn try_from(fixture: DiscountFixture) -> Result<Self, Self::Error> {
        let kind = match (&fixture.percent, &fixture.amount) {
            (Some(percent), None) => {
                DiscountKind::PercentageOff(products::parse_percentage(percent)?)
            }
            (None, Some(amount)) => DiscountKind::AmountOff(products::price(amount)?),
            _ => return Err(FixtureError::InvalidDiscount(fixture.code)),
        };

        let code = DiscountCode::new(&fixture.code, kind);

        match fixture.minimum.as_deref() {
            Some(minimum) => Ok(code.with_minimum(products::price(minimum)?)),
            None => Ok(code),
        }
    }
}

/// Tax Rate Fixture
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRateFixture {
    /// Country code
    pub country: String,

    /// State or province code; the rate covers the whole country when absent
    #[serde(default)]
    pub region: Option<String>,

    /// Rate (e.g., "8.25%")
    pub rate: String,
}

/// Store data loaded from fixtures.
#[derive(Debug, Clone)]
pub struct Store {
    /// Product catalog
    pub catalog: Catalog,

    /// Accepted discount codes
    pub discounts: Vec<DiscountCode>,

    /// Tax rates by destination
    pub tax: TaxTable,
}

impl Store {
    /// Look up a discount code, ignoring case and surrounding whitespace.
    pub fn discount(&self, code: &str) -> Option<&DiscountCode> {
        let code = code.trim().to_ascii_uppercase();

        self.discounts.iter().find(|discount| discount.code == code)
    }
}

impl TryFrom<StoreFixture> for Store {
    type Error = FixtureError;

    fn try_from(fixture: StoreFixture) -> Result<Self, Self::Error> {
        let currency = currency(&fixture.currency)
            .map_err(|_err| FixtureError::UnknownCurrency(fixture.currency.clone()))?;

        let products = fixture
            .products
            .into_iter()
            .map(Product::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let catalog = Catalog::with_products(products, currency)?;

        let discounts = fixture
            .discounts
            .into_iter()
            .map(DiscountCode::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let tax = fixture
            .tax_rates
            .into_iter()
            .try_fold(TaxTable::new(), |table, entry| {
                let country: Country = entry.country.parse()?;
                let rate = products::parse_percentage(&entry.rate)?;

                Ok::<_, FixtureError>(match entry.region.as_deref() {
                    Some(region) => table.with_region(country, region, rate),
                    None => table.with_country(country, rate),
                })
            })?;

        Ok(Self {
            catalog,
            discounts,
            tax,
        })
    }
}

/// Fixture
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a fixture loader rooted at this crate's `fixtures` directory
    pub fn new() -> Self {
        Self::with_base_path(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures"))
    }

    /// Create a fixture loader with a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load a store from `<base>/store/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the data
    /// is inconsistent.
    pub fn load_store(&self, name: &str) -> Result<Store, FixtureError> {
        let file_path = self.base_path.join("store").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Self::parse_store(&contents)
    }

    /// Parse a store from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or the data is inconsistent.
    pub fn parse_store(yaml: &str) -> Result<Store, FixtureError> {
        let fixture: StoreFixture = serde_norway::from_str(yaml)?;

        Store::try_from(fixture)
    }
}
