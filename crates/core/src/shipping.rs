//! Shipping methods

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    address::{Address, Country},
    money::{Price, minor_units, option_minor_units, zero},
};

/// Errors raised while choosing a shipping method.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShippingError {
    /// The id is not among the offered methods.
    #[error("shipping method {0} is not available for this address")]
    UnknownMethod(String),

    /// The backend offered nothing for this address.
    #[error("no shipping methods available for this address")]
    NoMethods,
}

/// Delivery window in business days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryEstimate {
    /// Fastest expected delivery.
    pub min_days: u8,

    /// Slowest expected delivery.
    pub max_days: u8,
}

impl std::fmt::Display for DeliveryEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.min_days == self.max_days {
            let unit = if self.min_days == 1 { "day" } else { "days" };
            write!(f, "{} business {unit}", self.min_days)
        } else {
            write!(f, "{}-{} business days", self.min_days, self.max_days)
        }
    }
}

/// A shipping option quoted by the backend for an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingMethod {
    /// Backend identifier.
    pub id: String,

    /// Display name, e.g. "USPS Priority".
    pub name: String,

    /// Flat price for the order.
    #[serde(with = "minor_units")]
    pub price: Price,

    /// Delivery window.
    pub estimated_days: DeliveryEstimate,

    /// Preselected by the backend.
    #[serde(default)]
    pub is_default: bool,

    /// Subtotal from which this method ships free.
    #[serde(default, with = "option_minor_units")]
    pub free_over: Option<Price>,
}

impl ShippingMethod {
    /// Shipping charged for an order with this subtotal.
    pub fn cost_for(&self, subtotal: &Price) -> Price {
        match self.free_over {
            Some(threshold) if subtotal.to_minor_units() >= threshold.to_minor_units() => {
                zero(self.price.currency())
            }
            _ => self.price,
        }
    }
}

/// Methods offered for the current address plus the customer's choice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShippingOptions {
    methods: Vec<ShippingMethod>,
    selected: Option<String>,
}

impl ShippingOptions {
    /// Offer `methods`, preselecting the backend default, or the cheapest
    /// method when none is flagged.
    pub fn new(methods: Vec<ShippingMethod>) -> Self {
        let selected = methods
            .iter()
            .find(|method| method.is_default)
            .or_else(|| {
                methods
                    .iter()
                    .min_by_key(|method| method.price.to_minor_units())
            })
            .map(|method| method.id.clone());

        Self { methods, selected }
    }

    /// Offer `methods`, keeping the previous choice when it is still offered.
    pub fn refreshed(methods: Vec<ShippingMethod>, previous: Option<&str>) -> Self {
        let mut options = Self::new(methods);

        if let Some(id) = previous
            && options.method(id).is_some()
        {
            options.selected = Some(id.to_string());
        }

        options
    }

    /// Choose a method.
    ///
    /// # Errors
    ///
    /// Returns [`ShippingError::UnknownMethod`] when `id` is not offered.
    pub fn select(&mut self, id: &str) -> Result<&ShippingMethod, ShippingError> {
        if self.methods.is_empty() {
            return Err(ShippingError::NoMethods);
        }

        let method = self
            .methods
            .iter()
            .find(|method| method.id == id)
            .ok_or_else(|| ShippingError::UnknownMethod(id.to_string()))?;

        self.selected = Some(method.id.clone());

        Ok(method)
    }

    /// Find an offered method.
    pub fn method(&self, id: &str) -> Option<&ShippingMethod> {
        self.methods.iter().find(|method| method.id == id)
    }

    /// The chosen method.
    pub fn selected(&self) -> Option<&ShippingMethod> {
        self.selected.as_deref().and_then(|id| self.method(id))
    }

    /// Every offered method.
    pub fn methods(&self) -> &[ShippingMethod] {
        &self.methods
    }

    /// Whether nothing is offered.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// The part of an address that shipping quotes depend on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingQuoteKey {
    /// Destination country.
    pub country: Country,

    /// Postal zone: the five-digit ZIP in the US, the normalized code elsewhere.
    pub postal_zone: String,
}

impl From<&Address> for ShippingQuoteKey {
    fn from(address: &Address) -> Self {
        let postal_zone = match address.country {
            Country::Us => address
                .postal_code
                .split('-')
                .next()
                .unwrap_or_default()
                .to_string(),
            _ => address.postal_code.clone(),
        };

        Self {
            country: address.country,
            postal_zone,
        }
    }
}

/// Whether methods must be re-fetched for `next`: only when the country or
/// postal zone changed.
pub fn needs_refresh(previous: Option<&ShippingQuoteKey>, next: &ShippingQuoteKey) -> bool {
    previous != Some(next)
}
