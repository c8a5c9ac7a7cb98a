//! Orders

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    address::Address,
    money::{Price, minor_units},
    summary::CartSummary,
};

/// Error parsing an order number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderNumberError {
    /// Nothing was entered.
    #[error("enter an order number")]
    Empty,

    /// Too short or too long.
    #[error("order numbers are 4 to 32 characters long")]
    Length,

    /// Contains something other than letters, digits and dashes.
    #[error("order numbers only contain letters, digits and dashes")]
    Characters,
}

/// Order number as shown on the confirmation page, e.g. `PS-20240611-0042`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    /// The number as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderNumber {
    type Err = OrderNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = s.trim().to_ascii_uppercase();

        if number.is_empty() {
            return Err(OrderNumberError::Empty);
        }

        if !(4..=32).contains(&number.len()) {
            return Err(OrderNumberError::Length);
        }

        if !number
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(OrderNumberError::Characters);
        }

        Ok(Self(number))
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = OrderNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrderNumber> for String {
    fn from(value: OrderNumber) -> Self {
        value.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fulfilment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, payment not yet captured.
    Pending,
    /// Payment captured.
    Confirmed,
    /// Being packed.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Arrived.
    Delivered,
    /// Will not ship.
    Cancelled,
}

impl OrderStatus {
    /// Whether the order can no longer change.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Customer-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A status change on the order timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEvent {
    /// New status.
    pub status: OrderStatus,

    /// When it happened.
    pub at: Timestamp,

    /// Optional note, e.g. the carrier scan location.
    #[serde(default)]
    pub note: Option<String>,
}

/// A purchased line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Product name.
    pub name: String,

    /// Variant SKU.
    pub sku: String,

    /// Variant label, e.g. "M / Black".
    #[serde(default)]
    pub variant_label: String,

    /// Units bought.
    pub quantity: u32,

    /// Price paid per unit.
    #[serde(with = "minor_units")]
    pub unit_price: Price,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order number.
    pub number: OrderNumber,

    /// Current status.
    pub status: OrderStatus,

    /// Purchased lines.
    pub lines: Vec<OrderLine>,

    /// Amounts charged.
    pub summary: CartSummary,

    /// Destination.
    pub shipping_address: Address,

    /// Name of the shipping method.
    pub shipping_method: String,

    /// Status timeline, oldest first.
    #[serde(default)]
    pub events: Vec<OrderEvent>,

    /// Carrier tracking number once shipped.
    #[serde(default)]
    pub tracking_number: Option<String>,

    /// When the order was placed.
    pub created_at: Timestamp,
}

impl Order {
    /// Most recent timeline event.
    pub fn latest_event(&self) -> Option<&OrderEvent> {
        self.events.iter().max_by_key(|event| event.at)
    }

    /// Units across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |count, line| count.saturating_add(line.quantity))
    }
}

/// Result of looking up an order number.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderLookup {
    /// The order exists.
    Found(Box<Order>),

    /// No order has this number.
    NotFound(OrderNumber),
}

impl OrderLookup {
    /// The order, when found.
    pub fn order(&self) -> Option<&Order> {
        match self {
            Self::Found(order) => Some(order.as_ref()),
            Self::NotFound(_) => None,
        }
    }
}
