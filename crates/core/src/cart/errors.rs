//! Cart Errors

use thiserror::Error;

use crate::{cart::CartItemUuid, catalog::CatalogError, pricing::PricingError};

/// Errors raised by cart mutations. A failed mutation leaves the cart unchanged.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// The requested quantity is above the line's stock ceiling.
    #[error("only {available} of {sku} can be ordered, {requested} requested")]
    OutOfStock {
        /// Variant SKU
        sku: String,
        /// Quantity the line would have held
        requested: u32,
        /// Current ceiling for the line
        available: u32,
    },

    /// Quantities start at one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// No line with this id.
    #[error("cart item {0} not found")]
    ItemNotFound(CartItemUuid),

    /// The product or variant is not in the catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The line could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// A variant is priced in another currency (sku, variant currency, cart currency).
    #[error("{0} is priced in {1}, but the cart is in {2}")]
    CurrencyMismatch(String, &'static str, &'static str),
}
