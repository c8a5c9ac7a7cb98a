//! Skywalker
//!
//! Storefront domain for the Panickin' Skywalker merch shop: the catalog,
//! a stock-aware cart with derived totals, address validation, shipping
//! selection, and the checkout session that turns a cart into an order.
//!
//! Everything in this crate is synchronous and free of I/O apart from the
//! YAML [`fixtures`] loader.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod discounts;
pub mod fixtures;
pub mod money;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod shipping;
pub mod summary;
pub mod tax;
pub mod uuids;
pub mod validation;
