//! Storefront application for the Panickin' Skywalker merch shop.
//!
//! Wires the [`skywalker`] domain to the storefront API and to local state:
//! a cart that survives restarts, the checkout flow, order lookup and the
//! fan engagement forms.

pub mod api;
pub mod config;
pub mod context;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod storage;

#[cfg(test)]
mod test;
