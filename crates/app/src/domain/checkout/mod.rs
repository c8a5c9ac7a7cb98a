//! Checkout

pub mod models;
pub mod service;

pub use models::{CheckoutView, Confirmation, PaymentStep, ShippingStep};
pub use service::*;
