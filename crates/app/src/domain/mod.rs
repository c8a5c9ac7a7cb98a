//! Storefront Domain Concerns

pub mod carts;
pub mod checkout;
pub mod engagement;
pub mod orders;
