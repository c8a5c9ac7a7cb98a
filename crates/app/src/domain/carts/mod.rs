//! Carts

pub mod models;
pub mod service;

pub use models::CartUpdate;
pub use service::*;
