//! Cart service models

use skywalker::cart::{Cart, CartChange, StockAdjustment};

/// The cart after a service call.
#[derive(Debug, Clone)]
pub struct CartUpdate {
    /// Current cart.
    pub cart: Cart,

    /// What the requested action changed, `None` for reads.
    pub change: Option<CartChange>,

    /// Lines removed or reduced because stock moved since they were added.
    pub adjustments: Vec<StockAdjustment>,
}
