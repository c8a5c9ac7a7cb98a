//! Checkout Errors

use thiserror::Error;

use crate::{checkout::CheckoutStep, validation::ValidationError};

/// Errors raised by checkout transitions. The session keeps its current step
/// on every error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// One or more fields failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An earlier step has not been completed yet.
    #[error("complete {missing} before continuing to {target}")]
    StepLocked {
        /// Step that was requested
        target: CheckoutStep,
        /// First incomplete step before it
        missing: CheckoutStep,
    },

    /// Checkout needs at least one cart line.
    #[error("your cart is empty")]
    EmptyCart,

    /// The order was already placed.
    #[error("this checkout has already been completed")]
    Finalized,
}
