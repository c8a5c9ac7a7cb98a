//! Persisted client state
//!
//! Cart and checkout progress are mirrored to a key/value store so a crash
//! or a new process picks up where the customer left off. Values are JSON.

use std::fmt;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

mod file;
mod memory;

pub use file::FileStateStore;
pub use memory::MemoryStateStore;

/// Errors raised by a state store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing files failed.
    #[error("state io error for {key}: {source}")]
    Io {
        /// Key being accessed
        key: StateKey,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A stored value could not be encoded or decoded.
    #[error("state for {key} is not valid: {source}")]
    Format {
        /// Key being accessed
        key: StateKey,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

/// Keys under which state is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKey {
    /// Cart contents.
    Cart,
    /// Checkout session.
    CheckoutSession,
    /// Shipping step: form input and the offered methods.
    CheckoutShipping,
    /// Payment step: card summary and billing choice, never the token.
    CheckoutPayment,
}

impl StateKey {
    /// Checkout keys, cleared together when checkout ends.
    pub const CHECKOUT: [Self; 3] = [
        Self::CheckoutSession,
        Self::CheckoutShipping,
        Self::CheckoutPayment,
    ];

    /// Stable key name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::CheckoutSession => "checkout/session",
            Self::CheckoutShipping => "checkout/shipping",
            Self::CheckoutPayment => "checkout/payment",
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key/value store for client state. Each call is atomic on its own key.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read a value, `None` when nothing is stored.
    async fn load(&self, key: StateKey) -> Result<Option<Value>, StorageError>;

    /// Replace a value.
    async fn save(&self, key: StateKey, value: Value) -> Result<(), StorageError>;

    /// Delete a value. Removing a missing key is not an error.
    async fn remove(&self, key: StateKey) -> Result<(), StorageError>;
}

/// Load and decode a typed value.
///
/// # Errors
///
/// Returns a [`StorageError`] when the store fails or the value does not
/// decode as `T`.
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn StateStore,
    key: StateKey,
) -> Result<Option<T>, StorageError> {
    store
        .load(key)
        .await?
        .map(|value| serde_json::from_value(value).map_err(|source| StorageError::Format { key, source }))
        .transpose()
}

/// Encode and save a typed value.
///
/// # Errors
///
/// Returns a [`StorageError`] when the value cannot be encoded or the store fails.
pub async fn save_json<T: Serialize + Sync>(
    store: &dyn StateStore,
    key: StateKey,
    value: &T,
) -> Result<(), StorageError> {
    let value = serde_json::to_value(value).map_err(|source| StorageError::Format { key, source })?;

    store.save(key, value).await
}
