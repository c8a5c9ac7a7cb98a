//! Orders service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use skywalker::orders::{OrderLookup, OrderNumber};
use tracing::info;

use crate::{
    api::{ApiError, Backend},
    errors::AppError,
};

/// Order lookup backed by the storefront API.
pub struct BackendOrdersService {
    backend: Arc<dyn Backend>,
}

impl std::fmt::Debug for BackendOrdersService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendOrdersService").finish_non_exhaustive()
    }
}

impl BackendOrdersService {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl OrdersService for BackendOrdersService {
    #[tracing::instrument(name = "orders.service.lookup", skip(self), err)]
    async fn lookup(&self, number: &str) -> Result<OrderLookup, AppError> {
        let number: OrderNumber = number.parse()?;

        match self.backend.get_order(&number).await {
            Ok(order) => {
                info!(order_number = %number, status = %order.status, "found order");

                Ok(OrderLookup::Found(Box::new(order)))
            }
            Err(ApiError::NotFound(_)) => Ok(OrderLookup::NotFound(number)),
            Err(error) => Err(error.into()),
        }
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Look up an order by the number on its confirmation. The number is
    /// trimmed and upper-cased first.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed number and a network error
    /// when the backend cannot be reached. An unknown number is
    /// [`OrderLookup::NotFound`], not an error.
    async fn lookup(&self, number: &str) -> Result<OrderLookup, AppError>;
}
