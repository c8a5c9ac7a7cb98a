//! App Context

use std::sync::Arc;

use skywalker::{
    cart::CartPolicy,
    catalog::{Catalog, CatalogError},
    fixtures::{Fixture, FixtureError, Store},
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    api::{ApiError, Backend, HttpBackend},
    config::AppConfig,
    domain::{
        carts::{CartService, StoreCartService},
        checkout::{CheckoutService, StoreCheckoutService},
        engagement::{BackendEngagementService, EngagementService},
        orders::{BackendOrdersService, OrdersService},
    },
    storage::{FileStateStore, StateStore},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to load store data")]
    Fixture(#[from] FixtureError),

    #[error("backend catalog is inconsistent")]
    Catalog(#[from] CatalogError),

    #[error("failed to configure the storefront API client")]
    Api(#[from] ApiError),
}

#[derive(Clone)]
pub struct AppContext {
    pub carts: Arc<dyn CartService>,
    pub checkout: Arc<dyn CheckoutService>,
    pub orders: Arc<dyn OrdersService>,
    pub engagement: Arc<dyn EngagementService>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

impl AppContext {
    /// Wire the services around a backend and a state store.
    #[must_use]
    pub fn new(
        backend: Arc<dyn Backend>,
        state: Arc<dyn StateStore>,
        store: Store,
        policy: CartPolicy,
    ) -> Self {
        let carts: Arc<dyn CartService> = Arc::new(StoreCartService::new(
            Arc::clone(&backend),
            Arc::clone(&state),
            store.catalog,
            policy,
        ));

        let checkout = Arc::new(StoreCheckoutService::new(
            Arc::clone(&backend),
            state,
            Arc::clone(&carts),
            store.tax,
            store.discounts,
        ));

        Self {
            carts,
            checkout,
            orders: Arc::new(BackendOrdersService::new(Arc::clone(&backend))),
            engagement: Arc::new(BackendEngagementService::new(backend)),
        }
    }

    /// Build application context from configuration.
    ///
    /// The catalog is fetched from the backend. When the backend cannot be
    /// reached the bundled store data is used instead, so the cart stays
    /// usable offline.
    ///
    /// # Errors
    ///
    /// Returns an error when the store data cannot be loaded, the API URL is
    /// invalid or the backend returns an inconsistent catalog.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let fixture = config
            .store
            .fixtures_dir
            .as_ref()
            .map_or_else(Fixture::new, Fixture::with_base_path);

        let mut store = fixture.load_store(&config.store.name)?;

        let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(&config.api)?);

        match backend.list_products().await {
            Ok(products) => {
                store.catalog = Catalog::with_products(products, store.catalog.currency())?;

                info!(products = store.catalog.len(), "loaded catalog from backend");
            }
            Err(error) => {
                warn!(%error, store = %config.store.name, "using bundled catalog");
            }
        }

        let state = Arc::new(FileStateStore::new(config.storage.state_dir.clone()));

        Ok(Self::new(
            backend,
            state,
            store,
            CartPolicy {
                max_per_line: config.store.max_per_line,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use skywalker::{cart::CartAction, products::Inventory};
    use testresult::TestResult;

    use crate::{
        api::MockBackend,
        storage::MemoryStateStore,
        test::{merch, variant},
    };

    use super::*;

    #[tokio::test]
    async fn services_share_one_cart() -> TestResult {
        let store = merch()?;
        let (product, variant) = variant(&store.catalog, "PIN-SABER")?;

        let mut backend = MockBackend::new();
        backend
            .expect_variant_inventory()
            .returning(|_, _| {
                Ok(Inventory {
                    in_stock: true,
                    available: 150,
                })
            });
        backend.expect_save_checkout_session().returning(|_| Ok(()));

        let ctx = AppContext::new(
            Arc::new(backend),
            Arc::new(MemoryStateStore::new()),
            store,
            CartPolicy::default(),
        );

        ctx.carts
            .apply(CartAction::Add {
                product,
                variant,
                quantity: 3,
            })
            .await?;

        let view = ctx.checkout.begin().await?;

        assert_eq!(view.summary.item_count, 3);

        Ok(())
    }
}
