//! Carts service.
//!
//! The backend is authoritative for stock: every add or quantity change
//! re-reads the variant's inventory before the cart is touched.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use skywalker::{
    cart::{Cart, CartAction, CartChange, CartError, CartPolicy, CartSnapshot, StockAdjustment},
    catalog::Catalog,
    products::{Product, ProductUuid, VariantUuid},
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    api::Backend,
    domain::carts::models::CartUpdate,
    errors::AppError,
    storage::{StateKey, StateStore, load_json, save_json},
};

/// Cart kept in the state store, priced from an in-memory catalog.
pub struct StoreCartService {
    backend: Arc<dyn Backend>,
    state: Arc<dyn StateStore>,
    catalog: Mutex<Catalog>,
    policy: CartPolicy,
}

impl std::fmt::Debug for StoreCartService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCartService")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl StoreCartService {
    #[must_use]
    pub fn new(
        backend: Arc<dyn Backend>,
        state: Arc<dyn StateStore>,
        catalog: Catalog,
        policy: CartPolicy,
    ) -> Self {
        Self {
            backend,
            state,
            catalog: Mutex::new(catalog),
            policy,
        }
    }

    async fn load(&self, catalog: &Catalog) -> Result<(Cart, Vec<StockAdjustment>), AppError> {
        let currency = catalog.currency();

        let Some(snapshot) = load_json::<CartSnapshot>(self.state.as_ref(), StateKey::Cart).await?
        else {
            return Ok((Cart::with_policy(currency, self.policy), Vec::new()));
        };

        let snapshot = CartSnapshot {
            policy: self.policy,
            ..snapshot
        };

        Ok(Cart::restore(&snapshot, catalog, currency))
    }

    async fn save(&self, cart: &Cart) -> Result<(), AppError> {
        save_json(self.state.as_ref(), StateKey::Cart, &cart.snapshot()).await?;

        Ok(())
    }

    async fn refresh_stock(
        &self,
        catalog: &mut Catalog,
        product: ProductUuid,
        variant: VariantUuid,
    ) -> Result<(), AppError> {
        catalog.resolve(product, variant)?;

        let inventory = self.backend.variant_inventory(product, variant).await?;

        debug!(
            %product,
            %variant,
            available = inventory.available,
            in_stock = inventory.in_stock,
            "refreshed stock"
        );

        catalog.set_inventory(product, variant, inventory)?;

        Ok(())
    }
}

#[async_trait]
impl CartService for StoreCartService {
    #[tracing::instrument(name = "carts.service.cart", skip(self), err)]
    async fn cart(&self) -> Result<CartUpdate, AppError> {
        let catalog = self.catalog.lock().await;

        let (cart, adjustments) = self.load(&catalog).await?;

        if !adjustments.is_empty() {
            self.save(&cart).await?;
        }

        Ok(CartUpdate {
            cart,
            change: None,
            adjustments,
        })
    }

    #[tracing::instrument(name = "carts.service.apply", skip(self), err)]
    async fn apply(&self, action: CartAction) -> Result<CartUpdate, AppError> {
        let mut catalog = self.catalog.lock().await;

        let (mut cart, mut adjustments) = self.load(&catalog).await?;

        let target = match action {
            CartAction::Add {
                product, variant, ..
            } => Some((product, variant, None)),
            CartAction::Update { item, quantity } if quantity > 0 => cart
                .line(item)
                .map(|line| (line.product, line.variant, Some(line.sku.clone()))),
            CartAction::Update { .. } | CartAction::Remove(_) | CartAction::Clear => None,
        };

        if let Some((product, variant, sku)) = target {
            self.refresh_stock(&mut catalog, product, variant).await?;

            adjustments.extend(cart.refresh_inventory(&catalog));

            if let (CartAction::Update { item, quantity }, Some(sku)) = (action, sku)
                && cart.line(item).is_none()
            {
                self.save(&cart).await?;

                return Err(AppError::from(CartError::OutOfStock {
                    sku,
                    requested: quantity,
                    available: 0,
                }));
            }
        }

        let change = match cart.apply(&catalog, action) {
            Ok(change) => change,
            Err(error) => {
                if !adjustments.is_empty() {
                    self.save(&cart).await?;
                }

                return Err(error.into());
            }
        };

        self.save(&cart).await?;

        if change == CartChange::Cleared {
            for key in StateKey::CHECKOUT {
                self.state.remove(key).await?;
            }
        }

        info!(?change, lines = cart.len(), items = cart.item_count(), "updated cart");

        Ok(CartUpdate {
            cart,
            change: Some(change),
            adjustments,
        })
    }

    async fn products(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.catalog.lock().await.products().cloned().collect())
    }

    async fn product(&self, slug: &str) -> Result<Product, AppError> {
        self.catalog
            .lock()
            .await
            .by_slug(slug)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("product {slug}")))
    }
}

#[automock]
#[async_trait]
pub trait CartService: Send + Sync {
    /// The saved cart, re-priced and re-capped against the catalog.
    async fn cart(&self) -> Result<CartUpdate, AppError>;

    /// Apply a cart action and save the result. A rejected action leaves the
    /// saved cart as it was, apart from stock adjustments. Clearing the cart
    /// also ends any checkout in progress.
    async fn apply(&self, action: CartAction) -> Result<CartUpdate, AppError>;

    /// Every product in listing order.
    async fn products(&self) -> Result<Vec<Product>, AppError>;

    /// A single product by slug.
    async fn product(&self, slug: &str) -> Result<Product, AppError>;
}
