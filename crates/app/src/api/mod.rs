//! Store backend API
//!
//! The backend owns products, stock, shipping quotes and orders. Everything
//! here is request/response; a failed call is reported to the caller and
//! never retried.

use async_trait::async_trait;
use mockall::automock;
use skywalker::{
    address::Address,
    checkout::CheckoutSnapshot,
    orders::{Order, OrderNumber},
    products::{Inventory, Product, ProductUuid, VariantUuid},
    shipping::ShippingMethod,
};

pub mod errors;
mod http;
pub mod models;

pub use errors::ApiError;
pub use http::HttpBackend;
pub use models::{
    FanPhotoSubmission, NewsletterSignup, OrderRequest, OrderRequestLine, PlacedOrder,
    SharePlatform, ShareRequest,
};

#[automock]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Every listed product.
    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;

    /// A single product by slug.
    async fn get_product(&self, slug: &str) -> Result<Product, ApiError>;

    /// Current stock of one variant.
    async fn variant_inventory(
        &self,
        product: ProductUuid,
        variant: VariantUuid,
    ) -> Result<Inventory, ApiError>;

    /// Record the checkout session server-side.
    async fn save_checkout_session(&self, snapshot: &CheckoutSnapshot) -> Result<(), ApiError>;

    /// Shipping methods quoted for an address.
    async fn shipping_methods(&self, address: &Address) -> Result<Vec<ShippingMethod>, ApiError>;

    /// Charge the card and create the order.
    async fn place_order(&self, request: &OrderRequest) -> Result<PlacedOrder, ApiError>;

    /// Look up a placed order.
    async fn get_order(&self, number: &OrderNumber) -> Result<Order, ApiError>;

    /// Subscribe to the mailing list.
    async fn newsletter_signup(&self, signup: &NewsletterSignup) -> Result<(), ApiError>;

    /// Send a photo to the fan wall moderation queue.
    async fn submit_fan_photo(&self, submission: &FanPhotoSubmission) -> Result<(), ApiError>;

    /// Record a share.
    async fn share(&self, share: &ShareRequest) -> Result<(), ApiError>;
}
