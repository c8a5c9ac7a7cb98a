//! HTTP backend client.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use skywalker::{
    address::Address,
    checkout::CheckoutSnapshot,
    orders::{Order, OrderNumber},
    products::{Inventory, Product, ProductUuid, VariantUuid},
    shipping::ShippingMethod,
};
use tracing::debug;

use crate::{
    api::{
        ApiError, Backend,
        models::{FanPhotoSubmission, NewsletterSignup, OrderRequest, PlacedOrder, ShareRequest},
    },
    config::api::ApiConfig,
};

/// JSON-over-HTTP client for the store backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: Url,
    http: Client,
}

impl HttpBackend {
    /// Create a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = parse_base_url(&config.api_url)?;

        let http = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self { base_url, http })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        endpoint(&self.base_url, segments)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let url = self.url(&["api", "products"])?;

        debug!(%url, "listing products");

        fetch(self.http.get(url), "products").await
    }

    async fn get_product(&self, slug: &str) -> Result<Product, ApiError> {
        let url = self.url(&["api", "products", slug])?;

        debug!(%url, "fetching product");

        fetch(self.http.get(url), &format!("product {slug}")).await
    }

    async fn variant_inventory(
        &self,
        product: ProductUuid,
        variant: VariantUuid,
    ) -> Result<Inventory, ApiError> {
        let product_segment = product.to_string();
        let variant_segment = variant.to_string();
        let url = self.url(&[
            "api",
            "products",
            &product_segment,
            "variants",
            &variant_segment,
            "inventory",
        ])?;

        debug!(%url, "fetching inventory");

        fetch(self.http.get(url), &format!("variant {variant}")).await
    }

    async fn save_checkout_session(&self, snapshot: &CheckoutSnapshot) -> Result<(), ApiError> {
        let url = self.url(&["api", "checkout", "session"])?;

        debug!(%url, session = %snapshot.uuid, step = %snapshot.step, "saving checkout session");

        submit(self.http.post(url).json(snapshot), "checkout session").await
    }

    async fn shipping_methods(&self, address: &Address) -> Result<Vec<ShippingMethod>, ApiError> {
        let url = self.url(&["api", "shipping-methods"])?;

        let mut query = vec![
            ("country", address.country.code().to_string()),
            ("postalCode", address.postal_code.clone()),
        ];

        if let Some(state) = &address.state {
            query.push(("state", state.clone()));
        }

        debug!(%url, country = %address.country, "fetching shipping methods");

        fetch(self.http.get(url).query(&query), "shipping methods").await
    }

    async fn place_order(&self, request: &OrderRequest) -> Result<PlacedOrder, ApiError> {
        let url = self.url(&["api", "orders"])?;

        debug!(%url, session = %request.session, lines = request.lines.len(), "placing order");

        fetch(self.http.post(url).json(request), "order").await
    }

    async fn get_order(&self, number: &OrderNumber) -> Result<Order, ApiError> {
        let url = self.url(&["api", "orders", number.as_str()])?;

        debug!(%url, "fetching order");

        fetch(self.http.get(url), &format!("order {number}")).await
    }

    async fn newsletter_signup(&self, signup: &NewsletterSignup) -> Result<(), ApiError> {
        let url = self.url(&["api", "newsletter", "signup"])?;

        debug!(%url, "newsletter signup");

        submit(self.http.post(url).json(signup), "newsletter").await
    }

    async fn submit_fan_photo(&self, submission: &FanPhotoSubmission) -> Result<(), ApiError> {
        let url = self.url(&["api", "fan-photos", "submit"])?;

        debug!(%url, "submitting fan photo");

        submit(self.http.post(url).json(submission), "fan photo").await
    }

    async fn share(&self, share: &ShareRequest) -> Result<(), ApiError> {
        let url = self.url(&["api", "social", "share"])?;

        debug!(%url, platform = ?share.platform, "recording share");

        submit(self.http.post(url).json(share), "share").await
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw).map_err(|err| ApiError::InvalidBaseUrl(format!("{raw}: {err}")))?;

    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidBaseUrl(raw.to_string()));
    }

    Ok(url)
}

fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = base.clone();

    url.path_segments_mut()
        .map_err(|()| ApiError::InvalidBaseUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

async fn fetch<T: DeserializeOwned>(
    request: RequestBuilder,
    resource: &str,
) -> Result<T, ApiError> {
    let response = checked(request.send().await?, resource).await?;
    let body = response.bytes().await?;

    Ok(serde_json::from_slice(&body)?)
}

async fn submit(request: RequestBuilder, resource: &str) -> Result<(), ApiError> {
    checked(request.send().await?, resource).await?;

    Ok(())
}

async fn checked(response: Response, resource: &str) -> Result<Response, ApiError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();

    Err(status_error(status, resource, text))
}

fn status_error(status: StatusCode, resource: &str, body: String) -> ApiError {
    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound(resource.to_string()),
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => ApiError::Rejected(body),
        _ => ApiError::UnexpectedResponse {
            status: status.as_u16(),
            body,
        },
    }
}
