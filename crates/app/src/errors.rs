//! Application errors
//!
//! Every failure a command can hit ends up as an [`AppError`]. Callers show
//! [`AppError::notice`] to the customer instead of the raw error.

use std::fmt;

use skywalker::{
    cart::CartError,
    catalog::CatalogError,
    checkout::CheckoutError,
    fixtures::FixtureError,
    orders::OrderNumberError,
    pricing::PricingError,
    shipping::ShippingError,
    summary::SummaryError,
    validation::{Field, FieldError, ValidationError},
};
use thiserror::Error;

use crate::{
    api::ApiError, context::AppInitError, observability::ObservabilityError,
    storage::StorageError,
};

/// Errors surfaced by the storefront services.
#[derive(Debug, Error)]
pub enum AppError {
    /// One or more fields failed validation.
    #[error(transparent)]
    Validation(ValidationError),

    /// Not enough stock for the requested quantity.
    #[error("only {available} of {sku} can be ordered, {requested} requested")]
    OutOfStock {
        /// Variant SKU
        sku: String,
        /// Quantity asked for
        requested: u32,
        /// Units that can be ordered
        available: u32,
    },

    /// The backend could not be reached or failed.
    #[error("network error: {0}")]
    Network(#[source] ApiError),

    /// The backend refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The requested resource does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Local state could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The application is misconfigured.
    #[error("configuration error: {0}")]
    Config(String),

    /// A checkout transition was not allowed.
    #[error(transparent)]
    Checkout(CheckoutError),

    /// Catalog or pricing data is inconsistent.
    #[error("store data error: {0}")]
    Data(String),
}

/// How an error is presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Messages shown next to the failing fields.
    Inline(Vec<FieldError>),

    /// A dismissible banner; the action can be retried.
    Banner(String),

    /// The page content is replaced by an empty state.
    EmptyState(String),

    /// Generic fallback for unexpected failures.
    Fallback(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline(errors) => {
                for (index, error) in errors.iter().enumerate() {
                    if index > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{error}")?;
                }
                Ok(())
            }
            Self::Banner(message) | Self::EmptyState(message) | Self::Fallback(message) => {
                f.write_str(message)
            }
        }
    }
}

impl AppError {
    /// The customer-facing presentation of this error.
    pub fn notice(&self) -> Notice {
        match self {
            Self::Validation(errors) => Notice::Inline(errors.errors().to_vec()),
            Self::OutOfStock { sku, available, .. } => Notice::Inline(vec![FieldError::new(
                Field::Quantity,
                match available {
                    0 => format!("{sku} is sold out"),
                    _ => format!("Only {available} of {sku} available"),
                },
            )]),
            Self::Network(_) => Notice::Banner(
                "We couldn't reach the store. Check your connection and try again.".to_string(),
            ),
            Self::Rejected(message) => Notice::Banner(format!(
                "The store couldn't accept this request: {message}"
            )),
            Self::NotFound(resource) => Notice::EmptyState(format!("We couldn't find {resource}")),
            Self::Checkout(CheckoutError::EmptyCart) => {
                Notice::EmptyState("Your cart is empty".to_string())
            }
            Self::Checkout(error) => Notice::Banner(capitalize(&error.to_string())),
            Self::Config(message) => Notice::Fallback(format!("Configuration problem: {message}")),
            Self::Storage(_) | Self::Data(_) => {
                Notice::Fallback("Something went wrong. Please try again.".to_string())
            }
        }
    }

    /// Whether resubmitting the same action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl From<ValidationError> for AppError {
    fn from(error: ValidationError) -> Self {
        Self::Validation(error)
    }
}

impl From<FieldError> for AppError {
    fn from(error: FieldError) -> Self {
        Self::Validation(error.into())
    }
}

impl From<ApiError> for AppError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::NotFound(resource) => Self::NotFound(resource),
            ApiError::Rejected(body) => Self::Rejected(body),
            ApiError::InvalidBaseUrl(url) => Self::Config(format!("invalid backend url {url}")),
            other => Self::Network(other),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(error: CheckoutError) -> Self {
        match error {
            CheckoutError::Validation(errors) => Self::Validation(errors),
            other => Self::Checkout(other),
        }
    }
}

impl From<CartError> for AppError {
    fn from(error: CartError) -> Self {
        match error {
            CartError::OutOfStock {
                sku,
                requested,
                available,
            } => Self::OutOfStock {
                sku,
                requested,
                available,
            },
            CartError::InvalidQuantity => Self::Validation(ValidationError::single(
                Field::Quantity,
                "Quantity must be at least 1",
            )),
            CartError::ItemNotFound(item) => Self::NotFound(format!("cart item {item}")),
            CartError::Catalog(error) => error.into(),
            CartError::Pricing(error) => Self::Data(error.to_string()),
            error @ CartError::CurrencyMismatch(..) => Self::Data(error.to_string()),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::UnknownProduct(product) => Self::NotFound(format!("product {product}")),
            CatalogError::UnknownVariant { variant, .. } => {
                Self::NotFound(format!("variant {variant}"))
            }
            other => Self::Data(other.to_string()),
        }
    }
}

impl From<ShippingError> for AppError {
    fn from(error: ShippingError) -> Self {
        let message = match error {
            ShippingError::UnknownMethod(_) => "Choose one of the offered shipping methods",
            ShippingError::NoMethods => "We don't ship to this address yet",
        };

        Self::Validation(ValidationError::single(Field::ShippingMethod, message))
    }
}

impl From<OrderNumberError> for AppError {
    fn from(error: OrderNumberError) -> Self {
        Self::Validation(ValidationError::single(
            Field::OrderNumber,
            capitalize(&error.to_string()),
        ))
    }
}

impl From<SummaryError> for AppError {
    fn from(error: SummaryError) -> Self {
        Self::Data(error.to_string())
    }
}

impl From<PricingError> for AppError {
    fn from(error: PricingError) -> Self {
        Self::Data(error.to_string())
    }
}

impl From<FixtureError> for AppError {
    fn from(error: FixtureError) -> Self {
        Self::Config(error.to_string())
    }
}

impl From<ObservabilityError> for AppError {
    fn from(error: ObservabilityError) -> Self {
        Self::Config(error.to_string())
    }
}

impl From<AppInitError> for AppError {
    fn from(error: AppInitError) -> Self {
        match error {
            AppInitError::Fixture(error) => error.into(),
            AppInitError::Catalog(error) => Self::Data(error.to_string()),
            AppInitError::Api(error) => error.into(),
        }
    }
}
