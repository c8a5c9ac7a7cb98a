//! Engagement service: newsletter, fan photos and share links.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use skywalker::validation::{EmailAddress, Field, ValidationError};
use tracing::info;

use crate::{
    api::{Backend, NewsletterSignup, ShareRequest, SharePlatform},
    domain::engagement::models::{FanPhotoForm, display_name, web_link},
    errors::AppError,
};

/// Engagement forms submitted to the storefront API.
pub struct BackendEngagementService {
    backend: Arc<dyn Backend>,
}

impl std::fmt::Debug for BackendEngagementService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendEngagementService")
            .finish_non_exhaustive()
    }
}

impl BackendEngagementService {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl EngagementService for BackendEngagementService {
    #[tracing::instrument(name = "engagement.service.newsletter_signup", skip_all, err)]
    async fn newsletter_signup(&self, email: &str, name: Option<String>) -> Result<(), AppError> {
        let mut errors = ValidationError::new();

        let email = errors.check(EmailAddress::parse(email));
        let name = match name.as_deref().map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => errors.check(display_name(name)).map(Some),
            None => Some(None),
        };

        let (Some(email), Some(name)) = (email, name) else {
            return Err(errors.into());
        };

        self.backend
            .newsletter_signup(&NewsletterSignup { email, name })
            .await?;

        info!("subscribed to newsletter");

        Ok(())
    }

    #[tracing::instrument(name = "engagement.service.submit_fan_photo", skip_all, err)]
    async fn submit_fan_photo(&self, form: &FanPhotoForm) -> Result<(), AppError> {
        let submission = form.validate()?;

        self.backend.submit_fan_photo(&submission).await?;

        info!(image_url = %submission.image_url, "submitted fan photo");

        Ok(())
    }

    #[tracing::instrument(name = "engagement.service.share", skip(self), err)]
    async fn share(&self, platform: SharePlatform, url: &str) -> Result<(), AppError> {
        let url = web_link(url, Field::ShareUrl)?;

        self.backend
            .share(&ShareRequest {
                platform,
                url: url.to_string(),
            })
            .await?;

        info!(?platform, "shared link");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait EngagementService: Send + Sync {
    /// Subscribe an email to the band newsletter. A blank name is dropped.
    async fn newsletter_signup(&self, email: &str, name: Option<String>) -> Result<(), AppError>;

    /// Submit a fan photo for the gallery.
    async fn submit_fan_photo(&self, form: &FanPhotoForm) -> Result<(), AppError>;

    /// Record a share of a store link.
    async fn share(&self, platform: SharePlatform, url: &str) -> Result<(), AppError>;
}
