//! Engagement service models

use reqwest::Url;
use skywalker::validation::{EmailAddress, Field, FieldError, ValidationError};

use crate::api::FanPhotoSubmission;

/// Longest credit line shown under a fan photo.
pub const MAX_NAME_CHARS: usize = 80;

/// Longest fan photo caption.
pub const MAX_CAPTION_CHARS: usize = 280;

/// Fan photo form as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanPhotoForm {
    /// Credit line.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Link to the hosted image.
    pub image_url: String,
    /// Optional caption, blank for none.
    pub caption: String,
    /// Permission to publish.
    pub consent: bool,
}

impl FanPhotoForm {
    /// Validate every field at once.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming each failing field.
    pub fn validate(&self) -> Result<FanPhotoSubmission, ValidationError> {
        let mut errors = ValidationError::new();

        let name = errors.check(display_name(&self.name));
        let email = errors.check(EmailAddress::parse(&self.email));
        let image_url = errors.check(web_link(&self.image_url, Field::ImageUrl));

        let caption = self.caption.trim();

        if caption.chars().count() > MAX_CAPTION_CHARS {
            errors.push(
                Field::Caption,
                format!("Keep the caption under {MAX_CAPTION_CHARS} characters"),
            );
        }

        if !self.consent {
            errors.push(Field::Consent, "We need your permission to share the photo");
        }

        let (Some(name), Some(email), Some(image_url)) = (name, email, image_url) else {
            return Err(errors);
        };

        errors.into_result(FanPhotoSubmission {
            name,
            email,
            image_url: image_url.to_string(),
            caption: (!caption.is_empty()).then(|| caption.to_string()),
            consent: self.consent,
        })
    }
}

/// A required name, trimmed.
///
/// # Errors
///
/// Returns a [`FieldError`] on [`Field::Name`] when the name is blank or too long.
pub fn display_name(raw: &str) -> Result<String, FieldError> {
    let name = raw.trim();

    if name.is_empty() {
        return Err(FieldError::new(Field::Name, "Enter your name"));
    }

    if name.chars().count() > MAX_NAME_CHARS {
        return Err(FieldError::new(
            Field::Name,
            format!("Keep your name under {MAX_NAME_CHARS} characters"),
        ));
    }

    Ok(name.to_string())
}

/// An absolute `http` or `https` link.
///
/// # Errors
///
/// Returns a [`FieldError`] on `field` for anything else.
pub fn web_link(raw: &str, field: Field) -> Result<Url, FieldError> {
    let invalid = || FieldError::new(field, "Enter a link starting with http:// or https://");

    let url = Url::parse(raw.trim()).map_err(|_err| invalid())?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn form() -> FanPhotoForm {
        FanPhotoForm {
            name: " Leia ".to_string(),
            email: "leia@example.com".to_string(),
            image_url: "https://photos.example.com/pit.jpg".to_string(),
            caption: String::new(),
            consent: true,
        }
    }

    #[test]
    fn valid_form_is_trimmed() -> Result<(), ValidationError> {
        let submission = form().validate()?;

        assert_eq!(submission.name, "Leia");
        assert_eq!(submission.caption, None);

        Ok(())
    }

    #[test]
    fn every_failing_field_is_reported() -> TestResult {
        let result = FanPhotoForm {
            name: String::new(),
            email: "nope".to_string(),
            image_url: "ftp://photos.example.com/pit.jpg".to_string(),
            caption: "x".repeat(MAX_CAPTION_CHARS + 1),
            consent: false,
        }
        .validate();

        let Err(errors) = result else {
            return Err("expected validation errors".into());
        };

        for field in [
            Field::Name,
            Field::Email,
            Field::ImageUrl,
            Field::Caption,
            Field::Consent,
        ] {
            assert!(errors.has(field), "missing {field}");
        }

        Ok(())
    }

    #[test]
    fn long_names_are_rejected() {
        assert!(display_name(&"a".repeat(MAX_NAME_CHARS)).is_ok());
        assert!(display_name(&"a".repeat(MAX_NAME_CHARS + 1)).is_err());
    }

    #[test]
    fn links_need_a_web_scheme() {
        assert!(web_link("https://skywalker.band/tour", Field::ShareUrl).is_ok());
        assert!(web_link("javascript:alert(1)", Field::ShareUrl).is_err());
        assert!(web_link("skywalker.band", Field::ShareUrl).is_err());
    }
}
