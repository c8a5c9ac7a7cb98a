//! Field validation
//!
//! Form validation collects every failing field instead of stopping at the
//! first, so the caller can show all messages inline at once.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

/// Fields of a postal address form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AddressField {
    /// Recipient name
    FullName,
    /// First street line
    Line1,
    /// Second street line
    Line2,
    /// City or town
    City,
    /// State, province or territory
    State,
    /// Postal or ZIP code
    PostalCode,
    /// ISO country code
    Country,
    /// Contact phone number
    Phone,
}

impl AddressField {
    /// Form field name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Line1 => "line1",
            Self::Line2 => "line2",
            Self::City => "city",
            Self::State => "state",
            Self::PostalCode => "postalCode",
            Self::Country => "country",
            Self::Phone => "phone",
        }
    }
}

/// Any user-editable field that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// Shipping address field.
    Shipping(AddressField),
    /// Billing address field.
    Billing(AddressField),
    /// Contact email.
    Email,
    /// Display or subscriber name.
    Name,
    /// Shipping method choice.
    ShippingMethod,
    /// Card token from the payment widget.
    PaymentToken,
    /// Terms and conditions checkbox.
    Terms,
    /// Image link of a fan photo.
    ImageUrl,
    /// Caption of a fan photo.
    Caption,
    /// Permission to publish a submission.
    Consent,
    /// Link being shared.
    ShareUrl,
    /// Units of a cart line.
    Quantity,
    /// Order number on the lookup form.
    OrderNumber,
    /// Discount code entered at checkout.
    DiscountCode,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shipping(field) => write!(f, "shipping.{}", field.as_str()),
            Self::Billing(field) => write!(f, "billing.{}", field.as_str()),
            Self::Email => f.write_str("email"),
            Self::Name => f.write_str("name"),
            Self::ShippingMethod => f.write_str("shippingMethod"),
            Self::PaymentToken => f.write_str("paymentToken"),
            Self::Terms => f.write_str("terms"),
            Self::ImageUrl => f.write_str("imageUrl"),
            Self::Caption => f.write_str("caption"),
            Self::Consent => f.write_str("consent"),
            Self::ShareUrl => f.write_str("shareUrl"),
            Self::Quantity => f.write_str("quantity"),
            Self::OrderNumber => f.write_str("orderNumber"),
            Self::DiscountCode => f.write_str("discountCode"),
        }
    }
}

/// A message attached to one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Failing field.
    pub field: Field,

    /// Message shown next to the field.
    pub message: String,
}

impl FieldError {
    /// Create a field error.
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Field-level validation failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{} field(s) failed validation: {}", .errors.len(), summarize(.errors))]
pub struct ValidationError {
    errors: SmallVec<[FieldError; 4]>,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|error| format!("{}: {}", error.field, error.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// An empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// A single-field error.
    pub fn single(field: Field, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    /// Record a failing field.
    pub fn push(&mut self, field: Field, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Merge another error set into this one.
    pub fn extend(&mut self, other: Self) {
        self.errors.extend(other.errors);
    }

    /// Record the error of a fallible field check and return its value.
    pub fn check<T>(&mut self, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.errors.push(error);
                None
            }
        }
    }

    /// Every recorded error.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Message for a field, if it failed.
    pub fn message_for(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    /// Whether the field failed.
    pub fn has(&self, field: Field) -> bool {
        self.message_for(field).is_some()
    }

    /// Whether nothing failed.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(value)` when nothing failed, otherwise the collected errors.
    ///
    /// # Errors
    ///
    /// Returns `self` when any field failed.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    /// Move shipping-address errors onto the billing address.
    #[must_use]
    pub fn as_billing(mut self) -> Self {
        for error in &mut self.errors {
            if let Field::Shipping(field) = error.field {
                error.field = Field::Billing(field);
            }
        }
        self
    }
}

impl From<FieldError> for ValidationError {
    fn from(error: FieldError) -> Self {
        Self::single(error.field, error.message)
    }
}

/// A syntactically valid, lower-cased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parse and normalize an email address.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] on [`Field::Email`] when the address is malformed.
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        let email = raw.trim().to_ascii_lowercase();

        if email.is_empty() {
            return Err(FieldError::new(Field::Email, "Email is required"));
        }

        let Some((local, domain)) = email.split_once('@') else {
            return Err(FieldError::new(Field::Email, "Enter a valid email address"));
        };

        let domain_ok = !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !domain.contains("..");

        if local.is_empty() || !domain_ok || email.chars().any(char::is_whitespace) {
            return Err(FieldError::new(Field::Email, "Enter a valid email address"));
        }

        Ok(Self(email))
    }

    /// The address as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
