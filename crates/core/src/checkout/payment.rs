//! Payment details

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    address::{Address, AddressForm},
    validation::{Field, FieldError, ValidationError},
};

/// Opaque card token issued by the payment widget.
///
/// Tokens are held in memory only. They never serialize and are redacted in
/// debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct PaymentToken(String);

impl PaymentToken {
    /// Wrap a token.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] on [`Field::PaymentToken`] when the token is blank.
    pub fn new(token: &str) -> Result<Self, FieldError> {
        let token = token.trim();

        if token.is_empty() {
            return Err(FieldError::new(
                Field::PaymentToken,
                "Enter your card details",
            ));
        }

        Ok(Self(token.to_string()))
    }

    /// The raw token, for the order request only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PaymentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PaymentToken(<redacted>)")
    }
}

/// Card shown back to the customer, e.g. "Visa ending 4242".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSummary {
    /// Card brand.
    pub brand: String,

    /// Last four digits.
    pub last4: String,
}

impl fmt::Display for CardSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ending {}", self.brand, self.last4)
    }
}

/// Billing address choice as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingInput {
    /// Bill to the shipping address.
    SameAsShipping,

    /// Bill to a separately entered address.
    Address(AddressForm),
}

/// Validated billing address choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "address", rename_all = "camelCase")]
pub enum Billing {
    /// Bill to the shipping address.
    SameAsShipping,

    /// Bill to this address.
    Address(Address),
}

/// Everything submitted on the payment step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    /// Token from the payment widget.
    pub token: String,

    /// Card summary from the payment widget.
    pub card: CardSummary,

    /// Billing address choice.
    pub billing: BillingInput,

    /// Terms and conditions checkbox.
    pub accept_terms: bool,
}

impl PaymentDetails {
    /// Validate every payment field at once.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming each failing field. Billing
    /// address errors are reported on [`Field::Billing`].
    pub fn validate(&self) -> Result<(PaymentToken, Billing), ValidationError> {
        let mut errors = ValidationError::new();

        let token = errors.check(PaymentToken::new(&self.token));

        if self.card.last4.len() != 4 || !self.card.last4.bytes().all(|b| b.is_ascii_digit()) {
            errors.push(Field::PaymentToken, "Card details are incomplete");
        }

        let billing = match &self.billing {
            BillingInput::SameAsShipping => Some(Billing::SameAsShipping),
            BillingInput::Address(form) => match form.validate() {
                Ok(address) => Some(Billing::Address(address)),
                Err(invalid) => {
                    errors.extend(invalid.as_billing());
                    None
                }
            },
        };

        if !self.accept_terms {
            errors.push(Field::Terms, "Accept the terms to place your order");
        }

        match (token, billing) {
            (Some(token), Some(billing)) if errors.is_empty() => Ok((token, billing)),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::validation::AddressField;

    use super::*;

    fn details(billing: BillingInput) -> PaymentDetails {
        PaymentDetails {
            token: "tok_visa".to_string(),
            card: CardSummary {
                brand: "Visa".to_string(),
                last4: "4242".to_string(),
            },
            billing,
            accept_terms: true,
        }
    }

    #[test]
    fn token_is_redacted_in_debug() -> Result<(), FieldError> {
        let token = PaymentToken::new("tok_secret")?;

        assert_eq!(format!("{token:?}"), "PaymentToken(<redacted>)");
        assert_eq!(token.expose(), "tok_secret");

        Ok(())
    }

    #[test]
    fn every_payment_field_is_reported() {
        let mut submitted = details(BillingInput::Address(AddressForm::default()));
        submitted.token = "  ".to_string();
        submitted.accept_terms = false;

        let errors = submitted.validate().err().unwrap_or_default();

        assert!(errors.has(Field::PaymentToken));
        assert!(errors.has(Field::Terms));
        assert!(errors.has(Field::Billing(AddressField::City)));
        assert!(!errors.has(Field::Shipping(AddressField::City)));
    }

    #[test]
    fn same_as_shipping_needs_no_address() {
        let result = details(BillingInput::SameAsShipping).validate();

        assert!(matches!(result, Ok((_, Billing::SameAsShipping))));
    }
}
