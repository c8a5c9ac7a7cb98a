//! Checkout
//!
//! A checkout session walks `Cart → Shipping → Payment → Confirmation`. Each
//! step is committed with its data, which is validated before the step is
//! marked complete. Moving back is always allowed and keeps what was entered.
//! Moving forward requires every earlier step to be complete. Changing the
//! data of a step invalidates the steps after it.

use std::{collections::BTreeSet, fmt};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    address::{Address, AddressForm},
    cart::Cart,
    discounts::DiscountCode,
    money::Price,
    orders::OrderNumber,
    shipping::{ShippingMethod, ShippingOptions},
    uuids::TypedUuid,
    validation::{EmailAddress, Field, ValidationError},
};

mod errors;
mod payment;
mod snapshot;

pub use errors::CheckoutError;
pub use payment::{Billing, BillingInput, CardSummary, PaymentDetails, PaymentToken};
pub use snapshot::CheckoutSnapshot;

/// Checkout session identifier.
pub type SessionUuid = TypedUuid<CheckoutSession>;

/// Checkout steps in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStep {
    /// Review the cart.
    Cart,
    /// Contact email, address and shipping method.
    Shipping,
    /// Card, billing address and terms.
    Payment,
    /// Order placed.
    Confirmation,
}

impl CheckoutStep {
    /// Every step, first to last.
    pub const ALL: [Self; 4] = [Self::Cart, Self::Shipping, Self::Payment, Self::Confirmation];

    /// The step before this one.
    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Cart => None,
            Self::Shipping => Some(Self::Cart),
            Self::Payment => Some(Self::Shipping),
            Self::Confirmation => Some(Self::Payment),
        }
    }

    /// The step after this one.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Cart => Some(Self::Shipping),
            Self::Shipping => Some(Self::Payment),
            Self::Payment => Some(Self::Confirmation),
            Self::Confirmation => None,
        }
    }

    /// Step title.
    pub fn label(self) -> &'static str {
        match self {
            Self::Cart => "Cart",
            Self::Shipping => "Shipping",
            Self::Payment => "Payment",
            Self::Confirmation => "Confirmation",
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A customer's progress through checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    uuid: SessionUuid,
    step: CheckoutStep,
    completed: BTreeSet<CheckoutStep>,
    email: Option<EmailAddress>,
    shipping_form: AddressForm,
    shipping_address: Option<Address>,
    shipping_method: Option<ShippingMethod>,
    billing: Option<Billing>,
    card: Option<CardSummary>,
    payment_token: Option<PaymentToken>,
    terms_accepted: bool,
    discount_code: Option<String>,
    order_number: Option<OrderNumber>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl CheckoutSession {
    /// Start a session on the cart step.
    pub fn new(uuid: SessionUuid, now: Timestamp) -> Self {
        Self {
            uuid,
            step: CheckoutStep::Cart,
            completed: BTreeSet::new(),
            email: None,
            shipping_form: AddressForm::default(),
            shipping_address: None,
            shipping_method: None,
            billing: None,
            card: None,
            payment_token: None,
            terms_accepted: false,
            discount_code: None,
            order_number: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `step` can be shown now.
    pub fn can_go_to(&self, step: CheckoutStep) -> bool {
        self.first_missing_before(step).is_none()
    }

    fn first_missing_before(&self, step: CheckoutStep) -> Option<CheckoutStep> {
        CheckoutStep::ALL
            .into_iter()
            .take_while(|earlier| *earlier < step)
            .find(|earlier| !self.completed.contains(earlier))
    }

    fn ensure_open(&self) -> Result<(), CheckoutError> {
        if self.is_finalized() {
            return Err(CheckoutError::Finalized);
        }
        Ok(())
    }

    fn ensure_reachable(&self, target: CheckoutStep) -> Result<(), CheckoutError> {
        match self.first_missing_before(target) {
            Some(missing) => Err(CheckoutError::StepLocked { target, missing }),
            None => Ok(()),
        }
    }

    /// Mark `step` complete without changing the current step.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Finalized`]: the order was already placed.
    /// - [`CheckoutError::StepLocked`]: an earlier step is incomplete.
    pub fn complete_step(&mut self, step: CheckoutStep, now: Timestamp) -> Result<(), CheckoutError> {
        self.ensure_open()?;
        self.ensure_reachable(step)?;

        self.completed.insert(step);
        self.updated_at = now;

        Ok(())
    }

    /// Move to `step`. Earlier steps are always reachable, later steps only
    /// once every step before them is complete.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Finalized`]: the order was already placed.
    /// - [`CheckoutError::StepLocked`]: an earlier step is incomplete.
    pub fn go_to_step(&mut self, step: CheckoutStep, now: Timestamp) -> Result<(), CheckoutError> {
        self.ensure_open()?;

        if step == CheckoutStep::Confirmation {
            return Err(CheckoutError::StepLocked {
                target: step,
                missing: self
                    .first_missing_before(step)
                    .unwrap_or(CheckoutStep::Payment),
            });
        }

        if step > self.step {
            self.ensure_reachable(step)?;
        }

        self.step = step;
        self.updated_at = now;

        Ok(())
    }

    /// Move to the previous step, staying put on the first one.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Finalized`] once the order was placed.
    pub fn back(&mut self, now: Timestamp) -> Result<CheckoutStep, CheckoutError> {
        self.ensure_open()?;

        if let Some(previous) = self.step.previous() {
            self.step = previous;
            self.updated_at = now;
        }

        Ok(self.step)
    }

    /// Drop completion of every step after `step`, along with the payment
    /// token when payment is invalidated.
    pub fn invalidate_after(&mut self, step: CheckoutStep) {
        self.completed.retain(|completed| *completed <= step);

        if step < CheckoutStep::Payment {
            self.payment_token = None;
        }

        if let Some(first_invalid) = step.next()
            && self.step > first_invalid
        {
            self.step = first_invalid;
        }
    }

    /// Commit the cart step.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Finalized`]: the order was already placed.
    /// - [`CheckoutError::EmptyCart`]: there is nothing to check out.
    pub fn commit_cart(&mut self, cart: &Cart, now: Timestamp) -> Result<(), CheckoutError> {
        self.ensure_open()?;

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        self.completed.insert(CheckoutStep::Cart);
        self.step = CheckoutStep::Shipping;
        self.updated_at = now;

        Ok(())
    }

    /// Commit contact email, shipping address and shipping method.
    ///
    /// The submitted form is kept even when it fails, so the customer can fix
    /// it in place. A change of address, email or method invalidates payment.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Validation`]: with every failing field.
    /// - [`CheckoutError::StepLocked`]: the cart step is incomplete.
    /// - [`CheckoutError::Finalized`]: the order was already placed.
    pub fn commit_shipping(
        &mut self,
        email: &str,
        form: &AddressForm,
        options: &ShippingOptions,
        now: Timestamp,
    ) -> Result<(), CheckoutError> {
        self.ensure_open()?;
        self.ensure_reachable(CheckoutStep::Shipping)?;

        self.shipping_form = form.clone();
        self.step = CheckoutStep::Shipping;
        self.updated_at = now;

        let mut errors = ValidationError::new();

        let email = errors.check(EmailAddress::parse(email));

        let address = match form.validate() {
            Ok(address) => Some(address),
            Err(invalid) => {
                errors.extend(invalid);
                None
            }
        };

        let method = options.selected().cloned();

        if method.is_none() {
            errors.push(Field::ShippingMethod, "Choose a shipping method");
        }

        let (Some(email), Some(address), Some(method)) = (email, address, method) else {
            return Err(errors.into());
        };

        let changed = self.email.as_ref() != Some(&email)
            || self.shipping_address.as_ref() != Some(&address)
            || self.shipping_method.as_ref() != Some(&method);

        if changed {
            self.invalidate_after(CheckoutStep::Shipping);
        }

        self.shipping_form = AddressForm::from(&address);
        self.email = Some(email);
        self.shipping_address = Some(address);
        self.shipping_method = Some(method);
        self.completed.insert(CheckoutStep::Shipping);
        self.step = CheckoutStep::Payment;

        Ok(())
    }

    /// Swap the shipping method after the shipping step was committed.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::StepLocked`]: shipping has not been committed.
    /// - [`CheckoutError::Finalized`]: the order was already placed.
    pub fn change_shipping_method(
        &mut self,
        method: &ShippingMethod,
        now: Timestamp,
    ) -> Result<(), CheckoutError> {
        self.ensure_open()?;
        self.ensure_reachable(CheckoutStep::Payment)?;

        if self.shipping_method.as_ref() != Some(method) {
            self.invalidate_after(CheckoutStep::Shipping);
            self.shipping_method = Some(method.clone());
            self.updated_at = now;
        }

        Ok(())
    }

    /// Commit card, billing address and terms acceptance.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Validation`]: with every failing field.
    /// - [`CheckoutError::StepLocked`]: shipping has not been committed.
    /// - [`CheckoutError::Finalized`]: the order was already placed.
    pub fn commit_payment(
        &mut self,
        details: &PaymentDetails,
        now: Timestamp,
    ) -> Result<(), CheckoutError> {
        self.ensure_open()?;
        self.ensure_reachable(CheckoutStep::Payment)?;

        self.step = CheckoutStep::Payment;
        self.updated_at = now;
        self.payment_token = None;
        self.completed.remove(&CheckoutStep::Payment);

        let (token, billing) = details.validate()?;

        self.payment_token = Some(token);
        self.card = Some(details.card.clone());
        self.billing = Some(billing);
        self.terms_accepted = details.accept_terms;
        self.completed.insert(CheckoutStep::Payment);

        Ok(())
    }

    /// Apply a discount code to the order.
    ///
    /// The total changes, so a committed payment has to be submitted again.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Validation`]: the subtotal is below the code's
    ///   minimum.
    /// - [`CheckoutError::Finalized`]: the order was already placed.
    pub fn apply_discount(
        &mut self,
        code: &DiscountCode,
        subtotal: &Price,
        now: Timestamp,
    ) -> Result<(), CheckoutError> {
        self.ensure_open()?;

        if !code.applies_to(subtotal) {
            let message = match &code.minimum_subtotal {
                Some(minimum) => format!("Spend at least {minimum} to use {}", code.code),
                None => format!("{} can't be used on this order", code.code),
            };

            return Err(ValidationError::single(Field::DiscountCode, message).into());
        }

        if self.discount_code.as_deref() != Some(code.code.as_str()) {
            self.invalidate_after(CheckoutStep::Shipping);
            self.discount_code = Some(code.code.clone());
            self.updated_at = now;
        }

        Ok(())
    }

    /// Drop the applied discount code, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Finalized`] once the order was placed.
    pub fn remove_discount(&mut self, now: Timestamp) -> Result<(), CheckoutError> {
        self.ensure_open()?;

        if self.discount_code.take().is_some() {
            self.invalidate_after(CheckoutStep::Shipping);
            self.updated_at = now;
        }

        Ok(())
    }

    /// Record the placed order and finish checkout. The payment token is
    /// dropped.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::StepLocked`]: payment has not been committed.
    /// - [`CheckoutError::Finalized`]: the order was already placed.
    pub fn confirm(&mut self, order_number: OrderNumber, now: Timestamp) -> Result<(), CheckoutError> {
        self.ensure_open()?;
        self.ensure_reachable(CheckoutStep::Confirmation)?;

        if self.payment_token.is_none() {
            return Err(CheckoutError::StepLocked {
                target: CheckoutStep::Confirmation,
                missing: CheckoutStep::Payment,
            });
        }

        self.payment_token = None;
        self.order_number = Some(order_number);
        self.completed.insert(CheckoutStep::Confirmation);
        self.step = CheckoutStep::Confirmation;
        self.updated_at = now;

        Ok(())
    }

    /// Whether the order was placed.
    pub fn is_finalized(&self) -> bool {
        self.completed.contains(&CheckoutStep::Confirmation)
    }

    /// Whether `step` is complete.
    pub fn is_complete(&self, step: CheckoutStep) -> bool {
        self.completed.contains(&step)
    }

    /// Session identifier.
    pub fn uuid(&self) -> SessionUuid {
        self.uuid
    }

    /// Current step.
    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Completed steps, in order.
    pub fn completed(&self) -> impl Iterator<Item = CheckoutStep> + '_ {
        self.completed.iter().copied()
    }

    /// Contact email.
    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    /// The shipping form as last entered.
    pub fn shipping_form(&self) -> &AddressForm {
        &self.shipping_form
    }

    /// Validated shipping address.
    pub fn shipping_address(&self) -> Option<&Address> {
        self.shipping_address.as_ref()
    }

    /// Chosen shipping method.
    pub fn shipping_method(&self) -> Option<&ShippingMethod> {
        self.shipping_method.as_ref()
    }

    /// Billing address choice.
    pub fn billing(&self) -> Option<&Billing> {
        self.billing.as_ref()
    }

    /// Address to bill, resolving "same as shipping".
    pub fn billing_address(&self) -> Option<&Address> {
        match self.billing.as_ref()? {
            Billing::SameAsShipping => self.shipping_address.as_ref(),
            Billing::Address(address) => Some(address),
        }
    }

    /// Card summary.
    pub fn card(&self) -> Option<&CardSummary> {
        self.card.as_ref()
    }

    /// In-memory payment token.
    pub fn payment_token(&self) -> Option<&PaymentToken> {
        self.payment_token.as_ref()
    }

    /// Whether the terms were accepted.
    pub fn terms_accepted(&self) -> bool {
        self.terms_accepted
    }

    /// Applied discount code.
    pub fn discount_code(&self) -> Option<&str> {
        self.discount_code.as_deref()
    }

    /// Placed order number.
    pub fn order_number(&self) -> Option<&OrderNumber> {
        self.order_number.as_ref()
    }

    /// Creation time.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Last change.
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use rusty_money::{Money, iso};
    use testresult::TestResult;

    use crate::{
        cart::tests::merch,
        shipping::DeliveryEstimate,
        validation::AddressField,
    };

    use super::*;

    pub(crate) fn form() -> AddressForm {
        AddressForm {
            full_name: "Tyler Skywalker".to_string(),
            line1: "500 Mission St".to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            postal_code: "94110".to_string(),
            country: "US".to_string(),
            ..AddressForm::default()
        }
    }

    pub(crate) fn options() -> ShippingOptions {
        ShippingOptions::new(vec![
            ShippingMethod {
                id: "ground".to_string(),
                name: "Ground".to_string(),
                price: Money::from_minor(6_00, iso::USD),
                estimated_days: DeliveryEstimate {
                    min_days: 3,
                    max_days: 7,
                },
                is_default: true,
                free_over: None,
            },
            ShippingMethod {
                id: "express".to_string(),
                name: "Express".to_string(),
                price: Money::from_minor(18_00, iso::USD),
                estimated_days: DeliveryEstimate {
                    min_days: 1,
                    max_days: 2,
                },
                is_default: false,
                free_over: None,
            },
        ])
    }

    pub(crate) fn payment() -> PaymentDetails {
        PaymentDetails {
            token: "tok_visa".to_string(),
            card: CardSummary {
                brand: "Visa".to_string(),
                last4: "4242".to_string(),
            },
            billing: BillingInput::SameAsShipping,
            accept_terms: true,
        }
    }

    pub(crate) fn session_at_payment() -> Result<CheckoutSession, Box<dyn std::error::Error>> {
        let merch = merch()?;
        let mut cart = Cart::new(iso::USD);
        cart.add_item(&merch.catalog, merch.vinyl, merch.vinyl_black, 1)?;

        let now = Timestamp::now();
        let mut session = CheckoutSession::new(SessionUuid::new(), now);
        session.commit_cart(&cart, now)?;
        session.commit_shipping("fan@example.com", &form(), &options(), now)?;

        Ok(session)
    }

    #[test]
    fn new_session_starts_on_cart() {
        let session = CheckoutSession::new(SessionUuid::new(), Timestamp::now());

        assert_eq!(session.step(), CheckoutStep::Cart);
        assert!(session.can_go_to(CheckoutStep::Cart));
        assert!(!session.can_go_to(CheckoutStep::Shipping));
    }

    #[test]
    fn forward_navigation_needs_earlier_steps() {
        let now = Timestamp::now();
        let mut session = CheckoutSession::new(SessionUuid::new(), now);

        assert_eq!(
            session.go_to_step(CheckoutStep::Payment, now),
            Err(CheckoutError::StepLocked {
                target: CheckoutStep::Payment,
                missing: CheckoutStep::Cart,
            })
        );
        assert_eq!(session.step(), CheckoutStep::Cart);
    }

    #[test]
    fn empty_cart_cannot_be_committed() {
        let now = Timestamp::now();
        let mut session = CheckoutSession::new(SessionUuid::new(), now);

        assert_eq!(
            session.commit_cart(&Cart::new(iso::USD), now),
            Err(CheckoutError::EmptyCart)
        );
    }

    #[test]
    fn invalid_shipping_stays_on_step_with_every_error() -> TestResult {
        let merch = merch()?;
        let mut cart = Cart::new(iso::USD);
        cart.add_item(&merch.catalog, merch.vinyl, merch.vinyl_black, 1)?;

        let now = Timestamp::now();
        let mut session = CheckoutSession::new(SessionUuid::new(), now);
        session.commit_cart(&cart, now)?;

        let bad = AddressForm {
            postal_code: "ABCDE".to_string(),
            ..form()
        };

        let Err(CheckoutError::Validation(errors)) =
            session.commit_shipping("not-an-email", &bad, &ShippingOptions::default(), now)
        else {
            return Err("expected validation errors".into());
        };

        assert!(errors.has(Field::Email));
        assert!(errors.has(Field::Shipping(AddressField::PostalCode)));
        assert!(errors.has(Field::ShippingMethod));
        assert_eq!(session.step(), CheckoutStep::Shipping);
        assert_eq!(session.shipping_form().postal_code, "ABCDE");
        assert!(!session.is_complete(CheckoutStep::Shipping));

        Ok(())
    }

    #[test]
    fn back_keeps_entered_data() -> TestResult {
        let mut session = session_at_payment()?;

        session.back(Timestamp::now())?;

        assert_eq!(session.step(), CheckoutStep::Shipping);
        assert!(session.shipping_address().is_some());
        assert!(session.can_go_to(CheckoutStep::Payment));

        session.go_to_step(CheckoutStep::Payment, Timestamp::now())?;
        assert_eq!(session.step(), CheckoutStep::Payment);

        Ok(())
    }

    #[test]
    fn changing_address_invalidates_payment() -> TestResult {
        let mut session = session_at_payment()?;
        let now = Timestamp::now();
        session.commit_payment(&payment(), now)?;
        assert!(session.is_complete(CheckoutStep::Payment));

        let moved = AddressForm {
            postal_code: "10001".to_string(),
            state: "NY".to_string(),
            city: "New York".to_string(),
            ..form()
        };
        session.commit_shipping("fan@example.com", &moved, &options(), now)?;

        assert!(!session.is_complete(CheckoutStep::Payment));
        assert!(session.payment_token().is_none());
        assert_eq!(session.step(), CheckoutStep::Payment);

        Ok(())
    }

    #[test]
    fn recommitting_same_shipping_keeps_payment() -> TestResult {
        let mut session = session_at_payment()?;
        let now = Timestamp::now();
        session.commit_payment(&payment(), now)?;

        session.commit_shipping("FAN@example.com", &form(), &options(), now)?;

        assert!(session.is_complete(CheckoutStep::Payment));

        Ok(())
    }

    #[test]
    fn switching_method_invalidates_payment() -> TestResult {
        let mut session = session_at_payment()?;
        let now = Timestamp::now();
        session.commit_payment(&payment(), now)?;

        let express = options().method("express").cloned().ok_or("no express")?;
        session.change_shipping_method(&express, now)?;

        assert!(!session.is_complete(CheckoutStep::Payment));
        assert_eq!(
            session.shipping_method().map(|m| m.id.as_str()),
            Some("express")
        );

        Ok(())
    }

    #[test]
    fn confirm_finalizes_and_drops_token() -> TestResult {
        let mut session = session_at_payment()?;
        let now = Timestamp::now();
        session.commit_payment(&payment(), now)?;

        session.confirm("PS-1042".parse()?, now)?;

        assert!(session.is_finalized());
        assert_eq!(session.step(), CheckoutStep::Confirmation);
        assert!(session.payment_token().is_none());
        assert_eq!(session.back(now), Err(CheckoutError::Finalized));
        assert_eq!(
            session.billing_address().map(|a| a.postal_code.as_str()),
            Some("94110")
        );

        Ok(())
    }

    #[test]
    fn confirm_needs_payment() -> TestResult {
        let mut session = session_at_payment()?;

        let result = session.confirm("PS-1042".parse()?, Timestamp::now());

        assert_eq!(
            result,
            Err(CheckoutError::StepLocked {
                target: CheckoutStep::Confirmation,
                missing: CheckoutStep::Payment,
            })
        );

        Ok(())
    }

    #[test]
    fn rejected_payment_replaces_the_earlier_one() -> TestResult {
        let mut session = session_at_payment()?;
        let now = Timestamp::now();
        session.commit_payment(&payment(), now)?;

        let declined = PaymentDetails {
            accept_terms: false,
            ..payment()
        };

        assert!(matches!(
            session.commit_payment(&declined, now),
            Err(CheckoutError::Validation(_))
        ));
        assert!(!session.is_complete(CheckoutStep::Payment));
        assert!(session.payment_token().is_none());
        assert_eq!(session.step(), CheckoutStep::Payment);
        assert!(matches!(
            session.confirm("PS-1042".parse()?, now),
            Err(CheckoutError::StepLocked { .. })
        ));

        Ok(())
    }

    #[test]
    fn discount_needs_its_minimum_and_resets_payment() -> TestResult {
        let mut session = session_at_payment()?;
        let now = Timestamp::now();
        session.commit_payment(&payment(), now)?;

        let fiver = DiscountCode::new(
            "fiver",
            crate::discounts::DiscountKind::AmountOff(Money::from_minor(5_00, iso::USD)),
        )
        .with_minimum(Money::from_minor(40_00, iso::USD));

        let result = session.apply_discount(&fiver, &Money::from_minor(25_00, iso::USD), now);

        assert!(matches!(
            result,
            Err(CheckoutError::Validation(ref errors)) if errors.has(Field::DiscountCode)
        ));
        assert!(session.is_complete(CheckoutStep::Payment));

        session.apply_discount(&fiver, &Money::from_minor(50_00, iso::USD), now)?;

        assert_eq!(session.discount_code(), Some("FIVER"));
        assert!(!session.is_complete(CheckoutStep::Payment));
        assert!(session.payment_token().is_none());
        assert_eq!(session.snapshot().discount_code.as_deref(), Some("FIVER"));

        session.remove_discount(now)?;

        assert_eq!(session.discount_code(), None);

        Ok(())
    }

    #[test]
    fn confirmation_is_not_reachable_by_navigation() -> TestResult {
        let mut session = session_at_payment()?;
        session.commit_payment(&payment(), Timestamp::now())?;

        assert!(matches!(
            session.go_to_step(CheckoutStep::Confirmation, Timestamp::now()),
            Err(CheckoutError::StepLocked { .. })
        ));

        Ok(())
    }
}
