//! Persisted checkout state

use std::collections::BTreeSet;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    address::{Address, AddressForm},
    checkout::{Billing, CardSummary, CheckoutSession, CheckoutStep, SessionUuid},
    orders::OrderNumber,
    shipping::ShippingMethod,
    validation::EmailAddress,
};

/// Serializable view of a [`CheckoutSession`]. The payment token is never
/// part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSnapshot {
    /// Session identifier.
    pub uuid: SessionUuid,

    /// Current step.
    pub step: CheckoutStep,

    /// Completed steps.
    pub completed: Vec<CheckoutStep>,

    /// Contact email.
    #[serde(default)]
    pub email: Option<EmailAddress>,

    /// Shipping form as last entered.
    #[serde(default)]
    pub shipping_form: AddressForm,

    /// Validated shipping address.
    #[serde(default)]
    pub shipping_address: Option<Address>,

    /// Chosen shipping method.
    #[serde(default)]
    pub shipping_method: Option<ShippingMethod>,

    /// Billing choice.
    #[serde(default)]
    pub billing: Option<Billing>,

    /// Card summary.
    #[serde(default)]
    pub card: Option<CardSummary>,

    /// Terms accepted.
    #[serde(default)]
    pub terms_accepted: bool,

    /// Applied discount code.
    #[serde(default)]
    pub discount_code: Option<String>,

    /// Placed order.
    #[serde(default)]
    pub order_number: Option<OrderNumber>,

    /// Creation time.
    pub created_at: Timestamp,

    /// Last change.
    pub updated_at: Timestamp,
}

impl CheckoutSession {
    /// Persistable view of the session.
    pub fn snapshot(&self) -> CheckoutSnapshot {
        CheckoutSnapshot {
            uuid: self.uuid,
            step: self.step,
            completed: self.completed.iter().copied().collect(),
            email: self.email.clone(),
            shipping_form: self.shipping_form.clone(),
            shipping_address: self.shipping_address.clone(),
            shipping_method: self.shipping_method.clone(),
            billing: self.billing.clone(),
            card: self.card.clone(),
            terms_accepted: self.terms_accepted,
            discount_code: self.discount_code.clone(),
            order_number: self.order_number.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Rebuild a session from a snapshot.
    ///
    /// The token is not persisted, so an unplaced order comes back with the
    /// payment step incomplete. Completed steps whose data is missing are
    /// dropped, and the current step is moved back to the first reachable one.
    pub fn restore(snapshot: CheckoutSnapshot) -> Self {
        let mut completed: BTreeSet<CheckoutStep> = snapshot.completed.into_iter().collect();
        let finalized = completed.contains(&CheckoutStep::Confirmation)
            && snapshot.order_number.is_some();

        if !finalized {
            completed.remove(&CheckoutStep::Confirmation);
            completed.remove(&CheckoutStep::Payment);

            let shipping_ready = snapshot.email.is_some()
                && snapshot.shipping_address.is_some()
                && snapshot.shipping_method.is_some();

            if !shipping_ready {
                completed.remove(&CheckoutStep::Shipping);
            }
        }

        let mut session = Self {
            uuid: snapshot.uuid,
            step: snapshot.step,
            completed,
            email: snapshot.email,
            shipping_form: snapshot.shipping_form,
            shipping_address: snapshot.shipping_address,
            shipping_method: snapshot.shipping_method,
            billing: snapshot.billing,
            card: snapshot.card,
            payment_token: None,
            terms_accepted: snapshot.terms_accepted,
            discount_code: snapshot.discount_code,
            order_number: snapshot.order_number,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        };

        if finalized {
            session.step = CheckoutStep::Confirmation;
        } else {
            session.step = CheckoutStep::ALL
                .into_iter()
                .filter(|step| *step <= session.step.min(CheckoutStep::Payment))
                .take_while(|step| session.can_go_to(*step))
                .last()
                .unwrap_or(CheckoutStep::Cart);
        }

        session
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::checkout::tests::{payment, session_at_payment};

    use super::*;

    #[test]
    fn snapshot_never_carries_the_token() -> TestResult {
        let mut session = session_at_payment()?;
        session.commit_payment(&payment(), Timestamp::now())?;

        let yaml = serde_norway::to_string(&session.snapshot())?;

        assert!(!yaml.contains("tok_visa"));
        assert!(yaml.contains("4242"));

        Ok(())
    }

    #[test]
    fn restore_requires_payment_again() -> TestResult {
        let mut session = session_at_payment()?;
        session.commit_payment(&payment(), Timestamp::now())?;

        let yaml = serde_norway::to_string(&session.snapshot())?;
        let restored = CheckoutSession::restore(serde_norway::from_str(&yaml)?);

        assert_eq!(restored.step(), CheckoutStep::Payment);
        assert!(restored.is_complete(CheckoutStep::Shipping));
        assert!(!restored.is_complete(CheckoutStep::Payment));
        assert_eq!(restored.card(), session.card());
        assert_eq!(restored.shipping_address(), session.shipping_address());

        Ok(())
    }

    #[test]
    fn restore_rewinds_to_reachable_step() -> TestResult {
        let session = session_at_payment()?;
        let mut snapshot = session.snapshot();
        snapshot.shipping_method = None;

        let restored = CheckoutSession::restore(snapshot);

        assert_eq!(restored.step(), CheckoutStep::Shipping);
        assert!(!restored.is_complete(CheckoutStep::Shipping));

        Ok(())
    }

    #[test]
    fn finalized_session_stays_finalized() -> TestResult {
        let mut session = session_at_payment()?;
        let now = Timestamp::now();
        session.commit_payment(&payment(), now)?;
        session.confirm("PS-1042".parse()?, now)?;

        let restored = CheckoutSession::restore(session.snapshot());

        assert!(restored.is_finalized());
        assert_eq!(restored.step(), CheckoutStep::Confirmation);

        Ok(())
    }
}
