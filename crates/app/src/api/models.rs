//! Wire models
//!
//! Request and response bodies that have no core counterpart. Products,
//! inventory, shipping methods and orders travel as their core types.

use serde::{Deserialize, Serialize, Serializer};
use skywalker::{
    address::Address,
    cart::Cart,
    checkout::{CheckoutError, CheckoutSession, CheckoutStep, PaymentToken, SessionUuid},
    money::{Price, minor_units},
    orders::{OrderNumber, OrderStatus},
    products::{ProductUuid, VariantUuid},
    summary::CartSummary,
    validation::EmailAddress,
};

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Checkout session placing the order.
    pub session: SessionUuid,

    /// Contact email.
    pub email: EmailAddress,

    /// Purchased lines.
    pub lines: Vec<OrderRequestLine>,

    /// Destination.
    pub shipping_address: Address,

    /// Address the card is billed to.
    pub billing_address: Address,

    /// Chosen shipping method id.
    pub shipping_method: String,

    /// Card token from the payment widget.
    #[serde(serialize_with = "expose_token")]
    pub payment_token: PaymentToken,

    /// Discount code applied at checkout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,

    /// Totals shown to the customer.
    pub summary: CartSummary,
}

/// One line of an [`OrderRequest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequestLine {
    /// Product bought.
    pub product: ProductUuid,

    /// Variant bought.
    pub variant: VariantUuid,

    /// Variant SKU.
    pub sku: String,

    /// Units bought.
    pub quantity: u32,

    /// Price per unit.
    #[serde(with = "minor_units")]
    pub unit_price: Price,
}

impl OrderRequest {
    /// Build the order for a session whose payment step is committed.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::StepLocked`] naming the first step whose data
    /// is missing, or [`CheckoutError::EmptyCart`].
    pub fn new(
        session: &CheckoutSession,
        cart: &Cart,
        summary: CartSummary,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let locked = |missing| CheckoutError::StepLocked {
            target: CheckoutStep::Confirmation,
            missing,
        };

        let (Some(email), Some(shipping_address), Some(method)) = (
            session.email(),
            session.shipping_address(),
            session.shipping_method(),
        ) else {
            return Err(locked(CheckoutStep::Shipping));
        };

        let (Some(billing_address), Some(token)) =
            (session.billing_address(), session.payment_token())
        else {
            return Err(locked(CheckoutStep::Payment));
        };

        let lines = cart
            .lines()
            .iter()
            .map(|line| OrderRequestLine {
                product: line.product,
                variant: line.variant,
                sku: line.sku.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();

        Ok(Self {
            session: session.uuid(),
            email: email.clone(),
            lines,
            shipping_address: shipping_address.clone(),
            billing_address: billing_address.clone(),
            shipping_method: method.id.clone(),
            payment_token: token.clone(),
            discount_code: session.discount_code().map(str::to_string),
            summary,
        })
    }
}

fn expose_token<S: Serializer>(token: &PaymentToken, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(token.expose())
}

/// Response of `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    /// Number shown on the confirmation page.
    pub order_number: OrderNumber,

    /// Initial status.
    pub status: OrderStatus,
}

/// Body of `POST /api/newsletter/signup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSignup {
    /// Subscriber email.
    pub email: EmailAddress,

    /// Optional first name for the greeting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Body of `POST /api/fan-photos/submit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FanPhotoSubmission {
    /// Credit line.
    pub name: String,

    /// Contact email, never published.
    pub email: EmailAddress,

    /// Link to the hosted image.
    pub image_url: String,

    /// Optional caption.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,

    /// Permission to publish.
    pub consent: bool,
}

/// Where a share link is posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharePlatform {
    /// Instagram story or post
    Instagram,
    /// TikTok
    Tiktok,
    /// Discord server
    Discord,
    /// Facebook
    Facebook,
    /// X, formerly Twitter
    X,
    /// Email to a friend
    Email,
}

/// Body of `POST /api/social/share`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    /// Target platform.
    pub platform: SharePlatform,

    /// Link being shared.
    pub url: String,
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rusty_money::iso;
    use skywalker::{
        cart::Cart,
        checkout::CheckoutSession,
        fixtures::Fixture,
        summary::SummaryInputs,
    };
    use testresult::TestResult;

    use crate::test::{payment_details, shipping_form, shipping_options};

    use super::*;

    #[test]
    fn order_request_carries_token_only_on_the_wire() -> TestResult {
        let store = Fixture::new().load_store("merch")?;
        let lp = store.catalog.by_slug("debut-lp").ok_or("missing debut-lp")?;
        let black = lp.default_variant().ok_or("missing variant")?;

        let mut cart = Cart::new(iso::USD);
        cart.add_item(&store.catalog, lp.uuid, black.uuid, 1)?;

        let now = Timestamp::now();
        let mut session = CheckoutSession::new(SessionUuid::new(), now);
        session.commit_cart(&cart, now)?;
        session.commit_shipping("fan@example.com", &shipping_form(), &shipping_options(), now)?;
        session.commit_payment(&payment_details(), now)?;

        let summary = cart.summary(&SummaryInputs {
            shipping: session.shipping_method(),
            ..SummaryInputs::default()
        })?;

        let request = OrderRequest::new(&session, &cart, summary)?;
        let body = serde_json::to_value(&request)?;

        assert_eq!(
            body.get("paymentToken").and_then(|token| token.as_str()),
            Some("tok_visa")
        );
        assert_eq!(
            body.get("shippingMethod").and_then(|method| method.as_str()),
            Some("ground")
        );
        assert_eq!(
            body.pointer("/lines/0/quantity").and_then(|quantity| quantity.as_u64()),
            Some(1)
        );
        assert!(!format!("{request:?}").contains("tok_visa"));

        Ok(())
    }

    #[test]
    fn order_request_needs_payment() -> TestResult {
        let store = Fixture::new().load_store("merch")?;
        let lp = store.catalog.by_slug("debut-lp").ok_or("missing debut-lp")?;
        let black = lp.default_variant().ok_or("missing variant")?;

        let mut cart = Cart::new(iso::USD);
        cart.add_item(&store.catalog, lp.uuid, black.uuid, 1)?;

        let now = Timestamp::now();
        let mut session = CheckoutSession::new(SessionUuid::new(), now);
        session.commit_cart(&cart, now)?;
        session.commit_shipping("fan@example.com", &shipping_form(), &shipping_options(), now)?;

        let summary = cart.summary(&SummaryInputs::default())?;

        assert_eq!(
            OrderRequest::new(&session, &cart, summary).err(),
            Some(CheckoutError::StepLocked {
                target: CheckoutStep::Confirmation,
                missing: CheckoutStep::Payment,
            })
        );

        Ok(())
    }

    #[test]
    fn placed_order_is_decoded() -> TestResult {
        let placed: PlacedOrder =
            serde_json::from_str(r#"{"orderNumber":"ps-2001","status":"confirmed"}"#)?;

        assert_eq!(placed.order_number.as_str(), "PS-2001");
        assert_eq!(placed.status, OrderStatus::Confirmed);

        Ok(())
    }
}
