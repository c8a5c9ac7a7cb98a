//! Checkout service models

use serde::{Deserialize, Serialize};
use skywalker::{
    address::AddressForm,
    cart::StockAdjustment,
    checkout::{BillingInput, CardSummary, CheckoutSession},
    orders::{OrderNumber, OrderStatus},
    shipping::{ShippingMethod, ShippingOptions, ShippingQuoteKey},
    summary::CartSummary,
    validation::EmailAddress,
};

/// Shipping step input, kept so a restart shows the form as it was typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingStep {
    /// Email as typed.
    pub email: String,

    /// Address as typed.
    pub form: AddressForm,

    /// Destination the offered methods were quoted for.
    pub quote: Option<ShippingQuoteKey>,

    /// Methods offered for `quote`.
    pub methods: Vec<ShippingMethod>,

    /// Chosen method id.
    pub selected: Option<String>,
}

impl ShippingStep {
    /// Offered methods with the current choice applied.
    pub fn options(&self) -> ShippingOptions {
        ShippingOptions::refreshed(self.methods.clone(), self.selected.as_deref())
    }

    /// Replace the offered methods after a new quote.
    pub fn offer(&mut self, quote: ShippingQuoteKey, options: &ShippingOptions) {
        self.quote = Some(quote);
        self.methods = options.methods().to_vec();
        self.selected = options.selected().map(|method| method.id.clone());
    }
}

/// Payment step input without the card token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentStep {
    /// Card shown back to the customer.
    pub card: Option<CardSummary>,

    /// Separate billing address as typed, `None` when billing to the
    /// shipping address.
    pub billing_form: Option<AddressForm>,

    /// Terms checkbox.
    pub terms_accepted: bool,
}

impl PaymentStep {
    /// Billing choice to prefill the payment form with.
    pub fn billing(&self) -> BillingInput {
        match &self.billing_form {
            Some(form) => BillingInput::Address(form.clone()),
            None => BillingInput::SameAsShipping,
        }
    }
}

/// Checkout as shown to the customer.
#[derive(Debug, Clone)]
pub struct CheckoutView {
    /// Session state.
    pub session: CheckoutSession,

    /// Methods offered for the current address.
    pub shipping: ShippingOptions,

    /// Totals with the chosen method and destination tax.
    pub summary: CartSummary,

    /// Cart lines changed by stock updates since the last view.
    pub adjustments: Vec<StockAdjustment>,
}

/// A placed order.
#[derive(Debug, Clone)]
pub struct Confirmation {
    /// Number to quote for support and order lookup.
    pub order_number: OrderNumber,

    /// Status reported by the backend.
    pub status: OrderStatus,

    /// Amounts charged.
    pub summary: CartSummary,

    /// Where the receipt goes.
    pub email: Option<EmailAddress>,

    /// Finalized session.
    pub session: CheckoutSession,
}
