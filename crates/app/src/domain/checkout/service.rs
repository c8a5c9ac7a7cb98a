//! Checkout service.
//!
//! A transition is applied to a copy of the session, recorded with the
//! backend and only then saved locally. When the backend call fails the
//! customer stays on the step they were on and can resubmit.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use skywalker::{
    address::AddressForm,
    cart::{Cart, CartAction},
    checkout::{
        BillingInput, CheckoutError, CheckoutSession, CheckoutSnapshot, CheckoutStep,
        PaymentDetails, SessionUuid,
    },
    discounts::DiscountCode,
    shipping::{ShippingOptions, ShippingQuoteKey, needs_refresh},
    summary::{CartSummary, SummaryInputs},
    tax::TaxTable,
    validation::{Field, ValidationError},
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    api::{Backend, OrderRequest},
    domain::{
        carts::{CartService, CartUpdate},
        checkout::models::{CheckoutView, Confirmation, PaymentStep, ShippingStep},
    },
    errors::AppError,
    storage::{StateKey, StateStore, load_json, save_json},
};

/// Checkout kept in the state store and mirrored to the backend.
pub struct StoreCheckoutService {
    backend: Arc<dyn Backend>,
    state: Arc<dyn StateStore>,
    carts: Arc<dyn CartService>,
    tax: TaxTable,
    discounts: Vec<DiscountCode>,
    lock: Mutex<()>,
}

impl std::fmt::Debug for StoreCheckoutService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCheckoutService")
            .field("tax", &self.tax)
            .field("discounts", &self.discounts.len())
            .finish_non_exhaustive()
    }
}

impl StoreCheckoutService {
    #[must_use]
    pub fn new(
        backend: Arc<dyn Backend>,
        state: Arc<dyn StateStore>,
        carts: Arc<dyn CartService>,
        tax: TaxTable,
        discounts: Vec<DiscountCode>,
    ) -> Self {
        Self {
            backend,
            state,
            carts,
            tax,
            discounts,
            lock: Mutex::new(()),
        }
    }

    async fn saved_session(&self) -> Result<Option<CheckoutSession>, AppError> {
        let snapshot =
            load_json::<CheckoutSnapshot>(self.state.as_ref(), StateKey::CheckoutSession).await?;

        Ok(snapshot.map(CheckoutSession::restore))
    }

    async fn existing_session(&self, target: CheckoutStep) -> Result<CheckoutSession, AppError> {
        self.saved_session().await?.ok_or_else(|| {
            AppError::from(CheckoutError::StepLocked {
                target,
                missing: CheckoutStep::Cart,
            })
        })
    }

    async fn shipping_step(&self) -> Result<ShippingStep, AppError> {
        Ok(load_json(self.state.as_ref(), StateKey::CheckoutShipping)
            .await?
            .unwrap_or_default())
    }

    async fn save_shipping_step(&self, step: &ShippingStep) -> Result<(), AppError> {
        save_json(self.state.as_ref(), StateKey::CheckoutShipping, step).await?;

        Ok(())
    }

    /// Resume the saved session or start a new one, committing the cart step
    /// while it is still open.
    async fn open(&self, cart: &Cart, now: Timestamp) -> Result<CheckoutSession, AppError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart.into());
        }

        let mut session = match self.saved_session().await? {
            Some(session) if !session.is_finalized() => session,
            _ => CheckoutSession::new(SessionUuid::new(), now),
        };

        if session.step() == CheckoutStep::Cart {
            session.commit_cart(cart, now)?;

            self.record(&session).await?;

            info!(session = %session.uuid(), items = cart.item_count(), "committed cart");
        }

        Ok(session)
    }

    async fn record(&self, session: &CheckoutSession) -> Result<(), AppError> {
        let snapshot = session.snapshot();

        self.backend.save_checkout_session(&snapshot).await?;

        self.keep(&snapshot).await
    }

    async fn keep(&self, snapshot: &CheckoutSnapshot) -> Result<(), AppError> {
        save_json(self.state.as_ref(), StateKey::CheckoutSession, snapshot).await?;

        Ok(())
    }

    async fn clear(&self) -> Result<(), AppError> {
        for key in StateKey::CHECKOUT {
            self.state.remove(key).await?;
        }

        Ok(())
    }

    fn discount(&self, code: &str) -> Option<&DiscountCode> {
        let code = code.trim().to_ascii_uppercase();

        self.discounts.iter().find(|discount| discount.code == code)
    }

    fn summarize(&self, cart: &Cart, session: &CheckoutSession) -> Result<CartSummary, AppError> {
        let tax_rate = session
            .shipping_address()
            .and_then(|address| self.tax.rate_for(address));

        Ok(cart.summary(&SummaryInputs {
            shipping: session.shipping_method(),
            tax_rate,
            discount: session.discount_code().and_then(|code| self.discount(code)),
        })?)
    }

    async fn view(
        &self,
        session: CheckoutSession,
        cart: CartUpdate,
    ) -> Result<CheckoutView, AppError> {
        let shipping = self.shipping_step().await?.options();
        let summary = self.summarize(&cart.cart, &session)?;

        Ok(CheckoutView {
            session,
            shipping,
            summary,
            adjustments: cart.adjustments,
        })
    }
}

#[async_trait]
impl CheckoutService for StoreCheckoutService {
    #[tracing::instrument(name = "checkout.service.begin", skip(self), err)]
    async fn begin(&self) -> Result<CheckoutView, AppError> {
        let _guard = self.lock.lock().await;

        let cart = self.carts.cart().await?;
        let session = self.open(&cart.cart, Timestamp::now()).await?;

        self.view(session, cart).await
    }

    #[tracing::instrument(name = "checkout.service.status", skip(self), err)]
    async fn status(&self) -> Result<Option<CheckoutView>, AppError> {
        let _guard = self.lock.lock().await;

        let Some(session) = self.saved_session().await? else {
            return Ok(None);
        };

        let cart = self.carts.cart().await?;

        Ok(Some(self.view(session, cart).await?))
    }

    #[tracing::instrument(
        name = "checkout.service.submit_shipping",
        skip(self, email, form),
        fields(country = %form.country),
        err
    )]
    async fn submit_shipping(
        &self,
        email: &str,
        form: &AddressForm,
    ) -> Result<CheckoutView, AppError> {
        let _guard = self.lock.lock().await;
        let now = Timestamp::now();

        let cart = self.carts.cart().await?;
        let mut next = self.open(&cart.cart, now).await?;

        let mut shipping = self.shipping_step().await?;
        shipping.email = email.to_string();
        shipping.form = form.clone();

        self.save_shipping_step(&shipping).await?;

        if let Ok(address) = form.validate() {
            let quote = ShippingQuoteKey::from(&address);

            if needs_refresh(shipping.quote.as_ref(), &quote) {
                let methods = self.backend.shipping_methods(&address).await?;
                let options = ShippingOptions::refreshed(methods, shipping.selected.as_deref());

                info!(
                    country = %quote.country,
                    offered = options.methods().len(),
                    "quoted shipping"
                );

                shipping.offer(quote, &options);

                self.save_shipping_step(&shipping).await?;
            }
        }

        match next.commit_shipping(email, form, &shipping.options(), now) {
            Ok(()) => self.record(&next).await?,
            Err(CheckoutError::Validation(errors)) => {
                self.keep(&next.snapshot()).await?;

                return Err(errors.into());
            }
            Err(error) => return Err(error.into()),
        }

        info!(session = %next.uuid(), "committed shipping");

        self.view(next, cart).await
    }

    #[tracing::instrument(name = "checkout.service.select_shipping_method", skip(self), err)]
    async fn select_shipping_method(&self, id: &str) -> Result<CheckoutView, AppError> {
        let _guard = self.lock.lock().await;
        let now = Timestamp::now();

        let cart = self.carts.cart().await?;
        let mut session = self.open(&cart.cart, now).await?;

        let mut shipping = self.shipping_step().await?;
        let mut options = shipping.options();
        let method = options.select(id)?.clone();

        shipping.selected = Some(method.id.clone());

        self.save_shipping_step(&shipping).await?;

        if session.is_complete(CheckoutStep::Shipping) {
            let mut next = session.clone();
            next.change_shipping_method(&method, now)?;

            self.record(&next).await?;

            session = next;
        }

        info!(method = %method.id, "selected shipping method");

        self.view(session, cart).await
    }

    #[tracing::instrument(name = "checkout.service.submit_payment", skip(self, details), err)]
    async fn submit_payment(&self, details: &PaymentDetails) -> Result<Confirmation, AppError> {
        let _guard = self.lock.lock().await;
        let now = Timestamp::now();

        let cart = self.carts.cart().await?;
        let mut next = self.open(&cart.cart, now).await?;

        let payment = PaymentStep {
            card: Some(details.card.clone()),
            billing_form: match &details.billing {
                BillingInput::SameAsShipping => None,
                BillingInput::Address(form) => Some(form.clone()),
            },
            terms_accepted: details.accept_terms,
        };

        save_json(self.state.as_ref(), StateKey::CheckoutPayment, &payment).await?;

        if let Err(error) = next.commit_payment(details, now) {
            if matches!(error, CheckoutError::Validation(_)) {
                self.keep(&next.snapshot()).await?;
            }

            return Err(error.into());
        }

        let summary = self.summarize(&cart.cart, &next)?;
        let request = OrderRequest::new(&next, &cart.cart, summary)?;

        let placed = self.backend.place_order(&request).await?;

        next.confirm(placed.order_number.clone(), now)?;

        if let Err(error) = self.backend.save_checkout_session(&next.snapshot()).await {
            warn!(
                %error,
                order_number = %placed.order_number,
                "order placed but the finished session was not recorded"
            );
        }

        if let Err(error) = self.keep(&next.snapshot()).await {
            warn!(
                %error,
                order_number = %placed.order_number,
                "order placed but the finished session was not saved"
            );
        }

        if let Err(error) = self.carts.apply(CartAction::Clear).await {
            warn!(
                %error,
                order_number = %placed.order_number,
                "order placed but the cart was not cleared"
            );
        }

        if let Err(error) = self.clear().await {
            warn!(
                %error,
                order_number = %placed.order_number,
                "order placed but the checkout state was not cleared"
            );
        }

        info!(
            order_number = %placed.order_number,
            total = %summary.total,
            "placed order"
        );

        Ok(Confirmation {
            order_number: placed.order_number,
            status: placed.status,
            summary,
            email: next.email().cloned(),
            session: next,
        })
    }

    #[tracing::instrument(name = "checkout.service.apply_discount", skip(self), err)]
    async fn apply_discount(&self, code: &str) -> Result<CheckoutView, AppError> {
        let _guard = self.lock.lock().await;
        let now = Timestamp::now();

        let cart = self.carts.cart().await?;
        let mut next = self.open(&cart.cart, now).await?;

        let discount = self.discount(code).ok_or_else(|| {
            ValidationError::single(Field::DiscountCode, "Enter a valid discount code")
        })?;

        next.apply_discount(discount, &cart.cart.subtotal()?, now)?;

        self.record(&next).await?;

        info!(session = %next.uuid(), code = %discount.code, "applied discount");

        self.view(next, cart).await
    }

    #[tracing::instrument(name = "checkout.service.remove_discount", skip(self), err)]
    async fn remove_discount(&self) -> Result<CheckoutView, AppError> {
        let _guard = self.lock.lock().await;
        let now = Timestamp::now();

        let cart = self.carts.cart().await?;
        let mut next = self.open(&cart.cart, now).await?;

        if next.discount_code().is_some() {
            next.remove_discount(now)?;

            self.record(&next).await?;
        }

        self.view(next, cart).await
    }

    #[tracing::instrument(name = "checkout.service.go_to_step", skip(self), err)]
    async fn go_to_step(&self, step: CheckoutStep) -> Result<CheckoutView, AppError> {
        let _guard = self.lock.lock().await;

        let mut next = self.existing_session(step).await?;
        next.go_to_step(step, Timestamp::now())?;

        self.record(&next).await?;

        let cart = self.carts.cart().await?;

        self.view(next, cart).await
    }

    #[tracing::instrument(name = "checkout.service.back", skip(self), err)]
    async fn back(&self) -> Result<CheckoutView, AppError> {
        let _guard = self.lock.lock().await;

        let mut next = self.existing_session(CheckoutStep::Cart).await?;
        next.back(Timestamp::now())?;

        self.record(&next).await?;

        let cart = self.carts.cart().await?;

        self.view(next, cart).await
    }

    #[tracing::instrument(name = "checkout.service.abandon", skip(self), err)]
    async fn abandon(&self) -> Result<(), AppError> {
        let _guard = self.lock.lock().await;

        self.clear().await?;

        info!("abandoned checkout");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Resume or start checkout for the current cart.
    async fn begin(&self) -> Result<CheckoutView, AppError>;

    /// The saved checkout, if one is in progress.
    async fn status(&self) -> Result<Option<CheckoutView>, AppError>;

    /// Validate and commit contact email and shipping address. Methods are
    /// re-quoted only when the destination changed.
    async fn submit_shipping(
        &self,
        email: &str,
        form: &AddressForm,
    ) -> Result<CheckoutView, AppError>;

    /// Choose one of the offered shipping methods.
    async fn select_shipping_method(&self, id: &str) -> Result<CheckoutView, AppError>;

    /// Commit payment and place the order. On success the cart and the
    /// checkout state are cleared. Once the order is placed the confirmation
    /// is returned even if that cleanup fails.
    async fn submit_payment(&self, details: &PaymentDetails) -> Result<Confirmation, AppError>;

    /// Apply one of the store's discount codes. A committed payment has to
    /// be submitted again.
    async fn apply_discount(&self, code: &str) -> Result<CheckoutView, AppError>;

    /// Drop the applied discount code.
    async fn remove_discount(&self) -> Result<CheckoutView, AppError>;

    /// Move to an earlier step, or a later one that is unlocked.
    async fn go_to_step(&self, step: CheckoutStep) -> Result<CheckoutView, AppError>;

    /// Move one step back.
    async fn back(&self) -> Result<CheckoutView, AppError>;

    /// Forget the checkout in progress. The cart is kept.
    async fn abandon(&self) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, Ordering},
    };

    use rusty_money::{Money, iso};
    use skywalker::{
        cart::CartPolicy,
        orders::{OrderNumber, OrderStatus},
        products::Inventory,
        validation::{AddressField, Field},
    };
    use testresult::TestResult;

    use serde_json::Value;

    use crate::{
        api::{ApiError, MockBackend, PlacedOrder},
        domain::carts::StoreCartService,
        storage::{MemoryStateStore, StateStore, StorageError},
        test::{merch, payment_details, shipping_form, shipping_methods, variant},
    };

    use super::*;

    struct Harness {
        carts: Arc<StoreCartService>,
        checkout: StoreCheckoutService,
        state: Arc<dyn StateStore>,
    }

    impl Harness {
        fn new(backend: MockBackend) -> TestResult<Self> {
            Self::with_state(backend, Arc::new(MemoryStateStore::new()))
        }

        fn with_state(mut backend: MockBackend, state: Arc<dyn StateStore>) -> TestResult<Self> {
            backend
                .expect_variant_inventory()
                .returning(|_, _| {
                Ok(Inventory {
                    in_stock: true,
                    available: 60,
                })
            });

            let store = merch()?;
            let backend: Arc<dyn Backend> = Arc::new(backend);

            let carts = Arc::new(StoreCartService::new(
                Arc::clone(&backend),
                state.clone(),
                store.catalog,
                CartPolicy::default(),
            ));

            let checkout = StoreCheckoutService::new(
                backend,
                state.clone(),
                carts.clone(),
                store.tax,
                store.discounts,
            );

            Ok(Self {
                carts,
                checkout,
                state,
            })
        }

        async fn add_records(&self, quantity: u32) -> TestResult {
            let (product, variant) = variant(&merch()?.catalog, "LP-DEBUT-BLK")?;

            self.carts
                .apply(CartAction::Add {
                    product,
                    variant,
                    quantity,
                })
                .await?;

            Ok(())
        }
    }

    /// Memory store whose removals fail once `failing` is set.
    #[derive(Debug, Default)]
    struct StuckRemovals {
        inner: MemoryStateStore,
        failing: AtomicBool,
    }

    #[async_trait]
    impl StateStore for StuckRemovals {
        async fn load(&self, key: StateKey) -> Result<Option<Value>, StorageError> {
            self.inner.load(key).await
        }

        async fn save(&self, key: StateKey, value: Value) -> Result<(), StorageError> {
            self.inner.save(key, value).await
        }

        async fn remove(&self, key: StateKey) -> Result<(), StorageError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StorageError::Io {
                    key,
                    source: std::io::Error::other("disk full"),
                });
            }

            self.inner.remove(key).await
        }
    }

    fn placed(number: &str) -> TestResult<PlacedOrder> {
        Ok(PlacedOrder {
            order_number: number.parse()?,
            status: OrderStatus::Confirmed,
        })
    }

    fn unavailable() -> ApiError {
        ApiError::UnexpectedResponse {
            status: 503,
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn cart_to_confirmation() -> TestResult {
        let number: OrderNumber = "PS-2001".parse()?;

        let mut backend = MockBackend::new();
        backend.expect_save_checkout_session().returning(|_| Ok(()));
        backend
            .expect_shipping_methods()
            .times(1)
            .returning(|_| Ok(shipping_methods()));
        backend
            .expect_place_order()
            .withf(|request| request.payment_token.expose() == "tok_visa" && request.lines.len() == 1)
            .times(1)
            .returning(move |_| {
                Ok(PlacedOrder {
                    order_number: number.clone(),
                    status: OrderStatus::Confirmed,
                })
            });

        let harness = Harness::new(backend)?;
        harness.add_records(4).await?;

        let started = harness.checkout.begin().await?;
        assert_eq!(started.session.step(), CheckoutStep::Shipping);

        let shipped = harness
            .checkout
            .submit_shipping("fan@example.com", &shipping_form())
            .await?;

        assert_eq!(shipped.session.step(), CheckoutStep::Payment);
        assert_eq!(shipped.summary.shipping, Money::from_minor(6_00, iso::USD));
        assert_eq!(shipped.summary.tax, Money::from_minor(7_25, iso::USD));

        let confirmation = harness.checkout.submit_payment(&payment_details()).await?;

        assert_eq!(confirmation.order_number.as_str(), "PS-2001");
        assert_eq!(confirmation.summary.total, Money::from_minor(113_25, iso::USD));
        assert!(confirmation.session.is_finalized());
        assert!(harness.carts.cart().await?.cart.is_empty());
        assert_eq!(harness.state.load(StateKey::CheckoutSession).await?, None);
        assert_eq!(harness.state.load(StateKey::CheckoutShipping).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn invalid_address_stays_on_shipping() -> TestResult {
        let mut backend = MockBackend::new();
        backend
            .expect_save_checkout_session()
            .times(1)
            .returning(|_| Ok(()));
        backend.expect_shipping_methods().never();

        let harness = Harness::new(backend)?;
        harness.add_records(1).await?;

        let form = AddressForm {
            postal_code: "ABCDE".to_string(),
            ..shipping_form()
        };

        let result = harness
            .checkout
            .submit_shipping("fan@example.com", &form)
            .await;

        let Err(AppError::Validation(errors)) = result else {
            return Err(format!("expected field errors, got {result:?}").into());
        };

        assert!(errors.has(Field::Shipping(AddressField::PostalCode)));

        let status = harness.checkout.status().await?.ok_or("missing session")?;

        assert_eq!(status.session.step(), CheckoutStep::Shipping);
        assert_eq!(status.session.shipping_form().postal_code, "ABCDE");

        Ok(())
    }

    #[tokio::test]
    async fn methods_are_quoted_once_per_destination() -> TestResult {
        let mut backend = MockBackend::new();
        backend.expect_save_checkout_session().returning(|_| Ok(()));
        backend
            .expect_shipping_methods()
            .times(1)
            .returning(|_| Ok(shipping_methods()));

        let harness = Harness::new(backend)?;
        harness.add_records(1).await?;

        harness
            .checkout
            .submit_shipping("fan@example.com", &shipping_form())
            .await?;

        let renamed = AddressForm {
            full_name: "Tyler S.".to_string(),
            postal_code: "94110-1234".to_string(),
            ..shipping_form()
        };

        let view = harness
            .checkout
            .submit_shipping("fan@example.com", &renamed)
            .await?;

        assert_eq!(view.session.step(), CheckoutStep::Payment);
        assert_eq!(view.shipping.methods().len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn network_failure_keeps_the_current_step() -> TestResult {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let mut backend = MockBackend::new();
        backend.expect_save_checkout_session().returning(move |_| {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 => Ok(()),
                _ => Err(unavailable()),
            }
        });
        backend
            .expect_shipping_methods()
            .returning(|_| Ok(shipping_methods()));

        let harness = Harness::new(backend)?;
        harness.add_records(1).await?;

        let result = harness
            .checkout
            .submit_shipping("fan@example.com", &shipping_form())
            .await;

        assert!(matches!(result, Err(AppError::Network(_))));

        let status = harness.checkout.status().await?.ok_or("missing session")?;

        assert_eq!(status.session.step(), CheckoutStep::Shipping);
        assert!(!status.session.is_complete(CheckoutStep::Shipping));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        Ok(())
    }

    #[tokio::test]
    async fn declined_order_keeps_cart_and_drops_token() -> TestResult {
        let mut backend = MockBackend::new();
        backend.expect_save_checkout_session().returning(|_| Ok(()));
        backend
            .expect_shipping_methods()
            .returning(|_| Ok(shipping_methods()));
        backend
            .expect_place_order()
            .returning(|_| Err(ApiError::Rejected("card declined".to_string())));

        let harness = Harness::new(backend)?;
        harness.add_records(2).await?;

        harness
            .checkout
            .submit_shipping("fan@example.com", &shipping_form())
            .await?;

        let result = harness.checkout.submit_payment(&payment_details()).await;

        assert!(matches!(result, Err(AppError::Rejected(ref message)) if message == "card declined"));
        assert_eq!(harness.carts.cart().await?.cart.item_count(), 2);

        let status = harness.checkout.status().await?.ok_or("missing session")?;

        assert_eq!(status.session.step(), CheckoutStep::Payment);
        assert!(!status.session.is_complete(CheckoutStep::Payment));

        let saved = harness
            .state
            .load(StateKey::CheckoutPayment)
            .await?
            .ok_or("missing payment step")?;

        assert!(saved.to_string().contains("4242"));
        assert!(!saved.to_string().contains("tok_visa"));

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_cannot_check_out() -> TestResult {
        let mut backend = MockBackend::new();
        backend.expect_save_checkout_session().never();

        let harness = Harness::new(backend)?;

        let result = harness.checkout.begin().await;

        assert!(matches!(
            result,
            Err(AppError::Checkout(CheckoutError::EmptyCart))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn payment_is_locked_until_shipping_is_done() -> TestResult {
        let mut backend = MockBackend::new();
        backend.expect_save_checkout_session().returning(|_| Ok(()));

        let harness = Harness::new(backend)?;
        harness.add_records(1).await?;
        harness.checkout.begin().await?;

        let result = harness.checkout.go_to_step(CheckoutStep::Payment).await;

        assert!(matches!(
            result,
            Err(AppError::Checkout(CheckoutError::StepLocked {
                target: CheckoutStep::Payment,
                missing: CheckoutStep::Shipping,
            }))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn changing_method_updates_totals() -> TestResult {
        let mut backend = MockBackend::new();
        backend.expect_save_checkout_session().returning(|_| Ok(()));
        backend
            .expect_shipping_methods()
            .returning(|_| Ok(shipping_methods()));

        let harness = Harness::new(backend)?;
        harness.add_records(1).await?;

        harness
            .checkout
            .submit_shipping("fan@example.com", &shipping_form())
            .await?;

        let view = harness.checkout.select_shipping_method("express").await?;

        assert_eq!(
            view.session.shipping_method().map(|method| method.id.as_str()),
            Some("express")
        );
        assert_eq!(view.summary.shipping, Money::from_minor(18_00, iso::USD));

        let result = harness.checkout.select_shipping_method("teleport").await;

        assert!(matches!(
            result,
            Err(AppError::Validation(ref errors)) if errors.has(Field::ShippingMethod)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn back_and_abandon() -> TestResult {
        let mut backend = MockBackend::new();
        backend.expect_save_checkout_session().returning(|_| Ok(()));
        backend
            .expect_shipping_methods()
            .returning(|_| Ok(shipping_methods()));

        let harness = Harness::new(backend)?;
        harness.add_records(1).await?;

        harness
            .checkout
            .submit_shipping("fan@example.com", &shipping_form())
            .await?;

        let view = harness.checkout.back().await?;
        assert_eq!(view.session.step(), CheckoutStep::Shipping);

        harness.checkout.abandon().await?;

        assert!(harness.checkout.status().await?.is_none());
        assert_eq!(harness.carts.cart().await?.cart.item_count(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn placed_order_is_confirmed_when_cleanup_fails() -> TestResult {
        let order = placed("PS-3001")?;

        let mut backend = MockBackend::new();
        backend.expect_save_checkout_session().returning(|_| Ok(()));
        backend
            .expect_shipping_methods()
            .returning(|_| Ok(shipping_methods()));
        backend
            .expect_place_order()
            .times(1)
            .returning(move |_| Ok(order.clone()));

        let state = Arc::new(StuckRemovals::default());
        let harness = Harness::with_state(backend, state.clone())?;
        harness.add_records(1).await?;

        harness
            .checkout
            .submit_shipping("fan@example.com", &shipping_form())
            .await?;

        state.failing.store(true, Ordering::SeqCst);

        let confirmation = harness.checkout.submit_payment(&payment_details()).await?;

        assert_eq!(confirmation.order_number.as_str(), "PS-3001");
        assert!(confirmation.session.is_finalized());
        assert!(harness.carts.cart().await?.cart.is_empty());

        let leftover = harness.checkout.status().await?.ok_or("missing session")?;

        assert!(leftover.session.is_finalized());

        Ok(())
    }

    #[tokio::test]
    async fn discount_code_reduces_the_order_total() -> TestResult {
        let order = placed("PS-4001")?;

        let mut backend = MockBackend::new();
        backend.expect_save_checkout_session().returning(|_| Ok(()));
        backend
            .expect_shipping_methods()
            .returning(|_| Ok(shipping_methods()));
        backend
            .expect_place_order()
            .withf(|request| {
                request.discount_code.as_deref() == Some("TOUR15")
                    && request.summary.total == Money::from_minor(97_16, iso::USD)
            })
            .times(1)
            .returning(move |_| Ok(order.clone()));

        let harness = Harness::new(backend)?;
        harness.add_records(4).await?;

        harness
            .checkout
            .submit_shipping("fan@example.com", &shipping_form())
            .await?;

        let unknown = harness.checkout.apply_discount("FREESTUFF").await;

        assert!(matches!(
            unknown,
            Err(AppError::Validation(ref errors)) if errors.has(Field::DiscountCode)
        ));

        let view = harness.checkout.apply_discount(" tour15 ").await?;

        assert_eq!(view.session.discount_code(), Some("TOUR15"));
        assert_eq!(view.summary.discount, Money::from_minor(15_00, iso::USD));
        assert_eq!(view.summary.tax, Money::from_minor(6_16, iso::USD));
        assert_eq!(view.summary.total, Money::from_minor(97_16, iso::USD));

        let confirmation = harness.checkout.submit_payment(&payment_details()).await?;

        assert_eq!(confirmation.summary.discount, Money::from_minor(15_00, iso::USD));
        assert_eq!(confirmation.order_number.as_str(), "PS-4001");

        Ok(())
    }

    #[tokio::test]
    async fn removing_a_discount_restores_the_total() -> TestResult {
        let mut backend = MockBackend::new();
        backend.expect_save_checkout_session().returning(|_| Ok(()));
        backend
            .expect_shipping_methods()
            .returning(|_| Ok(shipping_methods()));

        let harness = Harness::new(backend)?;
        harness.add_records(4).await?;

        harness
            .checkout
            .submit_shipping("fan@example.com", &shipping_form())
            .await?;
        harness.checkout.apply_discount("TOUR15").await?;

        let view = harness.checkout.remove_discount().await?;

        assert_eq!(view.session.discount_code(), None);
        assert_eq!(view.summary.total, Money::from_minor(113_25, iso::USD));

        Ok(())
    }
}
