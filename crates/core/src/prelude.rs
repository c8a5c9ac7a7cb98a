//! Skywalker prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    address::{Address, AddressForm, Country, UnsupportedCountry},
    cart::{
        Cart, CartAction, CartChange, CartError, CartItemUuid, CartLine, CartPolicy,
        CartSnapshot, StockAdjustment,
    },
    catalog::{Catalog, CatalogError},
    checkout::{
        Billing, BillingInput, CardSummary, CheckoutError, CheckoutSession, CheckoutSnapshot,
        CheckoutStep, PaymentDetails, PaymentToken, SessionUuid,
    },
    discounts::{DiscountCode, DiscountError, DiscountKind},
    fixtures::{Fixture, FixtureError, Store},
    money::{MinorUnits, Price},
    orders::{Order, OrderEvent, OrderLine, OrderLookup, OrderNumber, OrderNumberError, OrderStatus},
    pricing::PricingError,
    products::{
        Inventory, Product, ProductCategory, ProductUuid, ProductVariant, VariantAttribute,
        VariantUuid,
    },
    shipping::{
        DeliveryEstimate, ShippingError, ShippingMethod, ShippingOptions, ShippingQuoteKey,
        needs_refresh,
    },
    summary::{CartSummary, SummaryError, SummaryInputs},
    tax::TaxTable,
    uuids::TypedUuid,
    validation::{AddressField, EmailAddress, Field, FieldError, ValidationError},
};
