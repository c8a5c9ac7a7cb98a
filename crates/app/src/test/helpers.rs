//! Test Helpers

use rusty_money::{Money, iso};
use skywalker::{
    address::AddressForm,
    catalog::Catalog,
    checkout::{BillingInput, CardSummary, PaymentDetails},
    fixtures::{Fixture, FixtureError, Store},
    products::{ProductUuid, VariantUuid},
    shipping::{DeliveryEstimate, ShippingMethod, ShippingOptions},
};
use testresult::TestResult;

/// The bundled merch store.
pub(crate) fn merch() -> Result<Store, FixtureError> {
    Fixture::new().load_store("merch")
}

/// Product and variant ids of the variant sold as `sku`.
pub(crate) fn variant(catalog: &Catalog, sku: &str) -> TestResult<(ProductUuid, VariantUuid)> {
    catalog
        .products()
        .find_map(|product| {
            product
                .variant_by_sku(sku)
                .map(|variant| (product.uuid, variant.uuid))
        })
        .ok_or_else(|| format!("no variant with sku {sku}").into())
}

/// A valid San Francisco shipping address.
pub(crate) fn shipping_form() -> AddressForm {
    AddressForm {
        full_name: "Tyler Skywalker".to_string(),
        line1: "2501 Mission St".to_string(),
        line2: String::new(),
        city: "San Francisco".to_string(),
        state: "CA".to_string(),
        postal_code: "94110".to_string(),
        country: "US".to_string(),
        phone: String::new(),
    }
}

/// Ground (default) and express shipping.
pub(crate) fn shipping_methods() -> Vec<ShippingMethod> {
    vec![
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
    ]
}

/// [`shipping_methods`] with ground preselected.
pub(crate) fn shipping_options() -> ShippingOptions {
    ShippingOptions::new(shipping_methods())
}

/// A Visa payment billed to the shipping address.
pub(crate) fn payment_details() -> PaymentDetails {
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
