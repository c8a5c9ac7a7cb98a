//! Cart
//!
//! The cart holds at most one line per product variant. Every line carries a
//! stock ceiling, `min(orderable stock, policy.max_per_line)`, and mutations
//! that would push a line above it are rejected without touching the cart.
//! Totals are never stored: [`Cart::subtotal`] and [`Cart::summary`] derive
//! them from the lines on demand.

use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::Catalog,
    money::{Price, minor_units},
    pricing::{PricingError, line_total, total_price, unit_price},
    products::{Product, ProductUuid, ProductVariant, VariantUuid},
    summary::{CartSummary, SummaryError, SummaryInputs, summarize},
    uuids::TypedUuid,
};

mod actions;
mod errors;
mod inventory;

pub use actions::{CartAction, CartChange};
pub use errors::CartError;
pub use inventory::{CartSnapshot, SavedLine, StockAdjustment};

/// Cart line identifier.
pub type CartItemUuid = TypedUuid<CartLine>;

/// Limits applied to every line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPolicy {
    /// Most units of one variant a single order may hold.
    pub max_per_line: u32,
}

impl Default for CartPolicy {
    fn default() -> Self {
        Self { max_per_line: 10 }
    }
}

impl CartPolicy {
    /// Ceiling for a variant under this policy.
    pub fn ceiling(&self, variant: &ProductVariant) -> u32 {
        variant.inventory.orderable().min(self.max_per_line)
    }
}

/// One product variant in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Line identifier.
    pub uuid: CartItemUuid,

    /// Product in the line.
    pub product: ProductUuid,

    /// Variant in the line.
    pub variant: VariantUuid,

    /// Product name at the time it was added.
    pub name: String,

    /// Variant SKU.
    pub sku: String,

    /// Variant label, e.g. "M / Black".
    pub variant_label: String,

    /// Units ordered, always within `1..=ceiling`.
    pub quantity: u32,

    /// Unit price snapshot.
    #[serde(with = "minor_units")]
    pub unit_price: Price,

    /// Most units this line may hold.
    pub ceiling: u32,
}

impl CartLine {
    fn new(
        product: &Product,
        variant: &ProductVariant,
        quantity: u32,
        unit_price: Price,
        ceiling: u32,
    ) -> Self {
        Self {
            uuid: CartItemUuid::new(),
            product: product.uuid,
            variant: variant.uuid,
            name: product.name.clone(),
            sku: variant.sku.clone(),
            variant_label: variant.describe(),
            quantity,
            unit_price,
            ceiling,
        }
    }

    /// `unit_price × quantity`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] when the total does not fit in minor units.
    pub fn total(&self) -> Result<Price, PricingError> {
        line_total(&self.unit_price, self.quantity)
    }

    fn out_of_stock(&self, requested: u32) -> CartError {
        CartError::OutOfStock {
            sku: self.sku.clone(),
            requested,
            available: self.ceiling,
        }
    }
}

/// Shopping cart in a single currency.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
    currency: &'static Currency,
    policy: CartPolicy,
}

impl Cart {
    /// Create an empty cart with the default policy.
    pub fn new(currency: &'static Currency) -> Self {
        Self::with_policy(currency, CartPolicy::default())
    }

    /// Create an empty cart with a custom policy.
    pub fn with_policy(currency: &'static Currency, policy: CartPolicy) -> Self {
        Self {
            lines: Vec::new(),
            currency,
            policy,
        }
    }

    /// Add `quantity` units of a variant, merging into its existing line.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: `quantity` is zero.
    /// - [`CartError::Catalog`]: the product or variant is unknown.
    /// - [`CartError::OutOfStock`]: the merged quantity is above the ceiling.
    /// - [`CartError::CurrencyMismatch`]: the variant is priced in another currency.
    pub fn add_item(
        &mut self,
        catalog: &Catalog,
        product: ProductUuid,
        variant: VariantUuid,
        quantity: u32,
    ) -> Result<CartItemUuid, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let (found, found_variant) = catalog.resolve(product, variant)?;
        let price = unit_price(found, found_variant)?;

        if price.currency() != self.currency {
            return Err(CartError::CurrencyMismatch(
                found_variant.sku.clone(),
                price.currency().iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let ceiling = self.policy.ceiling(found_variant);

        if let Some(line) = self.find_mut(product, variant) {
            let merged = line.quantity.saturating_add(quantity);

            if merged > ceiling {
                return Err(CartError::OutOfStock {
                    sku: line.sku.clone(),
                    requested: merged,
                    available: ceiling,
                });
            }

            line.quantity = merged;
            line.unit_price = price;
            line.ceiling = ceiling;

            return Ok(line.uuid);
        }

        if quantity > ceiling {
            return Err(CartError::OutOfStock {
                sku: found_variant.sku.clone(),
                requested: quantity,
                available: ceiling,
            });
        }

        let line = CartLine::new(found, found_variant, quantity, price, ceiling);
        let uuid = line.uuid;

        self.lines.push(line);

        Ok(uuid)
    }

    /// Set a line's quantity. Zero removes the line.
    ///
    /// # Errors
    ///
    /// - [`CartError::ItemNotFound`]: no such line.
    /// - [`CartError::OutOfStock`]: `quantity` is above the line's ceiling.
    pub fn update_quantity(&mut self, item: CartItemUuid, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove_item(item).map(|_line| ());
        }

        let line = self
            .lines
            .iter_mut()
            .find(|line| line.uuid == item)
            .ok_or(CartError::ItemNotFound(item))?;

        if quantity > line.ceiling {
            return Err(line.out_of_stock(quantity));
        }

        line.quantity = quantity;

        Ok(())
    }

    /// Remove a line, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] when there is no such line.
    pub fn remove_item(&mut self, item: CartItemUuid) -> Result<CartLine, CartError> {
        let index = self
            .lines
            .iter()
            .position(|line| line.uuid == item)
            .ok_or(CartError::ItemNotFound(item))?;

        Ok(self.lines.remove(index))
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in the order they were first added.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up a line.
    pub fn line(&self, item: CartItemUuid) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.uuid == item)
    }

    /// The line holding a product variant, if any.
    pub fn find(&self, product: ProductUuid, variant: VariantUuid) -> Option<&CartLine> {
        self.lines
            .iter()
            .find(|line| line.product == product && line.variant == variant)
    }

    fn find_mut(&mut self, product: ProductUuid, variant: VariantUuid) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product == product && line.variant == variant)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |count, line| count.saturating_add(line.quantity))
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Cart currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Line limits.
    pub fn policy(&self) -> CartPolicy {
        self.policy
    }

    /// Sum of line totals.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] on overflow.
    pub fn subtotal(&self) -> Result<Price, PricingError> {
        let totals = self
            .lines
            .iter()
            .map(CartLine::total)
            .collect::<Result<Vec<_>, _>>()?;

        total_price(self.currency, &totals)
    }

    /// Derived totals for the current lines.
    ///
    /// # Errors
    ///
    /// Returns a [`SummaryError`] when an amount cannot be computed.
    pub fn summary(&self, inputs: &SummaryInputs<'_>) -> Result<CartSummary, SummaryError> {
        summarize(self, inputs)
    }
}
