//! Cart Actions

use crate::{
    cart::{Cart, CartError, CartItemUuid},
    catalog::Catalog,
    products::{ProductUuid, VariantUuid},
};

/// A user intent against the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAction {
    /// Add units of a variant.
    Add {
        /// Product to add
        product: ProductUuid,
        /// Variant to add
        variant: VariantUuid,
        /// Units to add
        quantity: u32,
    },

    /// Set the quantity of a line.
    Update {
        /// Line to change
        item: CartItemUuid,
        /// New quantity, zero removes
        quantity: u32,
    },

    /// Drop a line.
    Remove(CartItemUuid),

    /// Drop every line.
    Clear,
}

/// What an applied action changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A line was created or grew.
    Added(CartItemUuid),

    /// A line now holds `quantity` units.
    Updated {
        /// Changed line
        item: CartItemUuid,
        /// New quantity
        quantity: u32,
    },

    /// A line was removed.
    Removed(CartItemUuid),

    /// The cart was emptied.
    Cleared,
}

impl Cart {
    /// Apply an action, dispatching to the matching mutation.
    ///
    /// # Errors
    ///
    /// Returns the [`CartError`] of the underlying mutation. The cart is
    /// unchanged on error.
    pub fn apply(&mut self, catalog: &Catalog, action: CartAction) -> Result<CartChange, CartError> {
        match action {
            CartAction::Add {
                product,
                variant,
                quantity,
            } => self
                .add_item(catalog, product, variant, quantity)
                .map(CartChange::Added),
            CartAction::Update { item, quantity: 0 } | CartAction::Remove(item) => {
                self.remove_item(item).map(|line| CartChange::Removed(line.uuid))
            }
            CartAction::Update { item, quantity } => self
                .update_quantity(item, quantity)
                .map(|()| CartChange::Updated { item, quantity }),
            CartAction::Clear => {
                self.clear();
                Ok(CartChange::Cleared)
            }
        }
    }
}
