//! Stock reconciliation and cart persistence

use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};

use crate::{
    cart::{Cart, CartItemUuid, CartLine, CartPolicy},
    catalog::Catalog,
    pricing::unit_price,
    products::{ProductUuid, VariantUuid},
};

/// A change forced on a line by fresh stock data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StockAdjustment {
    /// The variant can no longer be ordered, or left the catalog.
    #[serde(rename_all = "camelCase")]
    Removed {
        /// Removed line
        item: CartItemUuid,
        /// Variant SKU
        sku: String,
    },

    /// The line held more than the new ceiling.
    #[serde(rename_all = "camelCase")]
    Reduced {
        /// Reduced line
        item: CartItemUuid,
        /// Variant SKU
        sku: String,
        /// Quantity before
        from: u32,
        /// Quantity after
        to: u32,
    },
}

impl Cart {
    /// Re-apply stock ceilings from the catalog. Lines whose variant can no
    /// longer be ordered are removed, lines above their new ceiling are
    /// reduced to it.
    pub fn refresh_inventory(&mut self, catalog: &Catalog) -> Vec<StockAdjustment> {
        let policy = self.policy;
        let mut adjustments = Vec::new();

        self.lines.retain_mut(|line| {
            let ceiling = catalog
                .resolve(line.product, line.variant)
                .map_or(0, |(_, variant)| policy.ceiling(variant));

            line.ceiling = ceiling;

            if ceiling == 0 {
                adjustments.push(StockAdjustment::Removed {
                    item: line.uuid,
                    sku: line.sku.clone(),
                });
                return false;
            }

            if line.quantity > ceiling {
                adjustments.push(StockAdjustment::Reduced {
                    item: line.uuid,
                    sku: line.sku.clone(),
                    from: line.quantity,
                    to: ceiling,
                });
                line.quantity = ceiling;
            }

            true
        });

        adjustments
    }

    /// Persistable view of the cart.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            currency: self.currency.iso_alpha_code.to_string(),
            policy: self.policy,
            lines: self
                .lines
                .iter()
                .map(|line| SavedLine {
                    uuid: line.uuid,
                    product: line.product,
                    variant: line.variant,
                    quantity: line.quantity,
                })
                .collect(),
        }
    }

    /// Rebuild a cart from a snapshot against the current catalog.
    ///
    /// Lines are re-priced and re-capped. Lines that can no longer be
    /// ordered are dropped, and every such change is reported.
    pub fn restore(
        snapshot: &CartSnapshot,
        catalog: &Catalog,
        currency: &'static Currency,
    ) -> (Self, Vec<StockAdjustment>) {
        let mut cart = Self::with_policy(currency, snapshot.policy);
        let mut adjustments = Vec::new();

        for saved in &snapshot.lines {
            let restored = catalog
                .resolve(saved.product, saved.variant)
                .ok()
                .and_then(|(product, variant)| {
                    let price = unit_price(product, variant).ok()?;
                    let ceiling = cart.policy.ceiling(variant);

                    (price.currency() == currency && ceiling > 0).then(|| {
                        let mut line =
                            CartLine::new(product, variant, saved.quantity, price, ceiling);
                        line.uuid = saved.uuid;
                        line
                    })
                });

            let Some(mut line) = restored else {
                adjustments.push(StockAdjustment::Removed {
                    item: saved.uuid,
                    sku: catalog
                        .product(saved.product)
                        .and_then(|product| product.variant(saved.variant))
                        .map(|variant| variant.sku.clone())
                        .unwrap_or_default(),
                });
                continue;
            };

            let requested = cart
                .find(saved.product, saved.variant)
                .map_or(0, |existing| existing.quantity)
                .saturating_add(saved.quantity);

            if requested > line.ceiling {
                adjustments.push(StockAdjustment::Reduced {
                    item: saved.uuid,
                    sku: line.sku.clone(),
                    from: requested,
                    to: line.ceiling,
                });
            }

            let quantity = requested.min(line.ceiling);

            if let Some(existing) = cart.find_mut(saved.product, saved.variant) {
                existing.quantity = quantity;
            } else {
                line.quantity = quantity;
                cart.lines.push(line);
            }
        }

        (cart, adjustments)
    }
}

/// Serializable cart contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    /// ISO code the cart was priced in.
    pub currency: String,

    /// Line limits.
    #[serde(default)]
    pub policy: CartPolicy,

    /// Saved lines.
    pub lines: Vec<SavedLine>,
}

/// A line as persisted. Prices are not saved; they are re-read from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedLine {
    /// Line identifier, kept across restores.
    pub uuid: CartItemUuid,

    /// Product in the line.
    pub product: ProductUuid,

    /// Variant in the line.
    pub variant: VariantUuid,

    /// Saved quantity.
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::{cart::tests::merch, products::Inventory};

    use super::*;

    #[test]
    fn refresh_reduces_and_removes_lines() -> TestResult {
        let mut merch = merch()?;
        let mut cart = Cart::new(iso::USD);

        let hoodie = cart.add_item(&merch.catalog, merch.hoodie, merch.hoodie_m, 3)?;
        let vinyl = cart.add_item(&merch.catalog, merch.vinyl, merch.vinyl_black, 2)?;

        merch.catalog.set_inventory(
            merch.hoodie,
            merch.hoodie_m,
            Inventory {
                in_stock: true,
                available: 1,
            },
        )?;
        merch.catalog.set_inventory(
            merch.vinyl,
            merch.vinyl_black,
            Inventory {
                in_stock: false,
                available: 40,
            },
        )?;

        let adjustments = cart.refresh_inventory(&merch.catalog);

        assert_eq!(
            adjustments,
            [
                StockAdjustment::Reduced {
                    item: hoodie,
                    sku: "HOOD-M".to_string(),
                    from: 3,
                    to: 1,
                },
                StockAdjustment::Removed {
                    item: vinyl,
                    sku: "LP-BLK".to_string(),
                },
            ]
        );
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.line(hoodie).map(|line| line.ceiling), Some(1));

        Ok(())
    }

    #[test]
    fn refresh_without_stock_changes_is_a_no_op() -> TestResult {
        let merch = merch()?;
        let mut cart = Cart::new(iso::USD);

        cart.add_item(&merch.catalog, merch.hoodie, merch.hoodie_l, 2)?;
        let before = cart.clone();

        assert!(cart.refresh_inventory(&merch.catalog).is_empty());
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn restore_rebuilds_the_same_cart() -> TestResult {
        let merch = merch()?;
        let mut cart = Cart::new(iso::USD);

        cart.add_item(&merch.catalog, merch.hoodie, merch.hoodie_l, 2)?;
        cart.add_item(&merch.catalog, merch.vinyl, merch.vinyl_black, 1)?;

        let yaml = serde_norway::to_string(&cart.snapshot())?;
        let snapshot: CartSnapshot = serde_norway::from_str(&yaml)?;
        let (restored, adjustments) = Cart::restore(&snapshot, &merch.catalog, iso::USD);

        assert!(adjustments.is_empty());
        assert_eq!(restored, cart);

        Ok(())
    }

    #[test]
    fn restore_drops_lines_missing_from_catalog() -> TestResult {
        let merch = merch()?;
        let missing = CartItemUuid::new();
        let snapshot = CartSnapshot {
            currency: "USD".to_string(),
            policy: CartPolicy::default(),
            lines: vec![
                SavedLine {
                    uuid: missing,
                    product: ProductUuid::new(),
                    variant: VariantUuid::new(),
                    quantity: 1,
                },
                SavedLine {
                    uuid: CartItemUuid::new(),
                    product: merch.hoodie,
                    variant: merch.hoodie_m,
                    quantity: 7,
                },
            ],
        };

        let (cart, adjustments) = Cart::restore(&snapshot, &merch.catalog, iso::USD);

        assert_eq!(cart.item_count(), 3);
        assert_eq!(adjustments.len(), 2);
        assert_eq!(
            adjustments.first(),
            Some(&StockAdjustment::Removed {
                item: missing,
                sku: String::new(),
            })
        );

        Ok(())
    }
}
