//! Products

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    money::{Price, minor_units, option_minor_units},
    uuids::TypedUuid,
};

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Variant UUID
pub type VariantUuid = TypedUuid<ProductVariant>;

/// Shop category a product is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    /// Shirts, hoodies and other wearables.
    Apparel,

    /// Vinyl, CDs, cassettes and downloads.
    Music,

    /// Pins, patches, totes.
    Accessories,

    /// Posters and prints.
    Prints,

    /// Bundles of several products sold as one.
    Bundles,
}

/// Product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product identifier.
    pub uuid: ProductUuid,

    /// Display name.
    pub name: String,

    /// URL slug, unique within a catalog.
    pub slug: String,

    /// Shop category.
    pub category: ProductCategory,

    /// Regular price before variant adjustments.
    #[serde(with = "minor_units")]
    pub base_price: Price,

    /// Sale price replacing the base price while set.
    #[serde(default, with = "option_minor_units")]
    pub sale_price: Option<Price>,

    /// Image URLs, first is the cover.
    #[serde(default)]
    pub images: Vec<String>,

    /// Purchasable configurations.
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// Find a variant of this product.
    pub fn variant(&self, uuid: VariantUuid) -> Option<&ProductVariant> {
        self.variants.iter().find(|variant| variant.uuid == uuid)
    }

    /// Mutable access to a variant of this product.
    pub fn variant_mut(&mut self, uuid: VariantUuid) -> Option<&mut ProductVariant> {
        self.variants.iter_mut().find(|variant| variant.uuid == uuid)
    }

    /// Find a variant by SKU.
    pub fn variant_by_sku(&self, sku: &str) -> Option<&ProductVariant> {
        self.variants.iter().find(|variant| variant.sku == sku)
    }

    /// The variant preselected on the product page: the first purchasable one.
    pub fn default_variant(&self) -> Option<&ProductVariant> {
        self.variants
            .iter()
            .find(|variant| variant.is_purchasable())
    }

    /// Whether a sale price is active.
    pub fn is_on_sale(&self) -> bool {
        self.sale_price.is_some()
    }

    /// Whether any variant can currently be bought.
    pub fn is_available(&self) -> bool {
        self.variants.iter().any(ProductVariant::is_purchasable)
    }
}

/// A single attribute of a variant, e.g. `size = M`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantAttribute {
    /// Attribute name.
    pub name: String,

    /// Attribute value.
    pub value: String,
}

/// Stock state reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    /// Whether the variant is sold at all right now.
    pub in_stock: bool,

    /// Units available to order.
    pub available: u32,
}

impl Inventory {
    /// Units that can actually be ordered.
    pub fn orderable(&self) -> u32 {
        if self.in_stock { self.available } else { 0 }
    }
}

/// Product Variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    /// Variant identifier.
    pub uuid: VariantUuid,

    /// Stock keeping unit.
    pub sku: String,

    /// Ordered attributes, e.g. size then colour.
    #[serde(default)]
    pub attributes: SmallVec<[VariantAttribute; 2]>,

    /// Signed amount added to the product price.
    #[serde(with = "minor_units")]
    pub price_adjustment: Price,

    /// Current stock.
    pub inventory: Inventory,
}

impl ProductVariant {
    /// Whether at least one unit can be ordered.
    pub fn is_purchasable(&self) -> bool {
        self.inventory.orderable() > 0
    }

    /// Value of the named attribute, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name.eq_ignore_ascii_case(name))
            .map(|attribute| attribute.value.as_str())
    }

    /// Human label for the variant, e.g. `"M / Black"`.
    pub fn describe(&self) -> String {
        VariantLabel(self).to_string()
    }
}

struct VariantLabel<'a>(&'a ProductVariant);

impl fmt::Display for VariantLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.attributes.is_empty() {
            return f.write_str(&self.0.sku);
        }

        for (i, attribute) in self.0.attributes.iter().enumerate() {
            if i > 0 {
                f.write_str(" / ")?;
            }
            f.write_str(&attribute.value)?;
        }

        Ok(())
    }
}
