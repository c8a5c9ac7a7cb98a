//! Catalog

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::products::{
    Inventory, Product, ProductCategory, ProductUuid, ProductVariant, VariantUuid,
};

/// Errors raised while building or querying a catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Product is not in the catalog.
    #[error("product {0} not found")]
    UnknownProduct(ProductUuid),

    /// Variant does not belong to the product.
    #[error("variant {variant} not found on product {product}")]
    UnknownVariant {
        /// Product searched
        product: ProductUuid,
        /// Variant requested
        variant: VariantUuid,
    },

    /// Another product already uses this slug.
    #[error("slug {0} is already taken")]
    DuplicateSlug(String),

    /// A product is priced in another currency (slug, product currency, catalog currency).
    #[error("product {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(String, &'static str, &'static str),
}

/// In-memory product catalog in a single currency.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: FxHashMap<ProductUuid, Product>,
    slugs: FxHashMap<String, ProductUuid>,
    order: Vec<ProductUuid>,
    currency: &'static Currency,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            products: FxHashMap::default(),
            slugs: FxHashMap::default(),
            order: Vec::new(),
            currency,
        }
    }

    /// Create a catalog holding the given products.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] on a currency mismatch or duplicate slug.
    pub fn with_products(
        products: impl IntoIterator<Item = Product>,
        currency: &'static Currency,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(currency);

        for product in products {
            catalog.insert(product)?;
        }

        Ok(catalog)
    }

    /// Insert or replace a product. Replacing keeps the listing position.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] on a currency mismatch or when the slug
    /// belongs to a different product.
    pub fn insert(&mut self, product: Product) -> Result<(), CatalogError> {
        let product_currency = product.base_price.currency();

        if product_currency != self.currency {
            return Err(CatalogError::CurrencyMismatch(
                product.slug,
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if let Some(existing) = self.slugs.get(&product.slug)
            && *existing != product.uuid
        {
            return Err(CatalogError::DuplicateSlug(product.slug));
        }

        if let Some(previous) = self.products.get(&product.uuid)
            && previous.slug != product.slug
        {
            self.slugs.remove(&previous.slug);
        }

        if !self.products.contains_key(&product.uuid) {
            self.order.push(product.uuid);
        }

        self.slugs.insert(product.slug.clone(), product.uuid);
        self.products.insert(product.uuid, product);

        Ok(())
    }

    /// Look up a product.
    pub fn product(&self, uuid: ProductUuid) -> Option<&Product> {
        self.products.get(&uuid)
    }

    /// Look up a product by slug.
    pub fn by_slug(&self, slug: &str) -> Option<&Product> {
        self.slugs.get(slug).and_then(|uuid| self.products.get(uuid))
    }

    /// Products in listing order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.order.iter().filter_map(|uuid| self.products.get(uuid))
    }

    /// Products of a category, in listing order.
    pub fn by_category(&self, category: ProductCategory) -> impl Iterator<Item = &Product> {
        self.products()
            .filter(move |product| product.category == category)
    }

    /// Resolve a product/variant pair.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownProduct`] or [`CatalogError::UnknownVariant`].
    pub fn resolve(
        &self,
        product: ProductUuid,
        variant: VariantUuid,
    ) -> Result<(&Product, &ProductVariant), CatalogError> {
        let found = self
            .products
            .get(&product)
            .ok_or(CatalogError::UnknownProduct(product))?;

        let found_variant = found
            .variant(variant)
            .ok_or(CatalogError::UnknownVariant { product, variant })?;

        Ok((found, found_variant))
    }

    /// Overwrite the stock of a variant with a fresh backend reading.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownProduct`] or [`CatalogError::UnknownVariant`].
    pub fn set_inventory(
        &mut self,
        product: ProductUuid,
        variant: VariantUuid,
        inventory: Inventory,
    ) -> Result<(), CatalogError> {
        let found = self
            .products
            .get_mut(&product)
            .ok_or(CatalogError::UnknownProduct(product))?;

        let found_variant = found
            .variant_mut(variant)
            .ok_or(CatalogError::UnknownVariant { product, variant })?;

        found_variant.inventory = inventory;

        Ok(())
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Catalog currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
