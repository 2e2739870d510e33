//! The five marketplace tables held together.

use chrono::Month;
use serde::Serialize;

use crate::model::{CarbonRecord, CustomerRecord, MarketRecord, Producer, Product};

/// All marketplace tables.
///
/// A dataset is built once, validated, and then only read. Joined views
/// borrow from it rather than copying rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Producer table.
    pub producers: Vec<Producer>,
    /// Product table.
    pub products: Vec<Product>,
    /// Weekly market activity.
    pub market: Vec<MarketRecord>,
    /// Monthly customer segments.
    pub customers: Vec<CustomerRecord>,
    /// Annual carbon estimates per producer.
    pub carbon: Vec<CarbonRecord>,
}

impl Dataset {
    /// Looks up a producer by id.
    #[must_use]
    pub fn producer(&self, id: u32) -> Option<&Producer> {
        self.producers.iter().find(|p| p.id == id)
    }

    /// Looks up a product by id.
    #[must_use]
    pub fn product(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Returns the carbon record of a producer, if one exists.
    #[must_use]
    pub fn carbon_for(&self, producer_id: u32) -> Option<&CarbonRecord> {
        self.carbon.iter().find(|c| c.producer_id() == producer_id)
    }

    /// Returns the products of one producer.
    pub fn products_of(&self, producer_id: u32) -> impl Iterator<Item = &Product> {
        self.products
            .iter()
            .filter(move |p| p.producer_id == producer_id)
    }

    /// Joins every product to its producer.
    ///
    /// Products whose producer cannot be resolved are skipped; validation
    /// rejects such datasets before they reach callers.
    #[must_use]
    pub fn listings(&self) -> Vec<ProductListing<'_>> {
        self.products
            .iter()
            .filter_map(|product| {
                self.producer(product.producer_id)
                    .map(|producer| ProductListing { product, producer })
            })
            .collect()
    }

    /// Returns the listing of one product.
    #[must_use]
    pub fn listing(&self, product_id: u32) -> Option<ProductListing<'_>> {
        let product = self.product(product_id)?;
        let producer = self.producer(product.producer_id)?;
        Some(ProductListing { product, producer })
    }
}

/// A product joined to the producer that grows it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductListing<'a> {
    /// Product row.
    pub product: &'a Product,
    /// Producer row.
    pub producer: &'a Producer,
}

impl ProductListing<'_> {
    /// Flattens the listing into a view row for `month`.
    #[must_use]
    pub fn row(&self, month: Month) -> ListingRow {
        ListingRow {
            product_id: self.product.id,
            name: self.product.name.clone(),
            category: self.product.category.label().to_owned(),
            unit_price: self.product.unit_price,
            unit: self.product.unit.clone(),
            season: self.product.season.to_string(),
            in_season: self.product.is_in_season(month),
            producer: self.producer.name.clone(),
            certification: self.producer.certification.label().to_owned(),
            distance_miles: self.producer.distance_miles,
        }
    }
}

/// Flat, serialisable product view including the derived `in_season` column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingRow {
    /// Product identifier.
    pub product_id: u32,
    /// Product name.
    pub name: String,
    /// Category label.
    pub category: String,
    /// Unit price.
    pub unit_price: f64,
    /// Unit of measure.
    pub unit: String,
    /// Season tag.
    pub season: String,
    /// Whether the product is in season for the view's month.
    pub in_season: bool,
    /// Producer name.
    pub producer: String,
    /// Producer certification label.
    pub certification: String,
    /// Producer distance in miles.
    pub distance_miles: f64,
}
