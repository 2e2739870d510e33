//! Dataset invariant checks.
//!
//! Generated and loaded datasets pass through [`validate_dataset`] before
//! they are handed to callers, so downstream code can rely on resolved
//! foreign keys and consistent derived columns.

use std::collections::HashSet;

use crate::dataset::Dataset;
use crate::error::ValidationError;
use crate::model::{Certification, MarketRecord};

/// Tolerance for comparing derived floating-point columns.
const EPSILON: f64 = 1e-9;

/// Top of the nutrition score scale.
const MAX_NUTRITION_SCORE: u8 = 100;

/// Checks every table invariant of a dataset.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
///
/// # Example
///
/// ```
/// use farm_data::{Dataset, validate_dataset};
///
/// assert!(validate_dataset(&Dataset::default()).is_ok());
/// ```
pub fn validate_dataset(dataset: &Dataset) -> Result<(), ValidationError> {
    validate_producers(dataset)?;
    validate_products(dataset)?;
    validate_market(dataset)?;
    validate_carbon(dataset)
}

fn validate_producers(dataset: &Dataset) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for producer in &dataset.producers {
        if !seen.insert(producer.id) {
            return Err(ValidationError::DuplicateId {
                table: "producers",
                id: producer.id,
            });
        }
        if !producer.distance_miles.is_finite() || producer.distance_miles < 0.0 {
            return Err(ValidationError::InvalidDistance {
                producer_id: producer.id,
                distance: producer.distance_miles,
            });
        }
    }
    Ok(())
}

fn validate_products(dataset: &Dataset) -> Result<(), ValidationError> {
    let producer_ids: HashSet<u32> = dataset.producers.iter().map(|p| p.id).collect();
    let mut seen = HashSet::new();
    for product in &dataset.products {
        if !seen.insert(product.id) {
            return Err(ValidationError::DuplicateId {
                table: "products",
                id: product.id,
            });
        }
        // NaN prices fail this check as well.
        if !(product.unit_price > 0.0) {
            return Err(ValidationError::NonPositivePrice {
                product_id: product.id,
                price: product.unit_price,
            });
        }
        if let Some(score) = product
            .nutrition_score
            .filter(|score| *score > MAX_NUTRITION_SCORE)
        {
            return Err(ValidationError::NutritionScoreOutOfRange {
                product_id: product.id,
                score,
                max: MAX_NUTRITION_SCORE,
            });
        }
        if !producer_ids.contains(&product.producer_id) {
            return Err(ValidationError::UnknownProducer {
                table: "products",
                producer_id: product.producer_id,
            });
        }
    }
    Ok(())
}

fn validate_market(dataset: &Dataset) -> Result<(), ValidationError> {
    let product_ids: HashSet<u32> = dataset.products.iter().map(|p| p.id).collect();
    for record in &dataset.market {
        if !product_ids.contains(&record.product_id()) {
            return Err(ValidationError::UnknownProduct {
                product_id: record.product_id(),
            });
        }
        let expected = MarketRecord::expected_revenue(record.price(), record.volume());
        if (record.revenue() - expected).abs() > EPSILON {
            return Err(ValidationError::RevenueMismatch {
                product_id: record.product_id(),
                date: record.date().to_string(),
                actual: record.revenue(),
                expected,
            });
        }
    }
    Ok(())
}

fn validate_carbon(dataset: &Dataset) -> Result<(), ValidationError> {
    for record in &dataset.carbon {
        let producer_id = record.producer_id();
        let Some(producer) = dataset.producer(producer_id) else {
            return Err(ValidationError::UnknownProducer {
                table: "carbon",
                producer_id,
            });
        };
        let total = record.transport_emissions() + record.farming_emissions();
        let net = record.total_emissions() - record.carbon_sequestration();
        if (record.total_emissions() - total).abs() > EPSILON
            || (record.net_impact() - net).abs() > EPSILON
        {
            return Err(ValidationError::CarbonTotals { producer_id });
        }
        if producer.certification != Certification::Regenerative
            && record.carbon_sequestration() != 0.0
        {
            return Err(ValidationError::UnexpectedSequestration { producer_id });
        }
    }
    Ok(())
}
