//! Error types for the farm-data crate.
//!
//! Each concern gets its own `thiserror` enum: field parsing, dataset
//! validation, generation, flat-file storage and filter settings.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while parsing a single cell into a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldParseError {
    /// The text does not name a known variant.
    #[error("unknown {kind} '{value}'")]
    UnknownVariant {
        /// Kind of value being parsed.
        kind: &'static str,
        /// Rejected text.
        value: String,
    },

    /// A list column contained no entries.
    #[error("{kind} must not be empty")]
    EmptyList {
        /// Kind of list being parsed.
        kind: &'static str,
    },
}

/// Invariant violations detected in a dataset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Two rows of a table share an identifier.
    #[error("duplicate {table} id {id}")]
    DuplicateId {
        /// Table holding the duplicate.
        table: &'static str,
        /// Repeated identifier.
        id: u32,
    },

    /// A producer distance is negative or not finite.
    #[error("producer {producer_id} has invalid distance {distance}")]
    InvalidDistance {
        /// Offending producer.
        producer_id: u32,
        /// Rejected distance.
        distance: f64,
    },

    /// A product price is not strictly positive.
    #[error("product {product_id} has non-positive price {price}")]
    NonPositivePrice {
        /// Offending product.
        product_id: u32,
        /// Rejected price.
        price: f64,
    },

    /// A product's nutrition score is above the 0-100 scale.
    #[error("product {product_id} has nutrition score {score}, expected at most {max}")]
    NutritionScoreOutOfRange {
        /// Offending product.
        product_id: u32,
        /// Rejected score.
        score: u8,
        /// Highest accepted score.
        max: u8,
    },

    /// A row references a producer that does not exist.
    #[error("{table} row references unknown producer {producer_id}")]
    UnknownProducer {
        /// Table holding the dangling reference.
        table: &'static str,
        /// Missing producer identifier.
        producer_id: u32,
    },

    /// A market record references a product that does not exist.
    #[error("market record references unknown product {product_id}")]
    UnknownProduct {
        /// Missing product identifier.
        product_id: u32,
    },

    /// A market record's revenue disagrees with its price and volume.
    #[error("market record for product {product_id} on {date} has revenue {actual}, expected {expected}")]
    RevenueMismatch {
        /// Product of the record.
        product_id: u32,
        /// Week of the record.
        date: String,
        /// Stored revenue.
        actual: f64,
        /// Revenue implied by price and volume.
        expected: f64,
    },

    /// A carbon record's totals disagree with its components.
    #[error("carbon record for producer {producer_id} has inconsistent totals")]
    CarbonTotals {
        /// Producer of the record.
        producer_id: u32,
    },

    /// A non-regenerative producer reports sequestration.
    #[error("producer {producer_id} is not regenerative but reports sequestration")]
    UnexpectedSequestration {
        /// Producer of the record.
        producer_id: u32,
    },
}

/// Errors that can occur while generating a dataset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    /// The built-in catalogue failed to parse.
    #[error("catalogue entry is invalid: {0}")]
    Catalogue(#[from] FieldParseError),

    /// The generated tables break an invariant.
    #[error("generated dataset is invalid: {0}")]
    Invalid(#[from] ValidationError),

    /// The configured date range is empty or unrepresentable.
    #[error("invalid generation date range: {message}")]
    DateRange {
        /// Description of the problem.
        message: String,
    },
}

/// Errors raised by the flat-file data store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The data directory could not be opened or created.
    #[error("failed to open data directory '{path}': {message}")]
    OpenDir {
        /// Directory path.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// A store file is absent.
    #[error("store file '{path}' is missing")]
    Missing {
        /// File path relative to the data directory.
        path: Utf8PathBuf,
    },

    /// A store file could not be read.
    #[error("failed to read store file '{path}': {message}")]
    ReadError {
        /// File path relative to the data directory.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// A store file could not be written.
    #[error("failed to write store file '{path}': {message}")]
    WriteError {
        /// File path relative to the data directory.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// A store file is not valid CSV or JSON for its table.
    #[error("store file '{path}' is malformed: {message}")]
    Malformed {
        /// File path relative to the data directory.
        path: Utf8PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// The manifest names a layout version this build cannot read.
    #[error("unsupported store version: expected {expected}, found {actual}")]
    UnsupportedVersion {
        /// Supported version.
        expected: u32,
        /// Version found on disk.
        actual: u32,
    },

    /// Loaded tables break an invariant.
    #[error("stored dataset is invalid: {0}")]
    Invalid(#[from] ValidationError),
}

/// Errors raised when building filter settings from user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// The maximum distance is outside the supported range.
    #[error("maximum distance must be between {min} and {max} miles, got {value}")]
    DistanceOutOfRange {
        /// Smallest accepted value.
        min: u32,
        /// Largest accepted value.
        max: u32,
        /// Rejected value.
        value: u32,
    },

    /// The maximum distance is not a multiple of the slider step.
    #[error("maximum distance must be a multiple of {step} miles, got {value}")]
    DistanceOffStep {
        /// Slider step.
        step: u32,
        /// Rejected value.
        value: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_parse_error_formats_correctly() {
        let err = FieldParseError::UnknownVariant {
            kind: "season",
            value: "Monsoon".to_owned(),
        };
        assert_eq!(err.to_string(), "unknown season 'Monsoon'");
    }

    #[test]
    fn validation_error_unknown_producer_formats_correctly() {
        let err = ValidationError::UnknownProducer {
            table: "products",
            producer_id: 99,
        };
        assert_eq!(
            err.to_string(),
            "products row references unknown producer 99"
        );
    }

    #[test]
    fn store_error_version_formats_correctly() {
        let err = StoreError::UnsupportedVersion {
            expected: 1,
            actual: 7,
        };
        assert_eq!(
            err.to_string(),
            "unsupported store version: expected 1, found 7"
        );
    }

    #[test]
    fn store_error_missing_formats_correctly() {
        let err = StoreError::Missing {
            path: Utf8PathBuf::from("producers.csv"),
        };
        assert_eq!(err.to_string(), "store file 'producers.csv' is missing");
    }

    #[test]
    fn filter_error_range_formats_correctly() {
        let err = FilterError::DistanceOutOfRange {
            min: 5,
            max: 100,
            value: 150,
        };
        assert_eq!(
            err.to_string(),
            "maximum distance must be between 5 and 100 miles, got 150"
        );
    }

    #[test]
    fn generation_error_wraps_validation() {
        let err = GenerationError::from(ValidationError::UnknownProduct { product_id: 4 });
        assert_eq!(
            err.to_string(),
            "generated dataset is invalid: market record references unknown product 4"
        );
    }
}
