//! Deterministic farm-to-table marketplace data.
//!
//! This crate owns everything below the dashboard's HTTP layer: the table
//! row types, a seeded generator for a believable regional marketplace, a
//! flat-file store with atomic writes, the filter layer and the aggregate
//! helpers the pages chart. It performs no logging; callers receive
//! warnings in [`LoadOutcome`] and decide how to report them.
//!
//! # Example
//!
//! ```
//! use chrono::Month;
//! use farm_data::{FilterSettings, GenerationOptions, filter_listings, generate_dataset};
//!
//! let dataset = generate_dataset(&GenerationOptions::new(42)).expect("generation succeeds");
//! let settings = FilterSettings {
//!     sustainable_only: true,
//!     ..FilterSettings::default()
//! };
//!
//! let listings = filter_listings(&dataset, &settings, Month::July);
//! assert!(listings.iter().all(|listing| listing.producer.is_sustainable()));
//! ```

pub mod analytics;
mod atomic_io;
mod catalogue;
mod dataset;
mod error;
pub mod filter;
mod generator;
mod model;
pub mod seed_cli;
mod store;
mod validation;

pub use dataset::{Dataset, ListingRow, ProductListing};
pub use error::{FieldParseError, FilterError, GenerationError, StoreError, ValidationError};
pub use filter::{
    Criterion, FilterSettings, Filterable, MaxDistance, filter_listings, filter_market,
    filter_producers, filter_rows,
};
pub use generator::{
    ActivityTables, ActivityWindow, GenerationOptions, TRANSPORT_FACTOR, generate_activity,
    generate_carbon, generate_customers, generate_dataset, generate_market, random_seed,
};
pub use model::{
    CarbonRecord, CategoryList, Certification, CustomerRecord, CustomerType, DistanceBracket,
    LIST_SEPARATOR, MarketRecord, Producer, Product, ProductCategory, Season, SeasonTag,
    month_of, round_cents,
};
pub use store::{
    ActivityPolicy, DataSource, DataStore, LoadOutcome, Manifest, STORE_VERSION, StoreOptions,
    load_or_generate,
};
pub use validation::validate_dataset;
