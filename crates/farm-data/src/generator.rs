//! Deterministic marketplace activity generation.
//!
//! Market, customer and carbon tables are derived from the catalogue with a
//! seeded ChaCha RNG. Each table draws from its own stream so adding rows to
//! one table never shifts the values of another. The same seed always
//! produces identical tables.

use std::f64::consts::TAU;
use std::ops::Range;

use chrono::{Datelike, Days, Months, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::catalogue;
use crate::dataset::Dataset;
use crate::error::GenerationError;
use crate::model::{
    CarbonRecord, Certification, CustomerRecord, CustomerType, DistanceBracket, MarketRecord,
    Producer, Product, ProductCategory, round_cents,
};
use crate::validation::validate_dataset;

/// RNG stream for market prices and volumes.
const MARKET_STREAM: u64 = 1;

/// RNG stream for customer segments.
const CUSTOMER_STREAM: u64 = 2;

/// RNG stream for carbon estimates.
const CARBON_STREAM: u64 = 3;

/// Peak fractional price swing across the year.
const SEASONAL_AMPLITUDE: f64 = 0.15;

/// Fractional price growth per elapsed year.
const TREND_PER_YEAR: f64 = 0.03;

/// Bound of the uniform weekly price jitter.
const PRICE_NOISE: f64 = 0.05;

/// Days per year used to express elapsed time in years.
const DAYS_PER_YEAR: f64 = 365.25;

/// Smallest weekly volume.
const MIN_VOLUME: u32 = 20;

/// Largest weekly volume.
const MAX_VOLUME: u32 = 200;

/// Peak fractional swing in customer counts across the year.
const CUSTOMER_SEASONAL_AMPLITUDE: f64 = 0.25;

/// Multiplicative jitter applied to customer counts.
const CUSTOMER_JITTER: Range<f64> = 0.85..1.15;

/// Tonnes CO2e per mile of distance to market.
pub const TRANSPORT_FACTOR: f64 = 0.12;

/// Sequestration drawn for regenerative producers, in tonnes CO2e.
const SEQUESTRATION_RANGE: Range<f64> = 1.5..4.5;

/// Date window covered by market and customer activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl ActivityWindow {
    /// Creates a window covering `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::DateRange`] when `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, GenerationError> {
        if end < start {
            return Err(GenerationError::DateRange {
                message: format!("end {end} precedes start {start}"),
            });
        }
        Ok(Self { start, end })
    }

    /// First week of the window.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    fn weeks(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        std::iter::successors(Some(self.start), |date| date.checked_add_days(Days::new(7)))
            .take_while(|date| *date <= self.end)
    }

    fn months(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        let first = self.start.with_day(1);
        std::iter::successors(first, |date| date.checked_add_months(Months::new(1)))
            .take_while(|date| *date <= self.end)
    }
}

impl Default for ActivityWindow {
    /// Mondays from 2023-01-02 through 2024-12-30.
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 12, 30).unwrap_or_default(),
        }
    }
}

/// Inputs for a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationOptions {
    seed: u64,
    window: ActivityWindow,
}

impl GenerationOptions {
    /// Options for `seed` over the default activity window.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            window: ActivityWindow::default(),
        }
    }

    /// Replaces the activity window.
    #[must_use]
    pub const fn with_window(mut self, window: ActivityWindow) -> Self {
        self.window = window;
        self
    }

    /// RNG seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Activity window.
    #[must_use]
    pub const fn window(&self) -> ActivityWindow {
        self.window
    }
}

/// Market, customer and carbon tables generated together.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityTables {
    /// Weekly market records.
    pub market: Vec<MarketRecord>,
    /// Monthly customer segments.
    pub customers: Vec<CustomerRecord>,
    /// Carbon estimates per producer.
    pub carbon: Vec<CarbonRecord>,
}

/// Draws a fresh seed for runs that want new activity every start.
#[must_use]
pub fn random_seed() -> u64 {
    rand::rng().random()
}

/// Generates the full dataset: catalogue plus activity tables.
///
/// # Errors
///
/// Returns [`GenerationError`] if the catalogue fails to build or the
/// result fails validation.
///
/// # Example
///
/// ```
/// use farm_data::{GenerationOptions, generate_dataset};
///
/// let first = generate_dataset(&GenerationOptions::new(42)).expect("generated");
/// let second = generate_dataset(&GenerationOptions::new(42)).expect("generated");
/// assert_eq!(first, second);
/// assert_eq!(first.carbon.len(), first.producers.len());
/// ```
pub fn generate_dataset(options: &GenerationOptions) -> Result<Dataset, GenerationError> {
    let producers = catalogue::producers()?;
    let products = catalogue::products()?;
    let activity = generate_activity(&producers, &products, options);
    let dataset = Dataset {
        producers,
        products,
        market: activity.market,
        customers: activity.customers,
        carbon: activity.carbon,
    };
    validate_dataset(&dataset)?;
    Ok(dataset)
}

/// Generates the activity tables for an existing catalogue.
#[must_use]
pub fn generate_activity(
    producers: &[Producer],
    products: &[Product],
    options: &GenerationOptions,
) -> ActivityTables {
    ActivityTables {
        market: generate_market(products, options),
        customers: generate_customers(options),
        carbon: generate_carbon(producers, options.seed),
    }
}

/// Generates one record per product per week of the window.
///
/// `price = base * (1 + seasonal + trend + noise)`, rounded to cents, where
/// the seasonal term is a sinusoid of the month and the trend grows with
/// elapsed years.
#[must_use]
pub fn generate_market(products: &[Product], options: &GenerationOptions) -> Vec<MarketRecord> {
    let mut rng = table_rng(options.seed, MARKET_STREAM);
    let window = options.window;
    let mut records = Vec::new();

    for product in products {
        for date in window.weeks() {
            let seasonal = SEASONAL_AMPLITUDE * month_phase(date.month0()).sin();
            let elapsed_days = (date - window.start).num_days();
            #[expect(
                clippy::cast_precision_loss,
                reason = "the window spans a few hundred days"
            )]
            let trend = TREND_PER_YEAR * (elapsed_days as f64 / DAYS_PER_YEAR);
            let noise = rng.random_range(-PRICE_NOISE..PRICE_NOISE);
            let price = round_cents(product.unit_price * (1.0 + seasonal + trend + noise));
            let volume = rng.random_range(MIN_VOLUME..=MAX_VOLUME);
            records.push(MarketRecord::new(date, product.id, price, volume));
        }
    }

    records
}

/// Generates one record per month, customer type and distance bracket.
#[must_use]
pub fn generate_customers(options: &GenerationOptions) -> Vec<CustomerRecord> {
    let mut rng = table_rng(options.seed, CUSTOMER_STREAM);
    let mut records = Vec::new();

    for month in options.window.months() {
        // Peaks in June, troughs in December.
        let seasonal =
            1.0 + CUSTOMER_SEASONAL_AMPLITUDE * month_phase(month.month0() + 10).sin();
        for customer_type in CustomerType::ALL {
            for bracket in DistanceBracket::ALL {
                let jitter = rng.random_range(CUSTOMER_JITTER);
                let raw = bracket_base(bracket)
                    * seasonal
                    * type_multiplier(customer_type)
                    * jitter;
                #[expect(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    reason = "raw is positive and stays below a few hundred"
                )]
                let customer_count = (raw.round() as u32).max(1);
                let spend = rng.random_range(spend_range(customer_type));
                records.push(CustomerRecord {
                    month,
                    customer_type,
                    distance_bracket: bracket,
                    customer_count,
                    revenue: round_cents(f64::from(customer_count) * spend),
                });
            }
        }
    }

    records
}

/// Generates one carbon estimate per producer.
///
/// Transport emissions scale with distance; farming emissions are drawn from
/// a certification-dependent range and scaled by the producer's main
/// category. Only regenerative producers sequester carbon.
#[must_use]
pub fn generate_carbon(producers: &[Producer], seed: u64) -> Vec<CarbonRecord> {
    let mut rng = table_rng(seed, CARBON_STREAM);
    producers
        .iter()
        .map(|producer| {
            let transport = producer.distance_miles * TRANSPORT_FACTOR;
            let base = rng.random_range(farming_range(producer.certification));
            let farming = round_cents(base * category_multiplier(producer.categories.primary()));
            let sequestration = if producer.certification == Certification::Regenerative {
                round_cents(rng.random_range(SEQUESTRATION_RANGE))
            } else {
                0.0
            };
            CarbonRecord::new(producer.id, transport, farming, sequestration)
        })
        .collect()
}

fn table_rng(seed: u64, stream: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(stream);
    rng
}

/// Angle of a zero-based month on the yearly cycle.
fn month_phase(month0: u32) -> f64 {
    TAU * f64::from(month0 % 12) / 12.0
}

const fn bracket_base(bracket: DistanceBracket) -> f64 {
    match bracket {
        DistanceBracket::Within10 => 120.0,
        DistanceBracket::Within25 => 90.0,
        DistanceBracket::Within50 => 60.0,
        DistanceBracket::Beyond50 => 30.0,
    }
}

const fn type_multiplier(customer_type: CustomerType) -> f64 {
    match customer_type {
        CustomerType::Individual => 1.0,
        CustomerType::Restaurant => 0.25,
        CustomerType::Retailer => 0.15,
        CustomerType::FoodService => 0.10,
    }
}

const fn spend_range(customer_type: CustomerType) -> Range<f64> {
    match customer_type {
        CustomerType::Individual => 25.0..60.0,
        CustomerType::Restaurant => 250.0..600.0,
        CustomerType::Retailer => 400.0..1200.0,
        CustomerType::FoodService => 300.0..900.0,
    }
}

const fn farming_range(certification: Certification) -> Range<f64> {
    match certification {
        Certification::Organic => 2.0..4.0,
        Certification::Regenerative => 1.0..2.5,
        Certification::Conventional => 4.0..7.0,
    }
}

const fn category_multiplier(category: ProductCategory) -> f64 {
    match category {
        ProductCategory::Meat => 2.5,
        ProductCategory::Dairy => 1.8,
        ProductCategory::Eggs => 1.3,
        ProductCategory::Grains => 1.1,
        ProductCategory::Vegetables | ProductCategory::Fruits => 1.0,
        ProductCategory::Honey => 0.6,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn dataset() -> Dataset {
        generate_dataset(&GenerationOptions::new(42)).expect("generation succeeds")
    }

    #[rstest]
    fn market_revenue_is_rounded_price_times_volume(dataset: Dataset) {
        for record in &dataset.market {
            assert_eq!(
                record.revenue(),
                round_cents(record.price() * f64::from(record.volume()))
            );
        }
    }

    #[rstest]
    fn carbon_totals_are_consistent(dataset: Dataset) {
        for record in &dataset.carbon {
            assert_eq!(
                record.total_emissions(),
                record.transport_emissions() + record.farming_emissions()
            );
            assert_eq!(
                record.net_impact(),
                record.total_emissions() - record.carbon_sequestration()
            );
        }
    }

    #[rstest]
    fn only_regenerative_producers_sequester(dataset: Dataset) {
        for record in &dataset.carbon {
            let producer = dataset
                .producer(record.producer_id())
                .expect("carbon producer exists");
            if producer.certification == Certification::Regenerative {
                assert!(record.carbon_sequestration() > 0.0);
            } else {
                assert_eq!(record.carbon_sequestration(), 0.0);
            }
        }
    }

    #[rstest]
    fn transport_scales_with_distance(dataset: Dataset) {
        for record in &dataset.carbon {
            let producer = dataset
                .producer(record.producer_id())
                .expect("carbon producer exists");
            assert_eq!(
                record.transport_emissions(),
                producer.distance_miles * TRANSPORT_FACTOR
            );
        }
    }

    #[rstest]
    fn market_covers_every_product_every_week(dataset: Dataset) {
        let weeks = ActivityWindow::default().weeks().count();
        assert_eq!(weeks, 105);
        assert_eq!(dataset.market.len(), dataset.products.len() * weeks);
    }

    #[rstest]
    fn market_values_stay_in_bounds(dataset: Dataset) {
        for record in &dataset.market {
            assert!((MIN_VOLUME..=MAX_VOLUME).contains(&record.volume()));
            assert!(record.price() > 0.0);
        }
    }

    #[rstest]
    fn customers_cover_every_segment(dataset: Dataset) {
        let months = ActivityWindow::default().months().count();
        assert_eq!(months, 24);
        assert_eq!(
            dataset.customers.len(),
            months * CustomerType::ALL.len() * DistanceBracket::ALL.len()
        );
        assert!(dataset.customers.iter().all(|c| c.customer_count >= 1));
        let distinct_months: HashSet<_> = dataset.customers.iter().map(|c| c.month).collect();
        assert_eq!(distinct_months.len(), months);
    }

    #[rstest]
    fn customer_counts_stay_within_the_seasonal_ceiling(dataset: Dataset) {
        // Largest bracket base, peak season and top jitter: 120 x 1.25 x 1.15.
        let ceiling = 173;
        for record in &dataset.customers {
            assert!(
                (1..=ceiling).contains(&record.customer_count),
                "{record:?}"
            );
        }
    }

    #[test]
    fn different_seeds_produce_different_activity() {
        let first = generate_dataset(&GenerationOptions::new(1)).expect("generated");
        let second = generate_dataset(&GenerationOptions::new(2)).expect("generated");
        assert_eq!(first.producers, second.producers);
        assert_ne!(first.market, second.market);
    }

    #[test]
    fn rejects_inverted_window() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).expect("valid date");
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        assert!(matches!(
            ActivityWindow::new(start, end),
            Err(GenerationError::DateRange { .. })
        ));
    }

    #[test]
    fn short_window_limits_rows() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 3).expect("valid date");
        let end = NaiveDate::from_ymd_opt(2024, 6, 30).expect("valid date");
        let window = ActivityWindow::new(start, end).expect("valid window");
        let options = GenerationOptions::new(7).with_window(window);
        let products = catalogue::products().expect("catalogue products");
        let market = generate_market(&products, &options);
        assert_eq!(market.len(), products.len() * 4);
        assert_eq!(generate_customers(&options).len(), 16);
    }
}
