//! Row types for the marketplace tables.
//!
//! Every table is a plain `Vec` of one of these rows. Derived columns
//! (market revenue, carbon totals) are computed by constructors and exposed
//! read-only so a row can never disagree with its own inputs.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::FieldParseError;

/// Separator used when a list column is flattened into a single CSV cell.
pub const LIST_SEPARATOR: char = ';';

/// Rounds a monetary value to whole cents.
///
/// # Example
///
/// ```
/// use farm_data::round_cents;
///
/// assert_eq!(round_cents(2.345_1), 2.35);
/// assert_eq!(round_cents(10.0), 10.0);
/// ```
#[must_use]
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Farming practice certification of a producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Certification {
    /// Certified organic.
    Organic,
    /// Regenerative agriculture; the only practice that sequesters carbon.
    Regenerative,
    /// Conventional farming.
    Conventional,
}

impl Certification {
    /// All certifications in display order.
    pub const ALL: [Self; 3] = [Self::Organic, Self::Regenerative, Self::Conventional];

    /// Returns `true` for the practices counted as sustainable.
    #[must_use]
    pub const fn is_sustainable(self) -> bool {
        matches!(self, Self::Organic | Self::Regenerative)
    }

    /// Returns the display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Organic => "Organic",
            Self::Regenerative => "Regenerative",
            Self::Conventional => "Conventional",
        }
    }
}

impl fmt::Display for Certification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Product category offered by producers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProductCategory {
    /// Fresh vegetables.
    Vegetables,
    /// Fresh fruit.
    Fruits,
    /// Milk, cheese and yoghurt.
    Dairy,
    /// Meat and poultry.
    Meat,
    /// Eggs.
    Eggs,
    /// Grains and flour.
    Grains,
    /// Honey and hive products.
    Honey,
}

impl ProductCategory {
    /// All categories in display order.
    pub const ALL: [Self; 7] = [
        Self::Vegetables,
        Self::Fruits,
        Self::Dairy,
        Self::Meat,
        Self::Eggs,
        Self::Grains,
        Self::Honey,
    ];

    /// Returns the display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Vegetables => "Vegetables",
            Self::Fruits => "Fruits",
            Self::Dairy => "Dairy",
            Self::Meat => "Meat",
            Self::Eggs => "Eggs",
            Self::Grains => "Grains",
            Self::Honey => "Honey",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProductCategory {
    type Err = FieldParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.label() == s.trim())
            .ok_or_else(|| FieldParseError::UnknownVariant {
                kind: "product category",
                value: s.to_owned(),
            })
    }
}

/// Non-empty list of categories, stored as a `;`-joined cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryList(Vec<ProductCategory>);

impl CategoryList {
    /// Builds a list from at least one category.
    ///
    /// # Errors
    ///
    /// Returns [`FieldParseError::EmptyList`] when `categories` is empty.
    pub fn new(categories: Vec<ProductCategory>) -> Result<Self, FieldParseError> {
        if categories.is_empty() {
            return Err(FieldParseError::EmptyList {
                kind: "product categories",
            });
        }
        Ok(Self(categories))
    }

    /// Returns the first listed category, treated as the producer's main line.
    #[must_use]
    pub fn primary(&self) -> ProductCategory {
        // Construction guarantees at least one entry.
        self.0.first().copied().unwrap_or(ProductCategory::Vegetables)
    }

    /// Returns the categories as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[ProductCategory] {
        &self.0
    }
}

impl fmt::Display for CategoryList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.0.iter().map(|c| c.label()).collect();
        f.write_str(&labels.join(&LIST_SEPARATOR.to_string()))
    }
}

impl TryFrom<String> for CategoryList {
    type Error = FieldParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let categories = value
            .split(LIST_SEPARATOR)
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(categories)
    }
}

impl From<CategoryList> for String {
    fn from(value: CategoryList) -> Self {
        value.to_string()
    }
}

/// Growing season of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    /// March to May.
    Spring,
    /// June to August.
    Summer,
    /// September to November.
    Fall,
    /// December to February.
    Winter,
    /// Available every month.
    YearRound,
}

impl Season {
    const ALL: [Self; 5] = [
        Self::Spring,
        Self::Summer,
        Self::Fall,
        Self::Winter,
        Self::YearRound,
    ];

    /// Returns the display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
            Self::Winter => "Winter",
            Self::YearRound => "Year-round",
        }
    }

    /// Returns `true` when `month` falls inside this season.
    #[must_use]
    pub fn contains(self, month: Month) -> bool {
        use Month::{
            April, August, December, February, January, July, June, March, May, November,
            October, September,
        };
        match self {
            Self::Spring => matches!(month, March | April | May),
            Self::Summer => matches!(month, June | July | August),
            Self::Fall => matches!(month, September | October | November),
            Self::Winter => matches!(month, December | January | February),
            Self::YearRound => true,
        }
    }
}

impl FromStr for Season {
    type Err = FieldParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|season| season.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| FieldParseError::UnknownVariant {
                kind: "season",
                value: s.to_owned(),
            })
    }
}

/// Season tag of a product: a single season, a composite such as
/// `Summer/Fall`, or `Year-round`.
///
/// # Example
///
/// ```
/// use chrono::Month;
/// use farm_data::SeasonTag;
///
/// let tag: SeasonTag = "Summer/Fall".parse().expect("valid tag");
/// assert!(tag.includes(Month::July));
/// assert!(tag.includes(Month::October));
/// assert!(!tag.includes(Month::January));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeasonTag(Vec<Season>);

impl SeasonTag {
    /// Separator between seasons in a composite tag.
    pub const SEPARATOR: char = '/';

    /// Tag for a single season.
    #[must_use]
    pub fn single(season: Season) -> Self {
        Self(vec![season])
    }

    /// Returns `true` when any season in the tag contains `month`.
    #[must_use]
    pub fn includes(&self, month: Month) -> bool {
        self.0.iter().any(|season| season.contains(month))
    }

    /// Returns the seasons making up the tag.
    #[must_use]
    pub fn seasons(&self) -> &[Season] {
        &self.0
    }
}

impl fmt::Display for SeasonTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.0.iter().map(|s| s.label()).collect();
        f.write_str(&labels.join(&Self::SEPARATOR.to_string()))
    }
}

impl FromStr for SeasonTag {
    type Err = FieldParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let seasons = s
            .split(Self::SEPARATOR)
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Season>, _>>()?;
        if seasons.is_empty() {
            return Err(FieldParseError::EmptyList { kind: "season tag" });
        }
        Ok(Self(seasons))
    }
}

impl TryFrom<String> for SeasonTag {
    type Error = FieldParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeasonTag> for String {
    fn from(value: SeasonTag) -> Self {
        value.to_string()
    }
}

/// A farm or ranch selling through the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    /// Producer identifier.
    pub id: u32,
    /// Farm name.
    pub name: String,
    /// Town and state.
    pub location: String,
    /// Broader growing region.
    pub region: String,
    /// Product categories offered, main line first.
    pub categories: CategoryList,
    /// Farming certification.
    pub certification: Certification,
    /// Distance from the consumer hub in miles.
    pub distance_miles: f64,
    /// Latitude, when geocoded.
    pub latitude: Option<f64>,
    /// Longitude, when geocoded.
    pub longitude: Option<f64>,
    /// Year the farm was founded.
    pub founded_year: u16,
    /// Number of employees.
    pub employees: u32,
    /// Free-text description.
    pub description: String,
}

impl Producer {
    /// Returns `true` when the producer's certification counts as sustainable.
    #[must_use]
    pub const fn is_sustainable(&self) -> bool {
        self.certification.is_sustainable()
    }

    /// Returns the coordinates when both are present.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

/// A product sold by one producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier.
    pub id: u32,
    /// Product name.
    pub name: String,
    /// Category.
    pub category: ProductCategory,
    /// Base unit price in dollars.
    pub unit_price: f64,
    /// Unit of measure, such as `lb` or `dozen`.
    pub unit: String,
    /// Season tag.
    pub season: SeasonTag,
    /// Identifier of the producing [`Producer`].
    pub producer_id: u32,
    /// Optional nutrition score from 0 to 100.
    pub nutrition_score: Option<u8>,
}

impl Product {
    /// Returns `true` when the product is in season during `month`.
    #[must_use]
    pub fn is_in_season(&self, month: Month) -> bool {
        self.season.includes(month)
    }
}

/// Weekly market activity for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    date: NaiveDate,
    product_id: u32,
    volume: u32,
    price: f64,
    revenue: f64,
}

impl MarketRecord {
    /// Creates a record, deriving revenue as `round(price * volume, 2)`.
    #[must_use]
    pub fn new(date: NaiveDate, product_id: u32, price: f64, volume: u32) -> Self {
        Self {
            date,
            product_id,
            volume,
            price,
            revenue: Self::expected_revenue(price, volume),
        }
    }

    /// Revenue implied by a price and volume.
    #[must_use]
    pub fn expected_revenue(price: f64, volume: u32) -> f64 {
        round_cents(price * f64::from(volume))
    }

    /// Week start date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Calendar month of the record.
    #[must_use]
    pub fn month(&self) -> Month {
        month_of(self.date)
    }

    /// Product sold.
    #[must_use]
    pub const fn product_id(&self) -> u32 {
        self.product_id
    }

    /// Units sold.
    #[must_use]
    pub const fn volume(&self) -> u32 {
        self.volume
    }

    /// Unit price that week.
    #[must_use]
    pub const fn price(&self) -> f64 {
        self.price
    }

    /// Revenue for the week.
    #[must_use]
    pub const fn revenue(&self) -> f64 {
        self.revenue
    }
}

/// Type of marketplace customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CustomerType {
    /// Household shoppers.
    Individual,
    /// Restaurants.
    Restaurant,
    /// Grocery retailers.
    Retailer,
    /// Institutional food service.
    #[serde(rename = "Food Service")]
    FoodService,
}

impl CustomerType {
    /// All customer types in display order.
    pub const ALL: [Self; 4] = [
        Self::Individual,
        Self::Restaurant,
        Self::Retailer,
        Self::FoodService,
    ];

    /// Returns the display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::Restaurant => "Restaurant",
            Self::Retailer => "Retailer",
            Self::FoodService => "Food Service",
        }
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Distance band between customer and producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DistanceBracket {
    /// Up to 10 miles.
    #[serde(rename = "0-10 miles")]
    Within10,
    /// 10 to 25 miles.
    #[serde(rename = "10-25 miles")]
    Within25,
    /// 25 to 50 miles.
    #[serde(rename = "25-50 miles")]
    Within50,
    /// Beyond 50 miles.
    #[serde(rename = "50+ miles")]
    Beyond50,
}

impl DistanceBracket {
    /// All brackets, nearest first.
    pub const ALL: [Self; 4] = [Self::Within10, Self::Within25, Self::Within50, Self::Beyond50];

    /// Returns the display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Within10 => "0-10 miles",
            Self::Within25 => "10-25 miles",
            Self::Within50 => "25-50 miles",
            Self::Beyond50 => "50+ miles",
        }
    }
}

/// Monthly customer activity for one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// First day of the month.
    pub month: NaiveDate,
    /// Customer type.
    pub customer_type: CustomerType,
    /// Distance band.
    pub distance_bracket: DistanceBracket,
    /// Number of active customers.
    pub customer_count: u32,
    /// Revenue from the segment in dollars.
    pub revenue: f64,
}

/// Annual carbon estimate for one producer, in tonnes CO2e.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonRecord {
    producer_id: u32,
    transport_emissions: f64,
    farming_emissions: f64,
    total_emissions: f64,
    carbon_sequestration: f64,
    net_impact: f64,
}

impl CarbonRecord {
    /// Creates a record, deriving the total and net impact.
    #[must_use]
    pub fn new(
        producer_id: u32,
        transport_emissions: f64,
        farming_emissions: f64,
        carbon_sequestration: f64,
    ) -> Self {
        let total_emissions = transport_emissions + farming_emissions;
        Self {
            producer_id,
            transport_emissions,
            farming_emissions,
            total_emissions,
            carbon_sequestration,
            net_impact: total_emissions - carbon_sequestration,
        }
    }

    /// Producer the estimate belongs to.
    #[must_use]
    pub const fn producer_id(&self) -> u32 {
        self.producer_id
    }

    /// Emissions from moving goods to market.
    #[must_use]
    pub const fn transport_emissions(&self) -> f64 {
        self.transport_emissions
    }

    /// Emissions from on-farm activity.
    #[must_use]
    pub const fn farming_emissions(&self) -> f64 {
        self.farming_emissions
    }

    /// Transport plus farming emissions.
    #[must_use]
    pub const fn total_emissions(&self) -> f64 {
        self.total_emissions
    }

    /// Carbon drawn down by regenerative practice.
    #[must_use]
    pub const fn carbon_sequestration(&self) -> f64 {
        self.carbon_sequestration
    }

    /// Total emissions minus sequestration.
    #[must_use]
    pub const fn net_impact(&self) -> f64 {
        self.net_impact
    }
}

/// Returns the calendar month of a date.
#[must_use]
pub fn month_of(date: NaiveDate) -> Month {
    u8::try_from(date.month())
        .ok()
        .and_then(|number| Month::try_from(number).ok())
        .unwrap_or(Month::January)
}
