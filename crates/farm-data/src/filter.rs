//! Filter settings and the row predicates derived from them.
//!
//! Filtering never mutates a table: each function borrows rows and returns
//! the subset that every active [`Criterion`] admits. Criteria are
//! independent per-row predicates combined with logical AND, so their order
//! does not affect the result.

use std::collections::HashSet;

use chrono::Month;
use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, ProductListing};
use crate::error::FilterError;
use crate::model::{Certification, MarketRecord, Producer, SeasonTag};

/// Smallest selectable maximum distance in miles.
pub const MIN_DISTANCE_MILES: u32 = 5;

/// Largest selectable maximum distance in miles.
pub const MAX_DISTANCE_MILES: u32 = 100;

/// Step between selectable distances.
pub const DISTANCE_STEP_MILES: u32 = 5;

/// Maximum distance applied when the user has not chosen one.
pub const DEFAULT_DISTANCE_MILES: u32 = 50;

/// A validated maximum-distance threshold.
///
/// # Example
///
/// ```
/// use farm_data::MaxDistance;
///
/// assert_eq!(MaxDistance::default().miles(), 50);
/// assert!(MaxDistance::new(35).is_ok());
/// assert!(MaxDistance::new(0).is_err());
/// assert!(MaxDistance::new(33).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct MaxDistance(u32);

impl MaxDistance {
    /// Validates a slider value.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] when `miles` is outside
    /// [`MIN_DISTANCE_MILES`]..=[`MAX_DISTANCE_MILES`] or not a multiple of
    /// [`DISTANCE_STEP_MILES`].
    pub const fn new(miles: u32) -> Result<Self, FilterError> {
        if miles < MIN_DISTANCE_MILES || miles > MAX_DISTANCE_MILES {
            return Err(FilterError::DistanceOutOfRange {
                min: MIN_DISTANCE_MILES,
                max: MAX_DISTANCE_MILES,
                value: miles,
            });
        }
        if miles % DISTANCE_STEP_MILES != 0 {
            return Err(FilterError::DistanceOffStep {
                step: DISTANCE_STEP_MILES,
                value: miles,
            });
        }
        Ok(Self(miles))
    }

    /// Threshold in miles.
    #[must_use]
    pub const fn miles(self) -> u32 {
        self.0
    }

    /// Returns `true` when `distance` is within the threshold.
    #[must_use]
    pub fn admits(self, distance: f64) -> bool {
        distance <= f64::from(self.0)
    }
}

impl Default for MaxDistance {
    fn default() -> Self {
        Self(DEFAULT_DISTANCE_MILES)
    }
}

impl TryFrom<u32> for MaxDistance {
    type Error = FilterError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MaxDistance> for u32 {
    fn from(value: MaxDistance) -> Self {
        value.0
    }
}

/// User-adjustable filter controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSettings {
    /// Keep only organic or regenerative producers.
    pub sustainable_only: bool,
    /// Keep only products in season this month.
    pub in_season_only: bool,
    /// Keep only producers within this distance.
    pub max_distance: MaxDistance,
}

impl FilterSettings {
    /// Expands the settings into the active criteria for `month`.
    ///
    /// The distance criterion is always active.
    #[must_use]
    pub fn criteria(&self, month: Month) -> Vec<Criterion> {
        let mut criteria = Vec::with_capacity(3);
        if self.sustainable_only {
            criteria.push(Criterion::Sustainable);
        }
        if self.in_season_only {
            criteria.push(Criterion::InSeason(month));
        }
        criteria.push(Criterion::WithinDistance(self.max_distance));
        criteria
    }
}

/// One row predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    /// Producer certification is organic or regenerative.
    Sustainable,
    /// Product season includes the month. Rows without a season pass.
    InSeason(Month),
    /// Producer distance is within the threshold.
    WithinDistance(MaxDistance),
}

impl Criterion {
    /// Returns `true` when `row` satisfies this criterion.
    #[must_use]
    pub fn admits<R: Filterable + ?Sized>(&self, row: &R) -> bool {
        match self {
            Self::Sustainable => row.certification().is_sustainable(),
            Self::InSeason(month) => row.season().is_none_or(|season| season.includes(*month)),
            Self::WithinDistance(max) => max.admits(row.distance_miles()),
        }
    }
}

/// Rows that the filter criteria can inspect.
pub trait Filterable {
    /// Certification of the row's producer.
    fn certification(&self) -> Certification;

    /// Distance of the row's producer in miles.
    fn distance_miles(&self) -> f64;

    /// Season tag of the row's product, if the row has one.
    fn season(&self) -> Option<&SeasonTag>;
}

impl<T: Filterable + ?Sized> Filterable for &T {
    fn certification(&self) -> Certification {
        (**self).certification()
    }

    fn distance_miles(&self) -> f64 {
        (**self).distance_miles()
    }

    fn season(&self) -> Option<&SeasonTag> {
        (**self).season()
    }
}

impl Filterable for Producer {
    fn certification(&self) -> Certification {
        self.certification
    }

    fn distance_miles(&self) -> f64 {
        self.distance_miles
    }

    fn season(&self) -> Option<&SeasonTag> {
        None
    }
}

impl Filterable for ProductListing<'_> {
    fn certification(&self) -> Certification {
        self.producer.certification
    }

    fn distance_miles(&self) -> f64 {
        self.producer.distance_miles
    }

    fn season(&self) -> Option<&SeasonTag> {
        Some(&self.product.season)
    }
}

/// Keeps the rows admitted by every criterion.
#[must_use]
pub fn filter_rows<I, R>(rows: I, criteria: &[Criterion]) -> Vec<R>
where
    I: IntoIterator<Item = R>,
    R: Filterable,
{
    rows.into_iter()
        .filter(|row| criteria.iter().all(|criterion| criterion.admits(row)))
        .collect()
}

/// Producers passing the settings.
#[must_use]
pub fn filter_producers<'a>(
    dataset: &'a Dataset,
    settings: &FilterSettings,
    month: Month,
) -> Vec<&'a Producer> {
    filter_rows(&dataset.producers, &settings.criteria(month))
}

/// Product listings passing the settings.
#[must_use]
pub fn filter_listings<'a>(
    dataset: &'a Dataset,
    settings: &FilterSettings,
    month: Month,
) -> Vec<ProductListing<'a>> {
    filter_rows(dataset.listings(), &settings.criteria(month))
}

/// Market records whose product listing passes the settings.
#[must_use]
pub fn filter_market<'a>(
    dataset: &'a Dataset,
    settings: &FilterSettings,
    month: Month,
) -> Vec<&'a MarketRecord> {
    let admitted: HashSet<u32> = filter_listings(dataset, settings, month)
        .iter()
        .map(|listing| listing.product.id)
        .collect();
    dataset
        .market
        .iter()
        .filter(|record| admitted.contains(&record.product_id()))
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::generator::{GenerationOptions, generate_dataset};
    use crate::model::{CategoryList, ProductCategory};

    fn producer(id: u32, distance_miles: f64, certification: Certification) -> Producer {
        Producer {
            id,
            name: format!("Producer {id}"),
            location: "Somewhere, CA".to_owned(),
            region: "Test".to_owned(),
            categories: CategoryList::new(vec![ProductCategory::Vegetables])
                .expect("non-empty categories"),
            certification,
            distance_miles,
            latitude: None,
            longitude: None,
            founded_year: 2000,
            employees: 1,
            description: String::new(),
        }
    }

    fn settings(sustainable_only: bool, in_season_only: bool, miles: u32) -> FilterSettings {
        FilterSettings {
            sustainable_only,
            in_season_only,
            max_distance: MaxDistance::new(miles).expect("valid distance"),
        }
    }

    #[fixture]
    fn dataset() -> Dataset {
        generate_dataset(&GenerationOptions::new(42)).expect("generation succeeds")
    }

    #[test]
    fn sustainable_and_distance_filters_combine() {
        let rows = vec![
            producer(1, 12.0, Certification::Organic),
            producer(2, 30.0, Certification::Conventional),
        ];
        let kept = filter_rows(&rows, &settings(true, false, 20).criteria(Month::May));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.first().map(|p| p.distance_miles), Some(12.0));
    }

    #[rstest]
    fn smallest_distance_excludes_everything_further(dataset: Dataset) {
        let kept = filter_producers(&dataset, &settings(false, false, 5), Month::June);
        assert!(kept.iter().all(|p| p.distance_miles <= 5.0));
        let excluded = dataset.producers.len() - kept.len();
        let further = dataset
            .producers
            .iter()
            .filter(|p| p.distance_miles > 5.0)
            .count();
        assert_eq!(excluded, further);
    }

    #[rstest]
    fn largest_distance_includes_everything_within(dataset: Dataset) {
        let kept = filter_producers(&dataset, &settings(false, false, 100), Month::June);
        let within = dataset
            .producers
            .iter()
            .filter(|p| p.distance_miles <= 100.0)
            .count();
        assert_eq!(kept.len(), within);
    }

    #[rstest]
    #[case(Month::July, true)]
    #[case(Month::January, false)]
    fn in_season_filter_follows_calendar(
        dataset: Dataset,
        #[case] month: Month,
        #[case] included: bool,
    ) {
        let kept = filter_listings(&dataset, &settings(false, true, 100), month);
        let tomatoes = kept.iter().any(|l| l.product.name == "Heirloom Tomatoes");
        assert_eq!(tomatoes, included);
    }

    #[rstest]
    fn criteria_order_does_not_matter(dataset: Dataset) {
        let base = settings(true, true, 50).criteria(Month::October);
        let expected: Vec<u32> = filter_rows(dataset.listings(), &base)
            .iter()
            .map(|l| l.product.id)
            .collect();

        let orders: [[usize; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        for order in orders {
            let permuted: Vec<Criterion> =
                order.iter().filter_map(|i| base.get(*i).copied()).collect();
            let actual: Vec<u32> = filter_rows(dataset.listings(), &permuted)
                .iter()
                .map(|l| l.product.id)
                .collect();
            assert_eq!(actual, expected, "order {order:?}");
        }
    }

    #[rstest]
    fn producers_ignore_the_season_criterion(dataset: Dataset) {
        let with_season = filter_producers(&dataset, &settings(false, true, 100), Month::January);
        let without = filter_producers(&dataset, &settings(false, false, 100), Month::January);
        assert_eq!(with_season, without);
    }

    #[rstest]
    fn market_filter_keeps_only_admitted_products(dataset: Dataset) {
        let filters = settings(true, false, 40);
        let admitted: HashSet<u32> = filter_listings(&dataset, &filters, Month::March)
            .iter()
            .map(|l| l.product.id)
            .collect();
        let records = filter_market(&dataset, &filters, Month::March);
        assert!(!records.is_empty());
        assert!(records.iter().all(|r| admitted.contains(&r.product_id())));
    }

    #[test]
    fn default_settings_match_initial_controls() {
        let defaults = FilterSettings::default();
        assert!(!defaults.sustainable_only);
        assert!(!defaults.in_season_only);
        assert_eq!(defaults.max_distance.miles(), DEFAULT_DISTANCE_MILES);
        assert_eq!(defaults.criteria(Month::May).len(), 1);
    }

    #[rstest]
    #[case(4, FilterError::DistanceOutOfRange { min: 5, max: 100, value: 4 })]
    #[case(105, FilterError::DistanceOutOfRange { min: 5, max: 100, value: 105 })]
    #[case(42, FilterError::DistanceOffStep { step: 5, value: 42 })]
    fn rejects_invalid_distances(#[case] miles: u32, #[case] expected: FilterError) {
        assert_eq!(MaxDistance::new(miles), Err(expected));
    }

    #[test]
    fn settings_deserialise_with_validation() {
        let parsed: Result<FilterSettings, _> = serde_json::from_str(
            r#"{"sustainable_only": true, "in_season_only": false, "max_distance": 7}"#,
        );
        assert!(parsed.is_err());
    }
}
