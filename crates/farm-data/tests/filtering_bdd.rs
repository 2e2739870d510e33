//! Behavioural tests for the filter layer.
//!
//! These scenarios cover certification, distance and season filters and the
//! independence of criterion order.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use chrono::Month;
use farm_data::{
    CategoryList, Certification, Criterion, Dataset, FilterSettings, GenerationOptions,
    MaxDistance, Producer, Product, ProductCategory, SeasonTag, filter_listings,
    filter_producers, filter_rows, generate_dataset,
};
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};

#[derive(Default, ScenarioState)]
struct World {
    dataset: Slot<Dataset>,
    kept_producers: Slot<Vec<Producer>>,
    kept_products: Slot<Vec<u32>>,
    orderings: Slot<Vec<Vec<u32>>>,
}

impl World {
    fn dataset(&self) -> Dataset {
        self.dataset.get().unwrap_or_default()
    }
}

#[fixture]
fn world() -> World {
    World::default()
}

fn producer(id: u32, miles: u32, certification: Certification) -> Producer {
    Producer {
        id,
        name: format!("Farm {id}"),
        location: "Petaluma, CA".to_owned(),
        region: "North Bay".to_owned(),
        categories: CategoryList::new(vec![ProductCategory::Vegetables]).expect("categories"),
        certification,
        distance_miles: f64::from(miles),
        latitude: None,
        longitude: None,
        founded_year: 1998,
        employees: 4,
        description: String::new(),
    }
}

fn certification_named(name: &str) -> Certification {
    Certification::ALL
        .into_iter()
        .find(|certification| certification.label() == name)
        .expect("known certification")
}

// ============================================================================
// Given steps
// ============================================================================

#[given("a producer {miles:u32} miles away certified {certification}")]
fn a_producer_miles_away(world: &World, miles: u32, certification: String) {
    let mut dataset = world.dataset();
    let id = u32::try_from(dataset.producers.len()).expect("small table") + 1;
    dataset
        .producers
        .push(producer(id, miles, certification_named(&certification)));
    world.dataset.set(dataset);
}

#[given("a {season} product from a nearby farm")]
fn a_seasonal_product(world: &World, season: String) {
    let season: SeasonTag = season.parse().expect("known season");
    let dataset = Dataset {
        producers: vec![producer(1, 10, Certification::Organic)],
        products: vec![Product {
            id: 1,
            name: "Heirloom Tomatoes".to_owned(),
            category: ProductCategory::Vegetables,
            unit_price: 4.5,
            unit: "lb".to_owned(),
            season,
            producer_id: 1,
            nutrition_score: Some(80),
        }],
        ..Dataset::default()
    };
    world.dataset.set(dataset);
}

#[given("the generated marketplace for seed {seed:u64}")]
fn the_generated_marketplace(world: &World, seed: u64) {
    let dataset = generate_dataset(&GenerationOptions::new(seed)).expect("generation succeeds");
    world.dataset.set(dataset);
}

// ============================================================================
// When steps
// ============================================================================

#[when("filtering for sustainable producers within {miles:u32} miles")]
fn filtering_for_sustainable_producers(world: &World, miles: u32) {
    let dataset = world.dataset();
    let settings = FilterSettings {
        sustainable_only: true,
        in_season_only: false,
        max_distance: MaxDistance::new(miles).expect("valid distance"),
    };
    let kept: Vec<Producer> = filter_producers(&dataset, &settings, Month::May)
        .into_iter()
        .cloned()
        .collect();
    world.kept_producers.set(kept);
}

#[when("filtering for in-season products in {month}")]
fn filtering_for_in_season_products(world: &World, month: String) {
    let month: Month = month.parse().expect("month name");
    let dataset = world.dataset();
    let settings = FilterSettings {
        in_season_only: true,
        ..FilterSettings::default()
    };
    let kept: Vec<u32> = filter_listings(&dataset, &settings, month)
        .iter()
        .map(|listing| listing.product.id)
        .collect();
    world.kept_products.set(kept);
}

#[when("the sustainable, season and distance criteria are applied in every order")]
fn criteria_applied_in_every_order(world: &World) {
    let dataset = world.dataset();
    let distance = MaxDistance::new(45).expect("valid distance");
    let criteria = [
        Criterion::Sustainable,
        Criterion::InSeason(Month::September),
        Criterion::WithinDistance(distance),
    ];
    let orders: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];
    let results: Vec<Vec<u32>> = orders
        .iter()
        .map(|order| {
            let permuted: Vec<Criterion> = order
                .iter()
                .filter_map(|index| criteria.get(*index).copied())
                .collect();
            filter_rows(dataset.listings(), &permuted)
                .iter()
                .map(|listing| listing.product.id)
                .collect::<Vec<u32>>()
        })
        .collect();
    world.orderings.set(results);
}

// ============================================================================
// Then steps
// ============================================================================

#[then("only the producer {miles:u32} miles away remains")]
fn only_the_producer_remains(world: &World, miles: u32) {
    let kept = world.kept_producers.get().expect("filter ran");
    let distances: Vec<f64> = kept.iter().map(|p| p.distance_miles).collect();
    assert_eq!(distances, vec![f64::from(miles)]);
}

#[then("the product is included")]
fn the_product_is_included(world: &World) {
    let kept = world.kept_products.get().expect("filter ran");
    assert_eq!(kept, vec![1]);
}

#[then("the product is excluded")]
fn the_product_is_excluded(world: &World) {
    let kept = world.kept_products.get().expect("filter ran");
    assert!(kept.is_empty());
}

#[then("every ordering keeps the same products")]
fn every_ordering_keeps_the_same_products(world: &World) {
    let orderings = world.orderings.get().expect("filters ran");
    let first = orderings.first().expect("at least one ordering");
    assert!(!first.is_empty(), "expected some products to pass");
    assert!(orderings.iter().all(|ids| ids == first));
}

// ============================================================================
// Scenario bindings
// ============================================================================

#[scenario(
    path = "tests/features/filtering.feature",
    name = "Sustainable and distance filters combine"
)]
fn sustainable_and_distance_filters_combine(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/filtering.feature",
    name = "Summer produce is in season in July"
)]
fn summer_produce_is_in_season_in_july(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/filtering.feature",
    name = "Summer produce is out of season in January"
)]
fn summer_produce_is_out_of_season_in_january(world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/filtering.feature",
    name = "Filter order does not change the result"
)]
fn filter_order_does_not_change_the_result(world: World) {
    let _ = world;
}
