//! Integration tests for the flat-file store.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]


use camino::Utf8PathBuf;
use farm_data::{
    ActivityPolicy, DataSource, DataStore, GenerationOptions, LoadOutcome, StoreOptions,
    generate_dataset, load_or_generate,
};
use rstest::{fixture, rstest};
use test_support::{cleanup, open_data_dir, unique_data_dir};

const ALL_FILES: [&str; 6] = [
    "producers.csv",
    "products.csv",
    "market.csv",
    "customers.csv",
    "carbon.csv",
    "manifest.json",
];

struct DataDir {
    path: Utf8PathBuf,
}

impl Drop for DataDir {
    fn drop(&mut self) {
        cleanup(&self.path);
    }
}

#[fixture]
fn data_dir() -> DataDir {
    DataDir {
        path: unique_data_dir("store").expect("temp dir"),
    }
}

fn options(policy: ActivityPolicy) -> StoreOptions {
    StoreOptions {
        seed: Some(42),
        policy,
        ..StoreOptions::default()
    }
}

fn load(dir: &DataDir, policy: ActivityPolicy) -> LoadOutcome {
    load_or_generate(&dir.path, &options(policy)).expect("load succeeds")
}

fn load_with_seed(dir: &DataDir, policy: ActivityPolicy, seed: u64) -> LoadOutcome {
    let options = StoreOptions {
        seed: Some(seed),
        ..options(policy)
    };
    load_or_generate(&dir.path, &options).expect("load succeeds")
}

fn manifest_seed(dir: &DataDir) -> u64 {
    DataStore::open(&dir.path)
        .and_then(|store| store.read_manifest())
        .expect("read manifest")
        .seed
}

#[rstest]
fn first_run_generates_and_persists_everything(data_dir: DataDir) {
    let outcome = load(&data_dir, ActivityPolicy::Persist);
    assert_eq!(outcome.source, DataSource::Generated);
    assert_eq!(outcome.seed, 42);

    let dir = open_data_dir(&data_dir.path).expect("open data dir");
    for file in ALL_FILES {
        assert!(dir.exists(file), "{file} should be written");
    }
}

#[rstest]
fn persisted_store_round_trips(data_dir: DataDir) {
    let first = load(&data_dir, ActivityPolicy::Persist);
    let second = load(&data_dir, ActivityPolicy::Persist);

    assert_eq!(second.source, DataSource::Loaded);
    assert!(second.warnings.is_empty(), "{:?}", second.warnings);
    assert_eq!(first.dataset, second.dataset);
    let expected = generate_dataset(&GenerationOptions::new(42)).expect("generate");
    assert_eq!(second.dataset, expected);
}

#[rstest]
fn regenerate_policy_never_writes_activity_tables(data_dir: DataDir) {
    load(&data_dir, ActivityPolicy::Regenerate);
    let dir = open_data_dir(&data_dir.path).expect("open data dir");
    assert!(dir.exists("producers.csv"));
    assert!(dir.exists("manifest.json"));
    assert!(!dir.exists("market.csv"));

    let second = load(&data_dir, ActivityPolicy::Regenerate);
    assert_eq!(second.source, DataSource::Refreshed);
    assert_eq!(second.dataset.market.len(), 20 * 105);
}

#[rstest]
#[case("products.csv", "id,name\nnot-a-number,Kale\n")]
#[case("market.csv", "date,product_id,volume,price,revenue\nyesterday,1,10,2.0,20.0\n")]
#[case("carbon.csv", "producer_id,transport_emissions\nabc,1.0\n")]
#[case("manifest.json", "{ not json")]
#[case("manifest.json", r#"{"version": 7, "seed": 42}"#)]
fn corrupt_files_are_regenerated_with_a_warning(
    data_dir: DataDir,
    #[case] file: &str,
    #[case] contents: &str,
) {
    load(&data_dir, ActivityPolicy::Persist);
    let dir = open_data_dir(&data_dir.path).expect("open data dir");
    dir.write(file, contents).expect("corrupt file");

    let outcome = load(&data_dir, ActivityPolicy::Persist);
    assert_eq!(outcome.source, DataSource::Regenerated);
    assert!(
        outcome.warnings.iter().any(|warning| warning.contains(file)
            || warning.contains("unsupported store version")),
        "warnings should name the problem: {:?}",
        outcome.warnings
    );

    let repaired = load(&data_dir, ActivityPolicy::Persist);
    assert_eq!(repaired.source, DataSource::Loaded);
}

#[rstest]
fn dangling_references_are_rejected_on_load(data_dir: DataDir) {
    load(&data_dir, ActivityPolicy::Persist);
    let store = DataStore::open(&data_dir.path).expect("open store");
    let mut dataset = generate_dataset(&GenerationOptions::new(42)).expect("generate");
    if let Some(product) = dataset.products.first_mut() {
        product.producer_id = 999;
    }
    store
        .write_table("products.csv", &dataset.products)
        .expect("write products");

    let outcome = load(&data_dir, ActivityPolicy::Persist);
    assert_eq!(outcome.source, DataSource::Regenerated);
    assert_eq!(outcome.dataset.products.len(), 20);
}

#[rstest]
fn missing_activity_table_is_generated(data_dir: DataDir) {
    load(&data_dir, ActivityPolicy::Persist);
    let dir = open_data_dir(&data_dir.path).expect("open data dir");
    dir.remove_file("customers.csv").expect("remove customers");

    let outcome = load(&data_dir, ActivityPolicy::Persist);
    assert_eq!(outcome.source, DataSource::Generated);
    assert!(outcome.warnings.iter().any(|w| w.contains("customers.csv")));
    assert_eq!(outcome.dataset.customers.len(), 24 * 16);
}

#[rstest]
fn list_columns_use_semicolons(data_dir: DataDir) {
    load(&data_dir, ActivityPolicy::Persist);
    let dir = open_data_dir(&data_dir.path).expect("open data dir");
    let producers = dir.read_to_string("producers.csv").expect("read producers");
    let header = producers.lines().next().expect("header row");
    assert!(header.starts_with("id,name,location,region,categories,certification"));
    assert!(producers.contains("Vegetables;"));
}

#[rstest]
fn regenerated_activity_is_not_reported_as_loaded(data_dir: DataDir) {
    load(&data_dir, ActivityPolicy::Persist);

    let outcome = load_with_seed(&data_dir, ActivityPolicy::Regenerate, 7);
    assert_eq!(outcome.source, DataSource::Refreshed);
    assert_eq!(outcome.seed, 7);
    let expected = generate_dataset(&GenerationOptions::new(7)).expect("generate");
    assert_eq!(outcome.dataset.market, expected.market);
    // The persisted activity tables are untouched, so their seed stays.
    assert_eq!(manifest_seed(&data_dir), 42);

    let reloaded = load(&data_dir, ActivityPolicy::Persist);
    assert_eq!(reloaded.source, DataSource::Loaded);
    assert_eq!(reloaded.seed, 42);
}

#[rstest]
fn stored_seed_wins_over_a_different_configured_seed_with_a_warning(data_dir: DataDir) {
    load(&data_dir, ActivityPolicy::Persist);

    let outcome = load_with_seed(&data_dir, ActivityPolicy::Persist, 7);
    assert_eq!(outcome.source, DataSource::Loaded);
    assert_eq!(outcome.seed, 42);
    assert!(
        outcome
            .warnings
            .iter()
            .any(|warning| warning.contains("configured seed 7 ignored")),
        "{:?}",
        outcome.warnings
    );
}

#[rstest]
fn regenerated_persisted_activity_uses_the_configured_seed(data_dir: DataDir) {
    load(&data_dir, ActivityPolicy::Persist);
    let dir = open_data_dir(&data_dir.path).expect("open data dir");
    dir.remove_file("market.csv").expect("remove market");

    let outcome = load_with_seed(&data_dir, ActivityPolicy::Persist, 7);
    assert_eq!(outcome.source, DataSource::Generated);
    assert_eq!(outcome.seed, 7);
    assert_eq!(manifest_seed(&data_dir), 7);
}
