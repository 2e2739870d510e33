//! Flat-file persistence for the marketplace tables.
//!
//! A store is a directory holding one CSV file per table plus a JSON
//! manifest recording the layout version and the seed the activity tables
//! were generated from. [`load_or_generate`] is the single entry point used
//! at startup: it never fails because of bad files on disk, it regenerates
//! and records a warning instead.

use std::fmt;
use std::io;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::atomic_io::replace_file;
use crate::catalogue;
use crate::dataset::Dataset;
use crate::error::{GenerationError, StoreError};
use crate::generator::{
    ActivityTables, ActivityWindow, GenerationOptions, generate_activity, random_seed,
};
use crate::model::{CarbonRecord, CustomerRecord, MarketRecord, Producer, Product};
use crate::validation::validate_dataset;

/// Layout version written to and expected in the manifest.
pub const STORE_VERSION: u32 = 1;

/// Producer table file.
pub const PRODUCERS_FILE: &str = "producers.csv";
/// Product table file.
pub const PRODUCTS_FILE: &str = "products.csv";
/// Market table file.
pub const MARKET_FILE: &str = "market.csv";
/// Customer table file.
pub const CUSTOMERS_FILE: &str = "customers.csv";
/// Carbon table file.
pub const CARBON_FILE: &str = "carbon.csv";
/// Manifest file.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Contents of `manifest.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Layout version.
    pub version: u32,
    /// Seed of the activity tables on disk, or of the run that created the
    /// store when none are persisted.
    pub seed: u64,
}

impl Manifest {
    /// Manifest for the current layout.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            version: STORE_VERSION,
            seed,
        }
    }
}

/// How the activity tables (market, customers, carbon) are sourced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityPolicy {
    /// Load from the store and persist on first generation, like the
    /// catalogue.
    Persist,
    /// Generate fresh on every start and never persist.
    #[default]
    Regenerate,
}

impl ActivityPolicy {
    /// Configuration name of the policy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Persist => "persist",
            Self::Regenerate => "regenerate",
        }
    }
}

impl fmt::Display for ActivityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "persist" => Ok(Self::Persist),
            "regenerate" => Ok(Self::Regenerate),
            other => Err(format!(
                "unknown activity policy '{other}', expected 'persist' or 'regenerate'"
            )),
        }
    }
}

/// Inputs for [`load_or_generate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Seed for generated tables; a random seed is drawn when absent.
    pub seed: Option<u64>,
    /// Activity table policy.
    pub policy: ActivityPolicy,
    /// Window of generated activity.
    pub window: ActivityWindow,
}

/// Where the returned dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Every stored table was read back intact.
    Loaded,
    /// The stored catalogue was read back and the activity tables were
    /// generated for this run.
    Refreshed,
    /// The store was empty or incomplete and was filled from the generator.
    Generated,
    /// Stored files were unreadable or invalid and were replaced.
    Regenerated,
}

impl DataSource {
    /// Lowercase name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loaded => "loaded",
            Self::Refreshed => "refreshed",
            Self::Generated => "generated",
            Self::Regenerated => "regenerated",
        }
    }
}

/// Result of [`load_or_generate`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    /// Validated tables.
    pub dataset: Dataset,
    /// Origin of the tables.
    pub source: DataSource,
    /// Seed the returned activity tables were generated from.
    pub seed: u64,
    /// Non-fatal problems met along the way.
    pub warnings: Vec<String>,
}

/// A data directory opened with capability-scoped access.
#[derive(Debug)]
pub struct DataStore {
    root: Utf8PathBuf,
    dir: Dir,
}

impl DataStore {
    /// Opens `root`, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::OpenDir`] when the directory cannot be created
    /// or opened.
    pub fn open(root: &Utf8Path) -> Result<Self, StoreError> {
        let open_error = |err: io::Error| StoreError::OpenDir {
            path: root.to_path_buf(),
            message: err.to_string(),
        };
        Dir::create_ambient_dir_all(root, ambient_authority()).map_err(open_error)?;
        let dir = Dir::open_ambient_dir(root, ambient_authority()).map_err(open_error)?;
        Ok(Self {
            root: root.to_path_buf(),
            dir,
        })
    }

    /// Directory path the store was opened at.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Reads and version-checks the manifest.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the manifest is missing, unreadable,
    /// malformed or of another layout version.
    pub fn read_manifest(&self) -> Result<Manifest, StoreError> {
        let path = Utf8Path::new(MANIFEST_FILE);
        let bytes = self.read_bytes(path)?;
        let manifest: Manifest =
            serde_json::from_slice(&bytes).map_err(|err| StoreError::Malformed {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
        if manifest.version != STORE_VERSION {
            return Err(StoreError::UnsupportedVersion {
                expected: STORE_VERSION,
                actual: manifest.version,
            });
        }
        Ok(manifest)
    }

    /// Atomically replaces the manifest.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WriteError`] when the file cannot be written.
    pub fn write_manifest(&self, manifest: &Manifest) -> Result<(), StoreError> {
        let path = Utf8Path::new(MANIFEST_FILE);
        let json = serde_json::to_vec_pretty(manifest).map_err(|err| StoreError::WriteError {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        replace_file(&self.dir, path, &json)
    }

    /// Reads every row of one CSV table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Missing`], [`StoreError::ReadError`] or
    /// [`StoreError::Malformed`].
    pub fn read_table<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, StoreError> {
        let path = Utf8Path::new(file);
        let bytes = self.read_bytes(path)?;
        csv::Reader::from_reader(bytes.as_slice())
            .deserialize()
            .collect::<Result<Vec<T>, _>>()
            .map_err(|err| StoreError::Malformed {
                path: path.to_path_buf(),
                message: err.to_string(),
            })
    }

    /// Atomically replaces one CSV table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WriteError`] when serialisation or the write
    /// fails.
    pub fn write_table<T: Serialize>(&self, file: &str, rows: &[T]) -> Result<(), StoreError> {
        let path = Utf8Path::new(file);
        let write_error = |message: String| StoreError::WriteError {
            path: path.to_path_buf(),
            message,
        };
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in rows {
            writer
                .serialize(row)
                .map_err(|err| write_error(err.to_string()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| write_error(err.to_string()))?;
        replace_file(&self.dir, path, &bytes)
    }

    /// Reads and validates the producer and product tables.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when either file cannot be read or the pair
    /// fails validation.
    pub fn load_catalogue(&self) -> Result<(Vec<Producer>, Vec<Product>), StoreError> {
        let catalogue = Dataset {
            producers: self.read_table(PRODUCERS_FILE)?,
            products: self.read_table(PRODUCTS_FILE)?,
            ..Dataset::default()
        };
        validate_dataset(&catalogue)?;
        Ok((catalogue.producers, catalogue.products))
    }

    /// Reads the activity tables and validates them against a catalogue.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when a file cannot be read or the combined
    /// tables fail validation.
    pub fn load_activity(
        &self,
        producers: &[Producer],
        products: &[Product],
    ) -> Result<ActivityTables, StoreError> {
        let market: Vec<MarketRecord> = self.read_table(MARKET_FILE)?;
        let customers: Vec<CustomerRecord> = self.read_table(CUSTOMERS_FILE)?;
        let carbon: Vec<CarbonRecord> = self.read_table(CARBON_FILE)?;
        let combined = Dataset {
            producers: producers.to_vec(),
            products: products.to_vec(),
            market,
            customers,
            carbon,
        };
        validate_dataset(&combined)?;
        Ok(ActivityTables {
            market: combined.market,
            customers: combined.customers,
            carbon: combined.carbon,
        })
    }

    /// Writes the producer and product tables.
    ///
    /// # Errors
    ///
    /// Returns the first [`StoreError::WriteError`].
    pub fn persist_catalogue(
        &self,
        producers: &[Producer],
        products: &[Product],
    ) -> Result<(), StoreError> {
        self.write_table(PRODUCERS_FILE, producers)?;
        self.write_table(PRODUCTS_FILE, products)
    }

    /// Writes the market, customer and carbon tables.
    ///
    /// # Errors
    ///
    /// Returns the first [`StoreError::WriteError`].
    pub fn persist_activity(&self, activity: &ActivityTables) -> Result<(), StoreError> {
        self.write_table(MARKET_FILE, &activity.market)?;
        self.write_table(CUSTOMERS_FILE, &activity.customers)?;
        self.write_table(CARBON_FILE, &activity.carbon)
    }

    /// Writes all five tables, then the manifest.
    ///
    /// # Errors
    ///
    /// Returns the first [`StoreError::WriteError`].
    pub fn persist_all(&self, dataset: &Dataset, seed: u64) -> Result<(), StoreError> {
        self.persist_catalogue(&dataset.producers, &dataset.products)?;
        self.write_table(MARKET_FILE, &dataset.market)?;
        self.write_table(CUSTOMERS_FILE, &dataset.customers)?;
        self.write_table(CARBON_FILE, &dataset.carbon)?;
        self.write_manifest(&Manifest::new(seed))
    }

    /// Reads and validates all five tables plus the manifest.
    ///
    /// # Errors
    ///
    /// Returns the first [`StoreError`] met.
    pub fn load_all(&self) -> Result<(Dataset, Manifest), StoreError> {
        let manifest = self.read_manifest()?;
        let (producers, products) = self.load_catalogue()?;
        let activity = self.load_activity(&producers, &products)?;
        let dataset = Dataset {
            producers,
            products,
            market: activity.market,
            customers: activity.customers,
            carbon: activity.carbon,
        };
        Ok((dataset, manifest))
    }

    fn read_bytes(&self, path: &Utf8Path) -> Result<Vec<u8>, StoreError> {
        self.dir.read(path).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                StoreError::Missing {
                    path: path.to_path_buf(),
                }
            } else {
                StoreError::ReadError {
                    path: path.to_path_buf(),
                    message: err.to_string(),
                }
            }
        })
    }
}

/// Loads the dataset from `root`, generating whatever is missing or broken.
///
/// The catalogue is loaded when intact and otherwise generated and
/// persisted. Activity tables follow [`StoreOptions::policy`]. Storage
/// problems never fail the call; they are reported in
/// [`LoadOutcome::warnings`].
///
/// # Errors
///
/// Returns [`GenerationError`] only when the built-in catalogue or the
/// final dataset is invalid.
///
/// # Example
///
/// ```
/// use camino::Utf8PathBuf;
/// use farm_data::{ActivityPolicy, DataSource, StoreOptions, load_or_generate};
///
/// let nanos = std::time::SystemTime::now()
///     .duration_since(std::time::UNIX_EPOCH)
///     .map_or(0, |elapsed| elapsed.as_nanos());
/// let root = Utf8PathBuf::from_path_buf(std::env::temp_dir())
///     .expect("utf-8 temp dir")
///     .join(format!("farm-data-doc-{nanos}"));
/// let options = StoreOptions {
///     seed: Some(42),
///     policy: ActivityPolicy::Persist,
///     ..StoreOptions::default()
/// };
///
/// let first = load_or_generate(&root, &options).expect("first run");
/// assert_eq!(first.source, DataSource::Generated);
/// let second = load_or_generate(&root, &options).expect("second run");
/// assert_eq!(second.source, DataSource::Loaded);
/// assert_eq!(first.dataset, second.dataset);
/// std::fs::remove_dir_all(&root).expect("clean up");
/// ```
pub fn load_or_generate(
    root: &Utf8Path,
    options: &StoreOptions,
) -> Result<LoadOutcome, GenerationError> {
    match DataStore::open(root) {
        Ok(store) => Loader::new(&store, options).run(),
        Err(err) => {
            let seed = options.seed.unwrap_or_else(random_seed);
            let generation = GenerationOptions::new(seed).with_window(options.window);
            let producers = catalogue::producers()?;
            let products = catalogue::products()?;
            let activity = generate_activity(&producers, &products, &generation);
            let dataset = assemble(producers, products, activity)?;
            Ok(LoadOutcome {
                dataset,
                source: DataSource::Generated,
                seed,
                warnings: vec![format!("{err}; data is kept in memory only")],
            })
        }
    }
}

struct Loader<'a> {
    store: &'a DataStore,
    options: &'a StoreOptions,
    warnings: Vec<String>,
    missing: bool,
    repaired: bool,
    wrote: bool,
}

impl<'a> Loader<'a> {
    const fn new(store: &'a DataStore, options: &'a StoreOptions) -> Self {
        Self {
            store,
            options,
            warnings: Vec::new(),
            missing: false,
            repaired: false,
            wrote: false,
        }
    }

    fn run(mut self) -> Result<LoadOutcome, GenerationError> {
        // A store without a readable manifest is not trusted at all.
        let manifest = self.keep(self.store.read_manifest(), "the store");
        let (producers, products) = self.catalogue(manifest.is_some())?;

        let (activity, seed) = match self.options.policy {
            ActivityPolicy::Regenerate => {
                let seed = self.options.seed.unwrap_or_else(random_seed);
                let generation = GenerationOptions::new(seed).with_window(self.options.window);
                (generate_activity(&producers, &products, &generation), seed)
            }
            ActivityPolicy::Persist => self.persisted_activity(manifest, &producers, &products),
        };

        if self.wrote || manifest.is_none() {
            // The manifest seed names the activity tables on disk, which a
            // regenerating run leaves alone.
            let recorded = match (self.options.policy, manifest) {
                (ActivityPolicy::Regenerate, Some(existing)) => existing.seed,
                _ => seed,
            };
            let written = self.store.write_manifest(&Manifest::new(recorded));
            self.record_write(written);
        }

        let dataset = assemble(producers, products, activity)?;
        let source = if self.repaired {
            DataSource::Regenerated
        } else if self.missing {
            DataSource::Generated
        } else if self.options.policy == ActivityPolicy::Regenerate {
            DataSource::Refreshed
        } else {
            DataSource::Loaded
        };
        Ok(LoadOutcome {
            dataset,
            source,
            seed,
            warnings: self.warnings,
        })
    }

    fn catalogue(
        &mut self,
        trusted: bool,
    ) -> Result<(Vec<Producer>, Vec<Product>), GenerationError> {
        if trusted {
            let loaded = self.store.load_catalogue();
            if let Some(stored) = self.keep(loaded, "the catalogue") {
                return Ok(stored);
            }
        }
        let producers = catalogue::producers()?;
        let products = catalogue::products()?;
        let written = self.store.persist_catalogue(&producers, &products);
        self.record_write(written);
        Ok((producers, products))
    }

    /// Stored activity tables with their manifest seed, or freshly generated
    /// and persisted ones.
    fn persisted_activity(
        &mut self,
        manifest: Option<Manifest>,
        producers: &[Producer],
        products: &[Product],
    ) -> (ActivityTables, u64) {
        let stored = manifest.and_then(|existing| {
            let loaded = self.store.load_activity(producers, products);
            self.keep(loaded, "the activity tables")
                .map(|activity| (activity, existing.seed))
        });
        let Some((activity, stored_seed)) = stored else {
            let seed = self
                .options
                .seed
                .or_else(|| manifest.map(|existing| existing.seed))
                .unwrap_or_else(random_seed);
            let generation = GenerationOptions::new(seed).with_window(self.options.window);
            let activity = generate_activity(producers, products, &generation);
            let written = self.store.persist_activity(&activity);
            self.record_write(written);
            return (activity, seed);
        };
        if let Some(configured) = self.options.seed.filter(|seed| *seed != stored_seed) {
            self.warnings.push(format!(
                "configured seed {configured} ignored; stored activity tables were generated \
                 from seed {stored_seed}"
            ));
        }
        (activity, stored_seed)
    }

    /// Passes loaded data through, recording why it was dropped otherwise.
    fn keep<T>(&mut self, result: Result<T, StoreError>, what: &str) -> Option<T> {
        let err = match result {
            Ok(value) => return Some(value),
            Err(err) => err,
        };
        if matches!(err, StoreError::Missing { .. }) {
            self.missing = true;
            self.warnings.push(format!("{err}; generating {what}"));
        } else {
            self.repaired = true;
            self.warnings.push(format!("{err}; regenerating {what}"));
        }
        None
    }

    fn record_write(&mut self, result: Result<(), StoreError>) {
        match result {
            Ok(()) => self.wrote = true,
            Err(err) => self.warnings.push(format!("{err}; continuing with in-memory data")),
        }
    }
}

fn assemble(
    producers: Vec<Producer>,
    products: Vec<Product>,
    activity: ActivityTables,
) -> Result<Dataset, GenerationError> {
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

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("persist", ActivityPolicy::Persist)]
    #[case("Regenerate", ActivityPolicy::Regenerate)]
    #[case(" persist ", ActivityPolicy::Persist)]
    fn parses_activity_policy(#[case] raw: &str, #[case] expected: ActivityPolicy) {
        assert_eq!(raw.parse::<ActivityPolicy>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_activity_policy() {
        assert!("sometimes".parse::<ActivityPolicy>().is_err());
    }

    #[test]
    fn default_policy_regenerates() {
        assert_eq!(ActivityPolicy::default(), ActivityPolicy::Regenerate);
        assert_eq!(ActivityPolicy::default().to_string(), "regenerate");
    }

    #[test]
    fn manifest_uses_current_version() {
        let manifest = Manifest::new(9);
        assert_eq!(manifest.version, STORE_VERSION);
        let json = serde_json::to_string(&manifest).expect("serialise manifest");
        assert_eq!(json, r#"{"version":1,"seed":9}"#);
    }
}
