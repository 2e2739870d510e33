//! Process-wide marketplace tables.
//!
//! [`DataState`] is filled exactly once at startup and read by every request
//! afterwards. A failed load is remembered as [`DataStatus::Failed`] so pages
//! can show "no data" instead of erroring.

use std::sync::OnceLock;

use farm_data::{DataSource, Dataset, GenerationError, LoadOutcome};
use tracing::{error, info, warn};

/// Result of the one-time initialisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataStatus {
    /// Tables are available.
    Ready {
        /// Where the tables came from.
        source: DataSource,
        /// Seed of the activity tables.
        seed: u64,
        /// Non-fatal problems met while loading.
        warnings: Vec<String>,
    },
    /// Loading failed; no tables are available.
    Failed {
        /// Why loading failed.
        reason: String,
    },
}

#[derive(Debug)]
struct Loaded {
    dataset: Option<Dataset>,
    status: DataStatus,
}

/// Holder for the tables shared by all requests.
#[derive(Debug, Default)]
pub struct DataState {
    cell: OnceLock<Loaded>,
}

impl DataState {
    /// Creates an uninitialised state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Runs `loader` on the first call and records its result.
    ///
    /// Later calls do not run their loader and return the first status.
    ///
    /// # Examples
    /// ```
    /// use dashboard::domain::{DataState, DataStatus};
    /// use farm_data::GenerationError;
    ///
    /// let state = DataState::new();
    /// let status = state.initialize(|| {
    ///     Err(GenerationError::DateRange {
    ///         message: "window ends before it starts".to_owned(),
    ///     })
    /// });
    /// assert!(matches!(status, DataStatus::Failed { .. }));
    /// assert!(state.dataset().is_none());
    /// ```
    #[must_use]
    pub fn initialize<F>(&self, loader: F) -> &DataStatus
    where
        F: FnOnce() -> Result<LoadOutcome, GenerationError>,
    {
        &self.cell.get_or_init(|| Self::load(loader)).status
    }

    fn load<F>(loader: F) -> Loaded
    where
        F: FnOnce() -> Result<LoadOutcome, GenerationError>,
    {
        match loader() {
            Ok(outcome) => {
                for warning in &outcome.warnings {
                    warn!(warning = %warning, "marketplace data store");
                }
                info!(
                    source = outcome.source.as_str(),
                    seed = outcome.seed,
                    producers = outcome.dataset.producers.len(),
                    products = outcome.dataset.products.len(),
                    market_records = outcome.dataset.market.len(),
                    "marketplace data ready"
                );
                Loaded {
                    dataset: Some(outcome.dataset),
                    status: DataStatus::Ready {
                        source: outcome.source,
                        seed: outcome.seed,
                        warnings: outcome.warnings,
                    },
                }
            }
            Err(err) => {
                error!(error = %err, "marketplace data unavailable");
                Loaded {
                    dataset: None,
                    status: DataStatus::Failed {
                        reason: err.to_string(),
                    },
                }
            }
        }
    }

    /// Tables, when initialisation succeeded.
    #[must_use]
    pub fn dataset(&self) -> Option<&Dataset> {
        self.cell.get().and_then(|loaded| loaded.dataset.as_ref())
    }

    /// Status, once initialised.
    #[must_use]
    pub fn status(&self) -> Option<&DataStatus> {
        self.cell.get().map(|loaded| &loaded.status)
    }

    /// Why no tables are available, if that is the case.
    #[must_use]
    pub fn unavailable_reason(&self) -> Option<&str> {
        match self.status() {
            None => Some("data has not been loaded yet"),
            Some(DataStatus::Failed { reason }) => Some(reason),
            Some(DataStatus::Ready { .. }) => None,
        }
    }
}
