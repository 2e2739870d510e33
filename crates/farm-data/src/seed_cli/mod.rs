//! CLI support for writing a freshly generated dataset to disk.
//!
//! The `farm-data-seed` binary delegates to these functions so parsing and
//! writing can be exercised in tests without spawning a subprocess.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};

use crate::generator::{GenerationOptions, generate_dataset, random_seed};
use crate::store::DataStore;

mod error;

pub use error::CliError;

/// Parsed options for the seed CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    data_dir: Utf8PathBuf,
    seed: Option<u64>,
}

impl Options {
    /// Returns the target data directory.
    ///
    /// # Example
    ///
    /// ```
    /// use farm_data::seed_cli::{ParseOutcome, parse_args};
    ///
    /// let args = vec!["--data-dir".to_owned(), "data".to_owned()];
    /// let ParseOutcome::Options(options) = parse_args(args.into_iter()).expect("parse") else {
    ///     panic!("expected options");
    /// };
    ///
    /// assert_eq!(options.data_dir().as_str(), "data");
    /// ```
    #[must_use]
    pub fn data_dir(&self) -> &Utf8Path {
        &self.data_dir
    }

    /// Returns the requested seed, if any.
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }
}

/// Outcome of parsing CLI arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Show help output and exit successfully.
    Help,
    /// Continue with the parsed options.
    Options(Options),
}

/// Row counts of a written dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    /// Seed the activity tables were generated from.
    pub seed: u64,
    /// Producer rows.
    pub producers: usize,
    /// Product rows.
    pub products: usize,
    /// Market rows.
    pub market: usize,
    /// Customer rows.
    pub customers: usize,
    /// Carbon rows.
    pub carbon: usize,
}

/// Parses CLI arguments.
///
/// # Errors
///
/// Returns [`CliError`] when `--data-dir` is missing, a flag lacks its
/// value, a number does not parse, or an argument is unknown.
pub fn parse_args<I>(mut args: I) -> Result<ParseOutcome, CliError>
where
    I: Iterator<Item = String>,
{
    let mut data_dir: Option<Utf8PathBuf> = None;
    let mut seed: Option<u64> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(ParseOutcome::Help),
            "--data-dir" => {
                let value = next_value(&mut args, "--data-dir")?;
                data_dir = Some(Utf8PathBuf::from(value));
            }
            "--seed" => {
                let value = next_value(&mut args, "--seed")?;
                seed = Some(parse_number(&value, "--seed")?);
            }
            _ => return Err(CliError::UnknownArgument { value: arg }),
        }
    }

    let data_dir = data_dir.ok_or(CliError::MissingDataDir)?;
    Ok(ParseOutcome::Options(Options { data_dir, seed }))
}

/// Generates a dataset and writes all tables plus the manifest.
///
/// Existing files in the directory are replaced.
///
/// # Errors
///
/// Returns [`CliError`] when generation fails or any file cannot be written.
pub fn run_seed(options: &Options) -> Result<SeedSummary, CliError> {
    let seed = options.seed.unwrap_or_else(random_seed);
    let dataset = generate_dataset(&GenerationOptions::new(seed))?;
    let store = DataStore::open(&options.data_dir)?;
    store.persist_all(&dataset, seed)?;
    Ok(SeedSummary {
        seed,
        producers: dataset.producers.len(),
        products: dataset.products.len(),
        market: dataset.market.len(),
        customers: dataset.customers.len(),
        carbon: dataset.carbon.len(),
    })
}

/// Formats the success line printed by the CLI.
///
/// # Example
///
/// ```
/// use camino::Utf8Path;
/// use farm_data::seed_cli::{SeedSummary, success_message};
///
/// let summary = SeedSummary {
///     seed: 7,
///     producers: 10,
///     products: 20,
///     market: 2100,
///     customers: 384,
///     carbon: 10,
/// };
/// let message = success_message(&summary, Utf8Path::new("data"));
///
/// assert!(message.contains("seed=7"));
/// ```
#[must_use]
pub fn success_message(summary: &SeedSummary, data_dir: &Utf8Path) -> String {
    format!(
        "Wrote dataset (seed={}) to {data_dir}: {} producers, {} products, {} market records, \
         {} customer records, {} carbon records",
        summary.seed,
        summary.producers,
        summary.products,
        summary.market,
        summary.customers,
        summary.carbon,
    )
}

fn next_value<I>(args: &mut I, flag: &'static str) -> Result<String, CliError>
where
    I: Iterator<Item = String>,
{
    args.next().ok_or(CliError::MissingValue { flag })
}

fn parse_number<T>(value: &str, flag: &'static str) -> Result<T, CliError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value.parse::<T>().map_err(|err| CliError::InvalidNumber {
        flag,
        value: value.to_owned(),
        message: err.to_string(),
    })
}
