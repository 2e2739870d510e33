//! Error types for the seed CLI.

use thiserror::Error;

use crate::error::{GenerationError, StoreError};

/// Errors surfaced by the seed CLI parsing and write flow.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CliError {
    /// Data directory was not supplied.
    #[error("missing required flag: --data-dir")]
    MissingDataDir,
    /// A flag expected a value but none was provided.
    #[error("missing value for {flag}")]
    MissingValue {
        /// Flag that was missing its value.
        flag: &'static str,
    },
    /// An unsupported argument was supplied.
    #[error("unknown argument: {value}")]
    UnknownArgument {
        /// Argument value that was not recognised.
        value: String,
    },
    /// A numeric value failed to parse.
    #[error("invalid number for {flag}: '{value}' ({message})")]
    InvalidNumber {
        /// Flag associated with the invalid number.
        flag: &'static str,
        /// Raw value supplied for the flag.
        value: String,
        /// Parser error message.
        message: String,
    },
    /// The dataset could not be generated.
    #[error("generation error: {source}")]
    Generation {
        /// Underlying generation error.
        #[from]
        #[source]
        source: GenerationError,
    },
    /// The dataset could not be written.
    #[error("store error: {source}")]
    Store {
        /// Underlying store error.
        #[from]
        #[source]
        source: StoreError,
    },
}
