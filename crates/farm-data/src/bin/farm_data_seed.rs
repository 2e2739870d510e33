//! Writes a freshly generated marketplace dataset to a data directory.
//!
//! This binary delegates to `farm_data::seed_cli` for parsing and writing,
//! keeping the CLI behaviour testable without spawning a process.

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use farm_data::seed_cli::{CliError, ParseOutcome, parse_args, run_seed, success_message};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Err(write_err) = writeln!(io::stderr().lock(), "{err}") {
                drop(write_err);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), CliError> {
    match parse_args(env::args().skip(1))? {
        ParseOutcome::Help => {
            print_usage(io::stdout().lock());
            Ok(())
        }
        ParseOutcome::Options(options) => {
            let summary = run_seed(&options)?;
            let message = success_message(&summary, options.data_dir());
            if let Err(err) = writeln!(io::stdout().lock(), "{message}") {
                drop(err);
            }
            Ok(())
        }
    }
}

fn print_usage(mut out: impl Write) {
    let usage = concat!(
        "Usage: farm-data-seed --data-dir <dir> [options]\n",
        "\n",
        "Options:\n",
        "  --data-dir <dir>     Directory to write the CSV tables and manifest to\n",
        "  --seed <seed>        RNG seed value (defaults to random)\n",
        "  -h, --help           Print this help output\n",
    );
    if let Err(err) = out.write_all(usage.as_bytes()) {
        drop(err);
    }
}
