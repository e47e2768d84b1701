//! rowbase CLI entry point
//!
//! Parses arguments and dispatches via `cli::run`, prints any error to
//! stderr and exits non-zero on failure. All other logic lives in the
//! CLI module.

use rowbase::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
