// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for the autodesc CLI.
//!
//! Uses `tracing` with `tracing-subscriber`. Log output goes to stderr so
//! JSON and YAML on stdout stay parseable. `RUST_LOG` overrides the default
//! filter:
//!
//! ```bash
//! RUST_LOG=autodesc_core=debug autodesc describe --repo octocat/hello --pr 7
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Default directives when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "autodesc=warn,autodesc_core=warn,octocrab=error,reqwest=error";

/// Directives used with `--verbose`.
const VERBOSE_FILTER: &str = "autodesc=info,autodesc_core=info,octocrab=error,reqwest=error";

/// Initialize the logging subsystem.
///
/// `--verbose` raises the autodesc crates to `info`, which reports the
/// pipeline states and the selected model.
pub fn init_logging(verbose: bool) {
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let default_filter = if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    };
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .expect("valid default filter directives");

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
