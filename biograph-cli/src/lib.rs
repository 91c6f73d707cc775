//! biograph-cli library: run catalog queries and manage threads from other crates.
//!
//! Reads settings from `.env` / the environment, builds the executor and resolves one
//! query per call.
//!
//! ## Usage
//!
//! ```rust,no_run,ignore
//! let response = biograph_cli::run("How many samples does GSE10000 have").await?;
//! println!("{}", response.answer);
//! ```

mod config;
mod logging;
mod run;

pub use biograph::{ProviderInfo, QueryResponse};
pub use config::{Error, RunConfig, RunOptions};
pub use logging::init_tracing;
pub use run::{
    clear_threads, delete_thread, list_providers, list_threads, run, run_with_config,
    run_with_options,
};

#[cfg(feature = "sqlite")]
pub use biograph::GseRecord;
#[cfg(feature = "sqlite")]
pub use run::{find_record, list_records};

#[cfg(test)]
mod tests;
