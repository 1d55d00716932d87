#[cfg(test)]
mod test;

pub mod args;
pub mod checker;
pub mod compiler;
pub mod config;
pub mod dedup;
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod judger;
pub mod lang;
pub mod model;
pub mod orchestrator;
pub mod preview;
pub mod result;
pub mod runner;
pub mod score;
pub mod subtask_runner;

use std::error::Error;

pub use crate::{args::ARGS, config::CONFIG};
pub use dedup::Deduplicator;

#[macro_use]
extern crate lazy_static;
extern crate log;

shadow_rs::shadow!(build);

/// Loads config, initializes logging, and documents the wiring seam: a real deployment
/// constructs a `RunnerTransport`/`CompilerService` pair here (a RabbitMQ/Redis-backed queue
/// client and a sandbox compile client, say), pulls a submission and its `TestData` from the
/// configured `ServerUrl`, and hands both to `orchestrator::run`. None of that broker/compiler
/// wiring is this crate's concern; `main` only proves the seam is reachable.
fn main() -> Result<(), Box<dyn Error>> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  lazy_static::initialize(&ARGS);
  lazy_static::initialize(&CONFIG);

  log::info!(
    "judge-core {} starting, {} language(s) configured",
    build::CLAP_LONG_VERSION,
    CONFIG.lang.len()
  );

  Ok(())
}
