//! `linkshort` server entry point.
//!
//! # Usage
//!
//! ```bash
//! # Start the HTTP server; pending migrations run first
//! cargo run
//! ```
//!
//! Schema administration lives in the `admin` binary
//! (`cargo run --bin admin -- migrate status`).
//!
//! Environment variables are read from the process and from `.env` if present;
//! see [`linkshort::config`] for the full list.

use linkshort::{config, server, telemetry};

use anyhow::{Context, Result};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_from_env().context("Invalid configuration")?;
    telemetry::init(&config);

    config.print_summary();
    server::run(config).await
}
