//! # Rollbook - Records Admin
//!
//! The main binary for the Rollbook records administration client.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    apps/rollbook (THE BINARY)                │
//! │                                                              │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐  │
//! │  │    CLI      │───►│    Pages    │───►│   HTTP client    │──┼──► records API
//! │  │   (clap)    │    │ (list/edit) │    │    (reqwest)     │  │
//! │  └─────────────┘    └──────┬──────┘    └──────────────────┘  │
//! │                            ▼                                 │
//! │                    ┌───────────────┐                         │
//! │                    │ rollbook-core │                         │
//! │                    │ (forms, sheet)│                         │
//! │                    └───────────────┘                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! rollbook courses list
//! rollbook sections add --section-id S1 --section-name "Mon AM" \
//!     --semester 2024-1 --location "Room 101" --course 1
//! rollbook students enroll 3 --section 1
//! rollbook grades bulk 1 --set 3=88.5 --set 4=92
//! ```

use clap::Parser;
use rollbook::cli::{self, Cli};
use rollbook::config::{Config, LogConfig, LogFormat};
use rollbook::pages::Outcome;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(mut config) => {
            config.apply_env();
            config
        }
        Err(e) => {
            init_logging(&LogConfig::default());
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    };
    init_logging(&config.log);

    match cli::execute(cli, &config).await {
        Ok(Outcome::Failed) => std::process::exit(1),
        Ok(_) => {}
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr; stdout carries tables and JSON only.
fn init_logging(log: &LogConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| log.filter.as_str().into());

    match log.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
