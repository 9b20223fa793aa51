//! plauder-server
//!
//! `PLAUDER_CONFIG` zeigt auf die TOML-Konfiguration (Standard: `config.toml`).

use plauder_observability::logging_initialisieren;
use plauder_server::{config::ServerConfig, Server};
use std::path::Path;
use std::process::ExitCode;

const STANDARD_CONFIG: &str = "config.toml";

#[tokio::main]
async fn main() -> ExitCode {
    let config_pfad = std::env::var("PLAUDER_CONFIG").unwrap_or_else(|_| STANDARD_CONFIG.into());

    // Logging haengt von der Config ab, Fehler hier gehen daher direkt nach stderr
    let config = match ServerConfig::laden(&config_pfad) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };
    logging_initialisieren(&config.logging.level, &config.logging.format);

    if !Path::new(&config_pfad).exists() {
        tracing::warn!(pfad = %config_pfad, "Keine Konfigurationsdatei, verwende Standardwerte");
    }
    tracing::info!(version = env!("CARGO_PKG_VERSION"), config = %config_pfad, "Plauder Server startet");

    match Server::neu(config).starten().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(fehler = %format!("{e:#}"), "Server abgebrochen");
            ExitCode::FAILURE
        }
    }
}
