//! tracing-subscriber Setup
//!
//! Level und Format kommen aus der Konfiguration und koennen per
//! Umgebungsvariable ueberschrieben werden:
//! - `PLAUDER_LOG_LEVEL`: EnvFilter-Direktive, z.B. `debug` oder `plauder_relay=trace`
//! - `PLAUDER_LOG_FORMAT`: `text` oder `json`
//!
//! Ausgabe geht immer nach stderr, stdout gehoert dem interaktiven Client.

use std::str::FromStr;
use tracing_subscriber::{fmt, EnvFilter};

/// Umgebungsvariable fuer das Log-Level
pub const ENV_LEVEL: &str = "PLAUDER_LOG_LEVEL";
/// Umgebungsvariable fuer das Log-Format
pub const ENV_FORMAT: &str = "PLAUDER_LOG_FORMAT";

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Ausgabeformat der Log-Zeilen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Menschenlesbar, eine Zeile pro Event
    #[default]
    Text,
    /// Ein JSON-Objekt pro Event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            anderes => Err(format!("unbekanntes Log-Format '{anderes}'")),
        }
    }
}

/// Installiert den globalen Subscriber.
///
/// Ein zweiter Aufruf im selben Prozess aendert nichts.
pub fn logging_initialisieren(level: &str, format: &str) {
    let filter = EnvFilter::try_from_env(ENV_LEVEL)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format = std::env::var(ENV_FORMAT)
        .ok()
        .and_then(|f| f.parse().ok())
        .or_else(|| format.parse().ok())
        .unwrap_or_default();

    let ergebnis = match format {
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_thread_ids(true)
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Text => fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    if ergebnis.is_err() {
        tracing::debug!("Subscriber bereits installiert");
    }
}

/// Prueft ein einfaches Level ohne Target-Direktiven
pub fn log_level_gueltig(level: &str) -> bool {
    LEVELS.contains(&level)
}

pub fn log_format_gueltig(format: &str) -> bool {
    format.parse::<LogFormat>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_pruefung() {
        assert!(LEVELS.iter().all(|l| log_level_gueltig(l)));
        assert!(!log_level_gueltig("verbose"));
        assert!(!log_level_gueltig("INFO"));
        assert!(!log_level_gueltig(""));
    }

    #[test]
    fn format_parsen() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("text".parse::<LogFormat>(), Ok(LogFormat::Text));
        assert!(!log_format_gueltig("JSON"));
        assert!(!log_format_gueltig("xml"));
    }

    #[test]
    fn doppelte_initialisierung_paniert_nicht() {
        logging_initialisieren("warn", "text");
        logging_initialisieren("debug", "json");
    }
}
