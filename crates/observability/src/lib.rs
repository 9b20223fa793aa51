//! # plauder-observability
//!
//! Observability-Crate fuer Plauder:
//! - Structured Logging via tracing-subscriber
//! - Append-only Aktivitaetsprotokoll (Verbindungen, Nachrichten, Fehler)

pub mod aktivitaet;
pub mod logging;

pub use aktivitaet::{
    Aktivitaetsprotokoll, DateiProtokoll, KeinProtokoll, SpeicherProtokoll, Stufe,
};
pub use logging::{logging_initialisieren, LogFormat};
