//! Fehlertypen fuer den Relay-Service

use plauder_core::VerbindungsId;
use plauder_protocol::CodecFehler;
use thiserror::Error;

/// Fehlertyp fuer den Relay-Service
#[derive(Debug, Error)]
pub enum RelayFehler {
    /// Envelope konnte nicht kodiert werden
    #[error("Codec-Fehler: {0}")]
    Codec(#[from] CodecFehler),

    /// Senden an Verbindung fehlgeschlagen (Writer beendet)
    #[error("Senden an Verbindung {0} fehlgeschlagen")]
    SendFehler(VerbindungsId),

    /// Verbindung ist nicht (mehr) registriert
    #[error("Verbindung {0} nicht registriert")]
    NichtRegistriert(VerbindungsId),
}

/// Result-Typ fuer den Relay-Service
pub type RelayResult<T> = Result<T, RelayFehler>;
