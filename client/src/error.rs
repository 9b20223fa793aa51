//! Fehlertypen fuer den Client

use plauder_protocol::CodecFehler;
use thiserror::Error;

/// Fehler die bei der Server-Verbindung auftreten koennen
#[derive(Debug, Error)]
pub enum ClientFehler {
    /// Verbindungsaufbau fehlgeschlagen (Server nicht erreichbar, Handshake)
    #[error("Verbindung fehlgeschlagen: {0}")]
    Verbindung(#[source] tokio_tungstenite::tungstenite::Error),

    /// Senden auf bestehender Verbindung fehlgeschlagen
    #[error("Senden fehlgeschlagen: {0}")]
    Senden(#[source] tokio_tungstenite::tungstenite::Error),

    /// Envelope nicht kodierbar
    #[error("Codec-Fehler: {0}")]
    Codec(#[from] CodecFehler),
}

/// Result-Typ fuer den Client
pub type ClientResult<T> = Result<T, ClientFehler>;
