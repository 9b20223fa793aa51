//! JSON-Codec fuer Envelopes
//!
//! Ein eingehender Payload gilt nur dann als Envelope, wenn er ein
//! nicht-leeres JSON-Objekt ist. Fehlschlaege sind nie fatal:
//!
//! - Server: `server_dekodieren` verpackt den Rohtext als anonyme Nachricht
//! - Client: `client_dekodieren` verwirft die Nachricht mit einer Warnung

use serde_json::{Map, Value};
use thiserror::Error;

use crate::envelope::{Envelope, EnvelopeTyp};

/// Fehler beim Dekodieren oder Kodieren eines Envelopes
#[derive(Debug, Error)]
pub enum CodecFehler {
    /// Kein gueltiges JSON
    #[error("JSON-Fehler: {0}")]
    Json(#[from] serde_json::Error),

    /// Gueltiges JSON, aber kein Objekt (Zahl, String, Array, null)
    #[error("Payload ist kein JSON-Objekt")]
    KeinObjekt,

    /// Leeres Objekt `{}` traegt keine Nachricht
    #[error("Payload ist ein leeres JSON-Objekt")]
    LeeresObjekt,
}

/// Versucht einen Payload strukturiert als Envelope zu lesen
///
/// Jedes nicht-leere Objekt ist ein Envelope. Bekannte Felder mit falschem
/// JSON-Typ (z.B. `"type": 5`) landen unveraendert in `extra`.
pub fn dekodieren(roh: &str) -> Result<Envelope, CodecFehler> {
    match serde_json::from_str::<Value>(roh)? {
        Value::Object(map) if map.is_empty() => Err(CodecFehler::LeeresObjekt),
        Value::Object(map) => Ok(aus_objekt(map)),
        _ => Err(CodecFehler::KeinObjekt),
    }
}

fn aus_objekt(mut map: Map<String, Value>) -> Envelope {
    Envelope {
        typ: text_feld(&mut map, "type").map(EnvelopeTyp::from),
        user: text_feld(&mut map, "user"),
        content: text_feld(&mut map, "content"),
        message: text_feld(&mut map, "message"),
        timestamp: text_feld(&mut map, "timestamp"),
        extra: map,
    }
}

/// Entnimmt ein Feld nur wenn es ein String ist
fn text_feld(map: &mut Map<String, Value>, schluessel: &str) -> Option<String> {
    if !map.get(schluessel).is_some_and(Value::is_string) {
        return None;
    }
    match map.remove(schluessel) {
        Some(Value::String(text)) => Some(text),
        _ => None,
    }
}

/// Serverseitiges Dekodieren mit Fallback
///
/// Nicht dekodierbare Payloads werden zu
/// `{"type":"message","user":"Anonymous","content":<roh>,"timestamp":<jetzt>}`.
pub fn server_dekodieren(roh: &str) -> Envelope {
    match dekodieren(roh) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!(fehler = %e, "Payload nicht strukturiert – als anonyme Nachricht verpackt");
            Envelope::anonym(roh)
        }
    }
}

/// Clientseitiges Dekodieren: ungueltige Payloads werden verworfen
pub fn client_dekodieren(roh: &str) -> Option<Envelope> {
    match dekodieren(roh) {
        Ok(envelope) => Some(envelope),
        Err(e) => {
            tracing::warn!(fehler = %e, "Ungueltiges Nachrichtenformat empfangen");
            None
        }
    }
}

/// Serialisiert einen Envelope in das JSON-Wire-Format
pub fn kodieren(envelope: &Envelope) -> Result<String, CodecFehler> {
    Ok(serde_json::to_string(envelope)?)
}
