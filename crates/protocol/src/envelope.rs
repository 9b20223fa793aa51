//! Envelope – Die Nachrichteneinheit auf dem Draht
//!
//! ```text
//! { "type": "join" | "message" | "system" | <anderer>,
//!   "user": string,
//!   "content": string,
//!   "message": string,
//!   "timestamp": string }
//! ```
//!
//! Alle Felder sind optional. Unbekannte Zusatzfelder werden beim
//! Weiterleiten unveraendert mitgeschickt.

use plauder_core::zeitstempel_jetzt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Benutzername fuer Nachrichten ohne strukturierten Absender
pub const ANONYM: &str = "Anonymous";

// ---------------------------------------------------------------------------
// Nachrichtentyp
// ---------------------------------------------------------------------------

/// Typ eines Envelopes
///
/// Geschlossene Menge bekannter Typen plus expliziter `Unbekannt`-Fall,
/// der den empfangenen Wert behaelt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EnvelopeTyp {
    /// Client meldet sich an (rein informativ)
    Join,
    /// Chat-Nachricht
    Message,
    /// Hinweis vom Server
    System,
    /// Jeder andere Wert
    Unbekannt(String),
}

impl EnvelopeTyp {
    /// Wire-Darstellung des Typs
    pub fn als_str(&self) -> &str {
        match self {
            Self::Join => "join",
            Self::Message => "message",
            Self::System => "system",
            Self::Unbekannt(s) => s,
        }
    }
}

impl From<String> for EnvelopeTyp {
    fn from(s: String) -> Self {
        match s.as_str() {
            "join" => Self::Join,
            "message" => Self::Message,
            "system" => Self::System,
            _ => Self::Unbekannt(s),
        }
    }
}

impl From<EnvelopeTyp> for String {
    fn from(typ: EnvelopeTyp) -> Self {
        match typ {
            EnvelopeTyp::Unbekannt(s) => s,
            bekannt => bekannt.als_str().to_string(),
        }
    }
}

impl std::fmt::Display for EnvelopeTyp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.als_str())
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Strukturierte Nachricht zwischen Client und Server
///
/// Enthaelt keine IDs, Sequenznummern oder Zustellgarantien.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<EnvelopeTyp>,

    /// Absender (frei waehlbar, serverseitig nicht geprueft)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Nutzlast einer Chat-Nachricht
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Text eines System-Hinweises
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Menschenlesbarer Erstellungszeitpunkt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Unbekannte Felder, werden beim Weiterleiten beibehalten
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    /// Anmelde-Envelope des Clients
    pub fn join(user: impl Into<String>) -> Self {
        Self {
            typ: Some(EnvelopeTyp::Join),
            user: Some(user.into()),
            timestamp: Some(zeitstempel_jetzt()),
            ..Default::default()
        }
    }

    /// Chat-Nachricht
    pub fn nachricht(user: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            typ: Some(EnvelopeTyp::Message),
            user: Some(user.into()),
            content: Some(content.into()),
            timestamp: Some(zeitstempel_jetzt()),
            ..Default::default()
        }
    }

    /// System-Hinweis vom Server
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            typ: Some(EnvelopeTyp::System),
            message: Some(text.into()),
            timestamp: Some(zeitstempel_jetzt()),
            ..Default::default()
        }
    }

    /// Verpackt einen nicht dekodierbaren Payload als anonyme Nachricht
    pub fn anonym(roh: impl Into<String>) -> Self {
        Self::nachricht(ANONYM, roh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typ_aus_string() {
        assert_eq!(EnvelopeTyp::from("join".to_string()), EnvelopeTyp::Join);
        assert_eq!(EnvelopeTyp::from("system".to_string()), EnvelopeTyp::System);
        assert_eq!(
            EnvelopeTyp::from("typing".to_string()),
            EnvelopeTyp::Unbekannt("typing".into())
        );
    }

    #[test]
    fn unbekannter_typ_behaelt_wert() {
        let s: String = EnvelopeTyp::Unbekannt("emote".into()).into();
        assert_eq!(s, "emote");
    }

    #[test]
    fn system_envelope_serialisierung() {
        let env = Envelope::system("Hallo");
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["type"], "system");
        assert_eq!(json["message"], "Hallo");
        assert!(json.get("user").is_none(), "Leere Felder werden weggelassen");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn zusatzfelder_bleiben_erhalten() {
        let roh = r#"{"type":"message","user":"bob","content":"x","farbe":"blau"}"#;
        let env: Envelope = serde_json::from_str(roh).unwrap();
        assert_eq!(env.extra.get("farbe"), Some(&Value::from("blau")));

        let zurueck = serde_json::to_value(&env).unwrap();
        assert_eq!(zurueck["farbe"], "blau");
    }

    #[test]
    fn anonym_setzt_absender() {
        let env = Envelope::anonym("rohtext");
        assert_eq!(env.typ, Some(EnvelopeTyp::Message));
        assert_eq!(env.user.as_deref(), Some(ANONYM));
        assert_eq!(env.content.as_deref(), Some("rohtext"));
    }
}
