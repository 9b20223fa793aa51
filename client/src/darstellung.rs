//! Darstellung empfangener Envelopes
//!
//! Die Zuordnung vom Envelope-Typ zur Ausgabe passiert in `anzeigen`;
//! wohin geschrieben wird, entscheidet die `Darstellung`.

use plauder_protocol::{kodieren, Envelope, EnvelopeTyp};
use std::io::Write;

/// Ausgabe-Senke fuer den Client
pub trait Darstellung: Send + 'static {
    /// Hinweis vom Server
    fn system(&mut self, text: &str);
    /// Chat-Zeile eines anderen Teilnehmers
    fn nachricht(&mut self, user: &str, content: &str);
    /// Jemand hat den Chat betreten
    fn beigetreten(&mut self, user: &str);
    /// Unbekannter Typ, roh ausgegeben
    fn unbekannt(&mut self, roh: &str);
}

/// Verteilt einen Envelope nach Typ auf die Darstellung
pub fn anzeigen<D: Darstellung + ?Sized>(darstellung: &mut D, envelope: &Envelope) {
    let feld = |f: &Option<String>| f.clone().unwrap_or_default();

    match &envelope.typ {
        Some(EnvelopeTyp::System) => darstellung.system(&feld(&envelope.message)),
        Some(EnvelopeTyp::Message) => {
            darstellung.nachricht(&feld(&envelope.user), &feld(&envelope.content))
        }
        Some(EnvelopeTyp::Join) => darstellung.beigetreten(&feld(&envelope.user)),
        Some(EnvelopeTyp::Unbekannt(_)) | None => {
            let roh = kodieren(envelope).unwrap_or_else(|e| format!("<{e}>"));
            darstellung.unbekannt(&roh);
        }
    }
}

/// Schreibt Zeilen im Stil `[SYSTEM] ...` auf einen Writer (normalerweise stdout)
pub struct KonsolenDarstellung<W: Write + Send + 'static> {
    ausgabe: W,
}

impl KonsolenDarstellung<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::neu(std::io::stdout())
    }
}

impl<W: Write + Send + 'static> KonsolenDarstellung<W> {
    pub fn neu(ausgabe: W) -> Self {
        Self { ausgabe }
    }

    pub fn into_inner(self) -> W {
        self.ausgabe
    }

    fn zeile(&mut self, text: std::fmt::Arguments<'_>) {
        // Ausgabefehler (z.B. geschlossenes Terminal) sind nicht behebbar
        let _ = writeln!(self.ausgabe, "\n{text}");
        let _ = self.ausgabe.flush();
    }
}

impl<W: Write + Send + 'static> Darstellung for KonsolenDarstellung<W> {
    fn system(&mut self, text: &str) {
        self.zeile(format_args!("[SYSTEM] {text}"));
    }

    fn nachricht(&mut self, user: &str, content: &str) {
        self.zeile(format_args!("[{user}] {content}"));
    }

    fn beigetreten(&mut self, user: &str) {
        self.zeile(format_args!("[SYSTEM] {user} joined the chat"));
    }

    fn unbekannt(&mut self, roh: &str) {
        self.zeile(format_args!("[UNKNOWN] {roh}"));
    }
}
