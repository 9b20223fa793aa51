//! Lebenszyklus einer Verbindung
//!
//! Der Transport liefert pro Verbindung die Ereignisse open, message,
//! close und error. Der `LebenszyklusHandler` setzt sie in Aenderungen am
//! Register, System-Hinweise und Broadcasts um.
//!
//! ## State Machine
//! ```text
//! Offen --(registriert + Willkommen)--> Aktiv --close--> Geschlossen
//!                                         |                  ^
//!                                         +------error-------+
//! ```
//!
//! Nach `Geschlossen` werden alle weiteren Ereignisse ignoriert.

use plauder_core::VerbindungsId;
use plauder_observability::Aktivitaetsprotokoll;
use plauder_protocol::{server_dekodieren, Envelope};
use std::sync::Arc;

use crate::broadcast::{Broadcaster, Zustellbericht};
use crate::registry::{VerbindungsHandle, Verbindungsregister};

// ---------------------------------------------------------------------------
// Zustand und Ereignisse
// ---------------------------------------------------------------------------

/// Zustand einer Verbindung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbindungsZustand {
    /// Transport offen, noch nicht registriert
    Offen,
    /// Registriert, Nachrichten werden verteilt
    Aktiv,
    /// Endzustand
    Geschlossen,
}

/// Ereignis des Transports nach dem Oeffnen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ereignis {
    /// Eingehender Payload (Text)
    Nachricht(String),
    /// Transport wurde geschlossen
    Geschlossen,
    /// Transportfehler
    Fehler(String),
}

/// Zustand einer einzelnen Verbindung aus Sicht des Handlers
#[derive(Debug)]
pub struct Sitzung {
    handle: VerbindungsHandle,
    zustand: VerbindungsZustand,
}

impl Sitzung {
    pub fn id(&self) -> VerbindungsId {
        self.handle.id()
    }

    pub fn zustand(&self) -> VerbindungsZustand {
        self.zustand
    }

    pub fn ist_geschlossen(&self) -> bool {
        self.zustand == VerbindungsZustand::Geschlossen
    }
}

// ---------------------------------------------------------------------------
// LebenszyklusHandler
// ---------------------------------------------------------------------------

/// Reagiert auf Verbindungs-Ereignisse
///
/// Clone teilt Register, Broadcaster und Protokoll.
#[derive(Clone)]
pub struct LebenszyklusHandler {
    register: Verbindungsregister,
    broadcaster: Broadcaster,
    protokoll: Arc<dyn Aktivitaetsprotokoll>,
    willkommen: Arc<str>,
}

impl LebenszyklusHandler {
    /// Erstellt einen Handler
    pub fn neu(
        register: Verbindungsregister,
        broadcaster: Broadcaster,
        protokoll: Arc<dyn Aktivitaetsprotokoll>,
        willkommen: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            register,
            broadcaster,
            protokoll,
            willkommen: willkommen.into(),
        }
    }

    /// Transport-"open": registrieren, dann Willkommen nur an diese Verbindung
    pub fn oeffnen(&self, handle: VerbindungsHandle) -> Sitzung {
        let mut sitzung = Sitzung {
            handle,
            zustand: VerbindungsZustand::Offen,
        };
        let id = sitzung.id();

        self.register.hinzufuegen(sitzung.handle.clone());
        self.protokoll.info(&format!("New connection! ({id})"));
        tracing::info!(verbindung = %id, online = self.register.anzahl(), "Neue Verbindung");

        let willkommen = Envelope::system(&*self.willkommen);
        if let Err(e) = self.broadcaster.an_einen_senden(&id, &willkommen) {
            tracing::warn!(verbindung = %id, fehler = %e, "Willkommen nicht zustellbar");
        }

        sitzung.zustand = VerbindungsZustand::Aktiv;
        sitzung
    }

    /// Verarbeitet ein Ereignis fuer eine Sitzung
    ///
    /// Gibt bei Nachrichten den Zustellbericht zurueck.
    pub fn verarbeiten(&self, sitzung: &mut Sitzung, ereignis: Ereignis) -> Option<Zustellbericht> {
        let id = sitzung.id();
        if sitzung.ist_geschlossen() {
            tracing::trace!(verbindung = %id, ?ereignis, "Ereignis nach Schliessen ignoriert");
            return None;
        }

        match ereignis {
            Ereignis::Nachricht(roh) => {
                let envelope = server_dekodieren(&roh);
                Some(self.broadcaster.verteilen(id, &envelope))
            }
            Ereignis::Geschlossen => {
                self.register.entfernen(&id);
                sitzung.zustand = VerbindungsZustand::Geschlossen;
                self.protokoll.info(&format!("Connection {id} has disconnected"));
                tracing::info!(verbindung = %id, online = self.register.anzahl(), "Verbindung getrennt");
                None
            }
            Ereignis::Fehler(fehler) => {
                tracing::error!(verbindung = %id, fehler = %fehler, "Transportfehler");
                self.protokoll.fehler(&format!("An error has occurred: {fehler}"));
                sitzung.handle.schliessen();
                // Das spaetere close des Transports trifft dann auf eine
                // bereits geschlossene Sitzung
                self.register.entfernen(&id);
                sitzung.zustand = VerbindungsZustand::Geschlossen;
                None
            }
        }
    }

    pub fn register(&self) -> &Verbindungsregister {
        &self.register
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Ausgehend;
    use plauder_observability::{SpeicherProtokoll, Stufe};
    use plauder_protocol::{dekodieren, EnvelopeTyp, ANONYM};
    use tokio::sync::mpsc::UnboundedReceiver;

    const WILLKOMMEN: &str = "Willkommen im Test!";

    fn handler() -> (LebenszyklusHandler, Arc<SpeicherProtokoll>) {
        let register = Verbindungsregister::neu();
        let protokoll = Arc::new(SpeicherProtokoll::neu());
        let broadcaster = Broadcaster::neu(register.clone(), protokoll.clone());
        (
            LebenszyklusHandler::neu(register, broadcaster, protokoll.clone(), WILLKOMMEN),
            protokoll,
        )
    }

    fn oeffnen(h: &LebenszyklusHandler) -> (Sitzung, UnboundedReceiver<Ausgehend>) {
        let (handle, rx) = VerbindungsHandle::neu(VerbindungsId::naechste());
        (h.oeffnen(handle), rx)
    }

    fn envelopes(rx: &mut UnboundedReceiver<Ausgehend>) -> Vec<Envelope> {
        let mut liste = Vec::new();
        while let Ok(Ausgehend::Text(t)) = rx.try_recv() {
            liste.push(dekodieren(&t).unwrap());
        }
        liste
    }

    #[test]
    fn oeffnen_sendet_genau_ein_willkommen() {
        let (h, protokoll) = handler();
        let (sitzung, mut rx) = oeffnen(&h);

        assert_eq!(sitzung.zustand(), VerbindungsZustand::Aktiv);
        assert!(h.register().ist_registriert(&sitzung.id()));

        let empfangen = envelopes(&mut rx);
        assert_eq!(empfangen.len(), 1);
        assert_eq!(empfangen[0].typ, Some(EnvelopeTyp::System));
        assert_eq!(empfangen[0].message.as_deref(), Some(WILLKOMMEN));

        assert_eq!(
            protokoll.eintraege()[0].1,
            format!("New connection! ({})", sitzung.id())
        );
    }

    #[test]
    fn willkommen_wird_nicht_verteilt() {
        let (h, _p) = handler();
        let (_a, mut rx_a) = oeffnen(&h);
        envelopes(&mut rx_a);

        let (_b, _rx_b) = oeffnen(&h);
        assert!(envelopes(&mut rx_a).is_empty(), "A darf Bs Willkommen nicht sehen");
    }

    #[test]
    fn drei_verbindungen_szenario() {
        let (h, _p) = handler();
        let (mut a, mut rx_a) = oeffnen(&h);
        let (_b, mut rx_b) = oeffnen(&h);
        let (_c, mut rx_c) = oeffnen(&h);
        for rx in [&mut rx_a, &mut rx_b, &mut rx_c] {
            envelopes(rx);
        }

        let bericht = h.verarbeiten(
            &mut a,
            Ereignis::Nachricht(r#"{"type":"message","user":"alice","content":"hi"}"#.into()),
        );
        assert_eq!(bericht.map(|b| b.zugestellt), Some(2));

        for rx in [&mut rx_b, &mut rx_c] {
            let empfangen = envelopes(rx);
            assert_eq!(empfangen.len(), 1);
            assert_eq!(empfangen[0].user.as_deref(), Some("alice"));
            assert_eq!(empfangen[0].content.as_deref(), Some("hi"));
        }
        assert!(envelopes(&mut rx_a).is_empty());
    }

    #[test]
    fn geschlossene_verbindung_empfaengt_nichts() {
        let (h, _p) = handler();
        let (mut a, _rx_a) = oeffnen(&h);
        let (mut b, mut rx_b) = oeffnen(&h);
        let (_c, mut rx_c) = oeffnen(&h);
        envelopes(&mut rx_b);
        envelopes(&mut rx_c);

        h.verarbeiten(&mut b, Ereignis::Geschlossen);
        assert!(b.ist_geschlossen());
        // Doppeltes close ist kein Fehler
        assert!(h.verarbeiten(&mut b, Ereignis::Geschlossen).is_none());
        h.register().entfernen(&b.id());

        let bericht = h
            .verarbeiten(&mut a, Ereignis::Nachricht(r#"{"type":"message","user":"a","content":"x"}"#.into()))
            .unwrap();
        assert_eq!(bericht.zugestellt, 1);
        assert!(envelopes(&mut rx_b).is_empty());
        assert_eq!(envelopes(&mut rx_c).len(), 1);
    }

    #[test]
    fn rohtext_wird_anonym_verteilt() {
        let (h, _p) = handler();
        let (mut a, _rx_a) = oeffnen(&h);
        let (_b, mut rx_b) = oeffnen(&h);
        envelopes(&mut rx_b);

        h.verarbeiten(&mut a, Ereignis::Nachricht("kein json".into()));

        let empfangen = envelopes(&mut rx_b);
        assert_eq!(empfangen[0].typ, Some(EnvelopeTyp::Message));
        assert_eq!(empfangen[0].user.as_deref(), Some(ANONYM));
        assert_eq!(empfangen[0].content.as_deref(), Some("kein json"));
    }

    #[test]
    fn fehler_schliesst_und_entfernt() {
        let (h, protokoll) = handler();
        let (mut a, mut rx_a) = oeffnen(&h);
        envelopes(&mut rx_a);

        h.verarbeiten(&mut a, Ereignis::Fehler("Verbindung zurueckgesetzt".into()));

        assert!(a.ist_geschlossen());
        assert!(!h.register().ist_registriert(&a.id()));
        assert_eq!(rx_a.try_recv().unwrap(), Ausgehend::Schliessen);
        assert!(protokoll
            .eintraege()
            .iter()
            .any(|(s, t)| *s == Stufe::Fehler && t.contains("Verbindung zurueckgesetzt")));

        // Das nachfolgende close des Transports ist ein No-op
        assert!(h.verarbeiten(&mut a, Ereignis::Geschlossen).is_none());
    }

    #[test]
    fn ereignisse_nach_schliessen_werden_ignoriert() {
        let (h, _p) = handler();
        let (mut a, _rx_a) = oeffnen(&h);
        let (_b, mut rx_b) = oeffnen(&h);
        envelopes(&mut rx_b);

        h.verarbeiten(&mut a, Ereignis::Geschlossen);
        let bericht = h.verarbeiten(&mut a, Ereignis::Nachricht("spaet".into()));

        assert!(bericht.is_none());
        assert!(envelopes(&mut rx_b).is_empty());
    }
}
