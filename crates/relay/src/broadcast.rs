//! Broadcaster – Verteilt Nachrichten an alle anderen Verbindungen
//!
//! Ein Envelope wird genau einmal kodiert und dann in die Queue jeder
//! registrierten Verbindung ausser der Herkunft eingereiht.
//!
//! ## Fehlerverhalten
//! - Scheitert das Senden an einen Empfaenger, wird das geloggt und
//!   gezaehlt; die uebrigen Empfaenger bekommen die Nachricht trotzdem.
//! - Die Herkunft erfaehrt nichts von Zustellfehlern.
//! - Jede eingehende Nachricht landet im Aktivitaetsprotokoll.

use plauder_core::VerbindungsId;
use plauder_observability::Aktivitaetsprotokoll;
use plauder_protocol::{kodieren, Envelope};
use std::sync::Arc;

use crate::error::{RelayFehler, RelayResult};
use crate::registry::Verbindungsregister;

/// Ergebnis eines Broadcasts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Zustellbericht {
    /// Erfolgreich eingereihte Kopien
    pub zugestellt: usize,
    /// Empfaenger deren Writer bereits beendet war
    pub fehlgeschlagen: usize,
}

/// Verteilt Envelopes ueber das Verbindungsregister
///
/// Clone teilt Register und Protokoll.
#[derive(Clone)]
pub struct Broadcaster {
    register: Verbindungsregister,
    protokoll: Arc<dyn Aktivitaetsprotokoll>,
}

impl Broadcaster {
    /// Erstellt einen Broadcaster ueber dem gegebenen Register
    pub fn neu(register: Verbindungsregister, protokoll: Arc<dyn Aktivitaetsprotokoll>) -> Self {
        Self {
            register,
            protokoll,
        }
    }

    /// Sendet einen Envelope an alle Verbindungen ausser `herkunft`
    pub fn verteilen(&self, herkunft: VerbindungsId, envelope: &Envelope) -> Zustellbericht {
        let kodiert = match kodieren(envelope) {
            Ok(k) => k,
            Err(e) => {
                tracing::error!(verbindung = %herkunft, fehler = %e, "Envelope nicht kodierbar");
                return Zustellbericht::default();
            }
        };

        self.protokoll
            .info(&format!("Message from {herkunft}: {kodiert}"));

        let mut bericht = Zustellbericht::default();
        for empfaenger in self.register.alle_ausser(&herkunft) {
            match empfaenger.senden(kodiert.clone()) {
                Ok(()) => bericht.zugestellt += 1,
                Err(e) => {
                    tracing::debug!(
                        verbindung = %empfaenger.id(),
                        fehler = %e,
                        "Zustellung fehlgeschlagen (Verbindung getrennt)"
                    );
                    bericht.fehlgeschlagen += 1;
                }
            }
        }

        tracing::trace!(
            verbindung = %herkunft,
            zugestellt = bericht.zugestellt,
            fehlgeschlagen = bericht.fehlgeschlagen,
            "Broadcast abgeschlossen"
        );
        bericht
    }

    /// Sendet einen Envelope nur an eine Verbindung
    pub fn an_einen_senden(&self, ziel: &VerbindungsId, envelope: &Envelope) -> RelayResult<()> {
        let handle = self
            .register
            .get(ziel)
            .ok_or(RelayFehler::NichtRegistriert(*ziel))?;
        handle.senden(kodieren(envelope)?)
    }

    /// Das zugrundeliegende Register
    pub fn register(&self) -> &Verbindungsregister {
        &self.register
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
