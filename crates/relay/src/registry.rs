//! Verbindungsregister – Wer ist gerade verbunden
//!
//! Das Register haelt fuer jede offene Verbindung genau einen
//! `VerbindungsHandle`. Mitgliedschaft entspricht exakt den Verbindungen,
//! fuer die "open" gefeuert hat und weder "close" noch ein fataler Fehler.
//!
//! ## Snapshots
//! `alle_ausser` liefert eine Kopie der Handles, keinen Live-Iterator.
//! Gleichzeitiges Hinzufuegen/Entfernen veraendert einen laufenden
//! Broadcast daher nicht.

use dashmap::DashMap;
use plauder_core::VerbindungsId;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::{RelayFehler, RelayResult};

// ---------------------------------------------------------------------------
// VerbindungsHandle
// ---------------------------------------------------------------------------

/// Auftrag an den Writer einer Verbindung
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ausgehend {
    /// Text-Frame senden
    Text(String),
    /// Verbindung schliessen
    Schliessen,
}

/// Transport-Handle einer Verbindung
///
/// Die Queue ist unbegrenzt: langsame Empfaenger werden weder erkannt
/// noch getrennt.
#[derive(Clone, Debug)]
pub struct VerbindungsHandle {
    id: VerbindungsId,
    tx: mpsc::UnboundedSender<Ausgehend>,
}

impl VerbindungsHandle {
    /// Erstellt ein Handle und die zugehoerige Empfangs-Queue
    ///
    /// Die `ClientConnection` liest aus der Queue und schreibt auf den Socket.
    pub fn neu(id: VerbindungsId) -> (Self, mpsc::UnboundedReceiver<Ausgehend>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { id, tx }, rx)
    }

    pub fn id(&self) -> VerbindungsId {
        self.id
    }

    /// Reiht einen Text-Frame ein (blockiert nie)
    pub fn senden(&self, text: String) -> RelayResult<()> {
        self.tx
            .send(Ausgehend::Text(text))
            .map_err(|_| RelayFehler::SendFehler(self.id))
    }

    /// Fordert das Schliessen der Verbindung an
    ///
    /// Ist der Writer bereits beendet, passiert nichts.
    pub fn schliessen(&self) {
        if self.tx.send(Ausgehend::Schliessen).is_err() {
            tracing::debug!(verbindung = %self.id, "Schliessen: Writer bereits beendet");
        }
    }

    /// Prueft ob der Writer noch laeuft
    pub fn ist_offen(&self) -> bool {
        !self.tx.is_closed()
    }
}

// ---------------------------------------------------------------------------
// Verbindungsregister
// ---------------------------------------------------------------------------

/// Menge aller offenen Verbindungen
///
/// Thread-safe via Arc + DashMap. Clone teilt den inneren Zustand.
#[derive(Clone, Default)]
pub struct Verbindungsregister {
    inner: Arc<DashMap<VerbindungsId, VerbindungsHandle>>,
}

impl Verbindungsregister {
    /// Erstellt ein leeres Register
    pub fn neu() -> Self {
        Self::default()
    }

    /// Registriert eine neu geoeffnete Verbindung
    ///
    /// Gibt `false` zurueck wenn die ID bereits registriert ist; der
    /// bestehende Eintrag bleibt dann unveraendert.
    pub fn hinzufuegen(&self, handle: VerbindungsHandle) -> bool {
        let id = handle.id();
        match self.inner.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                tracing::warn!(verbindung = %id, "Verbindung bereits registriert");
                false
            }
            dashmap::mapref::entry::Entry::Vacant(eintrag) => {
                eintrag.insert(handle);
                tracing::debug!(verbindung = %id, "Verbindung registriert");
                true
            }
        }
    }

    /// Entfernt eine Verbindung
    ///
    /// Idempotent: eine unbekannte oder bereits entfernte ID ist kein Fehler.
    pub fn entfernen(&self, id: &VerbindungsId) -> Option<VerbindungsHandle> {
        let entfernt = self.inner.remove(id).map(|(_, handle)| handle);
        if entfernt.is_some() {
            tracing::debug!(verbindung = %id, "Verbindung aus Register entfernt");
        }
        entfernt
    }

    /// Snapshot aller Verbindungen ausser `ausgeschlossen`
    ///
    /// Sortiert nach ID, also in Oeffnungsreihenfolge.
    pub fn alle_ausser(&self, ausgeschlossen: &VerbindungsId) -> Vec<VerbindungsHandle> {
        let mut handles: Vec<VerbindungsHandle> = self
            .inner
            .iter()
            .filter(|entry| entry.key() != ausgeschlossen)
            .map(|entry| entry.value().clone())
            .collect();
        handles.sort_by_key(VerbindungsHandle::id);
        handles
    }

    /// Handle einer einzelnen Verbindung
    pub fn get(&self, id: &VerbindungsId) -> Option<VerbindungsHandle> {
        self.inner.get(id).map(|entry| entry.value().clone())
    }

    /// Prueft ob eine Verbindung registriert ist
    pub fn ist_registriert(&self, id: &VerbindungsId) -> bool {
        self.inner.contains_key(id)
    }

    /// Anzahl der registrierten Verbindungen
    pub fn anzahl(&self) -> usize {
        self.inner.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn neue_verbindung() -> (VerbindungsHandle, mpsc::UnboundedReceiver<Ausgehend>) {
        VerbindungsHandle::neu(VerbindungsId::naechste())
    }

    #[test]
    fn hinzufuegen_und_entfernen() {
        let register = Verbindungsregister::neu();
        let (a, _rx_a) = neue_verbindung();
        let id = a.id();

        assert!(register.hinzufuegen(a));
        assert!(register.ist_registriert(&id));
        assert_eq!(register.anzahl(), 1);

        assert!(register.entfernen(&id).is_some());
        assert!(!register.ist_registriert(&id));
        assert_eq!(register.anzahl(), 0);
    }

    #[test]
    fn keine_doppelten_eintraege() {
        let register = Verbindungsregister::neu();
        let (a, _rx) = neue_verbindung();

        assert!(register.hinzufuegen(a.clone()));
        assert!(!register.hinzufuegen(a));
        assert_eq!(register.anzahl(), 1);
    }

    #[test]
    fn entfernen_ist_idempotent() {
        let register = Verbindungsregister::neu();
        let (a, _rx) = neue_verbindung();
        let id = a.id();
        register.hinzufuegen(a);

        assert!(register.entfernen(&id).is_some());
        assert!(register.entfernen(&id).is_none());
        // Nie registrierte ID
        assert!(register.entfernen(&VerbindungsId::naechste()).is_none());
        assert_eq!(register.anzahl(), 0);
    }

    #[test]
    fn alle_ausser_schliesst_herkunft_aus() {
        let register = Verbindungsregister::neu();
        let (a, _ra) = neue_verbindung();
        let (b, _rb) = neue_verbindung();
        let (c, _rc) = neue_verbindung();
        let (id_a, id_b, id_c) = (a.id(), b.id(), c.id());
        register.hinzufuegen(a);
        register.hinzufuegen(c);
        register.hinzufuegen(b);

        let ids: Vec<_> = register.alle_ausser(&id_a).iter().map(|h| h.id()).collect();
        assert_eq!(ids, vec![id_b, id_c], "Sortiert nach Oeffnungsreihenfolge");
    }

    #[test]
    fn snapshot_bleibt_bei_aenderung_stabil() {
        let register = Verbindungsregister::neu();
        let (a, _ra) = neue_verbindung();
        let (b, _rb) = neue_verbindung();
        let id_b = b.id();
        register.hinzufuegen(a.clone());
        register.hinzufuegen(b);

        let snapshot = register.alle_ausser(&a.id());
        register.entfernen(&id_b);
        let (c, _rc) = neue_verbindung();
        register.hinzufuegen(c);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id(), id_b);
    }

    #[test]
    fn mitgliedschaft_folgt_open_close_folge() {
        // Beliebige Folge von open/close: Register == Menge offener IDs
        let register = Verbindungsregister::neu();
        let mut erwartet = BTreeSet::new();
        let mut receivers = Vec::new();
        let mut offene = Vec::new();

        for schritt in 0..40u32 {
            if schritt % 3 == 2 && !offene.is_empty() {
                let index = (schritt as usize * 7) % offene.len();
                let id: VerbindungsId = offene.remove(index);
                register.entfernen(&id);
                // Doppeltes close
                register.entfernen(&id);
                erwartet.remove(&id);
            } else {
                let (h, rx) = neue_verbindung();
                erwartet.insert(h.id());
                offene.push(h.id());
                register.hinzufuegen(h);
                receivers.push(rx);
            }
            let ist: BTreeSet<_> = register.inner.iter().map(|e| *e.key()).collect();
            assert_eq!(ist, erwartet, "Abweichung nach Schritt {schritt}");
        }
    }

    #[test]
    fn handle_senden_und_schliessen() {
        let (h, mut rx) = neue_verbindung();
        h.senden("hallo".into()).unwrap();
        h.schliessen();
        assert_eq!(rx.try_recv().unwrap(), Ausgehend::Text("hallo".into()));
        assert_eq!(rx.try_recv().unwrap(), Ausgehend::Schliessen);

        drop(rx);
        assert!(!h.ist_offen());
        assert!(matches!(h.senden("weg".into()), Err(RelayFehler::SendFehler(_))));
        // Schliessen nach Ende ist harmlos
        h.schliessen();
    }
}
