//! Gemeinsamer Server-Zustand fuer den Relay-Service
//!
//! Haelt Register, Broadcaster und Lebenszyklus-Handler. Alle drei teilen
//! dasselbe Register; der Zustand wird einmal beim Start erzeugt und per
//! Arc an die Verbindungs-Tasks gereicht.

use plauder_observability::Aktivitaetsprotokoll;
use std::sync::Arc;
use std::time::Instant;

use crate::broadcast::Broadcaster;
use crate::lifecycle::LebenszyklusHandler;
use crate::registry::Verbindungsregister;

/// Standard-Willkommensnachricht fuer neue Verbindungen
pub const STANDARD_WILLKOMMEN: &str = "Welcome to Plauder Chat!";

/// Konfiguration fuer den Relay-Service
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Anzeigename des Servers
    pub server_name: String,
    /// System-Hinweis an jede neue Verbindung
    pub willkommen: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            server_name: "Plauder Server".to_string(),
            willkommen: STANDARD_WILLKOMMEN.to_string(),
        }
    }
}

/// Gemeinsamer Server-Zustand (thread-safe, Arc-geteilt)
pub struct RelayZustand {
    /// Server-Konfiguration
    pub config: Arc<RelayConfig>,
    /// Alle offenen Verbindungen
    pub register: Verbindungsregister,
    /// Fan-out an alle anderen Verbindungen
    pub broadcaster: Broadcaster,
    /// Reagiert auf open/message/close/error
    pub lebenszyklus: LebenszyklusHandler,
    /// Startzeitpunkt des Servers (fuer Uptime-Berechnung)
    pub start_time: Instant,
}

impl RelayZustand {
    /// Erstellt einen neuen Zustand mit leerem Register
    pub fn neu(config: RelayConfig, protokoll: Arc<dyn Aktivitaetsprotokoll>) -> Arc<Self> {
        let register = Verbindungsregister::neu();
        let broadcaster = Broadcaster::neu(register.clone(), Arc::clone(&protokoll));
        let lebenszyklus = LebenszyklusHandler::neu(
            register.clone(),
            broadcaster.clone(),
            protokoll,
            config.willkommen.as_str(),
        );

        Arc::new(Self {
            config: Arc::new(config),
            register,
            broadcaster,
            lebenszyklus,
            start_time: Instant::now(),
        })
    }

    /// Gibt die Uptime in Sekunden zurueck
    pub fn uptime_sek(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::VerbindungsHandle;
    use plauder_core::VerbindungsId;
    use plauder_observability::KeinProtokoll;

    #[test]
    fn komponenten_teilen_ein_register() {
        let zustand = RelayZustand::neu(RelayConfig::default(), Arc::new(KeinProtokoll));
        let (handle, _rx) = VerbindungsHandle::neu(VerbindungsId::naechste());
        let id = handle.id();

        let _sitzung = zustand.lebenszyklus.oeffnen(handle);

        assert!(zustand.register.ist_registriert(&id));
        assert!(zustand.broadcaster.register().ist_registriert(&id));
        assert_eq!(zustand.uptime_sek(), 0);
    }

    #[test]
    fn standard_willkommen() {
        assert_eq!(RelayConfig::default().willkommen, STANDARD_WILLKOMMEN);
    }
}
