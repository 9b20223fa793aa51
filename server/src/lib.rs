//! plauder-server
//!
//! Verdrahtet Konfiguration, Aktivitaetsprotokoll und Relay zu einem
//! lauffaehigen Prozess.

pub mod config;

use anyhow::{Context, Result};
use config::ServerConfig;
use plauder_observability::{Aktivitaetsprotokoll, DateiProtokoll, KeinProtokoll};
use plauder_relay::{RelayServer, RelayZustand};
use std::sync::Arc;

/// Kanalname im Aktivitaetsprotokoll
const PROTOKOLL_KANAL: &str = "chat_server";

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet den Relay und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Aktivitaetsprotokoll oeffnen (Fehler sind nicht fatal)
    /// 2. WebSocket-Listener binden (Fehler ist fatal)
    /// 3. Auf Ctrl-C warten, dann alle Verbindungen trennen
    pub async fn starten(self) -> Result<()> {
        let protokoll = self.protokoll_oeffnen();
        let zustand = RelayZustand::neu(self.config.relay_config(), protokoll);

        let adresse = self.config.bind_adresse();
        let server = RelayServer::binden(Arc::clone(&zustand), adresse.as_str())
            .await
            .with_context(|| format!("Listener konnte nicht an {adresse} gebunden werden"))?;

        tracing::info!(
            server_name = %self.config.server.name,
            adresse = %server.lokale_adresse()?,
            "Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)..."
        );

        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutdown-Signal empfangen, Server wird beendet"),
                Err(e) => tracing::error!(fehler = %e, "Ctrl-C-Handler nicht installierbar"),
            }
            let _ = shutdown_tx.send(true);
        });

        server.starten(shutdown_rx).await?;

        tracing::info!(uptime_sek = zustand.uptime_sek(), "Server beendet");
        Ok(())
    }

    /// Oeffnet das Aktivitaetsprotokoll laut Konfiguration
    fn protokoll_oeffnen(&self) -> Arc<dyn Aktivitaetsprotokoll> {
        let Some(pfad) = self.config.logging.aktivitaet_datei.as_deref() else {
            return Arc::new(KeinProtokoll);
        };

        match DateiProtokoll::oeffnen(pfad, PROTOKOLL_KANAL) {
            Ok(protokoll) => {
                tracing::info!(pfad = %protokoll.pfad().display(), "Aktivitaetsprotokoll geoeffnet");
                Arc::new(protokoll)
            }
            Err(e) => {
                tracing::warn!(pfad, fehler = %e, "Aktivitaetsprotokoll nicht verfuegbar, fahre ohne fort");
                Arc::new(KeinProtokoll)
            }
        }
    }
}
