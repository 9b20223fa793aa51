//! WebSocket-Listener
//!
//! Alle Verbindungs-Tasks laufen per `spawn_local` auf einem Thread. Jedes
//! Ereignis (open, message, close, error) wird daher vollstaendig
//! abgearbeitet, bevor das naechste an die Reihe kommt.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::watch;
use tokio::task::LocalSet;

use crate::connection::ClientConnection;
use crate::server_state::RelayZustand;

/// Pause nach einem fehlgeschlagenen accept (z.B. zu viele offene Dateien)
const ACCEPT_PAUSE: Duration = Duration::from_millis(10);

/// Wie lange `starten` nach dem Shutdown auf offene Verbindungen wartet
const ABBAU_FRIST: Duration = Duration::from_secs(5);

pub struct RelayServer {
    state: Arc<RelayZustand>,
    listener: TcpListener,
}

impl RelayServer {
    /// Bindet den Listener, Port 0 waehlt einen freien Port
    pub async fn binden(
        state: Arc<RelayZustand>,
        adresse: impl ToSocketAddrs,
    ) -> std::io::Result<Self> {
        Ok(Self {
            state,
            listener: TcpListener::bind(adresse).await?,
        })
    }

    pub fn lokale_adresse(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Nimmt Verbindungen an bis `shutdown_rx` auf `true` springt
    ///
    /// Bringt eine eigene `LocalSet` mit und wartet nach dem Signal hoechstens
    /// `ABBAU_FRIST`, bis alle Verbindungs-Tasks ihre Sockets geschlossen haben.
    pub async fn starten(self, shutdown_rx: watch::Receiver<bool>) -> std::io::Result<()> {
        let local = LocalSet::new();
        local.run_until(self.annehmen(shutdown_rx)).await?;
        if tokio::time::timeout(ABBAU_FRIST, local).await.is_err() {
            tracing::warn!(frist = ?ABBAU_FRIST, "Verbindungs-Tasks nicht rechtzeitig beendet, werden abgebrochen");
        }
        Ok(())
    }

    /// Accept-Loop ohne eigene `LocalSet`
    ///
    /// Muss innerhalb von `LocalSet::run_until` laufen.
    pub async fn annehmen(self, shutdown_rx: watch::Receiver<bool>) -> std::io::Result<()> {
        tracing::info!(
            adresse = %self.lokale_adresse()?,
            server = %self.state.config.server_name,
            "WebSocket-Relay gestartet"
        );

        let mut signal = shutdown_rx.clone();
        let beendet = signal.wait_for(|stop| *stop);
        tokio::pin!(beendet);

        loop {
            tokio::select! {
                biased;

                _ = &mut beendet => break,

                angenommen = self.listener.accept() => match angenommen {
                    Ok((stream, peer)) => self.verbindung_starten(stream, peer, shutdown_rx.clone()),
                    Err(e) => {
                        tracing::error!(fehler = %e, "accept fehlgeschlagen");
                        tokio::time::sleep(ACCEPT_PAUSE).await;
                    }
                },
            }
        }

        tracing::info!(
            verbindungen = self.state.register.anzahl(),
            "WebSocket-Relay gestoppt"
        );
        Ok(())
    }

    fn verbindung_starten(&self, stream: TcpStream, peer: SocketAddr, shutdown_rx: watch::Receiver<bool>) {
        tracing::debug!(peer = %peer, "TCP-Verbindung angenommen");
        let verbindung = ClientConnection::neu(Arc::clone(&self.state), peer);
        tokio::task::spawn_local(verbindung.verarbeiten(stream, shutdown_rx));
    }
}
