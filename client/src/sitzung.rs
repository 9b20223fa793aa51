//! Client-seitige WebSocket-Sitzung
//!
//! Nach dem Verbindungsaufbau wird ein `join`-Envelope mit dem eigenen
//! Namen gesendet. Ein Lese-Task gibt alle eingehenden Envelopes ueber die
//! `Darstellung` aus. Beim Schliessen wird nur protokolliert; es gibt keinen
//! automatischen Reconnect.

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use plauder_observability::Aktivitaetsprotokoll;
use plauder_protocol::{client_dekodieren, kodieren, Envelope};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::darstellung::{anzeigen, Darstellung};
use crate::error::{ClientFehler, ClientResult};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Standard-Adresse des Servers
pub const STANDARD_SERVER_URL: &str = "ws://localhost:8080";

/// Verarbeitet einen eingehenden Payload
///
/// Ungueltige Payloads werden mit einer Warnung verworfen. Der Server
/// verpackt sie dagegen als anonyme Nachricht.
pub fn eingang_verarbeiten<D: Darstellung + ?Sized>(
    roh: &str,
    darstellung: &mut D,
    protokoll: &dyn Aktivitaetsprotokoll,
) {
    match client_dekodieren(roh) {
        Some(envelope) => anzeigen(darstellung, &envelope),
        None => protokoll.warnung("Received invalid message format"),
    }
}

/// Verbundene Chat-Sitzung
pub struct ChatClient {
    username: String,
    sink: SplitSink<Ws, Message>,
    leser: JoinHandle<()>,
    protokoll: Arc<dyn Aktivitaetsprotokoll>,
}

impl ChatClient {
    /// Verbindet, sendet `join` und startet den Lese-Task
    pub async fn verbinden<D: Darstellung>(
        url: &str,
        username: impl Into<String>,
        darstellung: D,
        protokoll: Arc<dyn Aktivitaetsprotokoll>,
    ) -> ClientResult<Self> {
        let username = username.into();
        protokoll.info(&format!("Connecting to chat server: {url}"));

        let (ws, _antwort) = match tokio_tungstenite::connect_async(url).await {
            Ok(verbunden) => verbunden,
            Err(e) => {
                protokoll.fehler(&format!("Could not connect: {e}"));
                tracing::error!(url, fehler = %e, "Verbindung zum Server fehlgeschlagen");
                return Err(ClientFehler::Verbindung(e));
            }
        };
        protokoll.info("Connected to chat server!");
        tracing::info!(url, user = %username, "Verbunden");

        let (sink, quelle) = ws.split();
        let leser = tokio::spawn(lesen(quelle, darstellung, Arc::clone(&protokoll)));

        let mut client = Self {
            username,
            sink,
            leser,
            protokoll,
        };
        let join = Envelope::join(client.username.clone());
        client.envelope_senden(&join).await?;
        Ok(client)
    }

    /// Sendet eine Chat-Nachricht und gibt den gesendeten Envelope zurueck
    pub async fn senden(&mut self, content: &str) -> ClientResult<Envelope> {
        let envelope = Envelope::nachricht(self.username.clone(), content);
        self.envelope_senden(&envelope).await?;
        Ok(envelope)
    }

    async fn envelope_senden(&mut self, envelope: &Envelope) -> ClientResult<()> {
        let text = kodieren(envelope)?;
        if let Err(e) = self.sink.send(Message::text(text)).await {
            self.protokoll.fehler(&format!("Send failed: {e}"));
            return Err(ClientFehler::Senden(e));
        }
        Ok(())
    }

    /// Prueft ob der Server die Verbindung noch offen haelt
    pub fn ist_verbunden(&self) -> bool {
        !self.leser.is_finished()
    }

    /// Schliesst die Verbindung sauber
    pub async fn trennen(mut self) {
        if let Err(e) = self.sink.close().await {
            tracing::debug!(fehler = %e, "Schliessen fehlgeschlagen");
        }
        let _ = self.leser.await;
    }
}

/// Lese-Task: gibt eingehende Envelopes aus bis die Verbindung endet
async fn lesen<D: Darstellung>(
    mut quelle: futures_util::stream::SplitStream<Ws>,
    mut darstellung: D,
    protokoll: Arc<dyn Aktivitaetsprotokoll>,
) {
    while let Some(frame) = quelle.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                eingang_verarbeiten(text.as_str(), &mut darstellung, protokoll.as_ref());
            }
            Ok(Message::Binary(daten)) => {
                let text = String::from_utf8_lossy(&daten);
                eingang_verarbeiten(&text, &mut darstellung, protokoll.as_ref());
            }
            Ok(Message::Close(frame)) => {
                let (code, grund) = frame
                    .map(|f| (u16::from(f.code).to_string(), f.reason.as_str().to_owned()))
                    .unwrap_or_default();
                protokoll.info(&format!("Connection closed: {code} - {grund}"));
                tracing::info!(code = %code, grund = %grund, "Verbindung vom Server geschlossen");
                return;
            }
            Ok(_) => {}
            Err(e) => {
                protokoll.fehler(&format!("Connection error: {e}"));
                tracing::warn!(fehler = %e, "Lesefehler");
                return;
            }
        }
    }
    protokoll.info("Connection closed");
}
