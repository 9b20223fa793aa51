//! Client-Connection – Verwaltet eine einzelne WebSocket-Verbindung
//!
//! Jede Verbindung bekommt eine `ClientConnection` in einem eigenen Task.
//! Der Task fuehrt den WebSocket-Handshake durch, uebersetzt Socket-
//! Ereignisse in `Ereignis`se fuer den `LebenszyklusHandler` und schreibt
//! alles aus der Queue des `VerbindungsHandle` auf den Socket.
//!
//! Es gibt kein Keepalive und keinen Idle-Timeout: Verbindungen leben bis
//! der Transport sie schliesst.

use futures_util::{SinkExt, StreamExt};
use plauder_core::VerbindungsId;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;

use crate::lifecycle::Ereignis;
use crate::registry::{Ausgehend, VerbindungsHandle};
use crate::server_state::RelayZustand;

/// Verarbeitet eine einzelne WebSocket-Verbindung
pub struct ClientConnection {
    state: Arc<RelayZustand>,
    peer_addr: SocketAddr,
}

impl ClientConnection {
    pub fn neu(state: Arc<RelayZustand>, peer_addr: SocketAddr) -> Self {
        Self { state, peer_addr }
    }

    /// Handshake, dann Ereignisschleife bis close, Fehler oder Shutdown
    pub async fn verarbeiten<S>(self, stream: S, mut shutdown_rx: watch::Receiver<bool>)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let peer_addr = self.peer_addr;

        // Ein Peer ohne Upgrade-Request darf den Shutdown nicht aufhalten
        let handshake = tokio::select! {
            ergebnis = tokio_tungstenite::accept_async(stream) => ergebnis,
            _ = shutdown_rx.wait_for(|stop| *stop) => {
                tracing::debug!(peer = %peer_addr, "Shutdown waehrend Handshake");
                return;
            }
        };
        let ws = match handshake {
            Ok(ws) => ws,
            Err(e) => {
                tracing::warn!(peer = %peer_addr, fehler = %e, "WebSocket-Handshake fehlgeschlagen");
                return;
            }
        };
        let (mut sink, mut quelle) = ws.split();

        let id = VerbindungsId::naechste();
        let (handle, mut ausgang_rx) = VerbindungsHandle::neu(id);
        tracing::debug!(peer = %peer_addr, verbindung = %id, "WebSocket-Handshake abgeschlossen");

        let lebenszyklus = &self.state.lebenszyklus;
        let mut sitzung = lebenszyklus.oeffnen(handle);

        let beendet = shutdown_rx.wait_for(|stop| *stop);
        tokio::pin!(beendet);

        loop {
            tokio::select! {
                // Eingehender Frame vom Client
                frame = quelle.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            lebenszyklus.verarbeiten(&mut sitzung, Ereignis::Nachricht(text.as_str().to_owned()));
                        }
                        Some(Ok(Message::Binary(daten))) => {
                            let text = String::from_utf8_lossy(&daten).into_owned();
                            lebenszyklus.verarbeiten(&mut sitzung, Ereignis::Nachricht(text));
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::debug!(verbindung = %id, grund = ?frame, "Client hat Close gesendet");
                            // Schreibt die von tungstenite eingereihte Close-Antwort
                            let _ = sink.close().await;
                            lebenszyklus.verarbeiten(&mut sitzung, Ereignis::Geschlossen);
                            break;
                        }
                        // Pong-Antworten verschickt tungstenite selbst
                        Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                        Some(Err(e)) => {
                            lebenszyklus.verarbeiten(&mut sitzung, Ereignis::Fehler(e.to_string()));
                            break;
                        }
                        None => {
                            lebenszyklus.verarbeiten(&mut sitzung, Ereignis::Geschlossen);
                            break;
                        }
                    }
                }

                // Ausgehende Nachricht aus Broadcaster oder Handler
                Some(ausgehend) = ausgang_rx.recv() => {
                    match ausgehend {
                        Ausgehend::Text(text) => {
                            if let Err(e) = sink.send(Message::text(text)).await {
                                lebenszyklus.verarbeiten(&mut sitzung, Ereignis::Fehler(e.to_string()));
                                break;
                            }
                        }
                        Ausgehend::Schliessen => {
                            let _ = sink.close().await;
                            lebenszyklus.verarbeiten(&mut sitzung, Ereignis::Geschlossen);
                            break;
                        }
                    }
                }

                _ = &mut beendet => {
                    tracing::info!(verbindung = %id, "Shutdown, Verbindung wird getrennt");
                    let _ = sink.close().await;
                    lebenszyklus.verarbeiten(&mut sitzung, Ereignis::Geschlossen);
                    break;
                }
            }
        }

        debug_assert!(sitzung.ist_geschlossen());
        tracing::debug!(peer = %peer_addr, verbindung = %id, "Verbindungs-Task beendet");
    }
}
