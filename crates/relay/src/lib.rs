//! plauder-relay – WebSocket Chat-Relay
//!
//! Dieser Crate implementiert den serverseitigen Kern von Plauder: das
//! Register offener Verbindungen, den Broadcast an alle anderen Clients und
//! den Lebenszyklus jeder Verbindung.
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener (RelayServer, LocalSet)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein Task, WebSocket)
//!     |  open / message / close / error
//!     v
//! LebenszyklusHandler
//!     |  State Machine: Offen -> Aktiv -> Geschlossen
//!     |
//!     +-- Verbindungsregister (hinzufuegen, entfernen, alle_ausser)
//!     +-- Broadcaster         (verteilen, an_einen_senden)
//! ```

pub mod broadcast;
pub mod connection;
pub mod error;
pub mod lifecycle;
pub mod listener;
pub mod registry;
pub mod server_state;

// Bequeme Re-Exporte
pub use broadcast::{Broadcaster, Zustellbericht};
pub use connection::ClientConnection;
pub use error::{RelayFehler, RelayResult};
pub use lifecycle::{Ereignis, LebenszyklusHandler, Sitzung, VerbindungsZustand};
pub use listener::RelayServer;
pub use registry::{Ausgehend, VerbindungsHandle, Verbindungsregister};
pub use server_state::{RelayConfig, RelayZustand, STANDARD_WILLKOMMEN};
