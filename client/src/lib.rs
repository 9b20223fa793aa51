//! plauder-client – Kommandozeilen-Client
//!
//! Verbindet sich per WebSocket mit einem Plauder-Server, meldet sich mit
//! einem `join` an und gibt alle empfangenen Nachrichten auf der Konsole aus.

pub mod darstellung;
pub mod error;
pub mod sitzung;

pub use darstellung::{anzeigen, Darstellung, KonsolenDarstellung};
pub use error::{ClientFehler, ClientResult};
pub use sitzung::{eingang_verarbeiten, ChatClient, STANDARD_SERVER_URL};
