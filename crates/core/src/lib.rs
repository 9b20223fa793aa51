//! plauder-core – Gemeinsame Typen
//!
//! Dieses Crate stellt die Bausteine bereit, die von Server, Client und
//! Protokoll gemeinsam genutzt werden.

pub mod types;
pub mod zeit;

// Re-Exporte fuer bequemen Zugriff
pub use types::VerbindungsId;
pub use zeit::zeitstempel_jetzt;
