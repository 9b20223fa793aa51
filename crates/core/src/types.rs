//! Identifikationstypen fuer Plauder
//!
//! Verbindungs-IDs verwenden das Newtype-Pattern, damit sie nicht mit
//! anderen Zahlen verwechselt werden koennen.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Prozessweiter Zaehler fuer Verbindungs-IDs (beginnt bei 1)
static NAECHSTE_ID: AtomicU64 = AtomicU64::new(1);

/// Eindeutige, vom Server vergebene Verbindungs-ID
///
/// Monoton steigend und innerhalb eines Prozesses nie wiederverwendet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VerbindungsId(pub u64);

impl VerbindungsId {
    /// Vergibt die naechste freie ID
    pub fn naechste() -> Self {
        Self(NAECHSTE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for VerbindungsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
