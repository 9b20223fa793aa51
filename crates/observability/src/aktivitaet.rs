//! Aktivitaetsprotokoll – Append-only Textdatei
//!
//! Haelt Verbindungs-Ereignisse, empfangene Nachrichten und Fehler fest.
//! Das Format ist zeilenorientiert und fuer Menschen gedacht:
//!
//! ```text
//! [2024-03-07 09:05:01] chat_server.INFO: New connection! (3)
//! ```
//!
//! Schreibfehler sind nie fatal. Die Hilfsmethoden `info`, `warnung` und
//! `fehler` melden sie nur per tracing.

use parking_lot::Mutex;
use plauder_core::zeitstempel_jetzt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Schweregrad eines Protokolleintrags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stufe {
    Info,
    Warnung,
    Fehler,
}

impl Stufe {
    fn als_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warnung => "WARNING",
            Self::Fehler => "ERROR",
        }
    }
}

/// Formatiert eine Protokollzeile (ohne Zeilenumbruch)
pub fn zeile_formatieren(kanal: &str, stufe: Stufe, text: &str) -> String {
    format!("[{}] {}.{}: {}", zeitstempel_jetzt(), kanal, stufe.als_str(), text)
}

/// Senke fuer Aktivitaetseintraege
pub trait Aktivitaetsprotokoll: Send + Sync {
    /// Schreibt einen Eintrag
    fn schreiben(&self, stufe: Stufe, text: &str) -> io::Result<()>;

    /// Schreibt einen Info-Eintrag, Fehler werden nur geloggt
    fn info(&self, text: &str) {
        self.schreiben_oder_melden(Stufe::Info, text);
    }

    /// Schreibt eine Warnung, Fehler werden nur geloggt
    fn warnung(&self, text: &str) {
        self.schreiben_oder_melden(Stufe::Warnung, text);
    }

    /// Schreibt einen Fehler-Eintrag, Fehler werden nur geloggt
    fn fehler(&self, text: &str) {
        self.schreiben_oder_melden(Stufe::Fehler, text);
    }

    #[doc(hidden)]
    fn schreiben_oder_melden(&self, stufe: Stufe, text: &str) {
        if let Err(e) = self.schreiben(stufe, text) {
            tracing::warn!(fehler = %e, "Aktivitaetsprotokoll nicht schreibbar");
        }
    }
}

// ---------------------------------------------------------------------------
// DateiProtokoll
// ---------------------------------------------------------------------------

/// Protokoll in eine Datei, jede Zeile wird sofort geflusht
pub struct DateiProtokoll {
    kanal: String,
    pfad: PathBuf,
    datei: Mutex<File>,
}

impl DateiProtokoll {
    /// Oeffnet (oder erstellt) die Datei im Append-Modus
    ///
    /// Fehlende Elternverzeichnisse werden angelegt.
    pub fn oeffnen(pfad: impl AsRef<Path>, kanal: impl Into<String>) -> io::Result<Self> {
        let pfad = pfad.as_ref().to_path_buf();
        if let Some(eltern) = pfad.parent() {
            if !eltern.as_os_str().is_empty() {
                std::fs::create_dir_all(eltern)?;
            }
        }
        let datei = OpenOptions::new().create(true).append(true).open(&pfad)?;
        Ok(Self {
            kanal: kanal.into(),
            pfad,
            datei: Mutex::new(datei),
        })
    }

    /// Pfad der Protokolldatei
    pub fn pfad(&self) -> &Path {
        &self.pfad
    }
}

impl Aktivitaetsprotokoll for DateiProtokoll {
    fn schreiben(&self, stufe: Stufe, text: &str) -> io::Result<()> {
        let zeile = zeile_formatieren(&self.kanal, stufe, text);
        let mut datei = self.datei.lock();
        writeln!(datei, "{zeile}")?;
        datei.flush()
    }
}

// ---------------------------------------------------------------------------
// SpeicherProtokoll
// ---------------------------------------------------------------------------

/// Protokoll im Speicher (fuer Tests und Diagnose)
#[derive(Default)]
pub struct SpeicherProtokoll {
    eintraege: Mutex<Vec<(Stufe, String)>>,
}

impl SpeicherProtokoll {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Kopie aller bisherigen Eintraege
    pub fn eintraege(&self) -> Vec<(Stufe, String)> {
        self.eintraege.lock().clone()
    }
}

impl Aktivitaetsprotokoll for SpeicherProtokoll {
    fn schreiben(&self, stufe: Stufe, text: &str) -> io::Result<()> {
        self.eintraege.lock().push((stufe, text.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// KeinProtokoll
// ---------------------------------------------------------------------------

/// Verwirft alle Eintraege
#[derive(Debug, Default, Clone, Copy)]
pub struct KeinProtokoll;

impl Aktivitaetsprotokoll for KeinProtokoll {
    fn schreiben(&self, _stufe: Stufe, _text: &str) -> io::Result<()> {
        Ok(())
    }
}
