//! TOML-Konfiguration des Servers
//!
//! ```toml
//! [server]
//! name = "Plauder Server"
//! willkommen = "Welcome to Plauder Chat!"
//!
//! [netzwerk]
//! bind_adresse = "0.0.0.0"
//! port = 8080
//!
//! [logging]
//! level = "info"            # trace | debug | info | warn | error
//! format = "text"           # text | json
//! aktivitaet_datei = "logs/chat.log"
//! ```
//!
//! Jede Sektion und jedes Feld darf fehlen. Ohne Datei laeuft der Server
//! mit den obigen Werten.

use anyhow::Context;
use plauder_observability::logging::{log_format_gueltig, log_level_gueltig};
use plauder_relay::{RelayConfig, STANDARD_WILLKOMMEN};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerEinstellungen,
    pub netzwerk: NetzwerkEinstellungen,
    pub logging: LoggingEinstellungen,
}

/// `[server]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    pub name: String,
    /// Text des System-Hinweises an jede neue Verbindung
    pub willkommen: String,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "Plauder Server".into(),
            willkommen: STANDARD_WILLKOMMEN.into(),
        }
    }
}

/// `[netzwerk]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    pub bind_adresse: String,
    pub port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    pub level: String,
    pub format: String,
    /// Pfad des Aktivitaetsprotokolls, `None` schaltet es ab
    pub aktivitaet_datei: Option<String>,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
            aktivitaet_datei: Some("logs/chat.log".into()),
        }
    }
}

impl ServerConfig {
    /// Liest und validiert die Datei; fehlt sie, gelten die Standardwerte
    pub fn laden(pfad: impl AsRef<Path>) -> anyhow::Result<Self> {
        let pfad = pfad.as_ref();
        let inhalt = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => inhalt,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("{} nicht lesbar", pfad.display()))
            }
        };

        let config: Self = toml::from_str(&inhalt)
            .with_context(|| format!("Ungueltige Konfiguration in {}", pfad.display()))?;
        config.validieren()?;
        Ok(config)
    }

    /// Prueft Werte, die TOML allein nicht abfangen kann
    pub fn validieren(&self) -> anyhow::Result<()> {
        if !log_level_gueltig(&self.logging.level) {
            anyhow::bail!("Ungueltiges Log-Level: '{}'", self.logging.level);
        }
        if !log_format_gueltig(&self.logging.format) {
            anyhow::bail!("Ungueltiges Log-Format: '{}'", self.logging.format);
        }
        if self.netzwerk.bind_adresse.trim().is_empty() {
            anyhow::bail!("bind_adresse darf nicht leer sein");
        }
        Ok(())
    }

    /// `bind_adresse:port`
    pub fn bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.port)
    }

    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            server_name: self.server.name.clone(),
            willkommen: self.server.willkommen.clone(),
        }
    }
}
