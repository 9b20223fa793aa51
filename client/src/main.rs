//! Plauder Client – Einstiegspunkt
//!
//! `plauder-client <username> [server_url]`
//!
//! Liest Zeilen von stdin und sendet jede als Chat-Nachricht. Die Eingabe
//! `quit` beendet den Client mit Exit-Code 0.

use clap::Parser;
use plauder_client::{ChatClient, KonsolenDarstellung, STANDARD_SERVER_URL};
use plauder_observability::{
    logging_initialisieren, Aktivitaetsprotokoll, DateiProtokoll, KeinProtokoll,
};
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Eingabe, die den Client beendet
const BEENDEN: &str = "quit";

/// Kommandozeilen-Argumente
#[derive(Debug, Parser)]
#[command(name = "plauder-client", version, about = "Plauder Chat-Client")]
struct Args {
    /// Eigener Anzeigename
    username: String,

    /// WebSocket-URL des Servers
    #[arg(default_value = STANDARD_SERVER_URL)]
    server_url: String,

    /// Aktivitaetsprotokoll
    #[arg(long, default_value = "logs/client.log")]
    log_datei: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Standard "warn", damit Log-Ausgaben den Prompt nicht ueberdecken
    logging_initialisieren("warn", "text");

    match ausfuehren(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Fehler: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn ausfuehren(args: Args) -> anyhow::Result<()> {
    let protokoll: Arc<dyn Aktivitaetsprotokoll> =
        match DateiProtokoll::oeffnen(&args.log_datei, "chat_client") {
            Ok(p) => Arc::new(p),
            Err(e) => {
                tracing::warn!(pfad = %args.log_datei, fehler = %e, "Aktivitaetsprotokoll nicht verfuegbar");
                Arc::new(KeinProtokoll)
            }
        };

    println!("Connecting to chat server as: {}", args.username);
    println!("Server: {}\n", args.server_url);

    let mut client = ChatClient::verbinden(
        &args.server_url,
        args.username.as_str(),
        KonsolenDarstellung::stdout(),
        protokoll,
    )
    .await?;

    let mut zeilen = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("Enter your message (or '{BEENDEN}' to exit): ");
        std::io::stdout().flush()?;

        let Some(zeile) = zeilen.next_line().await? else {
            // stdin geschlossen
            break;
        };
        let eingabe = zeile.trim();

        if eingabe == BEENDEN {
            println!("Goodbye!");
            break;
        }
        if eingabe.is_empty() {
            continue;
        }

        if !client.ist_verbunden() {
            eprintln!("Verbindung zum Server verloren – bitte Client neu starten");
            break;
        }
        client.senden(eingabe).await?;
        println!("Sent: {eingabe}");
    }

    client.trennen().await;
    Ok(())
}
