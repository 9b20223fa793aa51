//! Menschenlesbare Zeitstempel
//!
//! Envelopes und Aktivitaetsprotokolle tragen lokale Zeit im Format
//! `YYYY-MM-DD HH:MM:SS`. Der Wert ist rein informativ und wird nicht
//! fuer die Reihenfolge verwendet.

use chrono::{DateTime, Local, TimeZone};

/// Format fuer alle Zeitstempel
pub const ZEITSTEMPEL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Aktueller lokaler Zeitstempel
pub fn zeitstempel_jetzt() -> String {
    zeitstempel_formatieren(&Local::now())
}

/// Formatiert einen beliebigen Zeitpunkt
pub fn zeitstempel_formatieren<Tz: TimeZone>(zeit: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    zeit.format(ZEITSTEMPEL_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn festes_datum_formatieren() {
        let zeit = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(zeitstempel_formatieren(&zeit), "2024-03-07 09:05:01");
    }

    #[test]
    fn jetzt_hat_festes_format() {
        let ts = zeitstempel_jetzt();
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
    }
}
