//! plauder-protocol – Netzwerkprotokoll-Definitionen
//!
//! Dieses Crate definiert den Envelope, der zwischen Client und Server
//! ausgetauscht wird, sowie den JSON-Codec dafuer.

pub mod codec;
pub mod envelope;

pub use codec::{client_dekodieren, dekodieren, kodieren, server_dekodieren, CodecFehler};
pub use envelope::{Envelope, EnvelopeTyp, ANONYM};
