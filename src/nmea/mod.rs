// src/nmea/mod.rs
//! NMEA-0183 framing, parsing and coordinate decoding

pub mod coordinate;
pub mod framer;
pub mod parser;

pub use framer::{FrameError, LineError, LineFramer, RawLine};
pub use parser::{parse_sentence, Sentence, SentenceError};
