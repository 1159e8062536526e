// src/nmea/parser.rs
//! NMEA sentence parsing
//!
//! Only the sentence types that carry position, speed or heading are
//! understood; every other type parses to [`Sentence::Unsupported`].
//! Checksums are not verified.

use super::coordinate::nmea_to_decimal;
use crate::nav::store::{FieldUpdate, FixUpdate};
use std::fmt;

/// Recommended minimum navigation data
#[derive(Debug, Clone, PartialEq)]
pub struct Rmc {
    pub valid: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub speed_knots: Option<f64>,
    pub track_degrees: Option<f64>,
}

/// Fix data
#[derive(Debug, Clone, PartialEq)]
pub struct Gga {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Track made good and ground speed
#[derive(Debug, Clone, PartialEq)]
pub struct Vtg {
    pub speed_knots: Option<f64>,
}

/// True heading
#[derive(Debug, Clone, PartialEq)]
pub struct Hdt {
    pub heading_degrees: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sentence {
    Rmc(Rmc),
    Gga(Gga),
    Vtg(Vtg),
    Hdt(Hdt),
    /// Any other sentence type code
    Unsupported(String),
}

impl Sentence {
    /// Field writes this sentence contributes to the navigation record
    pub fn to_update(&self) -> FixUpdate {
        match self {
            // An invalid-fix RMC carries nothing usable
            Sentence::Rmc(rmc) if !rmc.valid => FixUpdate::default(),
            Sentence::Rmc(rmc) => FixUpdate {
                latitude: FieldUpdate::set_if_present(rmc.latitude),
                longitude: FieldUpdate::set_if_present(rmc.longitude),
                // an empty speed field clears the stored speed rather than leaving it stale
                speed_knots: FieldUpdate::set_or_clear(rmc.speed_knots),
                heading_degrees: FieldUpdate::set_if_present(rmc.track_degrees),
            },
            Sentence::Gga(gga) => FixUpdate {
                latitude: FieldUpdate::set_if_present(gga.latitude),
                longitude: FieldUpdate::set_if_present(gga.longitude),
                ..Default::default()
            },
            Sentence::Vtg(vtg) => FixUpdate {
                speed_knots: FieldUpdate::set_if_present(vtg.speed_knots),
                ..Default::default()
            },
            Sentence::Hdt(hdt) => FixUpdate {
                heading_degrees: FieldUpdate::set_if_present(hdt.heading_degrees),
                ..Default::default()
            },
            Sentence::Unsupported(_) => FixUpdate::default(),
        }
    }

    /// Three-letter sentence type code
    pub fn kind(&self) -> &str {
        match self {
            Sentence::Rmc(_) => "RMC",
            Sentence::Gga(_) => "GGA",
            Sentence::Vtg(_) => "VTG",
            Sentence::Hdt(_) => "HDT",
            Sentence::Unsupported(code) => code.as_str(),
        }
    }
}

/// Why a line could not be parsed
#[derive(Debug, Clone, PartialEq)]
pub enum SentenceError {
    /// Line does not begin with `$`
    NoStartMarker,
    TooFewFields {
        kind: &'static str,
        needed: usize,
        found: usize,
    },
    InvalidNumber {
        field: &'static str,
        value: String,
    },
    /// Numeric, but outside the field's physical range
    OutOfRange {
        field: &'static str,
        value: f64,
    },
}

impl fmt::Display for SentenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentenceError::NoStartMarker => write!(f, "missing '$' start marker"),
            SentenceError::TooFewFields { kind, needed, found } => write!(
                f,
                "{} needs at least {} fields, got {}",
                kind, needed, found
            ),
            SentenceError::InvalidNumber { field, value } => {
                write!(f, "invalid number for {}: {:?}", field, value)
            }
            SentenceError::OutOfRange { field, value } => {
                write!(f, "{} out of range: {}", field, value)
            }
        }
    }
}

impl std::error::Error for SentenceError {}

/// Parse a single line of text into a sentence
pub fn parse_sentence(line: &str) -> Result<Sentence, SentenceError> {
    let line = line.trim();
    if !line.starts_with('$') {
        return Err(SentenceError::NoStartMarker);
    }

    let parts: Vec<&str> = line.split(',').collect();
    // `$` + two-letter talker ID, then the type code
    let code = parts[0].get(3..).unwrap_or("");

    match code {
        "RMC" => parse_rmc(&parts).map(Sentence::Rmc),
        "GGA" => parse_gga(&parts).map(Sentence::Gga),
        "VTG" => parse_vtg(&parts).map(Sentence::Vtg),
        "HDT" => parse_hdt(&parts).map(Sentence::Hdt),
        other => Ok(Sentence::Unsupported(other.to_string())),
    }
}

/// $--RMC,hhmmss,A,llll.ll,a,yyyyy.yy,a,x.x,x.x,ddmmyy,x.x,a*hh
fn parse_rmc(parts: &[&str]) -> Result<Rmc, SentenceError> {
    require_fields("RMC", parts, 9)?;

    let valid = parts[2] == "A";
    if !valid {
        return Ok(Rmc {
            valid,
            latitude: None,
            longitude: None,
            speed_knots: None,
            track_degrees: None,
        });
    }

    Ok(Rmc {
        valid,
        latitude: nmea_to_decimal(parts[3], parts[4]),
        longitude: nmea_to_decimal(parts[5], parts[6]),
        speed_knots: parse_speed(parts[7])?,
        track_degrees: parse_heading("track", parts[8])?,
    })
}

/// $--GGA,hhmmss.ss,llll.ll,a,yyyyy.yy,a,x,xx,x.x,x.x,M,x.x,M,x.x,xxxx*hh
fn parse_gga(parts: &[&str]) -> Result<Gga, SentenceError> {
    require_fields("GGA", parts, 6)?;

    Ok(Gga {
        latitude: nmea_to_decimal(parts[2], parts[3]),
        longitude: nmea_to_decimal(parts[4], parts[5]),
    })
}

/// $--VTG,x.x,T,x.x,M,x.x,N,x.x,K*hh
fn parse_vtg(parts: &[&str]) -> Result<Vtg, SentenceError> {
    // A short VTG is tolerated; it just has no speed
    let speed_knots = match parts.get(5) {
        Some(field) => parse_speed(field)?,
        None => None,
    };
    Ok(Vtg { speed_knots })
}

/// $--HDT,x.x,T*hh
fn parse_hdt(parts: &[&str]) -> Result<Hdt, SentenceError> {
    require_fields("HDT", parts, 2)?;

    Ok(Hdt {
        heading_degrees: parse_heading("heading", parts[1])?,
    })
}

fn require_fields(kind: &'static str, parts: &[&str], needed: usize) -> Result<(), SentenceError> {
    if parts.len() < needed {
        return Err(SentenceError::TooFewFields {
            kind,
            needed,
            found: parts.len(),
        });
    }
    Ok(())
}

/// Empty field is "no value"; anything else must be a finite number
fn parse_number(field: &'static str, text: &str) -> Result<Option<f64>, SentenceError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(SentenceError::InvalidNumber {
            field,
            value: text.to_string(),
        }),
    }
}

/// Speed over ground, knots: never negative
fn parse_speed(text: &str) -> Result<Option<f64>, SentenceError> {
    match parse_number("speed", text)? {
        Some(value) if value < 0.0 => Err(SentenceError::OutOfRange { field: "speed", value }),
        speed => Ok(speed),
    }
}

/// Heading or track, degrees in `[0, 360)`
fn parse_heading(field: &'static str, text: &str) -> Result<Option<f64>, SentenceError> {
    match parse_number(field, text)? {
        Some(value) if !(0.0..360.0).contains(&value) => {
            Err(SentenceError::OutOfRange { field, value })
        }
        heading => Ok(heading),
    }
}
