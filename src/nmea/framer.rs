// src/nmea/framer.rs
//! Incremental line framing over a lossy byte stream

use std::fmt;

const TERMINATOR: u8 = b'\n';

/// One complete line, terminator removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine(Vec<u8>);

impl RawLine {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// View the line as trimmed ASCII text
    pub fn decode(&self) -> Result<&str, LineError> {
        if let Some(position) = self.0.iter().position(|b| !b.is_ascii()) {
            return Err(LineError::NotAscii { position });
        }
        // ASCII is always valid UTF-8
        std::str::from_utf8(&self.0)
            .map(str::trim)
            .map_err(|_| LineError::NotAscii { position: 0 })
    }
}

/// A line could not be turned into text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    NotAscii { position: usize },
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineError::NotAscii { position } => {
                write!(f, "non-ASCII byte at offset {}", position)
            }
        }
    }
}

impl std::error::Error for LineError {}

/// Malformed input detected while framing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// A fragment grew past the line limit without a terminator and was dropped
    Overflow { discarded: usize },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Overflow { discarded } => {
                write!(f, "line exceeded limit, dropped {} bytes", discarded)
            }
        }
    }
}

impl std::error::Error for FrameError {}

/// Splits arbitrary chunks into `\n`-terminated lines, carrying the
/// unterminated tail over to the next chunk.
#[derive(Debug)]
pub struct LineFramer {
    buffer: Vec<u8>,
    max_line_len: usize,
    // Skipping the rest of an oversized line until its terminator shows up
    discarding: bool,
}

impl LineFramer {
    pub fn new(max_line_len: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(max_line_len.min(4096)),
            max_line_len: max_line_len.max(1),
            discarding: false,
        }
    }

    /// Feed one chunk; returns complete lines (and overflow reports) in arrival order
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<RawLine, FrameError>> {
        let mut out = Vec::new();
        let mut rest = chunk;

        while !rest.is_empty() {
            match rest.iter().position(|&b| b == TERMINATOR) {
                Some(end) => {
                    let (body, tail) = (&rest[..end], &rest[end + 1..]);
                    rest = tail;

                    if self.discarding {
                        self.discarding = false;
                        continue;
                    }

                    if self.buffer.len() + body.len() > self.max_line_len {
                        out.push(Err(FrameError::Overflow {
                            discarded: self.buffer.len() + body.len(),
                        }));
                        self.buffer.clear();
                        continue;
                    }

                    self.buffer.extend_from_slice(body);
                    out.push(Ok(RawLine(std::mem::take(&mut self.buffer))));
                }
                None => {
                    if !self.discarding {
                        self.buffer.extend_from_slice(rest);
                        if self.buffer.len() > self.max_line_len {
                            out.push(Err(FrameError::Overflow {
                                discarded: self.buffer.len(),
                            }));
                            self.buffer.clear();
                            self.discarding = true;
                        }
                    }
                    break;
                }
            }
        }

        out
    }

    /// Bytes carried over, waiting for a terminator
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Drop any carried-over fragment
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(results: Vec<Result<RawLine, FrameError>>) -> Vec<String> {
        results
            .into_iter()
            .map(|r| r.unwrap().decode().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_splits_on_terminator() {
        let mut framer = LineFramer::new(128);
        let out = framer.push(b"$GPHDT,1.0,T\r\n$GPHDT,2.0,T\r\n");
        assert_eq!(lines(out), vec!["$GPHDT,1.0,T", "$GPHDT,2.0,T"]);
        assert_eq!(framer.pending(), 0);
    }

    #[test]
    fn test_carries_fragment_across_chunks() {
        let mut framer = LineFramer::new(128);
        assert!(framer.push(b"$GPHDT,12").is_empty());
        assert_eq!(framer.pending(), 9);
        assert!(framer.push(b"3.4,T\r").is_empty());
        let out = framer.push(b"\n$GPV");
        assert_eq!(lines(out), vec!["$GPHDT,123.4,T"]);
        assert_eq!(framer.pending(), 4);

        framer.clear();
        assert_eq!(framer.pending(), 0);
        let out = framer.push(b"TG,1,T,2,M,3,N\n");
        assert_eq!(lines(out), vec!["TG,1,T,2,M,3,N"]);
    }

    #[test]
    fn test_empty_lines_are_yielded_raw() {
        let mut framer = LineFramer::new(128);
        let out = framer.push(b"\n\r\n");
        assert_eq!(lines(out), vec!["", ""]);
    }

    #[test]
    fn test_overflow_drops_fragment_and_its_tail() {
        let mut framer = LineFramer::new(16);
        let out = framer.push(&[b'x'; 20]);
        assert_eq!(out, vec![Err(FrameError::Overflow { discarded: 20 })]);
        assert_eq!(framer.pending(), 0);

        // the remainder of the oversized line is skipped, the next line survives
        assert!(framer.push(b"yyyy").is_empty());
        assert_eq!(framer.pending(), 0);
        let out = framer.push(b"yy\n$GPHDT,1,T\n");
        assert_eq!(lines(out), vec!["$GPHDT,1,T"]);
    }

    #[test]
    fn test_overflow_of_terminated_line() {
        let mut framer = LineFramer::new(8);
        let out = framer.push(b"0123456789\nabc\n");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Err(FrameError::Overflow { discarded: 10 }));
        assert_eq!(out[1].as_ref().unwrap().as_bytes(), b"abc");
    }

    #[test]
    fn test_decode_rejects_non_ascii() {
        let mut framer = LineFramer::new(64);
        let out = framer.push(b"$GP\xffRMC\n");
        let line = out.into_iter().next().unwrap().unwrap();
        assert_eq!(line.decode(), Err(LineError::NotAscii { position: 3 }));
    }
}
