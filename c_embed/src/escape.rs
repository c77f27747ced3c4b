//! Conversion between raw bytes and sequences of adjacent C string literals.
//!
//! The encoder writes each literal on its own line. Two kinds of breaks are
//! produced:
//!
//! - a *soft* break (`"` then a new line) whenever a line reaches the
//!   configured width; the next literal continues the same C string through
//!   adjacent-literal concatenation,
//! - a *hard* break (`",`) every time the resource-wide count of encoded bytes
//!   reaches a multiple of the literal length, which starts a new array element.
use std::num::{NonZeroU64, NonZeroUsize};

use crate::error::{Error, Result};

/// Upper bound on the text produced for one input byte: `\n"`, `\NNN`, `",`.
const MAX_EXPANSION: usize = 2 + 4 + 2;

/// Incremental string-literal encoder.
///
/// The state persists across [`Encoder::encode`] calls, so a resource may be
/// fed in arbitrarily sized pieces and still produce the same text.
#[derive(Debug, Clone)]
pub struct Encoder {
    line_width: NonZeroUsize,
    literal_length: NonZeroU64,
    column: usize,
    total: u64,
    previous: Option<u8>,
}

impl Encoder {
    /// Creates an encoder breaking lines after `line_width` columns and array
    /// elements after `literal_length` encoded bytes.
    #[must_use]
    pub const fn new(line_width: NonZeroUsize, literal_length: NonZeroU64) -> Self {
        Self {
            line_width,
            literal_length,
            column: 0,
            total: 0,
            previous: None,
        }
    }

    /// Number of input bytes encoded so far.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Current column inside the open literal; 0 when no literal is open.
    #[must_use]
    pub const fn column(&self) -> usize {
        self.column
    }

    /// Encodes `bytes` into a new text chunk.
    #[must_use]
    pub fn encode(&mut self, bytes: &[u8]) -> Vec<u8> {
        let mut chunk = Vec::with_capacity(bytes.len() * MAX_EXPANSION);

        for &byte in bytes {
            if self.column == 0 {
                chunk.extend_from_slice(b"\n\"");
            }

            if byte < 32 || byte == b'"' || byte == b'\\' || byte > 126 {
                chunk.extend_from_slice(&[
                    b'\\',
                    b'0' + (byte >> 6),
                    b'0' + ((byte >> 3) & 7),
                    b'0' + (byte & 7),
                ]);
                self.column += 4;
            } else if byte == b'?' && self.previous == Some(b'?') {
                // `??` would start a trigraph.
                chunk.extend_from_slice(b"\\?");
                self.column += 2;
            } else {
                chunk.push(byte);
                self.column += 1;
            }

            self.previous = Some(byte);
            self.total += 1;

            if self.total % self.literal_length == 0 {
                chunk.extend_from_slice(b"\",");
                self.column = 0;
            } else if self.column >= self.line_width.get() {
                chunk.push(b'"');
                self.column = 0;
            }
        }

        chunk
    }

    /// Text that closes the last literal and array element, if any is open.
    #[must_use]
    pub fn suffix(&self) -> &'static str {
        let open = self.column > 0;
        let partial = self.total % self.literal_length != 0;
        match (open, partial) {
            (true, true) => "\",\n",
            (true, false) => "\"",
            (false, true) => ",\n",
            (false, false) => "",
        }
    }
}

/// Decodes a sequence of C string literals back into bytes.
///
/// Whitespace and commas between literals are skipped, and adjacent literals
/// are concatenated. Only the escapes the encoder produces plus the common
/// single-character ones are accepted.
///
/// # Errors
/// Returns [`Error::MalformedLiteral`] on text outside a literal, an unknown
/// escape or an unterminated literal.
pub fn unescape(text: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len() / 2);
    let mut iter = text.iter().copied().enumerate().peekable();

    while let Some((pos, byte)) = iter.next() {
        match byte {
            b'"' => {}
            b',' => continue,
            b if b.is_ascii_whitespace() => continue,
            other => {
                return Err(Error::MalformedLiteral(format!(
                    "unexpected byte 0x{other:02x} at offset {pos}"
                )));
            }
        }

        loop {
            let Some((pos, byte)) = iter.next() else {
                return Err(Error::MalformedLiteral("unterminated literal".into()));
            };
            match byte {
                b'"' => break,
                b'\\' => {
                    let Some((_, escaped)) = iter.next() else {
                        return Err(Error::MalformedLiteral("dangling escape".into()));
                    };
                    let value = match escaped {
                        b'0'..=b'7' => {
                            let mut value = u32::from(escaped - b'0');
                            for _ in 0..2 {
                                match iter.peek() {
                                    Some(&(_, digit @ b'0'..=b'7')) => {
                                        value = value * 8 + u32::from(digit - b'0');
                                        iter.next();
                                    }
                                    _ => break,
                                }
                            }
                            u8::try_from(value).map_err(|_| {
                                Error::MalformedLiteral(format!(
                                    "octal escape out of range at offset {pos}"
                                ))
                            })?
                        }
                        b'n' => b'\n',
                        b't' => b'\t',
                        b'r' => b'\r',
                        b'?' | b'"' | b'\'' | b'\\' => escaped,
                        other => {
                            return Err(Error::MalformedLiteral(format!(
                                "unknown escape '\\{}' at offset {pos}",
                                char::from(other)
                            )));
                        }
                    };
                    out.push(value);
                }
                b'\n' => {
                    return Err(Error::MalformedLiteral(format!(
                        "newline inside literal at offset {pos}"
                    )));
                }
                other => out.push(other),
            }
        }
    }

    Ok(out)
}
