//! Placeholder substitution for the C glue code.
//!
//! The glue sources shipped with this crate name their functions and tables
//! with the [`PLACEHOLDER`] prefix; copying them through a [`Substitution`]
//! renames everything to the identifier chosen for the generated file.
use std::io::{self, Read, Write};

use crate::error::{Error, Result};

/// Marker replaced by the identifier in glue sources.
pub const PLACEHOLDER: &str = "__RESCUE";

/// Identifier used when none is configured.
pub const DEFAULT_IDENTIFIER: &str = "rescue";

/// Size of each read when copying a template.
const COPY_BUFFER_SIZE: usize = 128;

/// Streaming placeholder replacement.
///
/// Bytes are fed in arbitrary pieces; a placeholder split across two pieces is
/// still replaced because the match cursor is kept between calls. Only a prefix
/// of the placeholder is ever held back.
#[derive(Debug, Clone)]
pub struct Substitution<'a> {
    placeholder: &'a [u8],
    identifier: &'a [u8],
    cursor: usize,
}

impl<'a> Substitution<'a> {
    /// Creates a scanner replacing `placeholder` with `identifier`.
    ///
    /// An empty placeholder never matches.
    #[must_use]
    pub const fn new(placeholder: &'a str, identifier: &'a str) -> Self {
        Self {
            placeholder: placeholder.as_bytes(),
            identifier: identifier.as_bytes(),
            cursor: 0,
        }
    }

    /// Number of placeholder bytes currently held back.
    #[must_use]
    pub const fn pending(&self) -> usize {
        self.cursor
    }

    /// Scans `input`, writing everything that is known not to be part of a
    /// placeholder.
    ///
    /// # Errors
    /// Returns the first error reported by `out`.
    pub fn feed<W: Write + ?Sized>(&mut self, input: &[u8], out: &mut W) -> io::Result<()> {
        if self.placeholder.is_empty() {
            return out.write_all(input);
        }

        let mut start = 0;
        for (i, &byte) in input.iter().enumerate() {
            if self.cursor == 0 && byte != self.placeholder[0] {
                continue;
            }
            if self.cursor == 0 {
                out.write_all(&input[start..i])?;
            }
            start = i + 1;
            self.advance(byte, out)?;
        }

        if self.cursor == 0 {
            out.write_all(&input[start..])?;
        }
        Ok(())
    }

    /// Writes a partial match left over at the end of the input.
    ///
    /// # Errors
    /// Returns the first error reported by `out`.
    pub fn finish<W: Write + ?Sized>(&mut self, out: &mut W) -> io::Result<()> {
        let pending = &self.placeholder[..self.cursor];
        self.cursor = 0;
        out.write_all(pending)
    }

    /// Advances the matcher by one byte that arrived at cursor 0 matching the
    /// first placeholder byte, or while a partial match is held.
    fn advance<W: Write + ?Sized>(&mut self, byte: u8, out: &mut W) -> io::Result<()> {
        if self.placeholder[self.cursor] == byte {
            self.cursor += 1;
            if self.cursor == self.placeholder.len() {
                self.cursor = 0;
                out.write_all(self.identifier)?;
            }
            return Ok(());
        }

        // Not a placeholder: release the held bytes and `byte` verbatim.
        let held = self.cursor;
        out.write_all(&self.placeholder[..held])?;
        out.write_all(&[byte])?;
        self.cursor = 0;
        Ok(())
    }

    /// Copies `reader` to `out` with every placeholder replaced.
    ///
    /// # Errors
    /// Returns [`Error::Io`] if reading or writing fails.
    pub fn copy<R: Read + ?Sized, W: Write + ?Sized>(
        &mut self,
        reader: &mut R,
        out: &mut W,
    ) -> Result<()> {
        let mut buf = [0; COPY_BUFFER_SIZE];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            self.feed(&buf[..n], out)?;
        }
        self.finish(out)?;
        Ok(())
    }
}

/// C sources bundled with the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glue {
    /// Raw-inflate helper, written once before the resource arrays.
    Inflate,
    /// Lookup functions over the generated tables.
    Accessor,
}

impl Glue {
    /// Every bundled glue source.
    pub const ALL: [Self; 2] = [Self::Inflate, Self::Accessor];

    /// The resource name of this glue source.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Inflate => "inflate.c",
            Self::Accessor => "template.c",
        }
    }

    /// The unsubstituted source text.
    #[must_use]
    pub const fn source(self) -> &'static [u8] {
        match self {
            Self::Inflate => include_bytes!("../glue/inflate.c"),
            Self::Accessor => include_bytes!("../glue/template.c"),
        }
    }

    /// Looks a glue source up by resource name.
    ///
    /// # Errors
    /// Returns [`Error::UnknownGlue`] if no glue source has that name.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|glue| glue.name() == name)
            .ok_or_else(|| Error::UnknownGlue(name.to_owned()))
    }
}

/// Returns whether `identifier` can prefix C names.
#[must_use]
pub fn is_c_identifier(identifier: &str) -> bool {
    let mut bytes = identifier.bytes();
    bytes
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Writes the glue source called `name` to `out`, renamed to `identifier`.
///
/// # Errors
/// - [`Error::UnknownGlue`] if `name` is not a bundled glue source.
/// - [`Error::InvalidIdentifier`] if `identifier` is not a C identifier.
/// - [`Error::Io`] if writing fails.
pub fn write_glue<W: Write + ?Sized>(name: &str, identifier: &str, out: &mut W) -> Result<()> {
    let glue = Glue::from_name(name)?;
    if !is_c_identifier(identifier) {
        return Err(Error::InvalidIdentifier(identifier.to_owned()));
    }
    Substitution::new(PLACEHOLDER, identifier).copy(&mut glue.source(), out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn substitute(placeholder: &str, identifier: &str, pieces: &[&[u8]]) -> String {
        let mut sub = Substitution::new(placeholder, identifier);
        let mut out = Vec::new();
        for piece in pieces {
            sub.feed(piece, &mut out).unwrap();
        }
        sub.finish(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn false_partial_match_is_flushed_verbatim() {
        assert_eq!(
            substitute("__TOKEN", "ID", &[b"a__TOKb__TOKEN!"]),
            "a__TOKbID!"
        );
    }

    #[test]
    fn placeholder_straddling_reads_is_replaced() {
        assert_eq!(
            substitute("__TOKEN", "ID", &[b"int __TO", b"KEN_x = 1;"]),
            "int ID_x = 1;"
        );
        assert_eq!(
            substitute("__TOKEN", "ID", &[b"_", b"_", b"T", b"O", b"K", b"E", b"N"]),
            "ID"
        );
    }

    #[test]
    fn aborted_match_restarts_after_the_breaking_byte() {
        assert_eq!(substitute("__RESCUE", "res", &[b"___RESCUE"]), "___RESCUE");
        assert_eq!(substitute("__TOKEN", "ID", &[b"__T__TOKEN"]), "__T__TOKEN");
        assert_eq!(substitute("aab", "X", &[b"aaab"]), "aaab");
        assert_eq!(substitute("__TOKEN", "ID", &[b"__T", b"_", b"_TOKEN"]), "__T__TOKEN");
    }

    #[test]
    fn byte_after_aborted_match_does_not_start_one() {
        // `_` breaks the match after `__T`; the later `__TOKEN` is intact.
        assert_eq!(substitute("__TOKEN", "ID", &[b"__T_ __TOKEN"]), "__T_ ID");
    }

    #[test]
    fn consecutive_placeholders_are_all_replaced() {
        assert_eq!(substitute("__R", "id", &[b"__R__R", b"__R"]), "ididid");
    }

    #[test]
    fn dangling_partial_match_is_kept() {
        assert_eq!(substitute("__TOKEN", "ID", &[b"end __TOK"]), "end __TOK");
    }

    #[test]
    fn text_without_placeholder_is_unchanged() {
        let text = "static int x = 0; /* _ __ */\n";
        assert_eq!(substitute("__TOKEN", "ID", &[text.as_bytes()]), text);
    }

    #[test]
    fn empty_placeholder_copies_input() {
        assert_eq!(substitute("", "ID", &[b"abc"]), "abc");
    }

    #[test]
    fn glue_is_renamed() {
        let mut out = Vec::new();
        write_glue("template.c", "assets", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains(PLACEHOLDER));
        assert!(text.contains("assets_get_resource"));
    }

    #[test]
    fn glue_lookup_rejects_unknown_names_and_identifiers() {
        let mut out = Vec::new();
        assert!(matches!(
            write_glue("missing.c", "assets", &mut out),
            Err(Error::UnknownGlue(_))
        ));
        assert!(matches!(
            write_glue("inflate.c", "9lives", &mut out),
            Err(Error::InvalidIdentifier(_))
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn identifier_rules() {
        assert!(is_c_identifier("rescue"));
        assert!(is_c_identifier("_x9"));
        assert!(!is_c_identifier(""));
        assert!(!is_c_identifier("9x"));
        assert!(!is_c_identifier("a-b"));
    }
}
