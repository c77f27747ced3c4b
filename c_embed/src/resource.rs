//! Turning one resource into string-literal text.
//!
//! A resource is first streamed through the deflate compressor and the literal
//! encoder. If compression does not save more than the configured slack, the
//! compressed text is dropped and the raw bytes are encoded instead.
use std::{
    fs::File,
    io::{self, Cursor, ErrorKind, Read, Seek, Write},
    num::{NonZeroU64, NonZeroUsize},
    path::Path,
};

use log::debug;

use crate::{
    chunk::ChunkList,
    deflate::StreamCompressor,
    error::{Error, Result},
    escape::Encoder,
};

/// Default number of text columns after which a literal is continued on a new line.
pub const LINE_WIDTH: usize = 80;
/// Default number of encoded bytes per array element.
pub const LITERAL_LENGTH: u64 = 1024;
/// Default minimum number of bytes compression has to save to be kept.
pub const COMPRESSION_SLACK: u64 = 1024;
/// Size of each read from a resource. Every read is sync-flushed through the
/// compressor, so this also fixes the deflate block layout of the output.
pub const READ_BUFFER_SIZE: usize = 128;

/// Layout and compression settings for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Columns per literal line before a soft break.
    pub line_width: usize,
    /// Encoded bytes per array element before a hard break.
    pub literal_length: u64,
    /// Bytes compression must save for the compressed form to be kept.
    pub compression_slack: u64,
    /// Zlib-style deflate level, 0-10. `None` searches every match candidate.
    pub level: Option<u8>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            line_width: LINE_WIDTH,
            literal_length: LITERAL_LENGTH,
            compression_slack: COMPRESSION_SLACK,
            level: None,
        }
    }
}

impl Settings {
    /// Checks that both layout limits are usable.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSetting`] naming the first zero limit.
    pub fn validate(&self) -> Result<()> {
        self.encoder().map(drop)
    }

    /// A fresh encoder with these layout limits.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSetting`] naming the first zero limit.
    pub fn encoder(&self) -> Result<Encoder> {
        let line_width =
            NonZeroUsize::new(self.line_width).ok_or(Error::InvalidSetting("line_width"))?;
        let literal_length =
            NonZeroU64::new(self.literal_length).ok_or(Error::InvalidSetting("literal_length"))?;
        Ok(Encoder::new(line_width, literal_length))
    }

    fn compressor(&self) -> StreamCompressor {
        self.level
            .map_or_else(StreamCompressor::max_effort, StreamCompressor::new)
    }
}

/// Size information for one packed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Metadata {
    /// Length of the original resource.
    pub inflated: u64,
    /// Length of the payload encoded into the literals: the deflate stream when
    /// compressed, the raw bytes otherwise.
    pub deflated: u64,
    /// Whether the payload is a raw deflate stream.
    pub compressed: bool,
}

impl Metadata {
    /// The metadata value as written into generated tables: 1 for compressed, 0 for raw.
    #[must_use]
    pub const fn flag(&self) -> u8 {
        self.compressed as u8
    }
}

/// The text generated for one resource.
#[derive(Debug, Clone)]
pub struct Encoded {
    metadata: Metadata,
    chunks: ChunkList,
    suffix: &'static str,
}

impl Encoded {
    #[must_use]
    pub const fn metadata(&self) -> Metadata {
        self.metadata
    }

    #[must_use]
    pub const fn chunks(&self) -> &ChunkList {
        &self.chunks
    }

    /// Text that closes the last literal, written after the chunks.
    #[must_use]
    pub const fn suffix(&self) -> &'static str {
        self.suffix
    }

    /// Writes the chunks followed by the closing suffix.
    ///
    /// # Errors
    /// Returns the first error reported by `out`.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        self.chunks.write_to(out)?;
        out.write_all(self.suffix.as_bytes())
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut text = self.chunks.concat();
        text.extend_from_slice(self.suffix.as_bytes());
        text
    }
}

/// Output of one pass over a resource.
struct Pass {
    chunks: ChunkList,
    encoder: Encoder,
    length: u64,
}

impl Pass {
    const fn new(encoder: Encoder) -> Self {
        Self {
            chunks: ChunkList::new(),
            encoder,
            length: 0,
        }
    }

    fn into_encoded(self, inflated: u64, compressed: bool) -> Encoded {
        Encoded {
            metadata: Metadata {
                inflated,
                deflated: self.encoder.total(),
                compressed,
            },
            suffix: self.encoder.suffix(),
            chunks: self.chunks,
        }
    }
}

/// Reads into `buf`, retrying on interruption. Returns 0 at end of input.
fn read_some<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            result => return result,
        }
    }
}

fn compress_pass<R: Read + ?Sized>(reader: &mut R, settings: &Settings) -> Result<Pass> {
    let mut pass = Pass::new(settings.encoder()?);
    let mut compressor = settings.compressor();
    let mut buf = [0; READ_BUFFER_SIZE];

    let Pass {
        chunks,
        encoder,
        length,
    } = &mut pass;
    let mut sink = |bytes: &[u8]| chunks.push(encoder.encode(bytes));

    loop {
        let n = read_some(reader, &mut buf)?;
        if n == 0 {
            break;
        }
        compressor.feed(&buf[..n], &mut sink)?;
        *length += n as u64;
    }
    compressor.finish(&mut sink)?;

    Ok(pass)
}

fn raw_pass<R: Read + ?Sized>(reader: &mut R, settings: &Settings) -> Result<Pass> {
    let mut pass = Pass::new(settings.encoder()?);
    let mut buf = [0; READ_BUFFER_SIZE];

    loop {
        let n = read_some(reader, &mut buf)?;
        if n == 0 {
            break;
        }
        pass.chunks.push(pass.encoder.encode(&buf[..n]));
        pass.length += n as u64;
    }

    Ok(pass)
}

/// Encodes a resource, keeping the compressed form only when it is worthwhile.
///
/// The reader is consumed twice when compression is rejected, so it must be
/// seekable.
///
/// # Errors
/// - [`Error::InvalidSetting`] if `settings` has a zero limit.
/// - [`Error::Io`] if reading or rewinding fails.
/// - [`Error::IntegrityMismatch`] if the second pass reads a different number
///   of bytes than the first.
pub fn generate<R: Read + Seek + ?Sized>(reader: &mut R, settings: &Settings) -> Result<Encoded> {
    settings.validate()?;

    let first = compress_pass(reader, settings)?;
    let inflated = first.length;

    if inflated == 0 {
        return Ok(Pass::new(settings.encoder()?).into_encoded(0, false));
    }

    if inflated <= first.encoder.total() + settings.compression_slack {
        debug!(
            "compression saved too little ({inflated} -> {} bytes), encoding raw",
            first.encoder.total()
        );
        drop(first);

        reader.rewind()?;
        let raw = raw_pass(reader, settings)?;
        if raw.length != inflated {
            return Err(Error::IntegrityMismatch {
                expected: inflated,
                actual: raw.length,
            });
        }
        return Ok(raw.into_encoded(inflated, false));
    }

    debug!("compressed {inflated} -> {} bytes", first.encoder.total());
    Ok(first.into_encoded(inflated, true))
}

/// Encodes an in-memory resource.
///
/// # Errors
/// Returns [`Error::InvalidSetting`] if `settings` has a zero limit, or
/// [`Error::Compress`] if the deflate stream fails.
pub fn encode(bytes: &[u8], settings: &Settings) -> Result<Encoded> {
    generate(&mut Cursor::new(bytes), settings)
}

/// Encodes the file at `path` and writes its text to `out`.
///
/// Nothing is written when an error is returned before the write-out.
///
/// # Errors
/// - [`Error::ResourceUnreadable`] if the file cannot be opened or read.
/// - [`Error::IntegrityMismatch`] if the file changed between the two passes.
/// - [`Error::Io`] if writing to `out` fails.
pub fn pack_file<W: Write + ?Sized>(
    path: &Path,
    out: &mut W,
    settings: &Settings,
) -> Result<Metadata> {
    let unreadable = |source: io::Error| Error::ResourceUnreadable {
        path: path.to_path_buf(),
        source,
    };

    debug!("Generating resource from {}", path.display());
    let mut file = File::open(path).map_err(unreadable)?;
    let encoded = generate(&mut file, settings).map_err(|err| match err {
        Error::Io(source) => unreadable(source),
        other => other,
    })?;

    encoded.write_to(out)?;
    Ok(encoded.metadata())
}
