//! Streaming raw DEFLATE adapter.
use std::io::Read;

use flate2::read::DeflateDecoder;
use miniz_oxide::deflate::core::{
    CompressorOxide, TDEFLFlush, TDEFLStatus, compress, create_comp_flags_from_zip_params,
};

use crate::error::{Error, Result};

/// Size of the scratch buffer the compressor writes into.
const OUTPUT_BUFFER_SIZE: usize = 16 * 1024;

/// Compressor flags for the deepest match search: the whole search-depth mask
/// set, raw output without a zlib header.
pub const MAX_EFFORT_FLAGS: u32 = 0xFFF;

/// Raw DEFLATE compressor that hands every produced byte run to a sink.
///
/// Each [`StreamCompressor::feed`] ends with a synchronizing flush so the
/// output for a read is available immediately; [`StreamCompressor::finish`]
/// closes the stream.
pub struct StreamCompressor {
    inner: Box<CompressorOxide>,
    flags: u32,
    buf: Vec<u8>,
    total_in: u64,
    total_out: u64,
}

impl StreamCompressor {
    /// Creates a compressor searching as hard as the format allows.
    #[must_use]
    pub fn max_effort() -> Self {
        Self::with_flags(MAX_EFFORT_FLAGS)
    }

    /// Creates a compressor at zlib-style `level` (0-10).
    #[must_use]
    pub fn new(level: u8) -> Self {
        // negative window bits = raw deflate
        Self::with_flags(create_comp_flags_from_zip_params(level.min(10).into(), -15, 0))
    }

    /// Creates a compressor from raw `tdefl` flags.
    #[must_use]
    pub fn with_flags(flags: u32) -> Self {
        Self {
            inner: Box::new(CompressorOxide::new(flags)),
            flags,
            buf: vec![0; OUTPUT_BUFFER_SIZE],
            total_in: 0,
            total_out: 0,
        }
    }

    /// The flags the compressor was created with.
    #[must_use]
    pub const fn flags(&self) -> u32 {
        self.flags
    }

    /// Bytes consumed so far.
    #[must_use]
    pub const fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Bytes produced so far.
    #[must_use]
    pub const fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Compresses `input` and sync-flushes, forwarding the output to `sink`.
    ///
    /// # Errors
    /// Returns [`Error::Compress`] if the underlying stream fails.
    pub fn feed(&mut self, input: &[u8], sink: impl FnMut(&[u8])) -> Result<()> {
        self.run(input, TDEFLFlush::Sync, sink)
    }

    /// Finishes the stream, forwarding the remaining output to `sink`.
    ///
    /// # Errors
    /// Returns [`Error::Compress`] if the underlying stream fails.
    pub fn finish(&mut self, sink: impl FnMut(&[u8])) -> Result<()> {
        self.run(&[], TDEFLFlush::Finish, sink)
    }

    fn run(
        &mut self,
        mut input: &[u8],
        flush: TDEFLFlush,
        mut sink: impl FnMut(&[u8]),
    ) -> Result<()> {
        loop {
            let (status, consumed, produced) =
                compress(&mut self.inner, input, &mut self.buf, flush);

            self.total_in += consumed as u64;
            self.total_out += produced as u64;
            if produced > 0 {
                sink(&self.buf[..produced]);
            }
            input = &input[consumed..];

            match status {
                TDEFLStatus::Done => break,
                TDEFLStatus::Okay => {
                    // A sync flush is complete once the scratch buffer stops filling up.
                    if matches!(flush, TDEFLFlush::Sync)
                        && input.is_empty()
                        && produced < self.buf.len()
                    {
                        break;
                    }
                }
                status @ (TDEFLStatus::BadParam | TDEFLStatus::PutBufFailed) => {
                    return Err(Error::Compress(status));
                }
            }
        }
        Ok(())
    }
}

impl Default for StreamCompressor {
    fn default() -> Self {
        Self::max_effort()
    }
}

impl std::fmt::Debug for StreamCompressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamCompressor")
            .field("flags", &format_args!("{:#x}", self.flags))
            .field("total_in", &self.total_in())
            .field("total_out", &self.total_out())
            .finish_non_exhaustive()
    }
}

/// Inflates a raw DEFLATE payload produced by [`StreamCompressor`].
///
/// # Errors
/// Returns [`Error::Decompress`] if `data` is not a valid raw DEFLATE stream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 2);
    DeflateDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(Error::Decompress)?;
    Ok(out)
}
