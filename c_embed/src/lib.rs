//! Embed arbitrary files into a C translation unit.
//!
//! This crate turns files into C string-literal arrays that a host program can
//! link in and read at runtime without any file I/O. Each file is deflated
//! first; the compressed form is kept only when it saves more than a fixed
//! number of bytes, otherwise the raw bytes are embedded.
//!
//! ## How It Works
//!
//! 1.  **Compress pass:** the file is read in small pieces, each piece is
//!     compressed with a synchronizing flush, and every compressed byte run is
//!     escaped into string-literal text, collected in a [`ChunkList`].
//! 2.  **Decision:** if the deflate stream is not at least
//!     [`COMPRESSION_SLACK`] bytes smaller than the file, the text is dropped,
//!     the file is rewound, and its raw bytes are escaped instead.
//! 3.  **Write-out:** the chunks are written in order, followed by the text
//!     that closes the last literal.
//!
//! The literals are broken in two ways. A new line starts after
//! [`LINE_WIDTH`] columns, continuing the same C string. Every
//! [`LITERAL_LENGTH`] payload bytes a new array element begins, so a
//! resource ends up as `const char*` segments of known length.
//!
//! ## Usage
//!
//! 1. Add `c_embed` to your `[build-dependencies]` with the `build` feature.
//!
//! ```toml
//! [build-dependencies]
//! c_embed = { version = "0.1.0", features = ["build"] }
//! ```
//!
//! 2. Pack your files from `build.rs`.
//!
//! ```ignore
//! // build.rs
//! let packed = c_embed::Config::new("assets")
//!     .identifier("assets")
//!     .build()
//!     .expect("Failed to pack assets");
//! ```
//!
//! The lower-level pipeline is available without the feature:
//!
//! ```
//! use c_embed::{Settings, encode, unescape};
//!
//! let encoded = encode(b"hello", &Settings::default()).unwrap();
//! assert!(!encoded.metadata().compressed);
//! assert_eq!(encoded.to_bytes(), b"\n\"hello\",\n");
//! assert_eq!(unescape(&encoded.to_bytes()).unwrap(), b"hello");
//! ```

pub mod chunk;
pub mod deflate;
mod error;
pub mod escape;
pub mod resource;
pub mod template;

pub use chunk::ChunkList;
pub use deflate::{MAX_EFFORT_FLAGS, StreamCompressor};
pub use error::{Error, Result};
pub use escape::{Encoder, unescape};
pub use resource::{
    COMPRESSION_SLACK, Encoded, LINE_WIDTH, LITERAL_LENGTH, Metadata, Settings, encode, generate,
    pack_file,
};
pub use template::{DEFAULT_IDENTIFIER, Glue, PLACEHOLDER, Substitution, write_glue};

//
// ===== RUNTIME CODE =====
//

/// Recovers the original bytes of a resource from its array text.
///
/// `text` is everything between the opening `{` and the closing ` 0};` of a
/// generated array. `metadata` is the value reported when the resource was
/// packed.
///
/// # Errors
/// - [`Error::MalformedLiteral`] if `text` is not a sequence of string literals.
/// - [`Error::Decompress`] if a compressed payload does not inflate.
/// - [`Error::IntegrityMismatch`] if the recovered length differs from
///   `metadata.inflated`.
pub fn decompress(text: &[u8], metadata: &Metadata) -> Result<Vec<u8>> {
    let payload = unescape(text)?;
    let data = if metadata.compressed {
        deflate::decompress(&payload)?
    } else {
        payload
    };

    if data.len() as u64 != metadata.inflated {
        return Err(Error::IntegrityMismatch {
            expected: metadata.inflated,
            actual: data.len() as u64,
        });
    }
    Ok(data)
}

//
// ===== BUILD-TIME CODE =====
//

#[cfg(feature = "build")]
mod build;
#[cfg(feature = "build")]
pub use build::{Config, Packed, TableEmitter};
