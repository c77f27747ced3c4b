//! Build-script helpers for `c_embed`.
use std::{
    env,
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{debug, warn};

use crate::{
    error::{Error, Result},
    resource::{Metadata, Settings, pack_file},
    template::{DEFAULT_IDENTIFIER, Glue, is_c_identifier, write_glue},
};

//
// ==================== PUBLIC BUILDER API ====================
//

/// A builder for configuring the resource packing process.
///
/// # Example
/// ```no_run
/// // in build.rs
/// let packed = c_embed::Config::new("assets")
///     .identifier("assets")
///     .build()
///     .expect("Failed to pack assets");
/// for resource in &packed {
///     println!("{} -> {:?}", resource.path.display(), resource.metadata);
/// }
/// ```
#[derive(Debug)]
pub struct Config {
    paths: Vec<PathBuf>,
    identifier: String,
    output: Option<PathBuf>,
    settings: Settings,
    tables: Option<TableEmitter>,
}

/// Writes the lookup tables for the packed resources.
///
/// Called with the identifier, the packed resources in array order and the
/// generated file, after the last array and inside the `<identifier>_header_only`
/// guard. The accessor glue that follows expects these tables:
///
/// - `static const char** <id>_resource_data[]`, the arrays in order,
/// - `static const char* <id>_resource_names[]`,
/// - `static const int <id>_resource_metadata[]` (1 compressed, 0 raw),
/// - `static const size_t <id>_resource_length_inflated[]` and
///   `<id>_resource_length_deflated[]`,
///
/// each terminated by a `0` entry.
pub type TableEmitter = fn(&str, &[Packed], &mut dyn Write) -> io::Result<()>;

/// A resource that was written to the generated source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packed {
    /// The file the resource was read from.
    pub path: PathBuf,
    /// Position in the generated file: the array is named
    /// `<identifier>_resource_data_<index>`.
    pub index: usize,
    pub metadata: Metadata,
}

impl Config {
    /// Creates a new configuration for a given resource path.
    ///
    /// The path can be a single file or a directory, in which case every file
    /// below it is packed in sorted order.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            paths: vec![path.as_ref().to_path_buf()],
            identifier: DEFAULT_IDENTIFIER.to_owned(),
            output: None,
            settings: Settings::default(),
            tables: None,
        }
    }

    /// Adds another file or directory after the ones already configured.
    #[must_use]
    pub fn resource(mut self, path: impl AsRef<Path>) -> Self {
        self.paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Sets the prefix for every C name in the generated file.
    ///
    /// If not set, `rescue` is used.
    #[must_use]
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Sets the generated file. Defaults to `$OUT_DIR/<identifier>.c`.
    #[must_use]
    pub fn output(mut self, path: impl AsRef<Path>) -> Self {
        self.output = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the number of columns after which a literal continues on a new line.
    #[must_use]
    pub const fn line_width(mut self, line_width: usize) -> Self {
        self.settings.line_width = line_width;
        self
    }

    /// Sets the number of payload bytes per array element.
    #[must_use]
    pub const fn literal_length(mut self, literal_length: u64) -> Self {
        self.settings.literal_length = literal_length;
        self
    }

    /// Sets how many bytes compression must save for a resource to be stored compressed.
    #[must_use]
    pub const fn compression_slack(mut self, compression_slack: u64) -> Self {
        self.settings.compression_slack = compression_slack;
        self
    }

    /// Sets a zlib-style deflate compression level (0-10).
    ///
    /// If not set, the compressor searches every match candidate, which is
    /// deeper than any level. Lower levels produce larger payloads, so fewer
    /// resources clear the compression slack.
    #[must_use]
    pub const fn level(mut self, level: u8) -> Self {
        self.settings.level = Some(level);
        self
    }

    /// Sets the function writing the lookup tables.
    ///
    /// When set, the tables are followed by the accessor glue
    /// (`<identifier>_get_resource`, `<identifier>_get_resource_size`).
    /// Without it the generated file holds only the inflate helpers and the
    /// resource arrays.
    #[must_use]
    pub const fn tables(mut self, emitter: TableEmitter) -> Self {
        self.tables = Some(emitter);
        self
    }

    /// Runs the packing process with the specified configuration.
    ///
    /// Writes the inflate glue followed by one array per readable resource.
    /// Resources that cannot be read are reported as Cargo warnings and
    /// skipped. The returned list carries what the lookup tables need.
    ///
    /// # Errors
    /// Returns an [`Error`] if the identifier or the settings are invalid, the
    /// output cannot be written, or a path has an unsupported file type.
    pub fn build(self) -> Result<Vec<Packed>> {
        if !is_c_identifier(&self.identifier) {
            return Err(Error::InvalidIdentifier(self.identifier));
        }
        self.settings.validate()?;

        let output = match self.output {
            Some(path) => path,
            None => env::var("OUT_DIR")
                .map(PathBuf::from)
                .map_err(|_| Error::Var("OUT_DIR"))?
                .join(format!("{}.c", self.identifier)),
        };

        let mut files = Vec::new();
        for path in &self.paths {
            collect_files(path, &mut files)?;
        }

        let file = File::create(&output).map_err(|source| Error::OutputUnwritable {
            path: output.clone(),
            source,
        })?;
        debug!("Writing to file {}", output.display());
        let mut out = BufWriter::new(file);

        let packed = write_resources(
            &files,
            &self.identifier,
            &self.settings,
            self.tables,
            &mut out,
        )?;
        out.flush()?;
        Ok(packed)
    }
}

/// Expands directories into the files below them, in sorted order.
fn collect_files(path: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    println!("cargo:rerun-if-changed={}", path.display());

    // Unreadable paths are left for the packer to report.
    let Ok(metadata) = fs::metadata(path) else {
        files.push(path.to_path_buf());
        return Ok(());
    };

    if metadata.is_dir() {
        let entries = fs::read_dir(path).and_then(|dir| {
            dir.map(|entry| entry.map(|e| e.path()))
                .collect::<io::Result<Vec<_>>>()
        });
        let mut entries = match entries {
            Ok(entries) => entries,
            Err(source) => {
                let err = Error::ResourceUnreadable {
                    path: path.to_path_buf(),
                    source,
                };
                warn!("{err}, skipping");
                println!("cargo:warning={err}, skipping");
                return Ok(());
            }
        };
        entries.sort();
        for entry in entries {
            collect_files(&entry, files)?;
        }
        Ok(())
    } else if metadata.is_file() {
        files.push(path.to_path_buf());
        Ok(())
    } else {
        Err(Error::UnsupportedFileType(path.display().to_string()))
    }
}

/// Writes the glue prelude, one array per resource and the closing section
/// to `out`.
///
/// The arrays, the tables and the segment length sit inside
/// `#ifndef <identifier>_header_only`, so the file can also be included for
/// its declarations alone.
fn write_resources<W: Write>(
    files: &[PathBuf],
    identifier: &str,
    settings: &Settings,
    tables: Option<TableEmitter>,
    out: &mut W,
) -> Result<Vec<Packed>> {
    let mut packed: Vec<Packed> = Vec::with_capacity(files.len());
    if files.is_empty() {
        return Ok(packed);
    }

    write_glue(Glue::Inflate.name(), identifier, out)?;
    writeln!(out, "#ifndef {identifier}_header_only")?;

    // Each resource is rendered in memory first so a failed one leaves no
    // half-written array behind.
    let mut text = Vec::new();
    for path in files {
        text.clear();
        let metadata = match pack_file(path, &mut text, settings) {
            Ok(metadata) => metadata,
            Err(err @ (Error::ResourceUnreadable { .. } | Error::IntegrityMismatch { .. })) => {
                warn!("{err}, skipping");
                println!("cargo:warning={err}, skipping");
                continue;
            }
            Err(err) => return Err(err),
        };

        let index = packed.len();
        write!(
            out,
            "static const char* {identifier}_resource_data_{index}[] = {{"
        )?;
        out.write_all(&text)?;
        out.write_all(b" 0};\n")?;

        packed.push(Packed {
            path: path.clone(),
            index,
            metadata,
        });
    }

    if let Some(emit) = tables {
        emit(identifier, &packed, &mut *out)?;
    }
    writeln!(
        out,
        "#define {identifier}_SEGMENT_LENGTH ({})",
        settings.literal_length
    )?;
    writeln!(out, "#endif")?;
    if tables.is_some() {
        write_glue(Glue::Accessor.name(), identifier, out)?;
    }

    Ok(packed)
}
