//! Carve files embedded in a binary blob.
//!
//! A [`FormatSpec`] tells which start and end markers delimit a file format and
//! how to check a candidate. A [`Carver`] walks a buffer once with one format,
//! and yields each genuine span in the order it was found, named
//! `<target>_<n>.<ext>`.
//!
//! ```
//! use markcarve::{filetypes::jpeg, Carver};
//!
//! let image = b"junk\xFF\xD8\xFF\xE0payload\xFF\xD9junk";
//! let spec = jpeg::format();
//!
//! let found: Vec<_> = Carver::new("image.bin", image, &spec).collect();
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].name, "image.bin_0.jpg");
//! assert_eq!(found[0].offset, 4);
//! ```
pub mod audit;
pub mod carver;
pub mod error;
pub mod filetypes;
pub mod sink;
pub mod source;

pub use carver::{artifact_name, Artifact, CarveSummary, Carver, ScanState, SinkPolicy};
pub use error::CarveError;
pub use filetypes::{corpus::Corpus, FormatSpec, ValidateFn};
pub use sink::{ArtifactSink, FileSink, MemorySink};
pub use source::Source;
