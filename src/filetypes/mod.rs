// description of one embeddable file format: which markers delimit it and how to check it
use std::fmt;

// alias for the function deciding whether a candidate span is a genuine file
pub type ValidateFn = fn(&[u8]) -> bool;

/// Immutable description of a file format we're able to carve.
///
/// A `FormatSpec` is built once and then only borrowed: any number of carvers,
/// on any number of threads, can share the same instance.
#[derive(Clone)]
pub struct FormatSpec {
    // the file type extension, used to name carved files
    ext: String,

    // the magic bytes starting a file
    start_marker: Vec<u8>,

    // the bytes ending a file
    end_marker: Vec<u8>,

    // the function used to validate a candidate span
    validate: ValidateFn,
}

impl FormatSpec {
    /// Markers are taken as is and should not be empty: a carver given an
    /// empty marker finds nothing.
    pub fn new(ext: &str, start_marker: &[u8], end_marker: &[u8], validate: ValidateFn) -> Self {
        Self {
            ext: String::from(ext),
            start_marker: start_marker.to_vec(),
            end_marker: end_marker.to_vec(),
            validate,
        }
    }

    pub fn ext(&self) -> &str {
        &self.ext
    }

    pub fn start_marker(&self) -> &[u8] {
        &self.start_marker
    }

    pub fn end_marker(&self) -> &[u8] {
        &self.end_marker
    }

    // shortest span a validator has to look at
    pub fn marker_len(&self) -> usize {
        self.start_marker.len() + self.end_marker.len()
    }

    /// True if `span` is a genuine member of this format.
    #[inline]
    pub fn validate(&self, span: &[u8]) -> bool {
        (self.validate)(span)
    }
}

impl fmt::Debug for FormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ext={} start={:02X?} end={:02X?}",
            self.ext, self.start_marker, self.end_marker
        )
    }
}

pub mod corpus;
pub mod gif;
pub mod jpeg;
pub mod png;
