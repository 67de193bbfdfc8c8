// errors raised while carving
// not finding a marker or rejecting a candidate is never an error
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CarveError {
    // the image to carve couldn't be read, nothing was scanned
    #[error("unable to read {}: {source}", .path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // an accepted artifact couldn't be saved
    #[error("unable to write {name}: {source}")]
    SinkWrite {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CarveError>;
