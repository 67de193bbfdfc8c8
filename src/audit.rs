// audit trail: where each carved artifact was found in the image
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::carver::Artifact;

#[derive(Debug)]
pub struct AuditFile<W: Write> {
    writer: W,
}

impl AuditFile<BufWriter<File>> {
    // create a new audit file, truncating any previous one
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let f = File::create(path)?;
        Ok(Self::new(BufWriter::new(f)))
    }
}

impl<W: Write> AuditFile<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    // add metadata
    pub fn add_metadata<P: AsRef<Path>>(&mut self, path: P, length: usize) -> std::io::Result<()> {
        write!(
            self.writer,
            "image name: {}, file length: {}\n\n",
            path.as_ref().display(),
            length
        )?;
        self.writer.flush()
    }

    // add one line per artifact
    pub fn add_artifact(&mut self, artifact: &Artifact<'_>) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "{}: {}-{} (0x{:X}-0x{:X}) {}",
            artifact.name,
            artifact.offset,
            artifact.end(),
            artifact.offset,
            artifact.end(),
            artifact.data.len()
        )?;
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
