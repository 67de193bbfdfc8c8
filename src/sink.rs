// where carved artifacts end up
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::carver::Artifact;

/// Receives each artifact as soon as it's accepted.
pub trait ArtifactSink {
    fn write(&mut self, artifact: &Artifact<'_>) -> std::io::Result<()>;
}

/// Saves each artifact into its own file, named after the artifact.
#[derive(Debug, Default)]
pub struct FileSink {
    // if set, files are created here instead of at the artifact name as is
    output_dir: Option<PathBuf>,
}

impl FileSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            output_dir: Some(dir.as_ref().to_path_buf()),
        }
    }

    // path of the file for this artifact
    pub fn path_of(&self, artifact: &Artifact<'_>) -> PathBuf {
        match &self.output_dir {
            // only the file name part is kept, the target may contain directories
            Some(dir) => {
                let file_name = Path::new(&artifact.name)
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(&artifact.name));
                dir.join(file_name)
            }
            None => PathBuf::from(&artifact.name),
        }
    }
}

impl ArtifactSink for FileSink {
    fn write(&mut self, artifact: &Artifact<'_>) -> std::io::Result<()> {
        // check if the directory exists
        if let Some(dir) = &self.output_dir {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let file = File::create(self.path_of(artifact))?;
        let mut writer = BufWriter::new(file);

        writer.write_all(artifact.data)?;
        writer.flush()?; // Ensure everything is written

        Ok(())
    }
}

/// Keeps artifacts in memory, in the order they were received.
#[derive(Debug, Default)]
pub struct MemorySink(Vec<(String, Vec<u8>)>);

impl MemorySink {
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<(String, Vec<u8>)> {
        self.0
    }
}

impl ArtifactSink for MemorySink {
    fn write(&mut self, artifact: &Artifact<'_>) -> std::io::Result<()> {
        self.0.push((artifact.name.clone(), artifact.data.to_vec()));
        Ok(())
    }
}
