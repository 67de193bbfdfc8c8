// the image to carve, mapped in memory once and only read afterwards
use std::{
    fs::File,
    io::Read,
    ops::Deref,
    path::Path,
};

use log::debug;
use memmap2::{Mmap, MmapOptions};

use crate::error::{CarveError, Result};

#[derive(Debug)]
pub enum Source {
    Mapped(Mmap),

    // pipes, fifos or devices can't be mapped, so they're read up to EOF
    Owned(Vec<u8>),

    // an empty file can't be mapped
    Empty,
}

impl Source {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let read_error = |source| CarveError::SourceRead {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(read_error)?;
        let metadata = file.metadata().map_err(read_error)?;

        // only a regular file tells its real length
        if !metadata.is_file() {
            let mut buffer = Vec::new();
            file.read_to_end(&mut buffer).map_err(read_error)?;
            debug!("read {} ({} bytes)", path.display(), buffer.len());
            return Ok(Source::Owned(buffer));
        }

        if metadata.len() == 0 {
            debug!("{} is empty", path.display());
            return Ok(Source::Empty);
        }

        // the file must not be modified while we're carving it
        let mmap = unsafe { MmapOptions::new().map(&file) }.map_err(read_error)?;
        debug!("mapped {} ({} bytes)", path.display(), mmap.len());

        Ok(Source::Mapped(mmap))
    }
}

impl Deref for Source {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        match self {
            Source::Mapped(mmap) => &mmap[..],
            Source::Owned(buffer) => &buffer[..],
            Source::Empty => &[],
        }
    }
}
