use std::ops::Deref;

use super::{gif, jpeg, png, FormatSpec};

// the list of all file types that we can carve
// a scan only ever uses one of them
#[derive(Debug)]
pub struct Corpus(Vec<FormatSpec>);

impl Corpus {
    // define all file types to carve
    pub fn new() -> Self {
        Self(vec![jpeg::format(), png::format(), gif::format()])
    }

    // find a file type from its extension
    pub fn get(&self, ext: &str) -> Option<&FormatSpec> {
        self.0.iter().find(|spec| spec.ext().eq_ignore_ascii_case(ext))
    }

    // all extensions we know about, used for the cli help
    pub fn extensions(&self) -> Vec<&str> {
        self.0.iter().map(|spec| spec.ext()).collect()
    }
}

impl Default for Corpus {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Corpus {
    type Target = Vec<FormatSpec>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
