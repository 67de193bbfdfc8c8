//! Single pass marker carver.
//!
//! A [`Carver`] walks a read-only buffer once. Each time it meets a start
//! marker it looks for the first end marker from that same offset, checks the
//! resulting span with the format validator, and yields it as an [`Artifact`]
//! if it's genuine. The cursor always moves past the end marker, whatever the
//! validation outcome, so spans never overlap and the scan always terminates.
use std::iter::FusedIterator;

use log::{debug, trace, warn};
use memchr::memmem::Finder;

use crate::{
    error::{CarveError, Result},
    filetypes::FormatSpec,
    sink::ArtifactSink,
};

/// Name given to the `index`-th artifact carved out of `target`.
pub fn artifact_name(target: &str, index: usize, ext: &str) -> String {
    format!("{}_{}.{}", target, index, ext)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    // looking for the next start marker from the cursor
    Scanning,

    // a candidate span [start, stop) is waiting for validation
    Found { start: usize, stop: usize },

    // no more start/end pair, final
    Exhausted,
}

/// An accepted span, borrowed from the source buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact<'a> {
    // file name to save the artifact to
    pub name: String,

    // sequence number, starting at 0
    pub index: usize,

    // starting offset in the source buffer
    pub offset: usize,

    // artifact bytes, markers included
    pub data: &'a [u8],
}

impl Artifact<'_> {
    // offset right after the end marker
    pub fn end(&self) -> usize {
        self.offset + self.data.len()
    }
}

/// What to do when the sink fails to save an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkPolicy {
    #[default]
    Abort,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CarveSummary {
    // number of artifacts which passed validation
    pub accepted: usize,

    // number of artifacts the sink saved
    pub written: usize,

    // number of artifacts the sink failed to save (only with SinkPolicy::Skip)
    pub failed: usize,

    // total length of saved artifacts
    pub bytes_written: u64,
}

// 's: the target name and the format, 'b: the buffer artifacts are borrowed from
pub struct Carver<'s, 'b> {
    // used to name artifacts
    target: &'s str,

    // the buffer to carve, never modified
    buffer: &'b [u8],

    // what we're looking for
    spec: &'s FormatSpec,

    start_finder: Finder<'s>,
    end_finder: Finder<'s>,

    // where the next start marker search begins
    cursor: usize,

    // number of artifacts accepted so far
    accepted: usize,

    state: ScanState,
}

impl<'s, 'b> Carver<'s, 'b> {
    pub fn new(target: &'s str, buffer: &'b [u8], spec: &'s FormatSpec) -> Self {
        // an empty marker matches everywhere and the cursor would never move
        let state = if spec.start_marker().is_empty() || spec.end_marker().is_empty() {
            ScanState::Exhausted
        } else {
            ScanState::Scanning
        };

        Self {
            target,
            buffer,
            spec,
            start_finder: Finder::new(spec.start_marker()),
            end_finder: Finder::new(spec.end_marker()),
            cursor: 0,
            accepted: 0,
            state,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == ScanState::Exhausted
    }

    /// Carve the whole buffer, handing each artifact to `sink` as soon as it's accepted.
    pub fn carve<S>(&mut self, sink: &mut S, policy: SinkPolicy) -> Result<CarveSummary>
    where
        S: ArtifactSink + ?Sized,
    {
        let mut summary = CarveSummary::default();

        for artifact in self.by_ref() {
            summary.accepted += 1;

            match sink.write(&artifact) {
                Ok(()) => {
                    summary.written += 1;
                    summary.bytes_written += artifact.data.len() as u64;
                }
                Err(e) if policy == SinkPolicy::Skip => {
                    warn!("unable to write {}: {}, skipping", artifact.name, e);
                    summary.failed += 1;
                }
                Err(e) => {
                    return Err(CarveError::SinkWrite {
                        name: artifact.name,
                        source: e,
                    })
                }
            }
        }

        Ok(summary)
    }

    // Scanning -> Found or Exhausted
    fn locate(&self) -> ScanState {
        let Some(pos) = self.start_finder.find(&self.buffer[self.cursor..]) else {
            trace!("no start marker after offset {}", self.cursor);
            return ScanState::Exhausted;
        };
        let start = self.cursor + pos;

        // the end marker search begins at the start marker itself, not after it
        match self.end_finder.find(&self.buffer[start..]) {
            Some(pos) => ScanState::Found {
                start,
                stop: start + pos + self.spec.end_marker().len(),
            },
            None => {
                trace!("no end marker after offset {}", start);
                ScanState::Exhausted
            }
        }
    }
}

impl<'b> Iterator for Carver<'_, 'b> {
    type Item = Artifact<'b>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                ScanState::Scanning => self.state = self.locate(),
                ScanState::Found { start, stop } => {
                    self.cursor = stop;
                    self.state = ScanState::Scanning;

                    let buffer: &'b [u8] = self.buffer;
                    let span = &buffer[start..stop];

                    if !self.spec.validate(span) {
                        continue;
                    }

                    let artifact = Artifact {
                        name: artifact_name(self.target, self.accepted, self.spec.ext()),
                        index: self.accepted,
                        offset: start,
                        data: span,
                    };
                    self.accepted += 1;

                    debug!(
                        "found {} at offset {} (0x{:X}), length {}",
                        artifact.name,
                        start,
                        start,
                        span.len()
                    );
                    return Some(artifact);
                }
                ScanState::Exhausted => return None,
            }
        }
    }
}

impl FusedIterator for Carver<'_, '_> {}

#[cfg(test)]
mod tests {
    use std::io::{Error, ErrorKind};

    use hex_literal::hex;

    use super::*;
    use crate::{filetypes::jpeg, sink::MemorySink};

    fn always(_: &[u8]) -> bool {
        true
    }

    fn carve_all(buffer: &[u8]) -> Vec<Artifact<'_>> {
        let spec = jpeg::format();
        Carver::new("img", buffer, &spec).collect()
    }

    #[test]
    fn artifacts_outlive_target_and_format() {
        let buffer = hex!("00 FF D8 FF E0 01 FF D9");
        let found = {
            let target = String::from("scratch");
            let spec = jpeg::format();
            Carver::new(&target, &buffer, &spec).collect::<Vec<_>>()
        };

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "scratch_0.jpg");
        assert_eq!(found[0].data, &buffer[1..]);
    }

    #[test]
    fn naming() {
        assert_eq!(artifact_name("disk.img", 0, "jpg"), "disk.img_0.jpg");
        assert_eq!(artifact_name("/tmp/x", 12, "png"), "/tmp/x_12.png");
    }

    #[test]
    fn no_start_marker() {
        assert!(carve_all(&[]).is_empty());
        assert!(carve_all(&hex!("00 11 22 FF D9 33 FF")).is_empty());
    }

    #[test]
    fn start_without_end() {
        let spec = jpeg::format();
        let buffer = hex!("00 FF D8 FF E0 12 34 56 FF");
        let mut carver = Carver::new("img", &buffer, &spec);

        assert!(carver.next().is_none());
        assert!(carver.is_exhausted());
        assert_eq!(carver.cursor(), 0);

        // exhaustion is final
        assert!(carver.next().is_none());
    }

    #[test]
    fn single_span() {
        let buffer = hex!("00 00 FF D8 FF E0 01 02 03 FF D9 00");
        let found = carve_all(&buffer);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "img_0.jpg");
        assert_eq!(found[0].index, 0);
        assert_eq!(found[0].offset, 2);
        assert_eq!(found[0].data, &hex!("FF D8 FF E0 01 02 03 FF D9"));
        assert_eq!(found[0].end(), 11);
    }

    #[test]
    fn back_to_back() {
        let buffer = hex!("FF D8 FF E0 AA FF D9 FF D8 FF E0 BB BB FF D9");
        let found = carve_all(&buffer);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "img_0.jpg");
        assert_eq!(found[0].data, &hex!("FF D8 FF E0 AA FF D9"));
        assert_eq!(found[1].name, "img_1.jpg");
        assert_eq!(found[1].data, &hex!("FF D8 FF E0 BB BB FF D9"));
        assert_eq!(found[0].end(), found[1].offset);
    }

    #[test]
    fn rejected_span_is_skipped() {
        // first span has a DQT segment instead of APP0
        let buffer = hex!("FF D8 FF DB 00 FF D9 FF D8 FF E0 00 FF D9");
        let found = carve_all(&buffer);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "img_0.jpg");
        assert_eq!(found[0].offset, 7);
    }

    #[test]
    fn rejected_span_only() {
        let spec = jpeg::format();
        let buffer = hex!("FF D8 FF DB 00 FF D9 00 00");
        let mut carver = Carver::new("img", &buffer, &spec);

        assert!(carver.next().is_none());
        assert_eq!(carver.accepted(), 0);

        // the cursor went past the rejected span before giving up
        assert_eq!(carver.cursor(), 7);
    }

    #[test]
    fn rejection_does_not_consume_index() {
        let mut buffer = vec![0u8; 64];
        buffer[10..16].copy_from_slice(&hex!("FF D8 00 00 FF D9"));
        buffer[50..56].copy_from_slice(&hex!("FF D8 FF E0 FF D9"));

        let found = carve_all(&buffer);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].offset, 50);
        assert_eq!(found[0].index, 0);
        assert_eq!(found[0].name, "img_0.jpg");
    }

    #[test]
    fn ordering() {
        let mut buffer = Vec::new();
        for i in 0..10u8 {
            buffer.extend_from_slice(&[i; 3]);
            buffer.extend_from_slice(&hex!("FF D8 FF E0"));
            buffer.extend_from_slice(&[i; 5]);
            buffer.extend_from_slice(&hex!("FF D9"));
        }

        let found = carve_all(&buffer);
        assert_eq!(found.len(), 10);
        for (i, pair) in found.windows(2).enumerate() {
            assert!(pair[0].end() <= pair[1].offset);
            assert_eq!(pair[0].index, i);
            assert_eq!(pair[1].index, i + 1);
        }
    }

    #[test]
    fn idempotent() {
        let buffer = hex!("12 FF D8 FF E0 34 FF D9 FF D8 FF DB FF D9 FF D8 FF E0 FF D9");
        let first = carve_all(&buffer);
        let second = carve_all(&buffer);

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn leading_end_marker_ignored() {
        let buffer = hex!("FF D9 00 FF D8 FF E0 00 FF D9");
        let found = carve_all(&buffer);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].offset, 3);
    }

    #[test]
    fn nested_start_marker_is_consumed() {
        // the inner SOI belongs to the outer span and is never looked at again
        let buffer = hex!("FF D8 FF E0 FF D8 FF E0 00 FF D9 FF D9");
        let found = carve_all(&buffer);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].offset, 0);
        assert_eq!(found[0].end(), 11);
    }

    #[test]
    fn end_marker_matched_at_start() {
        // start and end markers are the same: each span is the marker alone
        let spec = FormatSpec::new("bin", b"AB", b"AB", always);
        let buffer = b"xxABxxABAB";
        let found: Vec<_> = Carver::new("t", buffer, &spec).collect();

        let offsets: Vec<_> = found.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![2, 6, 8]);
        assert!(found.iter().all(|a| a.data == b"AB"));
    }

    #[test]
    fn end_marker_prefix_of_start() {
        // the end marker is found inside the start marker itself
        let spec = FormatSpec::new("bin", b"ABC", b"AB", always);
        let buffer = b"--ABC--AB";
        let found: Vec<_> = Carver::new("t", buffer, &spec).collect();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].offset, 2);
        assert_eq!(found[0].data, b"AB");
    }

    #[test]
    fn empty_marker() {
        let spec = FormatSpec::new("bin", b"", b"AB", always);
        let mut carver = Carver::new("t", b"ABAB", &spec);
        assert!(carver.is_exhausted());
        assert!(carver.next().is_none());

        let spec = FormatSpec::new("bin", b"AB", b"", always);
        assert_eq!(Carver::new("t", b"ABAB", &spec).count(), 0);
    }

    #[test]
    fn carve_into_sink() {
        let spec = jpeg::format();
        let buffer = hex!("FF D8 FF E0 AA FF D9 00 FF D8 FF E0 FF D9");
        let mut sink = MemorySink::default();

        let summary = Carver::new("img", &buffer, &spec)
            .carve(&mut sink, SinkPolicy::Abort)
            .unwrap();

        assert_eq!(
            summary,
            CarveSummary {
                accepted: 2,
                written: 2,
                failed: 0,
                bytes_written: 13
            }
        );
        assert_eq!(sink.names(), vec!["img_0.jpg", "img_1.jpg"]);
        assert_eq!(sink.get("img_1.jpg").unwrap(), &hex!("FF D8 FF E0 FF D9"));
    }

    // fails on the given indexes, remembers the names it saved
    #[derive(Default)]
    struct FlakySink {
        failing: Vec<usize>,
        attempts: usize,
        saved: Vec<String>,
    }

    impl ArtifactSink for FlakySink {
        fn write(&mut self, artifact: &Artifact<'_>) -> std::io::Result<()> {
            self.attempts += 1;
            if self.failing.contains(&artifact.index) {
                return Err(Error::new(ErrorKind::PermissionDenied, "read-only"));
            }
            self.saved.push(artifact.name.clone());
            Ok(())
        }
    }

    #[test]
    fn sink_failure_aborts() {
        let spec = jpeg::format();
        let buffer = hex!("FF D8 FF E0 FF D9 FF D8 FF E0 FF D9");
        let mut sink = FlakySink {
            failing: vec![0],
            ..Default::default()
        };

        let mut carver = Carver::new("img", &buffer, &spec);
        let err = carver.carve(&mut sink, SinkPolicy::Abort).unwrap_err();
        assert!(matches!(err, CarveError::SinkWrite { ref name, .. } if name == "img_0.jpg"));
        assert_eq!(sink.attempts, 1);

        // the scan can be resumed where it stopped
        assert_eq!(carver.next().unwrap().name, "img_1.jpg");
    }

    #[test]
    fn sink_failure_skipped() {
        let spec = jpeg::format();
        let buffer = hex!("FF D8 FF E0 FF D9 FF D8 FF E0 FF D9 FF D8 FF E0 FF D9");
        let mut sink = FlakySink {
            failing: vec![1],
            ..Default::default()
        };

        let summary = Carver::new("img", &buffer, &spec)
            .carve(&mut sink, SinkPolicy::Skip)
            .unwrap();

        assert_eq!(summary.accepted, 3);
        assert_eq!(summary.written, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.bytes_written, 12);
        assert_eq!(sink.saved, vec!["img_0.jpg", "img_2.jpg"]);
    }
}
