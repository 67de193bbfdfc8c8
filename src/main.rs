use std::{fs::File, io::BufWriter, time::Instant};

use anyhow::anyhow;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, trace};

use markcarve::{
    audit::AuditFile, Artifact, ArtifactSink, Carver, Corpus, FileSink, SinkPolicy, Source,
};

mod args;
use args::CliOptions;

// saves carved files and reports each of them
struct CliSink {
    files: FileSink,
    audit: Option<AuditFile<BufWriter<File>>>,
    pb: Option<ProgressBar>,
}

impl ArtifactSink for CliSink {
    fn write(&mut self, artifact: &Artifact<'_>) -> std::io::Result<()> {
        self.files.write(artifact)?;

        if let Some(audit) = &mut self.audit {
            audit.add_artifact(artifact)?;
        }

        let line = format!("{} ({} KB)", artifact.name, artifact.data.len() / 1024);
        match &self.pb {
            Some(pb) => {
                pb.set_position(artifact.end() as u64);
                pb.println(line);
            }
            None => println!("{}", line),
        }

        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    // harvest cli arguments
    let opts = CliOptions::new()?;
    trace!("args: {:?}", opts);
    let now = Instant::now();

    // only one file type is carved per run
    let corpus = Corpus::new();
    let spec = corpus.get(&opts.ext).ok_or_else(|| {
        anyhow!(
            "unknown file type '{}', expected one of: {}",
            opts.ext,
            corpus.extensions().join(", ")
        )
    })?;

    // carved files are named after the input file, as given on the command line
    let target = opts.input_file.to_str().ok_or_else(|| {
        anyhow!(
            "input file name {} is not valid UTF-8, carved files can't be named after it",
            opts.input_file.display()
        )
    })?;

    // open image and build mmap
    let source = Source::open(&opts.input_file)?;
    info!(
        "carving {} files out of {} ({} bytes)",
        spec.ext(),
        opts.input_file.display(),
        source.len()
    );

    let mut audit = match &opts.audit {
        Some(path) => Some(AuditFile::create(path)?),
        None => None,
    };
    if let Some(audit) = &mut audit {
        audit.add_metadata(&opts.input_file, source.len())?;
    }

    let pb = opts.progress_bar.then(|| progress_bar(source.len()));

    let mut sink = CliSink {
        files: match &opts.output_dir {
            Some(dir) => FileSink::with_output_dir(dir),
            None => FileSink::new(),
        },
        audit,
        pb,
    };

    let summary = Carver::new(target, &source, spec).carve(&mut sink, SinkPolicy::Abort)?;

    if let Some(pb) = &sink.pb {
        pb.finish_with_message(format!("{} files found", summary.written));
    }

    // print out statistics
    info!(
        "{} files carved, {} bytes written, total time: {:?}",
        summary.written,
        summary.bytes_written,
        now.elapsed()
    );

    Ok(())
}

// progress bar over the whole image
fn progress_bar(length: usize) -> ProgressBar {
    let pb = ProgressBar::new(length as u64);

    if let Ok(style) =
        ProgressStyle::default_bar().template("[{msg}] {bar:40.cyan/blue} {bytes}/{total_bytes} ({eta})")
    {
        pb.set_style(style);
    }
    pb.set_message("Searching");

    pb
}
