//! Manage command line arguments here.
use std::fs::OpenOptions;
use std::path::PathBuf;

use clap::builder::styling;
use clap::{Arg, ArgAction, Command};
use simplelog::*;

/// This structure holds the command line arguments.
#[derive(Debug, Default)]
pub struct CliOptions {
    // input file to carve, also used to name carved files
    pub input_file: PathBuf,

    // extension of the file type to carve
    pub ext: String,

    // where to save carved files, next to the input name if not set
    pub output_dir: Option<PathBuf>,

    // audit file name
    pub audit: Option<PathBuf>,

    // display progress bar
    pub progress_bar: bool,
}

impl CliOptions {
    pub fn new() -> anyhow::Result<CliOptions> {
        Self::from_command(Self::command().get_matches())
    }

    fn command() -> Command {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        Command::new("markcarve")
            .version(clap::crate_version!())
            .styles(STYLES)
            .about("Carve files embedded in a binary blob, using their start and end markers.")
            .arg(
                Arg::new("input")
                    .long_help("Name and path of the file to be carved. Carved files are named <FILE>_<n>.<ext>")
                    .value_name("FILE")
                    .value_parser(clap::value_parser!(PathBuf))
                    .required(true),
            )
            .arg(
                Arg::new("ext")
                    .short('e')
                    .long("ext")
                    .long_help("Extension of the file type to carve: jpg, png or gif")
                    .value_name("EXT")
                    .default_value("jpg"),
            )
            .arg(
                Arg::new("output")
                    .short('o')
                    .long("output")
                    .long_help("Save carved files into DIR instead of next to FILE")
                    .value_name("DIR")
                    .value_parser(clap::value_parser!(PathBuf)),
            )
            .arg(
                Arg::new("audit")
                    .long("audit")
                    .long_help("Write the offsets of carved files into AUDIT")
                    .value_name("AUDIT")
                    .value_parser(clap::value_parser!(PathBuf)),
            )
            .arg(
                Arg::new("log")
                    .long("log")
                    .long_help("Save debugging info into the file LOG.")
                    .action(ArgAction::Set)
                    .value_name("LOG")
                    .value_parser(clap::value_parser!(PathBuf)),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .long_help("Verbose mode, from info (-v) to trace (-vvv).")
                    .action(ArgAction::Count),
            )
            .arg(
                Arg::new("pb")
                    .long("progress")
                    .short('p')
                    .action(ArgAction::SetTrue)
                    .long_help("Display progress bar"),
            )
    }

    fn from_command(matches: clap::ArgMatches) -> anyhow::Result<CliOptions> {
        // save all cli options into a structure
        let mut options = CliOptions::default();

        // input file is mandatory, and ext has a default value
        if let Some(input) = matches.get_one::<PathBuf>("input") {
            options.input_file = input.clone();
        }
        if let Some(ext) = matches.get_one::<String>("ext") {
            options.ext = ext.clone();
        }
        options.output_dir = matches.get_one::<PathBuf>("output").cloned();
        options.audit = matches.get_one::<PathBuf>("audit").cloned();
        options.progress_bar = matches.get_flag("pb");

        // manage debugging
        let level = match matches.get_count("verbose") {
            0 => log::LevelFilter::Off,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        if let Some(path) = matches.get_one::<PathBuf>("log") {
            init_write_logger(path, level)?;
        } else {
            init_term_logger(level)?;
        }

        Ok(options)
    }
}

// Initialize write logger: either create it or use it
fn init_write_logger(logfile: &PathBuf, level: log::LevelFilter) -> anyhow::Result<()> {
    if level == log::LevelFilter::Off {
        return Ok(());
    }

    // initialize logger
    let writable = OpenOptions::new().create(true).append(true).open(logfile)?;

    WriteLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_time_format_rfc3339()
            .build(),
        writable,
    )?;

    Ok(())
}

// Initialize terminal logger
fn init_term_logger(level: log::LevelFilter) -> anyhow::Result<()> {
    if level == log::LevelFilter::Off {
        return Ok(());
    }
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    Ok(())
}
