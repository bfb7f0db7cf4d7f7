//! CLI argument definitions for Autosave+.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::logging::LogFormat;

/// Version string with the commit and build time baked in by `build.rs`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("AUTOSAVE_PLUS_GIT_COMMIT"),
    "\nbuilt: ",
    env!("AUTOSAVE_PLUS_BUILD_TIMESTAMP"),
);

/// Autosave+ - incremental background autosaves for a document.
///
/// Run `autosave-plus run <DOCUMENT>` to keep numbered snapshots of a file
/// while it is being edited.
#[derive(Parser, Debug)]
#[command(name = "autosave-plus")]
#[command(author, version, long_version = LONG_VERSION)]
#[command(about = "Incremental background autosaves for a document", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Format of log lines written to stderr
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Preference management commands
    Prefs {
        #[command(subcommand)]
        command: PrefsCommands,
    },

    /// Print the path the next autosave of DOCUMENT would be written to
    NextPath {
        /// Document to autosave
        document: PathBuf,
    },

    /// Write one incremental autosave of DOCUMENT now
    Save {
        /// Document to autosave
        document: PathBuf,
    },

    /// Show how many autosaves of DOCUMENT exist and their total size
    Info {
        /// Document whose autosaves to inspect
        document: PathBuf,
    },

    /// Delete the autosaves of DOCUMENT (the document itself is kept)
    Clean {
        /// Document whose autosaves to delete
        document: PathBuf,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Run the autosave scheduler in the foreground until interrupted
    Run {
        /// Document to autosave
        document: PathBuf,

        /// Milliseconds between scheduler ticks
        #[arg(long, default_value_t = 250, value_parser = clap::value_parser!(u64).range(10..))]
        tick_ms: u64,
    },
}

/// Preference subcommands
#[derive(Subcommand, Debug)]
pub enum PrefsCommands {
    /// Show the effective preferences
    Show,

    /// Show where preferences are stored
    Path,

    /// Change one or more preferences
    Set {
        /// Minutes between autosaves (at least 1)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        interval: Option<u32>,

        /// Save autosaves next to the document
        #[arg(long)]
        save_next_to_scene: Option<bool>,

        /// Directory for autosaves when not saving next to the document
        #[arg(long)]
        save_location: Option<String>,

        /// Ask before each autosave
        #[arg(long)]
        prompt_before_save: Option<bool>,

        /// Skip autosaves while the host is in playback
        #[arg(long)]
        disable_in_playback: Option<bool>,
    },

    /// Restore default preferences
    Reset,
}
