//! Autosave+ CLI - incremental background autosaves for a document.

use autosave_plus::Error;
use autosave_plus::cli::{Cli, Commands, PrefsCommands};
use autosave_plus::commands::terminal::{PromptConfirmation, TerminalSink};
use autosave_plus::commands::{self, CommandResult, PrefsUpdate};
use autosave_plus::config::FilePreferenceStore;
use autosave_plus::logging::{self, LogConfig};
use clap::Parser;
use std::io::{self, IsTerminal};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    let log_config = LogConfig::from_verbosity(cli.verbose)
        .with_format(cli.log_format)
        .with_ansi(io::stderr().is_terminal());
    logging::init_logging(&log_config);

    if let Err(e) = run_command(cli.command, human) {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn run_command(command: Commands, human: bool) -> Result<(), Error> {
    let mut store = FilePreferenceStore::open_default()?;

    match command {
        Commands::Prefs { command } => {
            let path = store.path().to_path_buf();
            match command {
                PrefsCommands::Show => output(&commands::prefs_show(&store, &path), human),
                PrefsCommands::Path => output(&commands::prefs_path(&path), human),
                PrefsCommands::Set {
                    interval,
                    save_next_to_scene,
                    save_location,
                    prompt_before_save,
                    disable_in_playback,
                } => {
                    let update = PrefsUpdate {
                        interval,
                        save_next_to_scene,
                        save_location,
                        prompt_before_save,
                        disable_in_playback,
                    };
                    output(&commands::prefs_set(&mut store, &path, &update)?, human);
                }
                PrefsCommands::Reset => output(&commands::prefs_reset(&mut store, &path)?, human),
            }
        }
        Commands::NextPath { document } => {
            output(&commands::next_path(&store, &document)?, human);
        }
        Commands::Save { document } => {
            output(&commands::save_now(&store, &document)?, human);
        }
        Commands::Info { document } => {
            output(&commands::info(&store, &document)?, human);
        }
        Commands::Clean { document, yes } => {
            let mut ui = PromptConfirmation::stdin();
            output(&commands::clean(&store, &document, yes, &mut ui)?, human);
        }
        Commands::Run { document, tick_ms } => {
            let stop = Arc::new(AtomicBool::new(false));
            let handler_flag = Arc::clone(&stop);
            ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst))
                .map_err(|e| Error::Other(format!("Failed to install Ctrl-C handler: {}", e)))?;

            let mut sink = TerminalSink::stdout(human);
            let mut ui = PromptConfirmation::stdin();
            let summary = commands::run(
                store,
                &document,
                Duration::from_millis(tick_ms),
                &stop,
                &mut sink,
                &mut ui,
            )?;
            output(&summary, human);
        }
    }

    Ok(())
}

fn output<T: CommandResult>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
