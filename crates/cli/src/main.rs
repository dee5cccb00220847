//! Medcat CLI: build, query and export a medication catalog.
//!
//! Shell mode only: `medcat [flags] COMMAND` runs a single command and exits.
//! Results go to stdout, logs and errors to stderr.

mod commands;
mod format;
mod parse;

use std::path::{Path, PathBuf};
use std::process;

use medcat_executor::{CatalogConfig, Error, Executor, CONFIG_FILE_NAME};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_error, format_message_error, format_output, OutputMode};
use parse::{matches_to_action, CliAction};

fn main() {
    let cli = build_cli();
    let matches = cli.get_matches();

    // Determine output mode
    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else if matches.get_flag("raw") {
        OutputMode::Raw
    } else {
        OutputMode::Human
    };

    init_logging(matches.get_flag("verbose"));

    let config_path = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    let action = match matches_to_action(&matches) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("{}", format_message_error(&e, output_mode));
            process::exit(2);
        }
    };

    let exit_code = match action {
        CliAction::InitConfig => run_init_config(&config_path, output_mode),
        CliAction::Execute(cmd) => match open_executor(&matches, &config_path) {
            Ok(executor) => match executor.execute(cmd) {
                Ok(output) => {
                    let formatted = format_output(&output, output_mode);
                    if !formatted.is_empty() {
                        println!("{}", formatted);
                    }
                    0
                }
                Err(e) => {
                    eprintln!("{}", format_error(&e, output_mode));
                    1
                }
            },
            Err(e) => {
                eprintln!("{}", format_error(&e, output_mode));
                1
            }
        },
    };
    process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let directive = if verbose { "medcat=debug" } else { "medcat=info" };
    let mut filter = EnvFilter::from_default_env();
    if let Ok(d) = directive.parse() {
        filter = filter.add_directive(d);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_executor(matches: &clap::ArgMatches, config_path: &Path) -> Result<Executor, Error> {
    let mut config = CatalogConfig::load_or_default(config_path).map_err(Error::from)?;
    if let Some(dir) = matches.get_one::<String>("catalog") {
        config.catalog_dir = PathBuf::from(dir);
    }
    debug!(
        target: "medcat::cli",
        config = %config_path.display(),
        catalog_dir = %config.catalog_dir.display(),
        "Opening catalog"
    );
    Executor::open(config)
}

fn run_init_config(path: &Path, mode: OutputMode) -> i32 {
    match CatalogConfig::write_default_if_missing(path) {
        Ok(true) => {
            println!("Wrote {}", path.display());
            0
        }
        Ok(false) => {
            println!("{} already exists", path.display());
            0
        }
        Err(e) => {
            eprintln!("{}", format_error(&Error::from(e), mode));
            1
        }
    }
}
