//! Clap command tree definition.
//!
//! Builds the full `clap::Command` tree. Global flags select the catalog and
//! the output mode; each subcommand maps to one executor command.

use clap::{Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("medcat")
        .about("Medication catalog: build the index, query it, export it")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .short('c')
                .help("Catalog directory (overrides catalog_dir from the config file)")
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Config file (default: catalog.toml)")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .conflicts_with("raw")
                .global(true),
        )
        .arg(
            Arg::new("raw")
                .long("raw")
                .help("Raw output mode (bare values, one per line)")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Debug logging on stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(build_build())
        .subcommand(build_export())
        .subcommand(build_list())
        .subcommand(build_get())
        .subcommand(build_facets())
        .subcommand(build_stats())
        .subcommand(build_health())
        .subcommand(build_describe())
        .subcommand(build_upsert())
        .subcommand(build_remove())
        .subcommand(build_apply())
        .subcommand(build_init_config())
}

// =========================================================================
// Index
// =========================================================================

fn build_build() -> Command {
    Command::new("build").about("Regenerate the catalog index and packaging index")
}

fn build_export() -> Command {
    Command::new("export")
        .about("Export index entries, full records or packages")
        .arg(
            Arg::new("output")
                .required(true)
                .help("Destination file"),
        )
        .arg(
            Arg::new("target")
                .long("target")
                .short('t')
                .value_parser(["index", "catalog", "packages"])
                .default_value("catalog")
                .help("What to export"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .value_parser(["csv", "json"])
                .default_value("csv")
                .help("Output format"),
        )
}

// =========================================================================
// Read
// =========================================================================

fn build_list() -> Command {
    Command::new("list")
        .about("Search and filter medications")
        .arg(Arg::new("search").long("search").short('s').help("Substring to search for"))
        .arg(
            Arg::new("field")
                .long("field")
                .help("Field to search (default: name)"),
        )
        .arg(Arg::new("status").long("status").help("Exact status, any case"))
        .arg(Arg::new("category").long("category").help("Exact category, any case"))
        .arg(
            Arg::new("limit")
                .long("limit")
                .short('n')
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64))
                .help("Page size (default from config)"),
        )
        .arg(
            Arg::new("offset")
                .long("offset")
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64))
                .help("Entries to skip"),
        )
}

fn build_get() -> Command {
    Command::new("get")
        .about("Show one full medication record")
        .arg(Arg::new("id").required(true))
}

fn build_facets() -> Command {
    Command::new("facets")
        .about("Distinct manufacturers, categories or statuses")
        .arg(
            Arg::new("kind")
                .required(true)
                .help("manufacturers, categories or statuses"),
        )
}

fn build_stats() -> Command {
    Command::new("stats").about("Index totals and version")
}

fn build_health() -> Command {
    Command::new("health").about("Catalog directory status and file counts")
}

fn build_describe() -> Command {
    Command::new("describe").about("Service name, version and supported commands")
}

// =========================================================================
// Write
// =========================================================================

fn build_upsert() -> Command {
    Command::new("upsert")
        .about("Create or replace a record from a JSON file")
        .arg(Arg::new("id").required(true))
        .arg(
            Arg::new("file")
                .default_value("-")
                .help("JSON document, '-' for stdin"),
        )
}

fn build_remove() -> Command {
    Command::new("remove")
        .about("Delete a record")
        .arg(Arg::new("id").required(true))
}

fn build_apply() -> Command {
    Command::new("apply")
        .about("Apply a change notification ({\"Records\": [...]}) to the catalog")
        .arg(
            Arg::new("file")
                .default_value("-")
                .help("Notification JSON, '-' for stdin"),
        )
}

fn build_init_config() -> Command {
    Command::new("init-config").about("Write a commented default config file if none exists")
}
