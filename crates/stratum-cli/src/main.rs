//! The `migrate` binary.
//!
//! Usage:
//!
//! ```text
//! migrate up [--to VERSION]
//! migrate down (--to VERSION | --all)
//! migrate status
//! ```
//!
//! Exit code 0 on success or no-op; 1 on any planning, lock, or apply error.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use stratum_cli::command::CommandRegistry;
use stratum_cli::commands::register_builtin_commands;
use stratum_core::{setup_logging, Config};

#[tokio::main]
async fn main() -> ExitCode {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);

    let mut cli = clap::Command::new("migrate")
        .about("Versioned, reversible schema changesets for relational databases")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            clap::Arg::new("config")
                .long("config")
                .value_name("PATH")
                .global(true)
                .help("Path to a stratum.toml config file"),
        )
        .arg(
            clap::Arg::new("database-url")
                .long("database-url")
                .value_name("URL")
                .global(true)
                .help("Database connection URL (overrides config and DATABASE_URL)"),
        )
        .arg(
            clap::Arg::new("migrations-dir")
                .long("migrations-dir")
                .value_name("DIR")
                .global(true)
                .help("Directory containing changeset files"),
        );

    for name in registry.list_commands() {
        if let Some(command) = registry.get(name) {
            let sub = clap::Command::new(name.to_string()).about(command.help().to_string());
            cli = cli.subcommand(command.add_arguments(sub));
        }
    }

    let matches = cli.get_matches();
    let Some((sub_name, sub_matches)) = matches.subcommand() else {
        // subcommand_required makes this unreachable; keep the exit honest.
        return ExitCode::FAILURE;
    };

    let config_path = matches.get_one::<String>("config").map(Path::new);
    let mut config = match Config::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(url) = sub_matches
        .get_one::<String>("database-url")
        .or_else(|| matches.get_one::<String>("database-url"))
    {
        config.database_url.clone_from(url);
    }
    if let Some(dir) = sub_matches
        .get_one::<String>("migrations-dir")
        .or_else(|| matches.get_one::<String>("migrations-dir"))
    {
        config.migrations_dir = PathBuf::from(dir);
    }

    setup_logging(&config);

    let Some(command) = registry.get(sub_name) else {
        eprintln!("error: unknown command {sub_name}");
        return ExitCode::FAILURE;
    };

    match command.handle(sub_matches, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
