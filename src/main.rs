use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod domain;
mod services;

pub use cli::*;
pub use commands::compile::{apply_match, compile_patterns, working_table};
pub use commands::*;
pub use domain::errors::MushError;
pub use domain::models::*;
pub use services::compiler::{compile_sources, Compiler};
pub use services::config::{load_host_config, load_project};
pub use services::output::{print_one, print_out, report_error};
pub use services::session::install;
pub use services::sources::{
    copy_to_clipboard, expand_sources, filter_matching, read_source, read_sources, write_output,
};
pub use services::storage::DefineStore;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(report_error(cli.json, &e)),
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mushform=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let store = DefineStore::from_arg(&cli.defines);
    match store.path() {
        Some(p) => tracing::debug!(store = %p.display(), "defines store"),
        None => tracing::debug!("defines disabled"),
    }

    if handle_compile_command(cli, &store)? {
        return Ok(());
    }
    if handle_define_commands(cli, &store)? {
        return Ok(());
    }
    handle_install_command(cli, &store)?;
    Ok(())
}
