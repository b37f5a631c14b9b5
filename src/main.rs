#![deny(rust_2018_idioms, unsafe_code)]

mod commands;
mod options;

use anyhow::{Context, Result};
use clap::Parser;
use gix_protect_paths::hooks::MergeRequest;
use options::{Args, Subcommands};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);
    let format = args.format;
    match run(args) {
        Ok(code) => code,
        Err(err) => {
            // Anything we could not evaluate is rejected.
            commands::report_error(format, &err);
            ExitCode::FAILURE
        }
    }
}

/// Run the command and return the status to exit with.
fn run(args: Args) -> Result<ExitCode> {
    let settings = commands::load_settings(&args.git_dir, args.config.as_deref())?;
    let invocation = commands::Invocation {
        git_dir: args.git_dir,
        settings,
        user: args.user,
        format: args.format,
    };
    match args.cmd {
        Subcommands::PreReceive => {
            let input = std::io::read_to_string(std::io::stdin().lock()).context("could not read stdin")?;
            let decision = invocation.pre_receive(&input)?;
            invocation.report(&decision)
        }
        Subcommands::MergeCheck {
            target_ref,
            target_commit,
            source_commit,
        } => {
            let decision = invocation.merge_check(&MergeRequest {
                target_ref,
                target_commit,
                source_commit,
            })?;
            invocation.report(&decision)
        }
        Subcommands::CheckConfig => Ok(if invocation.check_config()? {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }),
    }
}

#[cfg(feature = "tracing")]
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("PROTECT_PATHS_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    // Only fails if a subscriber is installed already.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

#[cfg(not(feature = "tracing"))]
fn init_tracing(_verbose: bool) {}
