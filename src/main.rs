//! Sleepstack CLI - Binaural Beats and Ambience
//!
//! Command-line entry point for the sleepstack generator and mixer.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{debug, error};

use sleepstack::cli::{commands, Cli, Commands};
use sleepstack::SleepstackError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    debug!("Sleepstack v{}", env!("CARGO_PKG_VERSION"));

    match handle_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn handle_command(cli: &Cli) -> anyhow::Result<()> {
    if let Commands::Config { action } = &cli.command {
        return commands::config(&cli.config, *action)
            .with_context(|| format!("config {:?} failed", action));
    }

    let config = commands::load_config(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;

    match &cli.command {
        Commands::Generate {
            duration,
            tone,
            out,
        } => {
            commands::generate(&config, duration, tone, out.as_deref())
                .context("generate failed")?;
        }
        Commands::Mix {
            binaural,
            ambience,
            levels,
            fade,
            out,
        } => {
            commands::mix(&config, binaural, ambience, levels, *fade, out.as_deref())
                .context("mix failed")?;
        }
        Commands::Run {
            vibe,
            duration,
            ambience,
            tone,
            seamless_loop,
            levels,
            ambience_fade,
            binaural_out,
            out,
        } => {
            commands::run(
                &config,
                vibe.as_deref(),
                duration,
                ambience,
                tone,
                *seamless_loop,
                levels,
                *ambience_fade,
                binaural_out.as_deref(),
                out.as_deref(),
            )
            .context("run failed")?;
        }
        Commands::Vibes => commands::list_vibes(),
        Commands::Config { .. } => {}
    }

    Ok(())
}

/// Print the error chain with recovery hints and pick the exit code
fn report(err: &anyhow::Error) -> ExitCode {
    error!("{:#}", err);

    match err.downcast_ref::<SleepstackError>() {
        Some(app_err) => {
            for suggestion in app_err.recovery_suggestions() {
                eprintln!("  hint: {}", suggestion);
            }
            ExitCode::from(app_err.exit_code() as u8)
        }
        None => ExitCode::FAILURE,
    }
}
