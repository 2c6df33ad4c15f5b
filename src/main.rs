use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use covsummary::action::Outcome;
use covsummary::cli::{cmd_action, cmd_render, RenderArgs};

/// covsummary — Markdown coverage summaries for pull requests.
#[derive(Parser)]
#[command(name = "covsummary", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a coverage summary and print it to stdout.
    Render {
        #[command(flatten)]
        args: RenderArgs,

        /// Exit with an error when any report is below the minimum.
        #[arg(long)]
        fail_below_threshold: bool,
    },

    /// Run as a GitHub Actions step, reading `INPUT_*` variables.
    Action,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            args,
            fail_below_threshold,
        } => {
            let rendered = cmd_render(&args)?;
            println!("{}", rendered.document);
            if fail_below_threshold && rendered.below_threshold {
                bail!("Minimum coverage requirement was not satisfied");
            }
            Ok(())
        }
        Commands::Action => {
            let (settings, outcome) = cmd_action()?;
            if let Outcome::Completed {
                below_threshold: true,
                ..
            } = outcome
            {
                if settings.fail_below_threshold {
                    bail!("Minimum coverage requirement was not satisfied");
                }
            }
            Ok(())
        }
    }
}
