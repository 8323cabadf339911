//! Command line definition and dispatch.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::AppConfig;
use crate::error::Result;
use crate::plan::{load_request, openapi_json, read_request, run_plan};

#[derive(Parser, Debug)]
#[command(name = "load-it-now")]
#[command(version)]
#[command(about = "Plans which trucks to book for a set of boxes")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Optimize a plan request and print the ranked solutions as JSON
    Optimize {
        /// Path to the JSON plan request; reads stdin when omitted or "-"
        input: Option<PathBuf>,

        /// Leave metrics and insights out of the response
        #[arg(long)]
        no_insights: bool,

        /// Print JSON on a single line
        #[arg(long)]
        compact: bool,
    },
    /// Print the OpenAPI document of the request and response formats
    Schema,
}

/// Runs `cli` and writes the result to `out`.
pub fn execute(cli: Cli, config: &AppConfig, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Commands::Optimize {
            input,
            no_insights,
            compact,
        } => {
            let request = match input {
                Some(path) if path.as_os_str() != "-" => {
                    info!(path = %path.display(), "reading plan request");
                    load_request(&path)?
                }
                _ => read_request(io::stdin().lock())?,
            };

            let thresholds = config.insights.thresholds();
            let with_insights = config.insights.enabled() && !no_insights;
            let response = run_plan(
                request,
                &config.optimizer.loading_config(),
                with_insights.then_some(&thresholds),
            )?;

            if compact {
                serde_json::to_writer(&mut *out, &response)?;
            } else {
                serde_json::to_writer_pretty(&mut *out, &response)?;
            }
            writeln!(out)?;
        }
        Commands::Schema => {
            writeln!(out, "{}", openapi_json()?)?;
        }
    }
    Ok(())
}
