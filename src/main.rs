//! formsmith - a local-first form builder
//!
//! Define form fields, render them, and keep every submission as JSON

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use formsmith::commands;
use formsmith::config::FormsmithPaths;
use formsmith::shell::Shell;

#[derive(Parser)]
#[command(name = "formsmith")]
#[command(author, version, about = "Build forms from JSON definitions and keep their submissions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize formsmith (first-time setup)
    Init,

    /// Open the interactive form builder
    Shell {
        /// Form definition to load on start
        #[arg(short, long)]
        schema: Option<PathBuf>,
    },

    /// Render the form a definition file produces
    Render {
        /// Path to a form-definition.json file
        schema: PathBuf,

        /// Output HTML markup instead of a field listing
        #[arg(long)]
        html: bool,
    },

    /// Fill and save a submission for a definition file
    Submit {
        /// Path to a form-definition.json file
        schema: PathBuf,

        /// Field values as label=value or #<n>=value (repeatable)
        #[arg(short, long = "value", value_parser = commands::parse_assignment)]
        values: Vec<(String, String)>,
    },

    /// Show the most recent submissions
    Submissions {
        /// Output HTML markup
        #[arg(long)]
        html: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            commands::init()?;
        }
        Commands::Shell { schema } => {
            let paths = FormsmithPaths::new()?;
            let workbench = commands::open_workbench(&paths)?;
            let mut shell = Shell::new(workbench);
            tokio::task::block_in_place(|| shell.run(schema.as_deref()))?;
        }
        Commands::Render { schema, html } => {
            commands::render(&schema, html)?;
        }
        Commands::Submit { schema, values } => {
            if let Err(e) = commands::submit(&schema, &values) {
                // Already printed as a notification.
                if commands::is_reported(&e) {
                    std::process::exit(1);
                }
                return Err(e);
            }
        }
        Commands::Submissions { html } => {
            let format = if html {
                commands::OutputFormat::Html
            } else {
                commands::OutputFormat::Summary
            };
            commands::submissions(format)?;
        }
    }

    Ok(())
}
