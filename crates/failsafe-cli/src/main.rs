mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "failsafe",
    version,
    about = "Run records through a failsafe stage and dead-letter the bad ones"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse newline-delimited JSON records into rows
    Run {
        /// Input file (default: stdin)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Stage configuration JSON file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write dead-letter records here instead of stderr
        #[arg(long)]
        dead_letter: Option<PathBuf>,
        /// Stage name recorded on dead-letter records
        #[arg(long, default_value = "parse-row")]
        stage_name: String,
        /// Extra stage option, repeatable (KEY=VALUE)
        #[arg(long = "option", value_parser = parse_key_val)]
        options: Vec<(String, String)>,
    },
    /// Render KEY=VALUE pairs as command-line arguments
    Args {
        /// Pairs to render (KEY=VALUE)
        #[arg(value_parser = parse_key_val)]
        pairs: Vec<(String, String)>,
        /// Print a JSON object instead of arguments
        #[arg(long)]
        json: bool,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    match cli.command {
        Commands::Run {
            input,
            config,
            dead_letter,
            stage_name,
            options,
        } => {
            commands::run::execute(
                input.as_deref(),
                config.as_deref(),
                dead_letter.as_deref(),
                &stage_name,
                &options,
            )
            .await
        }
        Commands::Args { pairs, json } => commands::args::execute(&pairs, json),
    }
}
