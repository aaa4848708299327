//! `waitlist-fair` command-line entry point.
//!
//! - `serve`: run the HTTP engine
//! - `rank`: score a JSON file offline and print the response

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use waitlist_fair::{EngineConfig, Prioritizer};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "waitlist-fair")]
#[command(version = VERSION)]
#[command(about = "Fair, risk-aware radiotherapy wait-list prioritization", long_about = None)]
struct Args {
    /// TOML engine configuration (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve POST /prioritize and GET /health
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1:8000")]
        bind: SocketAddr,
    },
    /// Prioritize a batch from a JSON file and print the response
    Rank {
        /// JSON file: an array of patients or {"patients": [...]}
        #[arg(short, long)]
        input: PathBuf,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let prioritizer = Prioritizer::new(config).context("invalid engine configuration")?;

    match args.command {
        Command::Serve { bind } => {
            let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
            runtime
                .block_on(waitlist_fair::server::serve(bind, prioritizer))
                .with_context(|| format!("serving on {bind}"))?;
        }
        Command::Rank { input, pretty } => {
            let patients = read_patients(&input)?;
            let response = prioritizer
                .prioritize(&patients)
                .context("prioritization failed")?;
            let out = if pretty {
                serde_json::to_string_pretty(&response)?
            } else {
                serde_json::to_string(&response)?
            };
            println!("{out}");
        }
    }

    Ok(())
}

fn read_patients(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;

    match value {
        Value::Array(patients) => Ok(patients),
        Value::Object(mut body) => match body.remove("patients") {
            Some(Value::Array(patients)) => Ok(patients),
            _ => anyhow::bail!("{}: expected a \"patients\" array", path.display()),
        },
        _ => anyhow::bail!("{}: expected an array or an object", path.display()),
    }
}
