//! fakeresponse CLI
//!
//! Inspect a routes directory and replay request targets against it to see
//! which rule answers each call.
//!
//! Usage:
//!   fakeresponse list --routes ./default_routes
//!   fakeresponse match --routes ./default_routes /users /users?type=admin

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fakeresponse::{header_map, preload, LoaderConfig, MatchRequest, RuleStore};
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Fake response route inspector
#[derive(Parser, Debug)]
#[command(name = "fakeresponse")]
#[command(author, version, about = "Inspect and exercise fake response route files")]
struct Args {
    /// Directory containing *.json route documents
    #[arg(short, long, global = true, env = "FAKERESPONSE_ROUTES")]
    routes: Option<PathBuf>,

    /// YAML loader configuration (used when --routes is not given)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List loaded rules in match order
    List,
    /// Match request targets in sequence against one store
    Match {
        /// JSON request body used for every call
        #[arg(short, long)]
        body: Option<String>,

        /// Request header as NAME:VALUE (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Request targets, e.g. /users?type=admin
        #[arg(required = true)]
        uris: Vec<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = resolve_config(&args)?;

    let store = RuleStore::new();
    preload(&store, &config)
        .with_context(|| format!("failed to load routes from {}", config.routes_dir.display()))?;

    match args.command {
        Command::List => list_rules(&store),
        Command::Match {
            body,
            headers,
            uris,
        } => {
            let body = body
                .map(|raw| serde_json::from_str::<Value>(&raw))
                .transpose()
                .context("--body is not valid JSON")?
                .unwrap_or(Value::Null);
            let headers = parse_headers(&headers)?;

            for uri in uris {
                let request = MatchRequest::new(uri.as_str())
                    .with_body(body.clone())
                    .with_headers(headers.clone());
                match store.find_match(&request) {
                    Some(rule) => println!(
                        "{CYAN}{uri}{RESET} -> {GREEN}{}{RESET}",
                        serde_json::to_string(rule.rule())?
                    ),
                    None => println!("{CYAN}{uri}{RESET} -> {YELLOW}unmocked{RESET}"),
                }
            }

            println!();
            list_rules(&store);
        }
    }

    Ok(())
}

/// `--routes` (or its env var) wins over `--config`, which wins over the default.
fn resolve_config(args: &Args) -> Result<LoaderConfig> {
    if let Some(routes) = &args.routes {
        return Ok(LoaderConfig::new(routes));
    }
    if let Some(path) = &args.config {
        return LoaderConfig::from_file(path)
            .with_context(|| format!("failed to read config {}", path.display()));
    }
    Ok(LoaderConfig::default())
}

fn parse_headers(raw: &[String]) -> Result<Value> {
    let pairs = raw
        .iter()
        .map(|header| {
            header
                .split_once(':')
                .map(|(name, value)| (name.trim(), value.trim().to_string()))
                .with_context(|| format!("header '{header}' is not NAME:VALUE"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(header_map(pairs))
}

fn list_rules(store: &RuleStore) {
    for (index, rule) in store.all().iter().enumerate() {
        let gate = rule
            .at()
            .map(|at| format!(" at={at}"))
            .unwrap_or_default();
        println!(
            "{DIM}[{index}]{RESET} {}{gate} {DIM}numCalls={}{RESET}",
            rule.route(),
            rule.num_calls()
        );
    }
}
