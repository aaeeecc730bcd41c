//! CQL protocol features CLI binary.
//!
//! Runs extension negotiation over a SUPPORTED option map given as JSON.
//!
//! # Commands
//!
//! - `negotiate` - Parse SUPPORTED options and print the resulting features and STARTUP entries
//! - `keys` - List recognized SUPPORTED keys

use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cql_features::{
    protocol::{OptionShape, RECOGNIZED_KEYS},
    NegotiationConfig, ProtocolFeatures, SupportedOptions, VERSION,
};
use serde_json::json;

#[derive(Parser)]
#[command(name = "cql-features")]
#[command(version = VERSION)]
#[command(about = "CQL protocol extension negotiation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Negotiate features from a SUPPORTED option map (JSON)
    Negotiate {
        /// JSON input, e.g. {"TABLETS_ROUTING_V1": []} (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// TOML config with a [policy] table
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// List recognized SUPPORTED keys
    Keys {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Negotiate {
            input,
            file,
            config,
            json,
            verbose,
        } => cmd_negotiate(input, file, config, json, verbose),

        Commands::Keys { json } => cmd_keys(json),
    }
}

fn cmd_negotiate(
    input: Option<String>,
    file: Option<PathBuf>,
    config: Option<PathBuf>,
    json: bool,
    verbose: bool,
) -> anyhow::Result<()> {
    let log_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config = NegotiationConfig::load(config.as_deref())?;
    tracing::debug!(policy = ?config.policy, "Negotiation policy");

    let content = read_input(input, file)?;
    let supported = SupportedOptions::from_json(&content)?;

    let features = ProtocolFeatures::parse_with(&supported, &config.policy)?;
    let startup: BTreeMap<_, _> = features.startup_options().into_iter().collect();

    if json {
        let output = json!({
            "features": features,
            "startup": startup,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Negotiated features:");
    match features.rate_limit_error {
        Some(code) => println!("  Rate limit error:  code {code}"),
        None => println!("  Rate limit error:  -"),
    }
    match &features.sharding_info {
        Some(info) => {
            println!("  Sharding:          shard {}", features.shard_id);
            if let Some(count) = info.shards_count() {
                println!("    Shards:          {count}");
            }
            if let Some(partitioner) = &info.partitioner {
                println!("    Partitioner:     {partitioner}");
            }
            if let Some(algorithm) = &info.sharding_algorithm {
                println!("    Algorithm:       {algorithm}");
            }
            if let Some(msb) = info.sharding_ignore_msb() {
                println!("    Ignore MSB:      {msb}");
            }
            if let Some(port) = info.shard_aware_port() {
                println!("    Port:            {port}");
            }
            if let Some(port) = info.shard_aware_port_ssl() {
                println!("    Port (TLS):      {port}");
            }
        },
        None => println!("  Sharding:          -"),
    }
    println!(
        "  Tablets routing:   {}",
        if features.tablets_routing_v1 { "v1" } else { "-" }
    );
    match features.lwt_info {
        Some(info) => println!("  LWT metadata mark: mask {:#x}", info.lwt_meta_bit_mask),
        None => println!("  LWT metadata mark: -"),
    }

    println!();
    println!("STARTUP options:");
    if startup.is_empty() {
        println!("  (none)");
    }
    for (key, value) in &startup {
        println!("  {key} = {value:?}");
    }

    Ok(())
}

fn cmd_keys(json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&RECOGNIZED_KEYS)?);
        return Ok(());
    }

    println!("{:<32} SHAPE", "KEY");
    for key in RECOGNIZED_KEYS {
        let shape = match key.shape {
            OptionShape::Presence => "presence".to_string(),
            OptionShape::Encoded { field } => format!("{field}=<int>"),
            OptionShape::FirstValue => "first value".to_string(),
        };
        println!("{:<32} {shape}", key.name);
    }

    Ok(())
}

fn read_input(input: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    if let Some(path) = file {
        Ok(std::fs::read_to_string(path)?)
    } else if let Some(s) = input {
        if s == "-" {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        } else {
            Ok(s)
        }
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    }
}
