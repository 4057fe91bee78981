//! LargeMsg CLI
//!
//! Command-line tools for producing, reading and cleaning up offloaded
//! messages.
//!
//! # Commands
//!
//! - `encode` - Wrap a payload in an envelope, offloading it if too large
//! - `decode` - Recover the original payload from an envelope
//! - `inspect` - Show an envelope's flag and address without fetching
//! - `purge` - Delete backed payloads by prefix or topic

mod commands;

use clap::{Parser, Subcommand};
use largemsg_core::{Config, StoreFactory};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// LargeMsg command-line tools.
#[derive(Parser)]
#[command(name = "largemsg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base path for backed payloads (e.g. s3://bucket/root)
    #[arg(global = true, short, long, env = "LARGE_MESSAGE_BASE_PATH")]
    base_path: Option<String>,

    /// Payloads longer than this many bytes are backed
    #[arg(global = true, long, env = "LARGE_MESSAGE_MAX_SIZE")]
    max_size: Option<usize>,

    /// S3 access key id
    #[arg(global = true, long, env = "LARGE_MESSAGE_S3_ACCESS_KEY")]
    s3_access_key: Option<String>,

    /// S3 secret access key
    #[arg(global = true, long, env = "LARGE_MESSAGE_S3_SECRET_KEY", hide_env_values = true)]
    s3_secret_key: Option<String>,

    /// S3 region
    #[arg(global = true, long, env = "LARGE_MESSAGE_S3_REGION")]
    s3_region: Option<String>,

    /// S3 endpoint override
    #[arg(global = true, long, env = "LARGE_MESSAGE_S3_ENDPOINT")]
    s3_endpoint: Option<String>,

    /// Azure storage connection string
    #[arg(
        global = true,
        long,
        env = "LARGE_MESSAGE_ABS_CONNECTION_STRING",
        hide_env_values = true
    )]
    abs_connection_string: Option<String>,

    /// Root directory for file:// locations
    #[arg(global = true, long, env = "LARGE_MESSAGE_FILE_ROOT")]
    file_root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a payload into a wire envelope
    Encode {
        /// Topic the payload belongs to
        #[arg(short, long)]
        topic: String,

        /// Treat the payload as a record key
        #[arg(short, long)]
        key: bool,

        /// Input file (defaults to stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decode a wire envelope into the original payload
    Decode {
        /// Input file (defaults to stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show an envelope's flag, size and address
    Inspect {
        /// Input file (defaults to stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Delete backed payloads from the base path bucket
    Purge {
        /// Delete every key starting with this prefix
        #[arg(short, long, conflicts_with = "topic", required_unless_present = "topic")]
        prefix: Option<String>,

        /// Delete the payloads of this topic
        #[arg(short, long)]
        topic: Option<String>,

        /// Only delete record keys or record values (keys, values)
        #[arg(short, long, requires = "topic")]
        role: Option<String>,

        /// Dry run - show what would be deleted
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Show version information
    Version,
}

impl Cli {
    fn config(&self) -> Result<Config, Box<dyn std::error::Error>> {
        let mut config = Config::new();
        if let Some(base_path) = &self.base_path {
            config = config.try_base_path(base_path)?;
        }
        if let Some(max_size) = self.max_size {
            config = config.max_size(max_size);
        }
        config.s3_access_key = self.s3_access_key.clone();
        config.s3_secret_key = self.s3_secret_key.clone();
        config.s3_region = self.s3_region.clone();
        config.s3_endpoint = self.s3_endpoint.clone();
        config.abs_connection_string = self.abs_connection_string.clone();
        config.file_root = self.file_root.clone();
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let factory = Arc::new(StoreFactory::new(cli.config()?));

    match cli.command {
        Commands::Encode {
            topic,
            key,
            input,
            output,
        } => {
            commands::encode::run(&factory, &topic, key, input.as_deref(), output.as_deref())?;
        }
        Commands::Decode { input, output } => {
            commands::decode::run(&factory, input.as_deref(), output.as_deref())?;
        }
        Commands::Inspect { input, format } => {
            commands::inspect::run(input.as_deref(), &format)?;
        }
        Commands::Purge {
            prefix,
            topic,
            role,
            dry_run,
        } => {
            let target = match (prefix, topic) {
                (Some(prefix), _) => commands::purge::Target::Prefix(prefix),
                (None, Some(topic)) => commands::purge::Target::Topic {
                    topic,
                    role: role.as_deref().map(commands::purge::parse_role).transpose()?,
                },
                (None, None) => return Err("Either --prefix or --topic is required".into()),
            };
            commands::purge::run(&factory, &target, dry_run)?;
        }
        Commands::Version => {
            println!("LargeMsg CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("LargeMsg Core v{}", largemsg_core::VERSION);
        }
    }

    Ok(())
}
