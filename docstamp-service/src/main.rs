//! docstamp CLI

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docstamp_service::{ServiceConfig, SledStore, TimestampService, UploadPolicy};
use docstamp_types::Digest;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docstamp")]
#[command(about = "Document timestamping over a Merkle tree of every document seen", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, default_value = "docstamp.toml")]
    config: PathBuf,

    /// Storage directory, overrides the configuration
    #[arg(short = 'd', long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timestamp a file
    Timestamp {
        /// File to timestamp
        file: PathBuf,
    },

    /// Timestamp raw data from stdin
    TimestampStdin,

    /// Check whether a file was ever timestamped
    Verify {
        /// File to verify
        file: PathBuf,
    },

    /// Check a file against the leaves of the current tree
    Member {
        /// File to check
        file: PathBuf,
    },

    /// Print an inclusion proof for a file under the current root
    Prove {
        /// File to prove
        file: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the current merkle root
    Root,

    /// List all stored records
    List,

    /// Show details of a timestamp record
    Show {
        /// Document digest in hex format
        digest: String,
    },

    /// Export a record as JSON
    Export {
        /// Document digest in hex format
        digest: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a default configuration file
    InitConfig,
}

fn load_config(cli: &Cli) -> Result<ServiceConfig> {
    let mut config = if cli.config.exists() {
        ServiceConfig::from_file(&cli.config)
            .with_context(|| format!("Failed to load {}", cli.config.display()))?
    } else {
        let mut config = ServiceConfig::default();
        config.apply_env();
        config
    };

    if let Some(data_dir) = &cli.data_dir {
        config.storage.data_dir = data_dir.clone();
    }

    Ok(config)
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_service(config: &ServiceConfig) -> Result<TimestampService> {
    std::fs::create_dir_all(&config.storage.data_dir).with_context(|| {
        format!(
            "Failed to create data directory {}",
            config.storage.data_dir.display()
        )
    })?;

    let store = SledStore::open(&config.storage.data_dir)?;
    let service = TimestampService::open(Arc::new(store))?
        .with_upload_policy(UploadPolicy::from_config(&config.upload));

    Ok(service)
}

fn write_output(output: Option<&Path>, contents: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, contents)?;
            println!("Written to {}", path.display());
        }
        None => println!("{}", contents),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config.logging.level);

    if let Commands::InitConfig = cli.command {
        config.to_file(&cli.config)?;
        println!("Default configuration saved to {}", cli.config.display());
        return Ok(());
    }

    let service = open_service(&config)?;

    match cli.command {
        Commands::Timestamp { file } => {
            let receipt = service.timestamp_file(&file).await?;

            println!("Timestamp created successfully");
            println!("Document hash: {}", receipt.document_digest);
            println!("Merkle root:   {}", receipt.merkle_root);
        }

        Commands::TimestampStdin => {
            use std::io::Read;

            let mut data = Vec::new();
            std::io::stdin().read_to_end(&mut data)?;

            let receipt = service.timestamp(data).await?;

            println!("Timestamp created successfully");
            println!("Document hash: {}", receipt.document_digest);
            println!("Merkle root:   {}", receipt.merkle_root);
        }

        Commands::Verify { file } => {
            let result = service.verify_file(&file).await?;
            println!("{}", serde_json::to_string(&result)?);
        }

        Commands::Member { file } => {
            println!("{}", service.is_member_file(&file).await?);
        }

        Commands::Prove { file, output } => {
            let proof = service
                .inclusion_proof_file(&file)
                .await?
                .ok_or_else(|| anyhow::anyhow!("{} is not in the current tree", file.display()))?;

            write_output(output.as_deref(), &serde_json::to_string_pretty(&proof)?)?;
        }

        Commands::Root => match service.current_root().await {
            Some(root) => println!("{}", root),
            None => println!("No documents timestamped yet"),
        },

        Commands::List => {
            let records = service.records().await?;

            if records.is_empty() {
                println!("No stored records");
            } else {
                println!("Stored records ({})", records.len());
                println!();
                for record in records {
                    println!("Sequence:      {}", record.sequence);
                    println!("Document hash: {}", record.document_digest);
                    println!("Merkle root:   {}", record.merkle_root);
                    println!("Recorded at:   {}", record.recorded_at);
                    println!();
                }
            }
        }

        Commands::Show { digest } => {
            let digest = Digest::from_hex(&digest)?;
            let record = service
                .record(&digest)
                .await?
                .ok_or_else(|| anyhow::anyhow!("No record found for digest: {}", digest))?;

            println!("Timestamp Record");
            println!("================");
            println!("Sequence:      {}", record.sequence);
            println!("Document hash: {}", record.document_digest);
            println!("Merkle root:   {}", record.merkle_root);
            println!("Recorded at:   {}", record.recorded_at);
            println!("Size (bytes):  {}", record.document.len());
        }

        Commands::Export { digest, output } => {
            let digest = Digest::from_hex(&digest)?;
            let record = service
                .record(&digest)
                .await?
                .ok_or_else(|| anyhow::anyhow!("No record found for digest: {}", digest))?;

            write_output(output.as_deref(), &serde_json::to_string_pretty(&record)?)?;
        }

        // Handled before the store is opened
        Commands::InitConfig => {}
    }

    Ok(())
}
