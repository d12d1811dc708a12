//! IAM command line tool
//!
//! Builds index files from JSON documents and inspects, exports and queries
//! existing files.
//!
//! # Examples
//!
//! ```bash
//! # Build an index from a JSON document
//! iam build tables.json -o tables.iam
//!
//! # Show what a file contains
//! iam inspect tables.iam
//!
//! # Export as JSON
//! iam dump tables.iam --output tables.json
//!
//! # Look up a key in the first mapping
//! iam find tables.iam --mapping 0 --key 1,2,3
//!
//! # Print the default configuration
//! iam config
//! ```

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use iam_codec::config::ByteOrderSetting;
use iam_codec::decode::Decoded;
use iam_codec::document::IndexDocument;
use iam_codec::io::{write_index, CompressionAlgorithm};
use iam_codec::{CodecConfig, Encode, IndexFile, ListingView, MappingMode, MappingView, NumericSequence};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// IAM - Integer Array Model tables
#[derive(Parser, Debug)]
#[command(name = "iam")]
#[command(version = iam_codec::VERSION)]
#[command(about = "Build and inspect IAM integer array index files", long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(long, global = true, env = "IAM_CONFIG")]
    config: Option<PathBuf>,

    /// Log directory path (daily rolling file, disabled when unset)
    #[arg(long, global = true, env = "IAM_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG directives apply on top
    #[arg(long, global = true, default_value = "warn", env = "IAM_LOG_LEVEL")]
    log_level: String,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a JSON document into an index file
    Build(BuildArgs),

    /// Show format, byte order and layout of a file
    Inspect {
        /// Encoded file
        file: PathBuf,
    },

    /// Export an index file as JSON
    Dump {
        /// Encoded file
        file: PathBuf,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Look up a key in a mapping of an index file
    Find {
        /// Encoded file
        file: PathBuf,
        /// Mapping position within the index
        #[arg(short, long, default_value = "0")]
        mapping: usize,
        /// Key as comma separated integers
        #[arg(short, long, allow_hyphen_values = true)]
        key: String,
    },

    /// Print the effective configuration as TOML
    Config,

    /// Show version
    Version,
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// JSON document with mappings and listings
    input: PathBuf,

    /// Output file
    #[arg(short, long)]
    output: PathBuf,

    /// Byte order of the output
    #[arg(long, value_enum)]
    byte_order: Option<OrderArg>,

    /// Default lookup strategy for mappings without a mode
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Compress the output with zstd
    #[arg(long)]
    compress: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OrderArg {
    Big,
    Little,
    Native,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Hashed,
    Sorted,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli)?;

    let config = CodecConfig::load(cli.config.as_deref())?;
    debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Build(args) => build_command(config, args),
        Commands::Inspect { file } => inspect_command(file),
        Commands::Dump { file, output } => dump_command(file, output),
        Commands::Find { file, mapping, key } => find_command(file, mapping, &key),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        Commands::Version => {
            println!("iam {}", iam_codec::VERSION);
            Ok(())
        }
    }
}

/// Setup logging with console output and an optional rolling file
fn setup_logging(cli: &Cli) -> anyhow::Result<()> {
    let file_layer = match &cli.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "iam.log");
            Some(fmt::layer().with_writer(file_appender).with_ansi(false))
        }
        None => None,
    };

    let log_level = cli
        .log_level
        .parse::<tracing::Level>()
        .with_context(|| format!("Invalid log level '{}'", cli.log_level))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(!cli.no_color),
        )
        .with(file_layer)
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    Ok(())
}

/// Build command - encode a JSON document
fn build_command(mut config: CodecConfig, args: BuildArgs) -> anyhow::Result<()> {
    if let Some(order) = args.byte_order {
        config.byte_order = match order {
            OrderArg::Big => ByteOrderSetting::Big,
            OrderArg::Little => ByteOrderSetting::Little,
            OrderArg::Native => ByteOrderSetting::Native,
        };
    }
    if let Some(mode) = args.mode {
        config.mapping_mode = match mode {
            ModeArg::Hashed => MappingMode::Hashed,
            ModeArg::Sorted => MappingMode::Sorted,
        };
    }
    if args.compress {
        config.compression = CompressionAlgorithm::Zstd;
    }

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let document = IndexDocument::from_json(&text)?;
    let bytes = document.to_builder(&config)?.encode(config.byte_order())?;
    let stats = write_index(&args.output, &bytes, &config)?;

    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        mappings = document.mappings.len(),
        listings = document.listings.len(),
        "Built index"
    );
    println!(
        "{}: {} mappings, {} listings, {} bytes ({} on disk)",
        args.output.display(),
        document.mappings.len(),
        document.listings.len(),
        stats.encoded_size,
        stats.stored_size
    );
    Ok(())
}

/// Inspect command - describe a file
fn inspect_command(path: PathBuf) -> anyhow::Result<()> {
    let file = IndexFile::open(&path)?;
    let decoded = file
        .decode()
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    println!("file:        {}", path.display());
    println!("size:        {} bytes", file.bytes().len());
    println!("compression: {:?}", file.compression());
    println!("format:      {}", decoded.format());
    match &decoded {
        Decoded::Mapping(mapping) => {
            println!("byte order:  {}", mapping.order());
            print_mapping("mapping", mapping);
        }
        Decoded::Listing(listing) => {
            println!("byte order:  {}", listing.order());
            print_listing("listing", listing);
        }
        Decoded::Index(index) => {
            println!("byte order:  {}", index.order());
            println!("mappings:    {}", index.mapping_count());
            println!("listings:    {}", index.listing_count());
            for (i, mapping) in index.mappings().iter().enumerate() {
                print_mapping(&format!("mapping[{}]", i), mapping);
            }
            for (i, listing) in index.listings().iter().enumerate() {
                print_listing(&format!("listing[{}]", i), listing);
            }
        }
    }
    Ok(())
}

fn print_mapping(label: &str, mapping: &MappingView<'_>) {
    let range = mapping
        .range_mask()
        .map_or_else(|| "-".to_string(), |mask| format!("{:#X}", mask));
    println!(
        "  {}: {} entries, {}, range mask {}, keys {:?}, values {:?}",
        label,
        mapping.entry_count(),
        mapping.mode(),
        range,
        mapping.key_width(),
        mapping.value_width()
    );
}

fn print_listing(label: &str, listing: &ListingView<'_>) {
    let sizes = listing
        .size_width()
        .map_or_else(|| "uniform".to_string(), |width| format!("{:?} offsets", width));
    println!(
        "  {}: {} items, values {:?}, {}",
        label,
        listing.item_count(),
        listing.content_width(),
        sizes
    );
}

/// Dump command - export as JSON
fn dump_command(path: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let file = IndexFile::open(&path)?;
    let index = file
        .index()
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    let json = IndexDocument::from_index(&index).to_json_pretty()?;

    match output {
        Some(output) => {
            std::fs::write(&output, json)?;
            info!(output = %output.display(), "Exported index");
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Find command - look up one key
fn find_command(path: PathBuf, mapping: usize, key: &str) -> anyhow::Result<()> {
    let key = NumericSequence::from(parse_sequence(key)?);
    let file = IndexFile::open(&path)?;
    let index = file
        .index()
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    if mapping >= index.mapping_count() {
        anyhow::bail!(
            "{} has {} mappings, no mapping {}",
            path.display(),
            index.mapping_count(),
            mapping
        );
    }

    match index.mapping(mapping).find(&key) {
        Some(position) => println!("{} -> {} (entry {})", key, index.mapping(mapping).value(position), position),
        None => println!("{} not found", key),
    }
    Ok(())
}

fn parse_sequence(text: &str) -> anyhow::Result<Vec<i32>> {
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>()
                .with_context(|| format!("'{}' is not a 32-bit integer", part))
        })
        .collect()
}
