//! tablekv inspection tool
//!
//! Dump, query and merge SSTable files from the command line.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tablekv::storage::merge_disk;
use tablekv::{Config, DiskTable, Record, Searcher};
use tracing_subscriber::{fmt, EnvFilter};

/// tablekv SSTable tool
#[derive(Parser, Debug)]
#[command(name = "tablekv")]
#[command(about = "Inspect, query and merge tablekv SSTable files")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the header and every record, tombstones included
    Dump {
        /// Table file
        file: PathBuf,
    },

    /// Look up a key
    Get {
        /// Table file
        file: PathBuf,

        /// The key to look up
        key: String,
    },

    /// List live records in key order
    Scan {
        /// Table file
        file: PathBuf,

        /// Maximum number of records to print
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only print keys starting with this prefix
        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// Merge two tables into a new one named after the first
    Merge {
        /// First (older) table file
        first: PathBuf,

        /// Second (newer) table file
        second: PathBuf,

        /// Output file; generated under --data-dir when omitted
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Directory for generated output files
        #[arg(short, long, default_value = "./tablekv_data")]
        data_dir: PathBuf,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tablekv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args.command) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> tablekv::Result<()> {
    match command {
        Commands::Dump { file } => {
            let table = DiskTable::open(&file)?;
            let meta = table.meta();
            println!("name:        {}", meta.name());
            println!("header size: {}", meta.header_size());
            println!("records:     {}", meta.record_count());
            for (offset, record) in meta.offsets().iter().zip(table.iter()) {
                let record = record?;
                let marker = if record.is_tombstone() { " (deleted)" } else { "" };
                println!("@{:<10} {}{}", offset, format_record(&record), marker);
            }
        }
        Commands::Get { file, key } => {
            let table = DiskTable::open(&file)?;
            match table.get(key.as_bytes())? {
                Some(record) => println!("{}", format_record(&record)),
                None => println!("(not found)"),
            }
        }
        Commands::Scan { file, limit, prefix } => {
            let table = DiskTable::open(&file)?;
            let limit = limit.unwrap_or(usize::MAX);
            let records = match prefix {
                Some(prefix) => {
                    let matches_prefix = |key: &[u8], _: &[u8]| key.starts_with(prefix.as_bytes());
                    table.scan_with_predicate(Some(&matches_prefix), limit)?
                }
                None => table.scan_with_limit(limit)?,
            };
            for record in &records {
                println!("{}", format_record(record));
            }
        }
        Commands::Merge {
            first,
            second,
            out,
            data_dir,
        } => {
            let merged = merge_disk(&DiskTable::open(&first)?, &DiskTable::open(&second)?)?;
            let path = match out {
                Some(path) => {
                    merged.persist(&path)?;
                    path
                }
                None => {
                    let config = Config::builder().data_dir(data_dir).build()?;
                    merged.persist_in(&config)?
                }
            };
            tracing::info!(records = merged.len(), "Wrote {}", path.display());
        }
    }
    Ok(())
}

fn format_record(record: &Record) -> String {
    format!(
        "{} = {} (v{})",
        String::from_utf8_lossy(&record.key),
        String::from_utf8_lossy(&record.value),
        record.version
    )
}
