//! k2ipset-gen: CLI tool for building and inspecting binary table files.

use clap::{Parser, Subcommand};
use k2ipset::binary::FILE_EXTENSION;
use k2ipset::{IndexReader, IpSet, RangeListParser};
use std::fs;
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "k2ipset-gen")]
#[command(author = "Kaitu.io")]
#[command(version = "0.1.0")]
#[command(about = "Build binary membership tables from CIDR range lists", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build both family tables from range-list files
    Generate {
        /// IPv4 range list (one CIDR per line)
        #[arg(long)]
        v4_input: PathBuf,

        /// IPv6 range list (one CIDR per line)
        #[arg(long)]
        v6_input: PathBuf,

        /// Output directory for table files
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print size statistics for a table file
    Inspect {
        /// Table file
        input: PathBuf,
    },

    /// Query addresses against a generated table pair
    Query {
        /// IPv4 table file
        #[arg(long)]
        v4_table: PathBuf,

        /// IPv6 table file
        #[arg(long)]
        v6_table: PathBuf,

        /// Addresses to test
        addresses: Vec<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            v4_input,
            v6_input,
            output_dir,
            verbose,
        } => {
            if let Err(e) = generate(&v4_input, &v6_input, &output_dir, verbose) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Inspect { input } => {
            if let Err(e) = inspect(&input) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Query {
            v4_table,
            v6_table,
            addresses,
        } => {
            if let Err(e) = query(&v4_table, &v6_table, &addresses) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn generate(
    v4_input: &PathBuf,
    v6_input: &PathBuf,
    output_dir: &PathBuf,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ranges = RangeListParser::parse(fs::File::open(v4_input)?)?;
    let more = RangeListParser::parse(fs::File::open(v6_input)?)?;
    ranges.v4.extend(more.v4);
    ranges.v6.extend(more.v6);

    if verbose {
        println!(
            "Parsed {} IPv4 and {} IPv6 ranges",
            ranges.v4.len(),
            ranges.v6.len()
        );
    }

    let aggregated = ranges.aggregate();
    if verbose {
        println!(
            "Aggregated to {} IPv4 and {} IPv6 ranges",
            aggregated.v4.len(),
            aggregated.v6.len()
        );
    }

    let (v4_data, v6_data) = IpSet::build_tables(&aggregated)?;

    fs::create_dir_all(output_dir)?;
    let v4_path = output_dir.join(format!("ipset_v4.{FILE_EXTENSION}"));
    let v6_path = output_dir.join(format!("ipset_v6.{FILE_EXTENSION}"));
    fs::write(&v4_path, &v4_data)?;
    fs::write(&v6_path, &v6_data)?;

    println!("Generated {:?} ({} bytes)", v4_path, v4_data.len());
    println!("Generated {:?} ({} bytes)", v6_path, v6_data.len());
    Ok(())
}

fn inspect(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let reader = IndexReader::open(input)?;
    println!(
        "{:?}: {} words ({} bytes), {} nodes",
        input,
        reader.word_count(),
        reader.word_count() * 2,
        reader.node_count()
    );
    Ok(())
}

fn query(
    v4_table: &PathBuf,
    v6_table: &PathBuf,
    addresses: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let set = IpSet::open(v4_table, v6_table)?;

    for address in addresses {
        match address.parse::<IpAddr>() {
            Ok(ip) => println!("{}: {}", address, set.contains(ip)),
            Err(_) => println!("{}: not an IP address", address),
        }
    }
    Ok(())
}
