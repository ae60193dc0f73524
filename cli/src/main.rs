//! Build hash trees over line-delimited transaction records, then look for, prove or verify records.

use std::{fs, num::NonZeroUsize, path::PathBuf, time::Instant};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use log::info;
use txtree::{BuildConfig, Hasher, Sha256, Sha256Tree};

mod records;
mod simulate;


#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Default log filter, `RUST_LOG` taking precedence over it
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Args, Debug)]
struct Source {
    /// File holding one transaction record per line
    file: PathBuf,

    /// Number of workers hashing the records into leaves
    #[arg(short, long, env = "TXTREE_WORKERS", default_value_t = BuildConfig::DEFAULT_WORKERS)]
    workers: NonZeroUsize,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the root hash along with the tree statistics
    Root {
        #[command(flatten)]
        source: Source,
    },
    /// Look for a record in the tree
    Find {
        #[command(flatten)]
        source: Source,
        record: String,
    },
    /// Print the inclusion proof of a record, one `<side> <hex digest>` line per level
    Prove {
        #[command(flatten)]
        source: Source,
        record: String,
    },
    /// Check a record against a proof file and a root hash, without any record file
    Verify {
        record: String,
        proof: PathBuf,
        /// Hex encoded root hash
        root: String,
    },
    /// Mock a server keeping the records and a light client keeping the root hash only
    Simulate {
        #[command(flatten)]
        source: Source,
        /// Index of the record getting corrupted on server side
        #[arg(long, default_value_t = 0)]
        corrupted: usize,
    },
}

/// Statistics of a single build run.
#[derive(Debug)]
struct RunStats {
    leaves: usize,
    height: usize,
    elapsed: std::time::Duration,
}

fn build(source: &Source) -> anyhow::Result<(Sha256Tree, RunStats)> {
    let records = records::load(&source.file)?;

    let start = Instant::now();
    let tree = Sha256Tree::build(&records, &BuildConfig::with_workers(source.workers))?;
    let stats = RunStats { leaves: tree.len(), height: tree.height(), elapsed: start.elapsed() };

    info!("Hash tree built: {stats:?} (root hash: {})", tree.root_hex());

    Ok((tree, stats))
}

fn verify(record: &str, proof: &str, root: &str) -> anyhow::Result<bool> {
    let bytes = hex::decode(root.trim()).context("Root hash is not hex encoded")?;
    let Some(root) = Sha256::hash_from_slice(&bytes) else {
        bail!("Root hash should be {} bytes long, got {}", <Sha256 as txtree::Digest>::output_size(), bytes.len());
    };

    Ok(txtree::verify_encoded::<Sha256>(record, proof, &root))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::init_from_env(env_logger::Env::default().default_filter_or(&cli.log_level));

    match cli.command {
        Command::Root { source } => {
            let (tree, stats) = build(&source)?;

            println!("root:    {}", tree.root_hex());
            println!("leaves:  {}", stats.leaves);
            println!("height:  {}", stats.height);
            println!("elapsed: {:?}", stats.elapsed);
        }
        Command::Find { source, record } => {
            let (tree, _) = build(&source)?;

            match tree.find(&record) {
                Some(node) => println!("Record found (hash: {})", hex::encode(node.hash())),
                None => println!("Record not found"),
            }
        }
        Command::Prove { source, record } => {
            let (tree, _) = build(&source)?;

            let Some(proof) = tree.proof(&record) else {
                bail!("Record not found, no proof to build");
            };

            info!("Proving record with root hash {}", tree.root_hex());
            print!("{}", proof.encode());
        }
        Command::Verify { record, proof, root } => {
            let proof = fs::read_to_string(&proof).with_context(|| format!("Failed to read proof from {}", proof.display()))?;

            if !verify(&record, &proof, &root)? {
                bail!("Record is not part of the hash tree");
            }

            println!("Record is part of the hash tree");
        }
        Command::Simulate { source, corrupted } => {
            let records = records::load(&source.file)?;

            simulate::run(records, &BuildConfig::with_workers(source.workers), corrupted).await?;
        }
    }

    Ok(())
}
