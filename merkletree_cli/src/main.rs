//! Merkle root of a file.
//!
//! Usage:
//!   merkletree-cli <filename|-> [--algorithm sha256|sha512|blake3]
//!                            [--branching N] [--block-size N] [--height N]
//!
//! Logging goes to stderr; set RUST_LOG=merkletree=debug to watch the
//! pipeline start and stop.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use merkletree::config::{DEFAULT_BLOCK_SIZE, DEFAULT_BRANCHING};
use merkletree::hash::{Blake3, Sha256, Sha512};
use merkletree::{MerkleTree, Primitive, TreeConfig};
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "merkletree-cli")]
#[command(about = "Print the pipelined Merkle root of a file", long_about = None)]
struct Cli {
    /// File to hash, or `-` for stdin
    filename: PathBuf,

    /// Hash primitive for leaves and interior nodes
    #[arg(long, value_enum, default_value_t = Algorithm::Sha256)]
    algorithm: Algorithm,

    /// Child digests combined into each parent
    #[arg(long, default_value_t = DEFAULT_BRANCHING)]
    branching: usize,

    /// Leaf block size in bytes
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: usize,

    /// Tree height; defaults to the smallest height that fits the file
    #[arg(long)]
    height: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Algorithm {
    Sha256,
    Sha512,
    Blake3,
}

fn main() -> Result<()> {
    // Default to warnings only, override with RUST_LOG=merkletree=debug
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("merkletree=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let (file, len) = open(&cli.filename)?;

    let config = match cli.height {
        Some(height) => TreeConfig::new(height, cli.branching, cli.block_size),
        None => TreeConfig::for_input_len(len, cli.branching, cli.block_size),
    };
    info!(
        file = %cli.filename.display(),
        len,
        height = config.height(),
        algorithm = ?cli.algorithm,
        "hashing"
    );

    let reader = BufReader::new(file);
    let root = match cli.algorithm {
        Algorithm::Sha256 => digest::<Sha256>(reader, config),
        Algorithm::Sha512 => digest::<Sha512>(reader, config),
        Algorithm::Blake3 => digest::<Blake3>(reader, config),
    }
    .with_context(|| format!("failed to hash {}", cli.filename.display()))?;

    println!("{}", hex::encode(root));
    Ok(())
}

/// Opens the input and measures it. Pipes, FIFOs and `-` (stdin) report no
/// useful length, so they are spooled to an anonymous temp file first.
fn open(path: &Path) -> Result<(File, u64)> {
    if path == Path::new("-") {
        return spool(io::stdin().lock());
    }

    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let metadata = file
        .metadata()
        .with_context(|| format!("failed to stat {}", path.display()))?;
    if metadata.is_file() {
        return Ok((file, metadata.len()));
    }
    spool(file).with_context(|| format!("failed to read {}", path.display()))
}

fn spool(mut source: impl Read) -> Result<(File, u64)> {
    let mut spooled = tempfile::tempfile().context("failed to create spool file")?;
    let len = io::copy(&mut source, &mut spooled)?;
    spooled.seek(SeekFrom::Start(0))?;
    debug!(len, "spooled streamed input");
    Ok((spooled, len))
}

fn digest<P: Primitive>(mut reader: impl Read, config: TreeConfig) -> Result<Vec<u8>> {
    let mut tree = MerkleTree::<P>::with_config(config)?;
    let copied = io::copy(&mut reader, &mut tree)?;
    debug!(copied, "input consumed");

    let root = tree.sum(&[])?;
    tree.close()?;
    Ok(root)
}
