//! Streams a file through a `MerkleTree` and prints its root.
//!
//! cargo run --example hash_file -- <path>

use std::env;
use std::fs::File;
use std::io::{self, BufReader};

use merkletree::hash::{Blake3, Sha256};
use merkletree::{MerkleTree, Primitive, TreeConfig, sequential};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = env::args().nth(1).ok_or("usage: hash_file <path>")?;
    let len = File::open(&path)?.metadata()?.len();

    println!("=== Merkle root of {path} ({len} bytes) ===\n");

    // Example 1: default shape sized to the file
    let config = TreeConfig::for_input_len(len, 2, 32);
    let root = stream::<Sha256>(&path, config)?;
    println!("  sha256, {config:?}");
    println!("  root: {}\n", hex(&root));

    // Example 2: wider tree with bigger leaves
    let config = TreeConfig::for_input_len(len, 16, 4096);
    let root = stream::<Blake3>(&path, config)?;
    println!("  blake3, {config:?}");
    println!("  root: {}\n", hex(&root));

    // Example 3: the sequential fold agrees for inputs that fit in memory
    if len <= 1 << 20 {
        let data = std::fs::read(&path)?;
        let same = sequential::root::<Blake3>(&data, &config)? == root;
        println!("  sequential fold matches: {same}");
    }

    Ok(())
}

fn stream<P: Primitive>(
    path: &str,
    config: TreeConfig,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut tree = MerkleTree::<P>::with_config(config)?;
    let mut reader = BufReader::new(File::open(path)?);
    io::copy(&mut reader, &mut tree)?;

    let root = tree.sum(&[])?;
    tree.close()?;
    Ok(root)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
