use merkletree::hash::{Blake3, Sha256, Sha512};
use merkletree::{ConfigError, MerkleTree, TreeConfig, TreeError, sequential};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::Digest;
use std::io::{self, Cursor};

/// Reference SHA-256 over the concatenation of `parts`.
fn h(parts: &[&[u8]]) -> Vec<u8> {
    let mut hasher = sha2::Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

fn tree(height: usize, branching: usize, block: usize) -> MerkleTree<Sha256> {
    MerkleTree::with_config(TreeConfig::new(height, branching, block)).unwrap()
}

fn root_of(config: TreeConfig, data: &[u8]) -> Vec<u8> {
    let mut tree = MerkleTree::<Sha256>::with_config(config).unwrap();
    tree.write(data).unwrap();
    tree.sum(&[]).unwrap()
}

fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut data = vec![0u8; len];
    StdRng::seed_from_u64(seed).fill(&mut data[..]);
    data
}

#[test]
fn exact_grouping_binary_tree() {
    let d0 = h(&[b"aaaa"]);
    let d1 = h(&[b"bbbb"]);
    let d2 = h(&[b"cccc"]);
    let d3 = h(&[b"dddd"]);
    let left = h(&[&d0, &d1]);
    let right = h(&[&d2, &d3]);
    let expected = h(&[&left, &right]);

    let mut tree = tree(3, 2, 4);
    tree.write(b"aaaa").unwrap();
    tree.write(b"bbbb").unwrap();
    tree.write(b"cccc").unwrap();
    tree.write(b"dddd").unwrap();
    assert_eq!(tree.sum(&[]).unwrap(), expected);
}

#[test]
fn partial_group_is_flushed_as_short_group() {
    let d0 = h(&[b"aaaa"]);
    let d1 = h(&[b"bbbb"]);
    let d2 = h(&[b"cccc"]);
    let left = h(&[&d0, &d1]);
    let short = h(&[&d2]);
    let expected = h(&[&left, &short]);

    let config = TreeConfig::new(3, 2, 4);
    let three = root_of(config, b"aaaabbbbcccc");
    assert_eq!(three, expected);
    assert_eq!(root_of(config, b"aaaabbbbcccc"), three);
    assert_ne!(three, root_of(config, b"aaaabbbbccccdddd"));
}

#[test]
fn empty_input_yields_empty_digest() {
    let empty = h(&[]);
    for height in [1, 2, 3, 7] {
        let mut tree = tree(height, 2, 32);
        assert_eq!(tree.sum(&[]).unwrap(), empty, "height {height}");
    }
}

#[test]
fn single_short_leaf_propagates_through_every_level() {
    let leaf = h(&[b"abc"]);
    let mut expected = leaf.clone();
    for height in 1..=5 {
        let mut tree = tree(height, 2, 32);
        tree.write(b"abc").unwrap();
        assert_eq!(tree.sum(&[]).unwrap(), expected, "height {height}");
        expected = h(&[&expected]);
    }
    assert_ne!(leaf, expected);
}

#[test]
fn sum_prepends_prefix() {
    let mut tree = tree(3, 2, 4);
    tree.write(b"abcdef").unwrap();
    let root = tree.sum(&[]).unwrap();
    let prefixed = tree.sum(b"prefix:").unwrap();
    assert_eq!(&prefixed[..7], b"prefix:");
    assert_eq!(&prefixed[7..], root.as_slice());
}

#[test]
fn chunking_never_changes_root() {
    let config = TreeConfig::new(8, 3, 16);
    let data = random_bytes(16 * 500 + 7, 42);
    let expected = root_of(config, &data);

    for chunk in [1, 3, 15, 16, 17, 64, 1000] {
        let mut tree = MerkleTree::<Sha256>::with_config(config).unwrap();
        for piece in data.chunks(chunk) {
            assert_eq!(tree.write(piece).unwrap(), piece.len());
        }
        assert_eq!(tree.sum(&[]).unwrap(), expected, "chunk size {chunk}");
    }
    assert_eq!(sequential::root::<Sha256>(&data, &config).unwrap(), expected);
}

#[test]
fn byte_at_a_time_stress() {
    let data = random_bytes(64 * 1024, 7);
    let config = TreeConfig::for_input_len(data.len() as u64, 2, 32);
    let expected = root_of(config, &data);

    let mut tree = MerkleTree::<Sha256>::with_config(config).unwrap();
    for byte in &data {
        tree.write(std::slice::from_ref(byte)).unwrap();
    }
    assert_eq!(tree.sum(&[]).unwrap(), expected);
    tree.close().unwrap();
}

#[test]
fn io_copy_feeds_the_tree() {
    let data = random_bytes(10_000, 3);
    let config = TreeConfig::for_input_len(data.len() as u64, 4, 64);

    let mut tree = MerkleTree::<Sha256>::with_config(config).unwrap();
    let copied = io::copy(&mut Cursor::new(&data), &mut tree).unwrap();
    assert_eq!(copied, data.len() as u64);
    assert_eq!(tree.sum(&[]).unwrap(), root_of(config, &data));
}

#[test]
fn write_after_close_fails() {
    let mut tree = tree(3, 2, 4);
    tree.write(b"abcd").unwrap();
    tree.close().unwrap();
    assert!(tree.is_closed());
    assert!(matches!(tree.write(b"x"), Err(TreeError::Closed)));
    assert!(matches!(tree.sum(&[]), Err(TreeError::Closed)));
    assert!(matches!(tree.close(), Err(TreeError::Closed)));
}

#[test]
fn reset_after_close_forgets_history() {
    let config = TreeConfig::new(3, 2, 4);
    let mut tree = MerkleTree::<Sha256>::with_config(config).unwrap();
    tree.write(b"old old old").unwrap();
    tree.close().unwrap();

    tree.reset().unwrap();
    assert!(!tree.is_closed());
    assert_eq!(tree.bytes_written(), 0);
    tree.write(b"new").unwrap();
    assert_eq!(tree.sum(&[]).unwrap(), root_of(config, b"new"));
}

#[test]
fn reset_while_running_forgets_history() {
    let config = TreeConfig::new(3, 2, 4);
    let mut tree = MerkleTree::<Sha256>::with_config(config).unwrap();
    tree.write(b"aaaabbbbcc").unwrap();
    tree.reset().unwrap();
    tree.write(b"cc").unwrap();
    assert_eq!(tree.sum(&[]).unwrap(), root_of(config, b"cc"));
}

#[test]
fn write_after_sum_requires_reset() {
    let mut tree = tree(3, 2, 4);
    tree.write(b"abcd").unwrap();
    let root = tree.sum(&[]).unwrap();
    assert_eq!(tree.sum(&[]).unwrap(), root);
    assert!(matches!(tree.write(b"more"), Err(TreeError::Finalized)));
    assert!(!tree.is_closed());
}

#[test]
fn capacity_is_enforced_without_side_effects() {
    let config = TreeConfig::new(2, 2, 4);
    let mut tree = MerkleTree::<Sha256>::with_config(config).unwrap();
    tree.write(b"aaaab").unwrap();

    match tree.write(b"bbbc") {
        Err(TreeError::CapacityExceeded {
            attempted,
            capacity,
        }) => {
            assert_eq!(attempted, 9);
            assert_eq!(capacity, 8);
        }
        other => panic!("expected capacity error, got {other:?}"),
    }
    assert_eq!(tree.bytes_written(), 5);

    tree.write(b"bbb").unwrap();
    assert_eq!(tree.sum(&[]).unwrap(), root_of(config, b"aaaabbbb"));
}

#[test]
fn full_tree_without_sum_closes_cleanly() {
    let mut tree = tree(3, 2, 4);
    tree.write(b"aaaabbbbccccdddd").unwrap();
    tree.close().unwrap();
}

#[test]
fn drop_shuts_workers_down() {
    for _ in 0..32 {
        let mut tree = tree(6, 2, 1);
        tree.write(b"abcdefghij").unwrap();
    }
}

#[test]
fn invalid_configs_are_rejected() {
    assert!(matches!(
        MerkleTree::<Sha256>::with_config(TreeConfig::new(0, 2, 32)),
        Err(TreeError::Config(ConfigError::InvalidHeight(0)))
    ));
    assert!(matches!(
        MerkleTree::<Sha256>::with_config(TreeConfig::new(3, 1, 32)),
        Err(TreeError::Config(ConfigError::InvalidBranching(1)))
    ));
    assert!(matches!(
        MerkleTree::<Sha256>::with_config(TreeConfig::new(3, 2, 0)),
        Err(TreeError::Config(ConfigError::InvalidBlockSize))
    ));
}

#[test]
fn size_and_block_size() {
    let tree = tree(3, 2, 48);
    assert_eq!(tree.size(), 32);
    assert_eq!(tree.block_size(), 48);
    assert_eq!(tree.config().height(), 3);

    let wide = MerkleTree::<Sha512>::new().unwrap();
    assert_eq!(wide.size(), 64);
    assert_eq!(wide.block_size(), merkletree::config::DEFAULT_BLOCK_SIZE);
}

#[test]
fn primitives_give_distinct_roots() {
    let config = TreeConfig::new(4, 2, 8);
    let data = b"primitive selection is per tree";

    let mut sha = MerkleTree::<Sha256>::with_config(config).unwrap();
    let mut blake = MerkleTree::<Blake3>::with_config(config).unwrap();
    sha.write(data).unwrap();
    blake.write(data).unwrap();

    let blake_root = blake.sum(&[]).unwrap();
    assert_eq!(blake_root.len(), 32);
    assert_ne!(sha.sum(&[]).unwrap(), blake_root);
    assert_eq!(sequential::root::<Blake3>(data, &config).unwrap(), blake_root);
}
