//! A simple crate building hash trees (aka. Merkle trees) over transaction records, and Merkle proofs out of them.
//!
//! Each record is hashed twice into a leaf, eg. `sha256(sha256(record))`, then leaves are folded pairwise, level by
//! level, into branches holding the double hash of their children hashes concatenation, up to a single root hash.
//! A level with an odd number of nodes pairs its last node with itself.
//!
//! # Pros of the current implementation
//! - No need for smart pointers to link parents and children together, eg. using `Rc` / `Weak` pointers.
//! - A hash tree is immutable once built, so that it can be shared between threads without any lock.
//! - Proofs don't borrow the hash tree they come from, they can be checked knowing the root hash only.
//!
//! # Known limitations of the current implementation
//! - The leaves order depends on the concurrent hashing of records, so is the root hash of a given set of records.
//! - Looking for a record walks the whole tree as no index by hash is maintained.
//!
//! ```
//! use txtree::{BuildConfig, Sha256Tree};
//!
//! let tree = Sha256Tree::build(["tx1", "tx2", "tx3"], &BuildConfig::default()).unwrap();
//! let proof = tree.proof("tx1").unwrap();
//!
//! assert!(txtree::verify("tx1", &proof, tree.hash()));
//! ```

mod config;
mod error;
mod hash;

pub use config::BuildConfig;
pub use error::Error;
pub use hash::{verify, verify_encoded, HashNode, HashProof, HashTree, Hasher, LeafBuilder, Leaves, Sibling};

pub use digest::{Digest, Output};
pub use sha2::Sha256;

/// A hash tree relying on SHA-256.
pub type Sha256Tree = HashTree<Sha256>;

impl<D: Digest + Default> crate::Hasher for D {
    type Hash = Output<D>;

    fn write(&mut self, bytes: &[u8]) {
        self.update(bytes);
    }

    fn finish(self) -> Self::Hash {
        self.finalize()
    }

    fn hash_from_slice(bytes: &[u8]) -> Option<Self::Hash> {
        (bytes.len() == <D as Digest>::output_size()).then(|| Output::<D>::clone_from_slice(bytes))
    }
}
