use std::{fmt::Write, ptr};

use log::warn;

use super::{HashNode, Hasher};
use crate::Error;

/// A single sibling hash in a hash proof.
///
/// It is either `Sibling::Left(_)` or `Sibling::Right(_)` depending on its position wrt. the node on the path
/// from the leaf to the root.
#[derive(Debug)]
pub enum Sibling<H: Hasher> {
    Left(H::Hash),
    Right(H::Hash),
}

impl<H: Hasher> Sibling<H> {
    /// Compute the parent hash of this sibling and the given one depending on its position in the hash tree.
    fn hash(&self, other: &H::Hash) -> H::Hash {
        match self {
            Self::Left(hash) => H::hash(hash, other),
            Self::Right(hash) => H::hash(other, hash),
        }
    }

    fn side(&self) -> &'static str {
        match self {
            Self::Left(_) => "left",
            Self::Right(_) => "right",
        }
    }

    fn value(&self) -> &H::Hash {
        match self {
            Self::Left(hash) | Self::Right(hash) => hash,
        }
    }

    fn decode(line: usize, text: &str) -> Result<Self, Error> {
        let malformed = |reason| Error::MalformedPath { line, reason };

        let (side, hash) = text.trim().split_once(char::is_whitespace).ok_or(malformed("missing field"))?;
        let bytes = hex::decode(hash.trim()).map_err(|_| malformed("invalid hex digest"))?;
        let hash = H::hash_from_slice(&bytes).ok_or(malformed("unexpected digest length"))?;

        match side {
            "left" => Ok(Self::Left(hash)),
            "right" => Ok(Self::Right(hash)),
            _ => Err(malformed("unknown orientation")),
        }
    }
}

// Don't use `#[derive(Clone, PartialEq)]` here as it would require `Hasher` to implement them as well.
impl<H: Hasher> Clone for Sibling<H> {
    fn clone(&self) -> Self {
        match self {
            Self::Left(hash) => Self::Left(hash.clone()),
            Self::Right(hash) => Self::Right(hash.clone()),
        }
    }
}

impl<H: Hasher> PartialEq for Sibling<H> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Left(hash), Self::Left(other)) => hash.eq(other),
            (Self::Right(hash), Self::Right(other)) => hash.eq(other),
            _ => false,
        }
    }
}

/// A hash proof.
///
/// It is built with all sibling hashes required to compute the root hash for a given record, ordered from the
/// leaf up to the root. It does not depend on the hash tree it comes from, so that anyone knowing the root hash
/// can check it.
#[derive(Debug)]
pub struct HashProof<H: Hasher> {
    hashes: Vec<Sibling<H>>,
}

impl<H: Hasher> Clone for HashProof<H> {
    fn clone(&self) -> Self {
        Self { hashes: self.hashes.clone() }
    }
}

impl<H: Hasher> HashProof<H> {
    /// Build a hash proof from the path going from the root down to the proven leaf.
    pub(super) fn new(path: Vec<&HashNode<H>>) -> Self {
        let hashes = path
            .windows(2)
            .rev()
            .map(|pair| match pair[0].nodes() {
                // a left node without right sibling was paired with itself
                Some((left, right)) if ptr::eq(left, pair[1]) => Sibling::Right(right.unwrap_or(left).hash().clone()),
                Some((left, _)) => Sibling::Left(left.hash().clone()),
                None => unreachable!(),
            })
            .collect();

        Self { hashes }
    }

    pub fn from_siblings(hashes: impl IntoIterator<Item = Sibling<H>>) -> Self {
        Self { hashes: hashes.into_iter().collect() }
    }

    pub fn siblings(&self) -> &[Sibling<H>] {
        &self.hashes
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Compute the root hash wrt. the given leaf hash value.
    pub fn compute(&self, leaf: H::Hash) -> H::Hash {
        self.hashes.iter().fold(leaf, |hash, h| h.hash(&hash))
    }

    /// Check that the given record is part of the hash tree with the given root hash.
    pub fn verify(&self, record: impl AsRef<[u8]>, root: &H::Hash) -> bool {
        self.compute(H::leaf(record)) == *root
    }

    /// Text form of the proof, one `<side> <hex digest>` line per sibling.
    pub fn encode(&self) -> String {
        self.hashes.iter().fold(String::new(), |mut text, sibling| {
            let _ = writeln!(text, "{} {}", sibling.side(), hex::encode(sibling.value()));
            text
        })
    }

    /// Parse the text form of a proof, blank lines being ignored.
    pub fn decode(text: &str) -> Result<Self, Error> {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| Sibling::decode(index + 1, line))
            .collect::<Result<_, _>>()
            .map(|hashes| Self { hashes })
    }
}

/// Check that the given record is part of the hash tree with the given root hash, using its proof.
pub fn verify<H: Hasher>(record: impl AsRef<[u8]>, proof: &HashProof<H>, root: &H::Hash) -> bool {
    proof.verify(record, root)
}

/// Same as [`verify`] with a proof in its text form, a malformed proof never being verified.
pub fn verify_encoded<H: Hasher>(record: impl AsRef<[u8]>, proof: &str, root: &H::Hash) -> bool {
    match HashProof::<H>::decode(proof) {
        Ok(proof) => proof.verify(record, root),
        Err(err) => {
            warn!("Rejecting proof: {err}");
            false
        }
    }
}
