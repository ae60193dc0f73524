use std::fmt::Debug;

use crate::{BuildConfig, Error};

mod builder;
mod proof;

pub use builder::{LeafBuilder, Leaves};
pub use proof::{verify, verify_encoded, HashProof, Sibling};

/// A hasher trait to produce hash values.
///
/// Every hash stored in a tree is a double application of the hasher, either over a raw record (leaf)
/// or over the concatenation of two child hashes (branch).
pub trait Hasher: Default {
    type Hash: AsRef<[u8]> + Clone + PartialEq + Debug;

    fn write(&mut self, bytes: &[u8]);
    fn finish(self) -> Self::Hash;

    /// Rebuild a hash value from its raw bytes, if they have the expected shape.
    fn hash_from_slice(bytes: &[u8]) -> Option<Self::Hash>;

    fn hash_once<'b>(parts: impl IntoIterator<Item = &'b [u8]>) -> Self::Hash
    where
        Self: Sized,
    {
        let mut hasher = Self::default();
        for bytes in parts {
            hasher.write(bytes);
        }
        hasher.finish()
    }

    fn hash_twice<'b>(parts: impl IntoIterator<Item = &'b [u8]>) -> Self::Hash
    where
        Self: Sized,
    {
        Self::hash_once([Self::hash_once(parts).as_ref()])
    }

    /// Hash of the leaf holding the given record.
    fn leaf(record: impl AsRef<[u8]>) -> Self::Hash
    where
        Self: Sized,
    {
        Self::hash_twice([record.as_ref()])
    }

    /// Hash of a branch, `left` and `right` being the hashes of its children.
    fn hash(left: impl AsRef<[u8]>, right: impl AsRef<[u8]>) -> Self::Hash
    where
        Self: Sized,
    {
        Self::hash_twice([left.as_ref(), right.as_ref()])
    }
}

/// A hash node in the hash tree.
///
/// A branch always owns its left node, the right one being missing when the branch paired its left node with
/// itself, ie. when it closes a level with an odd number of nodes.
#[derive(Debug)]
pub enum HashNode<H: Hasher> {
    Branch(H::Hash, Box<(HashNode<H>, Option<HashNode<H>>)>),
    Leaf(H::Hash),
}

impl<H: Hasher> HashNode<H> {
    fn branch(left: Self, right: Option<Self>) -> Self {
        let hash = H::hash(left.hash(), right.as_ref().unwrap_or(&left).hash());

        Self::Branch(hash, Box::new((left, right)))
    }

    pub(crate) fn leaf(record: impl AsRef<[u8]>) -> Self {
        Self::Leaf(H::leaf(record))
    }

    /// Fold a level of nodes pairwise until a single node, ie. the root, is left.
    fn fold(level: Vec<Self>) -> Option<Self> {
        if level.len() <= 1 {
            return level.into_iter().next();
        }

        let mut parents = Vec::with_capacity(level.len().div_ceil(2));
        let mut nodes = level.into_iter();
        while let Some(left) = nodes.next() {
            parents.push(Self::branch(left, nodes.next()));
        }

        Self::fold(parents)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    fn match_leaf(&self, hash: &H::Hash) -> bool {
        matches!(self, Self::Leaf(h) if h == hash)
    }

    pub fn hash(&self) -> &H::Hash {
        match self {
            Self::Leaf(hash) | Self::Branch(hash, _) => hash,
        }
    }

    pub fn nodes(&self) -> Option<(&Self, Option<&Self>)> {
        match self {
            Self::Leaf(_) => None,
            Self::Branch(_, nodes) => Some((&nodes.0, nodes.1.as_ref())),
        }
    }

    fn max_depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 0,
            Self::Branch(_, nodes) => 1 + nodes.0.max_depth(), // max. depth is always left-handed
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Branch(_, nodes) => nodes.0.len() + nodes.1.as_ref().map_or(0, Self::len), // duplicates don't count
        }
    }

    /// Depth-first search (pre-order, left-handed first) of the first node matching the given predicate.
    ///
    /// On success, `path` holds every node from `self` down to the matching one.
    fn trace<'t>(&'t self, matches: &impl Fn(&Self) -> bool, path: &mut Vec<&'t Self>) -> bool {
        path.push(self);

        if matches(self) {
            return true;
        }

        if let Some((left, right)) = self.nodes() {
            if left.trace(matches, path) || right.is_some_and(|right| right.trace(matches, path)) {
                return true;
            }
        }

        path.pop();
        false
    }

    fn visit_nodes(&self) -> impl Iterator<Item = &Self> {
        let mut rights = Vec::with_capacity(self.max_depth());

        std::iter::successors(Some(self), move |&node| {
            if let Some((left, right)) = node.nodes() {
                rights.extend(right);
                Some(left)
            } else {
                rights.pop()
            }
        })
    }

    fn leaves(&self) -> impl Iterator<Item = &Self> {
        self.visit_nodes().filter(|&node| node.is_leaf())
    }
}

/// A hash tree.
///
/// It can only be obtained fully built, from a non-empty set of leaves.
#[derive(Debug)]
pub struct HashTree<H: Hasher> {
    root: HashNode<H>,
}

impl<H: Hasher> HashTree<H> {
    /// Build a hash tree out of a bag of records, hashing them concurrently wrt. the given config.
    ///
    /// The leaves order depends on which worker claimed which record first and is thus not deterministic.
    pub fn build<R>(records: impl IntoIterator<Item = R>, config: &BuildConfig) -> Result<Self, Error>
    where
        R: AsRef<[u8]> + Send,
        H::Hash: Send,
    {
        LeafBuilder::new(config).build(records)?.assemble()
    }

    pub(crate) fn from_leaves(leaves: Vec<HashNode<H>>) -> Result<Self, Error> {
        HashNode::fold(leaves).map(|root| Self { root }).ok_or(Error::EmptyInput)
    }

    pub fn root(&self) -> &HashNode<H> {
        &self.root
    }

    /// The root hash.
    pub fn hash(&self) -> &H::Hash {
        self.root.hash()
    }

    pub fn root_hex(&self) -> String {
        hex::encode(self.hash())
    }

    /// The number of levels above the leaves, a single leaf tree being one level high.
    pub fn height(&self) -> usize {
        self.root.max_depth().max(1)
    }

    /// The number of leaves, ie. of records the tree was built from.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn leaves(&self) -> impl Iterator<Item = &H::Hash> {
        self.root.leaves().map(HashNode::hash)
    }

    /// Look for the node holding the given record.
    pub fn find(&self, record: impl AsRef<[u8]>) -> Option<&HashNode<H>> {
        self.find_hash(&H::leaf(record))
    }

    /// Look for any node, leaf or branch, holding the given hash.
    pub fn find_hash(&self, hash: &H::Hash) -> Option<&HashNode<H>> {
        let mut path = Vec::with_capacity(self.height() + 1);

        self.root
            .trace(&|node| node.hash() == hash, &mut path)
            .then(|| path.pop())
            .flatten()
    }

    /// Build the inclusion proof of the given record, if any leaf holds it.
    pub fn proof(&self, record: impl AsRef<[u8]>) -> Option<HashProof<H>> {
        let hash = H::leaf(record);
        let mut path = Vec::with_capacity(self.height() + 1);

        self.root
            .trace(&|node| node.match_leaf(&hash), &mut path)
            .then(|| HashProof::new(path))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use assert_matches::assert_matches;

    /// A hasher concatenating its input, so that hashing twice is the same as hashing once.
    #[derive(Debug, Default)]
    pub(crate) struct SimpleHasher(Vec<u8>);
    impl Hasher for SimpleHasher {
        type Hash = String;

        fn write(&mut self, bytes: &[u8]) {
            self.0.extend_from_slice(bytes)
        }

        fn finish(self) -> Self::Hash {
            String::from_utf8(self.0).unwrap()
        }

        fn hash_from_slice(bytes: &[u8]) -> Option<Self::Hash> {
            String::from_utf8(bytes.to_vec()).ok()
        }
    }

    /// Build a tree keeping the records order, one leaf per char.
    pub(crate) fn tree(records: impl IntoIterator<Item = char>) -> HashTree<SimpleHasher> {
        records
            .into_iter()
            .map(String::from)
            .collect::<Leaves<_>>()
            .assemble()
            .unwrap()
    }

    #[test]
    fn branch_nodes() {
        fn leaf(record: &str) -> HashNode<SimpleHasher> {
            HashNode::leaf(record)
        }

        assert_matches!(HashNode::branch(leaf("a"), Some(leaf("b"))), HashNode::Branch(h, _) if h == "ab");
        assert_matches!(HashNode::branch(leaf("a"), None), HashNode::Branch(h, n) if h == "aa" && n.1.is_none());

        let branch = HashNode::branch(leaf("a"), Some(leaf("b")));
        assert_matches!(HashNode::branch(branch, None), HashNode::Branch(h, _) if h == "abab");
    }

    #[test]
    fn fold_nodes() {
        assert!(HashNode::<SimpleHasher>::fold(vec![]).is_none());

        for (leaves, root_hash) in [
            ('a'..='a', "a"),
            ('a'..='b', "ab"),
            ('a'..='c', "abcc"),
            ('a'..='d', "abcd"),
            ('a'..='e', "abcdeeee"),
            ('a'..='f', "abcdefef"),
        ] {
            let nodes = leaves.map(|c| HashNode::leaf(c.to_string())).collect();

            assert_eq!(HashNode::<SimpleHasher>::fold(nodes).unwrap().hash(), root_hash);
        }
    }

    #[test]
    fn empty_tree() {
        assert_matches!(HashTree::<SimpleHasher>::from_leaves(vec![]), Err(Error::EmptyInput));
    }

    #[test]
    fn odd_levels() {
        for count in [3, 5, 7, 9, 11, 25] {
            let records = ('a'..='z').take(count);
            let last = records.clone().last();

            let odd = tree(records.clone());
            let even = tree(records.chain(last));

            assert_eq!(odd.hash(), even.hash());
            assert_eq!(odd.len() + 1, even.len());
        }
    }

    #[test]
    fn height() {
        for count in 1..=26 {
            let tree = tree(('a'..='z').take(count));

            let expected = match count {
                1 => 1,
                _ => count.next_power_of_two().ilog2() as usize,
            };

            assert_eq!(tree.height(), expected, "height of a {count} leaves tree");
            assert_eq!(tree.len(), count);
        }
    }

    #[test]
    fn visit_nodes() {
        for (leaves, node_hashes) in [
            ('a'..='a', vec!["a"]),
            ('a'..='b', vec!["ab", "a", "b"]),
            ('a'..='c', vec!["abcc", "ab", "a", "b", "cc", "c"]),
        ] {
            let tree = tree(leaves);

            assert!(tree.root().visit_nodes().map(HashNode::hash).eq(node_hashes));
        }
    }

    #[test]
    fn leaves() {
        let records: Vec<_> = ('a'..='z').map(String::from).collect();
        let tree = tree('a'..='z');

        assert!(tree.leaves().eq(records.iter()));
        assert_eq!(tree.root().leaves().count(), 26);
    }

    #[test]
    fn find_nodes() {
        let tree = tree('a'..='e');

        assert_matches!(tree.find("c"), Some(HashNode::Leaf(h)) if h == "c");
        assert_matches!(tree.find("e"), Some(HashNode::Leaf(h)) if h == "e");
        assert_matches!(tree.find("z"), None);

        // branches are looked for as well
        assert_matches!(tree.find_hash(&String::from("cd")), Some(HashNode::Branch(..)));
        assert_matches!(tree.find_hash(&String::from("abcdeeee")), Some(node) if std::ptr::eq(node, tree.root()));
    }
}
