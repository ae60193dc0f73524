use std::{thread, time::Instant};

use log::{debug, info, trace};
use parking_lot::Mutex;
use rand::Rng;

use super::{HashNode, HashTree, Hasher};
use crate::{BuildConfig, Error};

/// The leaves of a hash tree that is yet to be assembled.
#[derive(Debug)]
pub struct Leaves<H: Hasher> {
    nodes: Vec<HashNode<H>>,
}

impl<H: Hasher> Leaves<H> {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The leaf hashes, in the order the hash tree is going to be assembled with.
    pub fn hashes(&self) -> impl Iterator<Item = &H::Hash> {
        self.nodes.iter().map(HashNode::hash)
    }

    /// Fold the leaves pairwise, level by level, up to the root of the hash tree.
    pub fn assemble(self) -> Result<HashTree<H>, Error> {
        let start = Instant::now();
        let tree = HashTree::from_leaves(self.nodes)?;

        debug!("Assembled {} leaves in {:?} (height: {})", tree.len(), start.elapsed(), tree.height());

        Ok(tree)
    }
}

/// Leaves built in the records order, without any concurrency involved.
impl<H: Hasher, R: AsRef<[u8]>> FromIterator<R> for Leaves<H> {
    fn from_iter<I: IntoIterator<Item = R>>(records: I) -> Self {
        Self { nodes: records.into_iter().map(HashNode::leaf).collect() }
    }
}

/// A builder turning a bag of records into leaves, hashing them concurrently.
///
/// Workers race to claim a random record from the pending ones until none is left, so that the leaves order
/// differs from one build to another.
#[derive(Debug, Clone)]
pub struct LeafBuilder {
    workers: usize,
}

impl LeafBuilder {
    pub fn new(config: &BuildConfig) -> Self {
        Self { workers: config.workers() }
    }

    pub fn build<H, R>(&self, records: impl IntoIterator<Item = R>) -> Result<Leaves<H>, Error>
    where
        H: Hasher,
        H::Hash: Send,
        R: AsRef<[u8]> + Send,
    {
        let pending: Vec<R> = records.into_iter().collect();
        if pending.is_empty() {
            return Err(Error::EmptyInput);
        }

        let count = pending.len();
        let workers = self.workers.min(count);
        info!("Building {count} leaves with {workers} workers");

        let start = Instant::now();
        let pending = Mutex::new(pending);
        let leaves = Mutex::new(Vec::with_capacity(count));

        thread::scope(|scope| {
            for worker in 0..workers {
                let (pending, leaves) = (&pending, &leaves);

                scope.spawn(move || {
                    let mut rng = rand::thread_rng();
                    let mut claimed = 0usize;

                    loop {
                        let record = {
                            let mut pending = pending.lock();
                            if pending.is_empty() {
                                break;
                            }
                            let index = rng.gen_range(0..pending.len());
                            pending.swap_remove(index)
                        };

                        let leaf = HashNode::<H>::leaf(record);
                        leaves.lock().push(leaf);
                        claimed += 1;
                    }

                    trace!("Worker #{worker} hashed {claimed} records");
                });
            }
        });

        let nodes = leaves.into_inner();
        info!("Built {} leaves in {:?}", nodes.len(), start.elapsed());

        Ok(Leaves { nodes })
    }
}
