use std::num::NonZeroUsize;

use crate::Error;

/// Settings for building a hash tree out of a bag of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildConfig {
    workers: NonZeroUsize,
}

impl BuildConfig {
    /// Number of workers used when none is given.
    pub const DEFAULT_WORKERS: NonZeroUsize = match NonZeroUsize::new(4) {
        Some(workers) => workers,
        None => unreachable!(),
    };

    pub fn new(workers: usize) -> Result<Self, Error> {
        NonZeroUsize::new(workers).map(Self::with_workers).ok_or(Error::NoWorkers)
    }

    pub fn with_workers(workers: NonZeroUsize) -> Self {
        Self { workers }
    }

    /// Number of workers racing to hash the records into leaves.
    pub fn workers(&self) -> usize {
        self.workers.get()
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::with_workers(Self::DEFAULT_WORKERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_matches::assert_matches;

    #[test]
    fn workers() {
        assert_eq!(BuildConfig::default().workers(), 4);
        assert_eq!(BuildConfig::new(1).unwrap().workers(), 1);
        assert_matches!(BuildConfig::new(0), Err(Error::NoWorkers));
    }
}
