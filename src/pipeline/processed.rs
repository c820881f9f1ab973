use std::collections::HashSet;

/// Issues already updated during this run, keyed by `iid`.
///
/// Lives as long as the pipeline, so a retried attempt never updates the
/// same issue twice. Nothing is written to disk.
#[derive(Debug, Default)]
pub struct ProcessedSet {
    iids: HashSet<u64>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the issue was already recorded.
    pub fn insert(&mut self, iid: u64) -> bool {
        self.iids.insert(iid)
    }

    pub fn contains(&self, iid: u64) -> bool {
        self.iids.contains(&iid)
    }
}
