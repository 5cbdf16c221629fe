//! Per-operation latency and visit-count instrumentation for an [`AvlTree`].

use std::{
    fmt,
    time::{Duration, Instant},
};

use crate::{AvlTree, DuplicateKey, Node};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    Insert,
    Find,
    Delete,
}

impl OpKind {
    pub const ALL: [OpKind; 3] = [OpKind::Insert, OpKind::Find, OpKind::Delete];

    fn verb(self) -> &'static str {
        match self {
            OpKind::Insert => "inserting",
            OpKind::Find => "searching",
            OpKind::Delete => "deleting",
        }
    }
}

/// One recorded call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    /// Wall-clock time spent in the call.
    pub elapsed: Duration,
    /// Number of tree nodes examined by the call.
    pub visits: usize,
}

/// The samples recorded for one kind of operation.
#[derive(Clone, Debug, Default)]
pub struct OpStats {
    samples: Vec<Sample>,
}

impl OpStats {
    pub const fn new() -> OpStats {
        OpStats {
            samples: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn record(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// Returns the arithmetic mean of the recorded durations, or `None` if nothing was recorded.
    pub fn mean_elapsed(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }

        let total: Duration = self.samples.iter().map(|s| s.elapsed).sum();
        let count = u32::try_from(self.samples.len()).ok()?;

        Some(total / count)
    }

    /// Returns the arithmetic mean of the recorded visit counts, or `None` if nothing was
    /// recorded.
    pub fn mean_visits(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }

        let total: usize = self.samples.iter().map(|s| s.visits).sum();

        Some(total as f64 / self.samples.len() as f64)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// An [`AvlTree`] that records a [`Sample`] for every insert, find and delete.
///
/// The wrapped tree behaves exactly as it does on its own; instrumentation only observes.
#[derive(Debug, Default)]
pub struct InstrumentedTree {
    tree: AvlTree,
    insert: OpStats,
    find: OpStats,
    delete: OpStats,
}

impl InstrumentedTree {
    pub const fn new() -> InstrumentedTree {
        InstrumentedTree::wrap(AvlTree::new())
    }

    pub const fn wrap(tree: AvlTree) -> InstrumentedTree {
        InstrumentedTree {
            tree,
            insert: OpStats::new(),
            find: OpStats::new(),
            delete: OpStats::new(),
        }
    }

    pub fn tree(&self) -> &AvlTree {
        &self.tree
    }

    pub fn into_inner(self) -> AvlTree {
        self.tree
    }

    pub fn insert(&mut self, key: i32) -> Result<(), DuplicateKey> {
        let mut visits = 0;
        let start = Instant::now();
        let result = self.tree.insert_counted(key, &mut visits);
        let elapsed = start.elapsed();

        self.insert.record(Sample { elapsed, visits });
        result
    }

    pub fn find(&mut self, key: i32) -> Option<&Node> {
        let mut visits = 0;
        let start = Instant::now();
        let found = self.tree.find_counted(key, &mut visits);
        let elapsed = start.elapsed();

        self.find.record(Sample { elapsed, visits });
        found
    }

    pub fn delete(&mut self, key: i32) -> bool {
        let mut visits = 0;
        let start = Instant::now();
        let removed = self.tree.delete_counted(key, &mut visits);
        let elapsed = start.elapsed();

        self.delete.record(Sample { elapsed, visits });
        removed
    }

    pub fn stats(&self, kind: OpKind) -> &OpStats {
        match kind {
            OpKind::Insert => &self.insert,
            OpKind::Find => &self.find,
            OpKind::Delete => &self.delete,
        }
    }

    /// Discards every recorded sample, keeping the tree.
    pub fn reset_stats(&mut self) {
        self.insert.clear();
        self.find.clear();
        self.delete.clear();
    }

    pub fn report(&self) -> Report {
        Report {
            insert: Summary::of(&self.insert),
            find: Summary::of(&self.find),
            delete: Summary::of(&self.delete),
        }
    }
}

/// Averages for one kind of operation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Summary {
    pub calls: usize,
    pub mean_elapsed: Option<Duration>,
    pub mean_visits: Option<f64>,
}

impl Summary {
    fn of(stats: &OpStats) -> Summary {
        Summary {
            calls: stats.len(),
            mean_elapsed: stats.mean_elapsed(),
            mean_visits: stats.mean_visits(),
        }
    }
}

/// A snapshot of the averages of an [`InstrumentedTree`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Report {
    pub insert: Summary,
    pub find: Summary,
    pub delete: Summary,
}

impl Report {
    pub fn summary(&self, kind: OpKind) -> &Summary {
        match kind {
            OpKind::Insert => &self.insert,
            OpKind::Find => &self.find,
            OpKind::Delete => &self.delete,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, kind) in OpKind::ALL.into_iter().enumerate() {
            let summary = self.summary(kind);
            let verb = kind.verb();

            if i > 0 {
                writeln!(f)?;
            }

            match (summary.mean_elapsed, summary.mean_visits) {
                (Some(elapsed), Some(visits)) => {
                    writeln!(f, "Avg {verb} time {elapsed:?}")?;
                    writeln!(f, "Avg {verb} iteration {visits:.2}")?;
                }
                _ => writeln!(f, "No {verb} calls recorded")?,
            }
        }

        Ok(())
    }
}
