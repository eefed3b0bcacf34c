use camino::Utf8PathBuf;
use derive_more::Display;
use itertools::Itertools;
use std::fmt;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum Change {
    /// a stylesheet matching the watch glob, relative to the working dir
    #[display("source {_0}")]
    Source(Utf8PathBuf),
    /// a stylesheet under one of the include paths
    #[display("include {_0}")]
    Include(Utf8PathBuf),
    /// the watcher lost track of events, or nothing was built yet
    #[display("rescan")]
    Rescan,
}

#[derive(Debug, Default, Clone)]
pub struct ChangeSet(Vec<Change>);

impl ChangeSet {
    pub fn all_changes() -> Self {
        Self(vec![Change::Rescan])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn need_style_build(&self) -> bool {
        !self.0.is_empty()
    }

    /// Returns false if the change was already pending.
    pub fn add(&mut self, change: Change) -> bool {
        if !self.0.contains(&change) {
            self.0.push(change);
            true
        } else {
            false
        }
    }
}

impl fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(", "))
    }
}
