//! A commit graph held in memory, for tests and for hosts that already know their history.

use super::{ChangeKind, ChangedPath, Commit, CommitHistory, Page, PageRequest};
use crate::Error;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// An in-memory [`CommitHistory`].
///
/// Ranges list commits newest first, where newer means added later.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    commits: Vec<Commit>,
    index: BTreeMap<String, usize>,
    changes: BTreeMap<String, Vec<ChangedPath>>,
    page_size: Option<usize>,
    /// Calls left before every query fails, `None` for no limit.
    remaining_calls: std::sync::Mutex<Option<usize>>,
    calls: AtomicUsize,
}

impl InMemoryHistory {
    /// Add a commit with `parents` (first parent first) that changed `changes`.
    ///
    /// Adding an id a second time replaces the earlier commit.
    pub fn add_commit(&mut self, id: &str, parents: &[&str], changes: &[(&str, ChangeKind)]) -> &mut Self {
        let commit = Commit::new(id, parents.iter().map(|p| (*p).to_owned()).collect());
        match self.index.get(id) {
            Some(&idx) => self.commits[idx] = commit,
            None => {
                self.index.insert(id.to_owned(), self.commits.len());
                self.commits.push(commit);
            }
        }
        self.changes.insert(
            id.to_owned(),
            changes
                .iter()
                .map(|(path, kind)| ChangedPath {
                    commit_id: id.to_owned(),
                    path: (*path).to_owned(),
                    kind: *kind,
                })
                .collect(),
        );
        self
    }

    /// Never return more than `page_size` results per call, whatever the caller asks for.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size.max(1));
        self
    }

    /// Let `calls` more queries succeed, then fail every query with [`Error::HostUnavailable`].
    pub fn fail_after(&self, calls: usize) {
        if let Ok(mut remaining) = self.remaining_calls.lock() {
            *remaining = Some(calls);
        }
    }

    /// The amount of queries answered or failed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn commit(&self, id: &str) -> Option<&Commit> {
        self.index.get(id).map(|&idx| &self.commits[idx])
    }

    fn record_call(&self, operation: &'static str) -> Result<(), Error> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let mut remaining = self
            .remaining_calls
            .lock()
            .map_err(|_| Error::host(operation, "history lock poisoned"))?;
        match remaining.as_mut() {
            Some(0) => Err(Error::host(operation, "injected failure")),
            Some(left) => {
                *left -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn limit(&self, page: PageRequest) -> PageRequest {
        PageRequest {
            start: page.start,
            limit: self.page_size.map_or(page.limit, |max| page.limit.min(max)).max(1),
        }
    }

    fn position(&self, id: &str) -> Result<usize, Error> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| Error::CommitNotFound(id.to_owned()))
    }

    /// Indices of `tip` and all its ancestors.
    fn ancestry(&self, tip: usize) -> BTreeSet<usize> {
        let mut seen = BTreeSet::new();
        let mut queue = vec![tip];
        while let Some(idx) = queue.pop() {
            if !seen.insert(idx) {
                continue;
            }
            queue.extend(
                self.commits[idx]
                    .parents
                    .iter()
                    .filter_map(|parent| self.index.get(parent).copied()),
            );
        }
        seen
    }
}

impl CommitHistory for InMemoryHistory {
    fn commits_between(&self, exclude: Option<&str>, include: &str, page: PageRequest) -> Result<Page<Commit>, Error> {
        self.record_call("commits_between")?;
        let mut range = self.ancestry(self.position(include)?);
        if let Some(exclude) = exclude {
            let hidden = self.ancestry(self.position(exclude)?);
            range.retain(|idx| !hidden.contains(idx));
        }
        let commits: Vec<Commit> = range.into_iter().rev().map(|idx| self.commits[idx].clone()).collect();
        Ok(Page::slice(&commits, self.limit(page)))
    }

    fn changed_paths(&self, commit: &Commit, page: PageRequest) -> Result<Page<ChangedPath>, Error> {
        self.record_call("changed_paths")?;
        let changes = self
            .changes
            .get(&commit.id)
            .ok_or_else(|| Error::CommitNotFound(commit.id.clone()))?;
        Ok(Page::slice(changes, self.limit(page)))
    }
}
