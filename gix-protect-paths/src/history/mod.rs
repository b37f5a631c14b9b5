//! Access to commit history, and resolution of a ref update into the changes it introduces.
//!
//! Hosts expose history through the paginated [`CommitHistory`] trait. The
//! [`ChangesetResolver`] drives it until every page is consumed, keeping the order the host
//! returned results in.
//!
//! # Diff policy
//!
//! The paths of a commit are those changed relative to its *first* parent. Root commits are
//! compared against the empty tree. Paths only changed relative to other parents of a merge
//! are not reported.

pub mod memory;
pub mod resolver;
#[cfg(feature = "git-cli")]
pub mod git;

pub use memory::InMemoryHistory;
pub use resolver::{ChangesetResolver, ResolvedCommit};
#[cfg(feature = "git-cli")]
pub use git::GitCli;

use crate::Error;

/// The largest page a host is asked for, and the default page size.
pub const MAX_PAGE_LIMIT: usize = 1000;

/// One commit within a resolved range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// The opaque, stable commit id.
    pub id: String,
    /// Parent commit ids, first parent first.
    pub parents: Vec<String>,
}

impl Commit {
    pub fn new(id: impl Into<String>, parents: Vec<String>) -> Self {
        Self { id: id.into(), parents }
    }

    /// The parent changes are computed against, or `None` for root commits.
    pub fn first_parent(&self) -> Option<&str> {
        self.parents.first().map(String::as_str)
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// How a path was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    /// The entry changed type, for instance from file to symlink.
    TypeChanged,
}

/// One file touched by one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedPath {
    pub commit_id: String,
    /// Repository-relative path with forward slashes.
    pub path: String,
    pub kind: ChangeKind,
}

/// Which slice of results to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Index of the first result.
    pub start: usize,
    /// Maximum amount of results.
    pub limit: usize,
}

impl PageRequest {
    /// The first page of `limit` results. A `limit` of 0 is raised to 1.
    pub fn first(limit: usize) -> Self {
        Self {
            start: 0,
            limit: limit.max(1),
        }
    }
}

/// A slice of results and how to get the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub values: Vec<T>,
    /// The request for the following page, or `None` if this is the last one.
    pub next: Option<PageRequest>,
}

impl<T> Page<T> {
    /// Cut the page `request` out of all `items`, linking to the following page if there is one.
    pub fn slice(items: &[T], request: PageRequest) -> Self
    where
        T: Clone,
    {
        let start = request.start.min(items.len());
        let end = start.saturating_add(request.limit).min(items.len());
        Page {
            values: items[start..end].to_vec(),
            next: (end < items.len()).then_some(PageRequest {
                start: end,
                limit: request.limit,
            }),
        }
    }
}

/// Read access to the commit history of one repository.
///
/// Both queries are paginated and may fail with [`Error::HostUnavailable`].
pub trait CommitHistory {
    /// Commits reachable from `include` but not from `exclude`, or all ancestors of `include`
    /// if `exclude` is `None`. Each call returns the page selected by `page`.
    fn commits_between(&self, exclude: Option<&str>, include: &str, page: PageRequest) -> Result<Page<Commit>, Error>;

    /// The paths `commit` changed relative to its first parent.
    fn changed_paths(&self, commit: &Commit, page: PageRequest) -> Result<Page<ChangedPath>, Error>;
}

impl<T: CommitHistory + ?Sized> CommitHistory for &T {
    fn commits_between(&self, exclude: Option<&str>, include: &str, page: PageRequest) -> Result<Page<Commit>, Error> {
        (**self).commits_between(exclude, include, page)
    }

    fn changed_paths(&self, commit: &Commit, page: PageRequest) -> Result<Page<ChangedPath>, Error> {
        (**self).changed_paths(commit, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_links_pages_until_the_end() {
        let items = [1, 2, 3, 4, 5];
        let first = Page::slice(&items, PageRequest::first(2));
        assert_eq!(first.values, vec![1, 2]);
        let second = Page::slice(&items, first.next.unwrap());
        assert_eq!(second.values, vec![3, 4]);
        let last = Page::slice(&items, second.next.unwrap());
        assert_eq!(last.values, vec![5]);
        assert_eq!(last.next, None);
    }

    #[test]
    fn slice_of_exact_multiple_has_no_empty_tail() {
        let page = Page::slice(&[1, 2], PageRequest::first(2));
        assert_eq!(page.values, vec![1, 2]);
        assert_eq!(page.next, None);
        assert!(Page::<u8>::slice(&[], PageRequest::first(5)).values.is_empty());
        assert!(Page::slice(&[1], PageRequest { start: 7, limit: 1 }).values.is_empty());
    }

    #[test]
    fn zero_limits_are_raised() {
        assert_eq!(PageRequest::first(0).limit, 1);
    }

    #[test]
    fn first_parent_and_merges() {
        let root = Commit::new("a", vec![]);
        assert_eq!(root.first_parent(), None);
        let merge = Commit::new("m", vec!["p1".into(), "p2".into()]);
        assert_eq!(merge.first_parent(), Some("p1"));
        assert!(merge.is_merge());
        assert!(!root.is_merge());
    }
}
