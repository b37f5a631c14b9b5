use super::{ChangedPath, Commit, CommitHistory, Page, PageRequest, MAX_PAGE_LIMIT};
use crate::interrupt::{CancellationFlag, CancellationPoint};
use crate::Error;
use std::sync::Arc;

/// A commit of a resolved range along with every path it changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommit {
    pub commit: Commit,
    /// Changed paths in the order the host reported them.
    pub changes: Vec<ChangedPath>,
}

/// Resolves commit ranges into the changes they introduce by exhausting a paginated [`CommitHistory`].
///
/// Any failed page fetch aborts the whole resolution, partial results are never returned.
#[derive(Debug, Clone)]
pub struct ChangesetResolver<H> {
    history: H,
    page_size: usize,
    cancellation: Option<Arc<CancellationFlag>>,
}

impl<H: CommitHistory> ChangesetResolver<H> {
    /// Create a resolver fetching pages of [`MAX_PAGE_LIMIT`] results.
    pub fn new(history: H) -> Self {
        Self {
            history,
            page_size: MAX_PAGE_LIMIT,
            cancellation: None,
        }
    }

    /// Fetch at most `page_size` results per call, clamped to `1..=MAX_PAGE_LIMIT`.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_LIMIT);
        self
    }

    /// Check `flag` before every page fetch.
    pub fn with_cancellation(mut self, flag: Arc<CancellationFlag>) -> Self {
        self.cancellation = Some(flag);
        self
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// All commits reachable from `to` but not from `from`, in host order.
    pub fn commits(&self, from: Option<&str>, to: &str) -> Result<Vec<Commit>, Error> {
        self.exhaust("commits_between", |page| self.history.commits_between(from, to, page))
    }

    /// All paths changed by `commit`, in host order.
    pub fn changes(&self, commit: &Commit) -> Result<Vec<ChangedPath>, Error> {
        self.exhaust("changed_paths", |page| self.history.changed_paths(commit, page))
    }

    /// Resolve the range `from..to` into its commits and their changes.
    pub fn resolve(&self, from: Option<&str>, to: &str) -> Result<Vec<ResolvedCommit>, Error> {
        let commits = self.commits(from, to)?;
        gix_trace::debug!("resolved {} commit(s) in range {:?}..{}", commits.len(), from, to);
        commits
            .into_iter()
            .map(|commit| {
                let changes = self.changes(&commit)?;
                Ok(ResolvedCommit { commit, changes })
            })
            .collect()
    }

    fn exhaust<T>(
        &self,
        operation: &'static str,
        mut fetch: impl FnMut(PageRequest) -> Result<Page<T>, Error>,
    ) -> Result<Vec<T>, Error> {
        let mut out = Vec::new();
        let mut request = Some(PageRequest::first(self.page_size));
        while let Some(current) = request {
            if let Some(flag) = &self.cancellation {
                flag.check()?;
            }
            let page = fetch(current)?;
            if let Some(next) = page.next {
                if next.start <= current.start {
                    return Err(Error::host(
                        operation,
                        format!("page cursor did not advance past {}", current.start),
                    ));
                }
            }
            out.extend(page.values);
            request = page.next;
        }
        Ok(out)
    }
}
