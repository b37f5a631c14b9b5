//! Commit history of a local repository, read by running `git`.
//!
//! Ranges come from `git rev-list --parents`, paged with `--skip` and `--max-count`. Changed
//! paths come from `git diff-tree` against the first parent, or against the empty tree with
//! `--root` for root commits. Rename detection is disabled, so a rename shows as a deletion
//! and an addition and both paths are checked.

use super::{ChangeKind, ChangedPath, Commit, CommitHistory, Page, PageRequest};
use crate::Error;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// A [`CommitHistory`] backed by the `git` executable and a git directory.
#[derive(Debug, Clone)]
pub struct GitCli {
    git_dir: PathBuf,
    program: OsString,
}

impl GitCli {
    /// Read history from the repository at `git_dir`, like `.git` or a bare repository.
    pub fn new(git_dir: impl Into<PathBuf>) -> Self {
        Self {
            git_dir: git_dir.into(),
            program: "git".into(),
        }
    }

    /// Run `program` instead of `git` from `PATH`.
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    fn run(&self, operation: &'static str, args: &[&str]) -> Result<std::process::Output, Error> {
        gix_trace::trace!("git {}", args.join(" "));
        let child = gix_command::prepare(self.program.clone())
            .arg("--git-dir")
            .arg(self.git_dir.clone())
            .args(args.iter().copied())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| Error::host(operation, format!("could not run git: {err}")))?;
        child
            .wait_with_output()
            .map_err(|err| Error::host(operation, format!("git did not finish: {err}")))
    }

    fn run_ok(&self, operation: &'static str, args: &[&str]) -> Result<Vec<u8>, Error> {
        let output = self.run(operation, args)?;
        if !output.status.success() {
            return Err(Error::host(
                operation,
                format!(
                    "git {} failed with {}: {}",
                    args.first().copied().unwrap_or_default(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        Ok(output.stdout)
    }

    /// Fail with [`Error::CommitNotFound`] unless `id` names a commit.
    fn verify_commit(&self, operation: &'static str, id: &str) -> Result<(), Error> {
        if id.starts_with('-') {
            return Err(Error::InvalidInput(format!("'{id}' is not a commit id")));
        }
        let rev = format!("{id}^{{commit}}");
        let output = self.run(operation, &["rev-parse", "--verify", "--quiet", &rev])?;
        if output.status.success() {
            Ok(())
        } else {
            Err(Error::CommitNotFound(id.to_owned()))
        }
    }
}

impl CommitHistory for GitCli {
    fn commits_between(&self, exclude: Option<&str>, include: &str, page: PageRequest) -> Result<Page<Commit>, Error> {
        const OPERATION: &str = "commits_between";
        if page.start == 0 {
            self.verify_commit(OPERATION, include)?;
            if let Some(exclude) = exclude {
                self.verify_commit(OPERATION, exclude)?;
            }
        }

        let skip = format!("--skip={}", page.start);
        let max_count = format!("--max-count={}", page.limit.saturating_add(1));
        let hidden = exclude.map(|id| format!("^{id}"));
        let mut args = vec!["rev-list", "--parents", skip.as_str(), max_count.as_str(), include];
        args.extend(hidden.as_deref());
        args.push("--");

        let stdout = self.run_ok(OPERATION, &args)?;
        let mut commits = parse_rev_list(&String::from_utf8_lossy(&stdout));
        let next = (commits.len() > page.limit).then(|| {
            commits.truncate(page.limit);
            PageRequest {
                start: page.start + page.limit,
                limit: page.limit,
            }
        });
        Ok(Page { values: commits, next })
    }

    fn changed_paths(&self, commit: &Commit, page: PageRequest) -> Result<Page<ChangedPath>, Error> {
        const OPERATION: &str = "changed_paths";
        let mut args = vec!["diff-tree", "-r", "-z", "--no-commit-id", "--no-renames", "--name-status"];
        match commit.first_parent() {
            Some(parent) => args.extend([parent, commit.id.as_str()]),
            None => args.extend(["--root", commit.id.as_str()]),
        }
        let stdout = self.run_ok(OPERATION, &args)?;
        let changes = parse_name_status(&commit.id, &stdout)?;
        Ok(Page::slice(&changes, page))
    }
}

/// Parse `<id> <parent>...` lines.
fn parse_rev_list(text: &str) -> Vec<Commit> {
    text.lines()
        .filter_map(|line| {
            let mut ids = line.split_whitespace();
            let id = ids.next()?;
            Some(Commit::new(id, ids.map(ToOwned::to_owned).collect()))
        })
        .collect()
}

/// Parse the NUL-separated `<status>\0<path>\0` pairs of `--name-status -z`.
fn parse_name_status(commit_id: &str, bytes: &[u8]) -> Result<Vec<ChangedPath>, Error> {
    let mut fields = bytes.split(|b| *b == 0).filter(|field| !field.is_empty());
    let mut out = Vec::new();
    while let Some(status) = fields.next() {
        let kind = match status.first() {
            Some(b'A') => ChangeKind::Added,
            Some(b'M') => ChangeKind::Modified,
            Some(b'D') => ChangeKind::Deleted,
            Some(b'T') => ChangeKind::TypeChanged,
            _ => {
                return Err(Error::host(
                    "changed_paths",
                    format!("unexpected status '{}'", String::from_utf8_lossy(status)),
                ))
            }
        };
        let path = fields
            .next()
            .ok_or_else(|| Error::host("changed_paths", "status without a path"))?;
        out.push(ChangedPath {
            commit_id: commit_id.to_owned(),
            path: String::from_utf8_lossy(path).into_owned(),
            kind,
        });
    }
    Ok(out)
}
