/*!
Reject pushes and merges whose new commits touch protected paths.

A ref update is resolved into the commits it introduces, and every path each commit changed is
matched against administrator-configured regular expressions. Each match is a [`Violation`],
and any violation rejects the operation.

Evaluation of one ref update, see [`engine::Evaluator::evaluate()`]:
1. Exempt users (repository administrators and excluded users) are never checked.
2. Without protected path patterns nothing is checked.
3. Refs outside the branch filter are not checked.
4. The commits of the update and their changed paths are resolved from a [`history::CommitHistory`].
5. Every changed path is matched against every pattern, in order.

Any error fails closed: callers must reject an operation that could not be evaluated.

Feature flags
- `git-cli` (default): [`history::GitCli`], reading history by running `git`.
- `tracing`: emit events through `gix-trace`.
- `serde`: derive serde traits on data types.
*/

#![forbid(unsafe_code)]
#![deny(missing_debug_implementations)]

pub mod config;
pub mod engine;
mod error;
pub mod history;
pub mod hooks;
pub mod interrupt;
pub mod matcher;
pub mod pattern;
pub mod permission;
pub mod policy;
pub mod refs;
mod violation;

pub use error::{Error, Kind};
pub use violation::Violation;
