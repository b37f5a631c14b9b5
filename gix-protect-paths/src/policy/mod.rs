//! Decisions taken before any commit is looked at.
//!
//! Evaluation of a ref update is skipped entirely if
//! 1. the acting user is exempt ([`should_skip()`]), or
//! 2. the ref is outside the configured branch filter ([`BranchFilter`]).

pub mod branch;
pub mod gate;

pub use branch::BranchFilter;
pub use gate::should_skip;
