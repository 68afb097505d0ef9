//! Core engine for commit-backup
//!
//! - **config**: optional commit-backup.toml parsing and validation
//! - **context**: validated run context built once from CLI input
//! - **error**: error types with contextual help messages and exit codes
//! - **selector**: commit selection by date window
//! - **extractor**: parallel changed-file discovery (stage A)
//! - **fetch**: historical content retrieval off the async scheduler
//! - **writer**: snapshot persistence under `<backup>/<commit>/<path>`
//! - **processor**: concurrent fetch + write per commit and file (stage B)
//! - **failures**: shared, append-only failure record
//! - **pipeline**: the end-to-end run
//! - **validate**: path and date preconditions
//! - **vcs**: repository access via system git

pub mod config;
pub mod context;
pub mod error;
pub mod extractor;
pub mod failures;
pub mod fetch;
pub mod pipeline;
pub mod processor;
pub mod selector;
pub mod validate;
pub mod vcs;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_support;
