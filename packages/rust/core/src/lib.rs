//! Core deployment logic for nbdeploy.
//!
//! This crate ties together stale-output pruning, the external notebook
//! converter, and the aggregate index into the `update_html` workflow.

pub mod convert;
pub mod files;
pub mod pipeline;
pub mod toc;
