//! RoSE Common - Shared utilities for RoSE dataset crates
//!
//! This crate provides the plumbing shared by the dataset crates:
//!
//! - **Initialization**: [`init_tracing`] for standardized logging setup
//! - **JSON lines**: [`JsonLines`] for streaming newline-delimited JSON files
//!
//! # Example
//!
//! ```rust,ignore
//! use rose_common::{init_tracing, JsonLines};
//!
//! init_tracing("rose")?;
//!
//! for item in JsonLines::<_, serde_json::Value>::open("data.jsonl")? {
//!     let (index, value) = item?;
//!     // ...
//! }
//! ```

pub mod init;
pub mod jsonl;

// Re-export commonly used items at crate root
pub use init::init_tracing;
pub use jsonl::{JsonLines, JsonlError, JsonlResult};
