//! Common types shared across Matchmate crates.
//!
//! This crate provides the error taxonomy that the roster loader, the
//! LLM backends and the HTTP layer all report through.

pub mod error;

pub use error::{MatchmateError, Result};
