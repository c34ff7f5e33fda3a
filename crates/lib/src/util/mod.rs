//! Shared utilities.
//!
//! Test helpers for exercising generators without touching the filesystem.

#[cfg(test)]
pub mod testutil;
