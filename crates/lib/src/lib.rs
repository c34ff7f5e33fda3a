//! modgraph-lib: build graph generation for Go binaries and script bundles
//!
//! This crate turns module descriptors into build actions:
//! - `pattern`: resolving source globs relative to a module directory
//! - `classify`: splitting sources into build and test files
//! - `rule`: the fixed set of command templates actions refer to
//! - `action`: build actions and their builder
//! - `module`: per-kind generators and the blueprint file format
//! - `graph`: combining modules into one checked graph and writing ninja

pub mod action;
pub mod classify;
pub mod config;
pub mod consts;
pub mod error;
pub mod graph;
pub mod module;
pub mod pattern;
pub mod rule;
pub mod util;
