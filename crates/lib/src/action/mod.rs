//! Build action construction.
//!
//! A [`BuildAction`] is one node of the emitted graph: a rule, the paths it
//! produces, the paths it reads, and the arguments substituted into the
//! rule's command. Actions are only created through [`ActionBuilder`], which
//! checks that the node is complete before handing it out.
//!
//! # Ordering
//!
//! This crate never schedules anything. When one step must run before
//! another, the generator lists the first step's output as an input of the
//! second and the executor orders them.
//!
//! # Submodules
//!
//! - [`args`] - typed argument sets for each rule kind

pub mod args;
mod types;

pub use args::*;
pub use types::*;
