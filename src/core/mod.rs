//! Core business logic module
//!
//! The planning and execution pipeline. Each stage consumes only the output
//! of the previous one:
//!
//! - [`recipe`] - Recipe (recipe.toml) parsing and folder discovery
//! - [`variant`] - Build variants and matrix expansion
//! - [`skip`] - Skip decisions against the channel
//! - [`graph`] - Dependency graph construction
//! - [`scheduler`] - Build-order scheduling
//! - [`plan`] - Ordered build plan and plan export
//! - [`executor`] - Sequential build execution

pub mod executor;
pub mod graph;
pub mod plan;
pub mod recipe;
pub mod scheduler;
pub mod skip;
pub mod variant;
