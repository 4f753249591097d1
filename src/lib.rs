//! buildmatrix - conda recipe matrix builder
//!
//! Builds a folder of conda recipes across a python × numpy version matrix,
//! skipping variants that already exist on the target channel and ordering
//! the rest by inter-recipe dependency.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - The planning and execution pipeline
//! - [`infra`] - Infrastructure layer (channel index, conda, child processes)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
