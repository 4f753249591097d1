//! Infrastructure layer
//!
//! Handles all I/O with external collaborators: the channel index over
//! HTTP, the conda executable, and tracked child processes.

pub mod conda;
pub mod index;
pub mod process;
