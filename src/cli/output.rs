//! Output formatting and progress indicators
//!
//! Utilities for displaying progress, status prefixes, and the end-of-run
//! summary to the user.

use indicatif::{ProgressBar, ProgressStyle};

use crate::core::executor::BuildResult;

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

/// Display a fatal error and its chain of causes
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}

/// Display the end-of-run summary.
///
/// Always enumerates built, failed, and already-built artifact names,
/// regardless of outcome.
pub fn display_summary(result: &BuildResult, expected: usize, channel: &str) {
    tracing::info!("Build summary");
    tracing::info!("Expected {} packages", expected);
    tracing::info!(
        "Got {} packages.",
        result.built.len() + result.failed.len()
    );

    if !result.failed.is_empty() {
        tracing::error!("Some packages failed to build");
        for name in &result.failed {
            tracing::error!("{} {name}", status::ERROR);
        }
    }
    if !result.built.is_empty() {
        tracing::info!("Packages built successfully");
        for name in &result.built {
            tracing::info!("{} {name}", status::SUCCESS);
        }
    }
    if !result.skipped.is_empty() {
        tracing::info!("Packages that already exist in {channel}");
        for name in &result.skipped {
            tracing::info!("{} {name}", status::INFO);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_handles_empty_result() {
        // Must not panic on a run where nothing happened.
        display_summary(&BuildResult::default(), 0, "anaconda");
    }
}
