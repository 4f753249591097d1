//! Channel URLs

/// Base URL bare channel names are resolved against
pub const ANACONDA_CHANNEL_BASE: &str = "https://conda.anaconda.org";
