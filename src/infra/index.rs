//! Channel index queries
//!
//! Fetches repodata.json for each relevant subdir of a channel and collects
//! the names of every artifact already present, as `<subdir>/<filename>`.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};

use crate::config::urls;
use crate::error::IndexError;

/// Subdirs queried for the current host, plus architecture-independent builds
pub fn host_subdirs() -> [&'static str; 2] {
    [host_subdir(), "noarch"]
}

/// Platform subdir conda uses for artifacts built on this host
pub fn host_subdir() -> &'static str {
    if cfg!(all(target_os = "linux", target_arch = "aarch64")) {
        "linux-aarch64"
    } else if cfg!(target_os = "linux") {
        "linux-64"
    } else if cfg!(all(target_os = "macos", target_arch = "aarch64")) {
        "osx-arm64"
    } else if cfg!(target_os = "macos") {
        "osx-64"
    } else if cfg!(target_os = "windows") {
        "win-64"
    } else {
        "linux-64"
    }
}

/// Shape of a subdir's repodata.json (only the filename keys matter here)
#[derive(Debug, Deserialize)]
struct Repodata {
    #[serde(default)]
    packages: HashMap<String, serde_json::Value>,
    #[serde(default, rename = "packages.conda")]
    packages_conda: HashMap<String, serde_json::Value>,
}

/// Client for one channel's artifact index
#[derive(Debug)]
pub struct ChannelIndex {
    /// HTTP client
    client: reqwest::Client,
    /// Channel base URL
    base_url: String,
}

impl ChannelIndex {
    /// Create an index client for a channel.
    ///
    /// `channel` is either a full URL or a bare anaconda.org channel name.
    pub fn new(channel: &str) -> Self {
        let base_url = if channel.starts_with("http://") || channel.starts_with("https://") {
            channel.trim_end_matches('/').to_string()
        } else {
            format!("{}/{channel}", urls::ANACONDA_CHANNEL_BASE)
        };
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Channel base URL this client queries
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Names of all artifacts on the channel for the given subdirs.
    ///
    /// A subdir without repodata (404) contributes nothing; any other
    /// failure is fatal since a partial index would produce wrong skip
    /// decisions.
    pub async fn artifact_names(&self, subdirs: &[&str]) -> Result<HashSet<String>, IndexError> {
        let mut names = HashSet::new();
        for subdir in subdirs {
            let url = format!("{}/{subdir}/repodata.json", self.base_url);
            tracing::debug!("Fetching channel index: {url}");

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|error| IndexError::Network {
                    url: url.clone(),
                    error: error.to_string(),
                })?;

            if response.status() == reqwest::StatusCode::NOT_FOUND {
                tracing::debug!("No repodata for subdir '{subdir}'");
                continue;
            }
            if !response.status().is_success() {
                return Err(IndexError::Status {
                    url,
                    status: response.status().as_u16(),
                });
            }

            let repodata: Repodata =
                response.json().await.map_err(|error| IndexError::Parse {
                    url: url.clone(),
                    error: error.to_string(),
                })?;

            names.extend(
                repodata
                    .packages
                    .keys()
                    .chain(repodata.packages_conda.keys())
                    .map(|filename| format!("{subdir}/{filename}")),
            );
        }
        tracing::debug!("Channel holds {} artifacts", names.len());
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_channel_name_expands_to_anaconda_url() {
        let index = ChannelIndex::new("my-channel");
        assert_eq!(index.base_url(), "https://conda.anaconda.org/my-channel");
    }

    #[test]
    fn test_full_url_is_kept_without_trailing_slash() {
        let index = ChannelIndex::new("https://example.com/channel/");
        assert_eq!(index.base_url(), "https://example.com/channel");
    }

    #[test]
    fn test_host_subdirs_include_noarch() {
        assert_eq!(host_subdirs()[1], "noarch");
    }
}
