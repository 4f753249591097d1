//! Skip decisions against the channel
//!
//! For each candidate variant, asks the build tool's dry-run interface what
//! artifact the build would produce, then checks whether that artifact
//! already exists on the channel. A dry-run failure only costs that one
//! variant, never the run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::defaults::ARCHIVE_EXTENSIONS;
use crate::core::variant::{BuildStatus, BuildVariant, ResolvedBuild};
use crate::error::BuildToolError;

/// Dry-run answer: the artifact the build would produce and how to build it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRun {
    /// Path the build tool would write the artifact to
    pub artifact_path: PathBuf,
    /// Exact command line that reproduces the build (dry-run flag removed)
    pub command: Vec<String>,
}

/// Interface to the external build tool's dry-run mode
#[allow(async_fn_in_trait)]
pub trait BuildTool {
    /// Ask the tool what building `recipe_dir` for this axis assignment
    /// would produce, without building it.
    async fn dry_run(
        &self,
        recipe_dir: &Path,
        python: &str,
        numpy: &str,
    ) -> Result<DryRun, BuildToolError>;
}

/// Variants split into the ones to build and the ones already on the channel
#[derive(Debug, Default)]
pub struct Classified {
    /// Variants marked [`BuildStatus::NeedsBuild`]
    pub to_build: Vec<BuildVariant>,
    /// Variants marked [`BuildStatus::AlreadyBuilt`]
    pub skipped: Vec<BuildVariant>,
}

/// Artifact name from the last two path segments (`<subdir>/<filename>`)
fn artifact_name_from_path(path: &Path) -> Option<String> {
    let filename = path.file_name()?.to_str()?;
    let subdir = path.parent()?.file_name()?.to_str()?;
    Some(format!("{subdir}/{filename}"))
}

fn is_archive_path(path: &Path) -> bool {
    let text = path.to_string_lossy();
    ARCHIVE_EXTENSIONS.iter().any(|ext| text.ends_with(ext))
}

/// Classify each variant as needing a build or already built.
///
/// The dry run may fail on first invocation (the tool fetching sources), so
/// a failure is retried once; a second failure drops that variant with an
/// error. A dry-run path without a conda archive extension is not yet
/// resolvable and is dropped too, counted as neither built nor skipped.
/// Cancellation is not a per-variant failure: it aborts classification.
pub async fn classify_variants<T: BuildTool>(
    tool: &T,
    variants: Vec<BuildVariant>,
    existing: &HashSet<String>,
) -> Result<Classified, BuildToolError> {
    let mut classified = Classified::default();
    tracing::info!("{:<8} | {:<5} | {:<5} | {}", "to build", "py", "npy", "artifact");

    for mut variant in variants {
        tracing::debug!(
            "Checking py={} and npy={} for {}",
            variant.python,
            variant.numpy,
            variant.package
        );

        let dry_run = match dry_run_with_retry(tool, &variant).await {
            Ok(dry_run) => dry_run,
            Err(BuildToolError::Cancelled) => return Err(BuildToolError::Cancelled),
            Err(error) => {
                tracing::error!("{error}");
                continue;
            }
        };

        if !is_archive_path(&dry_run.artifact_path) {
            tracing::warn!(
                "Dry run for {} (py={}, npy={}) returned a non-archive path '{}', skipping",
                variant.package,
                variant.python,
                variant.numpy,
                dry_run.artifact_path.display()
            );
            continue;
        }

        let Some(artifact_name) = artifact_name_from_path(&dry_run.artifact_path) else {
            tracing::warn!(
                "Could not derive an artifact name from '{}', skipping",
                dry_run.artifact_path.display()
            );
            continue;
        };

        let on_channel = existing.contains(&artifact_name);
        tracing::info!(
            "{:<8} | {:<5} | {:<5} | {}",
            (!on_channel).to_string(),
            variant.python,
            variant.numpy,
            artifact_name
        );

        variant.resolved = Some(ResolvedBuild {
            artifact_name,
            command: dry_run.command,
        });
        if on_channel {
            variant.status = BuildStatus::AlreadyBuilt;
            classified.skipped.push(variant);
        } else {
            variant.status = BuildStatus::NeedsBuild;
            classified.to_build.push(variant);
        }
    }
    Ok(classified)
}

async fn dry_run_with_retry<T: BuildTool>(
    tool: &T,
    variant: &BuildVariant,
) -> Result<DryRun, BuildToolError> {
    match tool
        .dry_run(&variant.recipe_dir, &variant.python, &variant.numpy)
        .await
    {
        Ok(dry_run) => Ok(dry_run),
        // A cancelled call means the run is over, not that the tool hiccuped.
        Err(BuildToolError::Cancelled) => Err(BuildToolError::Cancelled),
        Err(first) => {
            // The first call can fail while the tool checks out sources.
            tracing::warn!(
                "Dry run failed for {} (py={}, npy={}), retrying once: {first}",
                variant.package,
                variant.python,
                variant.numpy
            );
            tool.dry_run(&variant.recipe_dir, &variant.python, &variant.numpy)
                .await
        }
    }
}
