//! Sequential build execution
//!
//! Walks the plan in order, running each variant's build command as a
//! tracked child process. Later packages may need artifacts earlier ones
//! just wrote to the local build cache, so there is exactly one child at a
//! time and the plan order is strictly respected.

use tokio_util::sync::CancellationToken;

use crate::config::defaults::CONDA_NPY_VAR;
use crate::core::plan::BuildPlan;
use crate::core::variant::BuildStatus;
use crate::error::BuildToolError;
use crate::infra::process::{run_tracked, ProcessRegistry};

/// Accumulated record of one run
#[derive(Debug, Default)]
pub struct BuildResult {
    /// Artifact names built successfully
    pub built: Vec<String>,
    /// Artifact names whose build exited nonzero
    pub failed: Vec<String>,
    /// Artifact names that already existed on the channel
    pub skipped: Vec<String>,
}

/// Execute the plan in order.
///
/// Zero exit marks the variant [`BuildStatus::Built`]; nonzero marks it
/// [`BuildStatus::Failed`] with the captured output logged at error level.
/// Without `allow_failures` the first failure stops the plan; with it the
/// remaining entries still run. Cancellation kills the in-flight child and
/// surfaces as [`BuildToolError::Cancelled`].
pub async fn run_build(
    plan: &mut BuildPlan,
    allow_failures: bool,
    registry: &ProcessRegistry,
    cancel: &CancellationToken,
) -> Result<BuildResult, BuildToolError> {
    let mut result = BuildResult::default();

    for variant in &mut plan.entries {
        if cancel.is_cancelled() {
            return Err(BuildToolError::Cancelled);
        }

        let Some(resolved) = variant.resolved.clone() else {
            // Unresolved variants never make it into a plan.
            tracing::warn!("Plan entry for '{}' has no build command, skipping", variant.package);
            continue;
        };

        tracing::info!("Building: {}", resolved.artifact_name);
        tracing::info!("Build cmd: {}", resolved.command.join(" "));

        let env = vec![(CONDA_NPY_VAR.to_string(), variant.numpy.clone())];
        let output = run_tracked(&resolved.command, &env, registry, cancel).await?;

        if output.success() {
            variant.status = BuildStatus::Built;
            result.built.push(resolved.artifact_name);
        } else {
            variant.status = BuildStatus::Failed;
            tracing::error!(
                "\n\n========== STDOUT ==========\n{}\n\n========== STDERR ==========\n{}",
                output.stdout,
                output.stderr
            );
            result.failed.push(resolved.artifact_name);
            if !allow_failures {
                tracing::error!("Build failed and --allow-failures is not set, stopping");
                break;
            }
        }
    }

    result.built.sort();
    result.failed.sort();
    Ok(result)
}
