//! conda-build invocation
//!
//! Shells out to the conda executable. The dry run (`conda build --output`)
//! reports the artifact path a build would produce; dropping the `--output`
//! flag from that same command line gives the real build invocation.

use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::config::defaults::{CONDA_NPY_VAR, DEFAULT_CONDA_PROGRAM};
use crate::core::skip::{BuildTool, DryRun};
use crate::error::BuildToolError;
use crate::infra::process::{run_tracked, ProcessRegistry};

/// The conda build tool
#[derive(Debug, Clone)]
pub struct CondaBuildTool {
    program: String,
    registry: ProcessRegistry,
    cancel: CancellationToken,
}

impl CondaBuildTool {
    /// Create a tool driving the default `conda` executable
    pub fn new(registry: ProcessRegistry, cancel: CancellationToken) -> Self {
        Self::with_program(DEFAULT_CONDA_PROGRAM, registry, cancel)
    }

    /// Create a tool driving a specific executable (e.g. a mamba wrapper)
    pub fn with_program(program: &str, registry: ProcessRegistry, cancel: CancellationToken) -> Self {
        Self {
            program: program.to_string(),
            registry,
            cancel,
        }
    }

    /// Check the executable can be found at all
    pub fn preflight(&self) -> Result<(), BuildToolError> {
        // Paths to a stub script are fine too, so check the filesystem first.
        if Path::new(&self.program).is_file() {
            return Ok(());
        }
        which::which(&self.program)
            .map(|_| ())
            .map_err(|_| BuildToolError::ProgramNotFound {
                program: self.program.clone(),
            })
    }

    fn build_args(recipe_dir: &Path, python: &str, numpy: &str) -> Vec<String> {
        vec![
            "build".to_string(),
            recipe_dir.display().to_string(),
            "--python".to_string(),
            python.to_string(),
            "--numpy".to_string(),
            numpy.to_string(),
        ]
    }
}

impl BuildTool for CondaBuildTool {
    async fn dry_run(
        &self,
        recipe_dir: &Path,
        python: &str,
        numpy: &str,
    ) -> Result<DryRun, BuildToolError> {
        let mut command = vec![self.program.clone()];
        command.extend(Self::build_args(recipe_dir, python, numpy));
        command.push("--output".to_string());
        tracing::debug!("cmd={command:?}");

        let env = vec![(CONDA_NPY_VAR.to_string(), numpy.to_string())];
        let output = run_tracked(&command, &env, &self.registry, &self.cancel).await?;

        if !output.success() {
            return Err(BuildToolError::DryRunFailed {
                recipe: recipe_dir.display().to_string(),
                output: format!("{}\n{}", output.stdout, output.stderr),
            });
        }

        // The last line of stdout is the artifact path; earlier lines can be
        // source-fetch chatter.
        let artifact_path = output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .next_back()
            .ok_or_else(|| BuildToolError::NoArtifactPath {
                recipe: recipe_dir.display().to_string(),
            })?;

        // Keep the exact command for the real build, minus the dry-run flag.
        command.pop();
        Ok(DryRun {
            artifact_path: artifact_path.into(),
            command,
        })
    }
}
