//! Command-line interface module
//!
//! Argument parsing and the run orchestration that wires the pipeline
//! stages together: expand, classify, graph, schedule, execute.

pub mod output;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::config::defaults;
use crate::core::executor::run_build;
use crate::core::graph::build_dependency_mapping;
use crate::core::plan::BuildPlan;
use crate::core::recipe::{self, Recipe};
use crate::core::scheduler::resolve_build_order;
use crate::core::skip::classify_variants;
use crate::core::variant::{expand_matrix, AxisDefaults, AxisValues, BuildVariant};
use crate::infra::conda::CondaBuildTool;
use crate::infra::index::{host_subdirs, ChannelIndex};
use crate::infra::process::ProcessRegistry;
use self::output::create_spinner;

/// Build a folder of conda recipes, skipping whatever already exists on the
/// target channel.
#[derive(Parser, Debug)]
#[command(name = "buildmatrix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the recipes that should be built
    pub recipes_path: PathBuf,

    /// Python versions to build conda packages for
    #[arg(short, long, num_args = 1.., default_value = defaults::DEFAULT_PYTHON)]
    pub python: Vec<String>,

    /// Numpy versions to build packages against
    #[arg(long, num_args = 1.., default_value = defaults::DEFAULT_NUMPY)]
    pub numpy: Vec<String>,

    /// Conda channel to check for pre-existing artifacts
    #[arg(short, long, default_value = defaults::DEFAULT_CHANNEL)]
    pub channel: String,

    /// Conda executable to drive (e.g. a mambabuild wrapper)
    #[arg(long, env = "BUILDMATRIX_CONDA", default_value = defaults::DEFAULT_CONDA_PROGRAM)]
    pub conda: String,

    /// Continue building packages after one of them fails
    #[arg(long)]
    pub allow_failures: bool,

    /// Figure out what to build, print the plan, and exit
    #[arg(long)]
    pub dry_run: bool,

    /// File to write the JSON version of the plan to
    #[arg(long)]
    pub plan_file: Option<PathBuf>,

    /// Name of the log file to write
    #[arg(short, long)]
    pub log: Option<PathBuf>,

    /// Enable DEBUG level logging (-vv for TRACE). Default is INFO
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Execute the full run: decide, order, build, summarize
    pub async fn run(self, registry: ProcessRegistry, cancel: CancellationToken) -> Result<()> {
        // Configuration errors surface before any network or tool work.
        if !self.recipes_path.exists() {
            bail!(
                "The recipes path '{}' does not exist",
                self.recipes_path.display()
            );
        }
        let tool = CondaBuildTool::with_program(&self.conda, registry.clone(), cancel.clone());
        tool.preflight()?;

        // Everything downstream compares against this one index snapshot.
        let index = ChannelIndex::new(&self.channel);
        let spinner = create_spinner(&format!("Querying channel index for '{}'...", self.channel));
        let existing = index.artifact_names(&host_subdirs()).await;
        spinner.finish_and_clear();
        let existing = existing.with_context(|| format!("Failed to query channel '{}'", self.channel))?;

        tracing::info!("recipes_path = {}", self.recipes_path.display());
        let recipes = recipe::discover(&self.recipes_path)?;
        tracing::info!("Figuring out which recipes need to build...");

        let axes = AxisValues {
            python: self.python.clone(),
            numpy: self.numpy.clone(),
        };
        let axis_defaults = AxisDefaults {
            python: defaults::DEFAULT_PYTHON.to_string(),
            numpy: defaults::DEFAULT_NUMPY.to_string(),
        };
        let mut candidates: Vec<BuildVariant> = Vec::new();
        for recipe in &recipes {
            candidates.extend(expand_matrix(recipe, &axes, &axis_defaults));
        }

        let classified = classify_variants(&tool, candidates, &existing).await?;
        if classified.to_build.is_empty() {
            println!("No recipes to build!. Exiting 0");
            return Ok(());
        }

        // One graph node per package, however many of its variants build.
        let building: BTreeSet<&str> = classified
            .to_build
            .iter()
            .map(|v| v.package.as_str())
            .collect();
        let graph_recipes: Vec<&Recipe> = recipes
            .iter()
            .filter(|r| building.contains(r.name()))
            .collect();
        let mapping = build_dependency_mapping(&graph_recipes);
        let order = resolve_build_order(&mapping)?;

        let mut plan = BuildPlan::from_order(classified.to_build, &order);
        tracing::info!("This is the determined build order...");
        for variant in &plan.entries {
            tracing::info!("{}", variant.artifact_name().unwrap_or(variant.package.as_str()));
        }

        if let Some(ref path) = self.plan_file {
            plan.export(path)
                .with_context(|| format!("Failed to write plan file '{}'", path.display()))?;
            tracing::info!("Plan written to {}", path.display());
        }

        if self.dry_run {
            println!("Dry run enabled. Exiting 0");
            return Ok(());
        }

        let expected = plan.len();
        let mut result = run_build(&mut plan, self.allow_failures, &registry, &cancel).await?;
        result.skipped = classified
            .skipped
            .iter()
            .filter_map(|v| v.artifact_name().map(str::to_string))
            .collect();
        result.skipped.sort();

        output::display_summary(&result, expected, &self.channel);

        if !result.failed.is_empty() && !self.allow_failures {
            bail!("Some packages failed to build");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_match_conda_conventions() {
        let cli = Cli::parse_from(["buildmatrix", "/recipes"]);
        assert_eq!(cli.python, vec![defaults::DEFAULT_PYTHON]);
        assert_eq!(cli.numpy, vec![defaults::DEFAULT_NUMPY]);
        assert_eq!(cli.channel, defaults::DEFAULT_CHANNEL);
        assert!(!cli.allow_failures);
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_multiple_axis_values() {
        let cli = Cli::parse_from([
            "buildmatrix",
            "/recipes",
            "--python",
            "3.5",
            "3.6",
            "--numpy",
            "1.10",
            "1.11",
            "-c",
            "my-channel",
        ]);
        assert_eq!(cli.python, vec!["3.5", "3.6"]);
        assert_eq!(cli.numpy, vec!["1.10", "1.11"]);
        assert_eq!(cli.channel, "my-channel");
    }
}
