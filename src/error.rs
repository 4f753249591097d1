//! Error types for buildmatrix
//!
//! Domain-specific error types using thiserror.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use thiserror::Error;

/// Recipe loading errors
#[derive(Error, Debug)]
pub enum RecipeError {
    /// Folder does not contain a recipe definition
    #[error("No recipe.toml found in '{path}'")]
    NotARecipe { path: PathBuf },

    /// Failed to read the recipe definition
    #[error("Failed to read recipe '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },

    /// Failed to parse the recipe definition
    #[error("Failed to parse recipe '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Recipes path does not exist
    #[error("The recipes path '{path}' does not exist")]
    RecipesPathMissing { path: PathBuf },

    /// Failed to list the recipes folder
    #[error("Failed to list recipes folder '{path}': {error}")]
    ListFolder { path: PathBuf, error: String },
}

/// Channel index query errors
#[derive(Error, Debug)]
pub enum IndexError {
    /// Network failure reaching the channel
    #[error("Failed to query channel index at '{url}': {error}")]
    Network { url: String, error: String },

    /// Channel answered with an unexpected HTTP status
    #[error("Channel index query '{url}' returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Response body was not valid repodata
    #[error("Failed to parse repodata from '{url}': {error}")]
    Parse { url: String, error: String },
}

/// Build-order scheduling errors
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// A dependency is not part of the set being scheduled
    #[error(
        "The package '{package}' depends on '{dependency}', but '{dependency}' \
         is not part of the dependency mapping"
    )]
    MissingDependency { package: String, dependency: String },

    /// No progress is possible on the remaining packages
    #[error("Dependencies could not be resolved. Remaining dependencies: {remaining:?}")]
    Cycle {
        remaining: BTreeMap<String, BTreeSet<String>>,
    },
}

/// Build-tool invocation errors
#[derive(Error, Debug)]
pub enum BuildToolError {
    /// Build tool executable not found in PATH
    #[error("Build tool '{program}' not found in PATH")]
    ProgramNotFound { program: String },

    /// Failed to spawn the build tool
    #[error("Failed to spawn '{program}': {error}")]
    Spawn { program: String, error: String },

    /// Dry run exited nonzero
    #[error("Dry run failed for recipe '{recipe}':\n{output}")]
    DryRunFailed { recipe: String, output: String },

    /// Dry run produced no output path
    #[error("Dry run for recipe '{recipe}' returned no artifact path")]
    NoArtifactPath { recipe: String },

    /// Run was cancelled by a termination signal
    #[error("Build cancelled by termination signal")]
    Cancelled,
}
