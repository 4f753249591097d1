//! Build variants and matrix expansion
//!
//! A variant is one concrete build of a recipe for a specific
//! python/numpy assignment. Expansion takes the Cartesian product of the
//! requested axis values, collapsing an axis to its default when the recipe
//! never opts into it.

use std::path::PathBuf;

use crate::config::defaults::{NUMPY_PIN, PYTHON_DEP};
use crate::core::graph::sanitize_name;
use crate::core::recipe::Recipe;

/// Lifecycle of one build variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// Not yet classified against the channel
    Unknown,
    /// Artifact already exists on the channel
    AlreadyBuilt,
    /// Artifact is missing and must be built
    NeedsBuild,
    /// Build command succeeded
    Built,
    /// Build command exited nonzero
    Failed,
}

/// Resolved build identity, filled in by the skip decision stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBuild {
    /// Artifact name on the channel (`<subdir>/<filename>`)
    pub artifact_name: String,
    /// Exact command line that reproduces the build
    pub command: Vec<String>,
}

/// One concrete build of a recipe for a python/numpy assignment
#[derive(Debug, Clone, PartialEq)]
pub struct BuildVariant {
    /// Owning package name
    pub package: String,
    /// Recipe folder on disk
    pub recipe_dir: PathBuf,
    /// Python version for this build
    pub python: String,
    /// Numpy version for this build
    pub numpy: String,
    /// Artifact name and build command, known after the dry run
    pub resolved: Option<ResolvedBuild>,
    /// Classification and execution state
    pub status: BuildStatus,
}

impl BuildVariant {
    /// Artifact name if the variant has been resolved
    pub fn artifact_name(&self) -> Option<&str> {
        self.resolved.as_ref().map(|r| r.artifact_name.as_str())
    }
}

/// Requested axis values for one run
#[derive(Debug, Clone)]
pub struct AxisValues {
    /// Python versions to build for
    pub python: Vec<String>,
    /// Numpy versions to build against
    pub numpy: Vec<String>,
}

/// Default value used for an axis the recipe does not participate in
#[derive(Debug, Clone)]
pub struct AxisDefaults {
    /// Default python version
    pub python: String,
    /// Default numpy version
    pub numpy: String,
}

/// Expand one recipe into its concrete variants.
///
/// Multiple numpy builds only matter when the recipe pins numpy in its
/// build requirements (the `numpy x.x` entry); otherwise the numpy axis
/// collapses to the single default value. Likewise the python axis collapses
/// unless `python` appears among the build or run requirements.
pub fn expand_matrix(recipe: &Recipe, axes: &AxisValues, defaults: &AxisDefaults) -> Vec<BuildVariant> {
    let reqs = &recipe.requirements;

    let numpy_values: &[String] = if reqs.build.iter().any(|entry| entry.trim() == NUMPY_PIN) {
        &axes.numpy
    } else {
        std::slice::from_ref(&defaults.numpy)
    };

    let mentions_python = reqs
        .build
        .iter()
        .chain(reqs.run.iter())
        .filter_map(|entry| sanitize_name(entry))
        .any(|name| name == PYTHON_DEP);
    let python_values: &[String] = if mentions_python {
        &axes.python
    } else {
        std::slice::from_ref(&defaults.python)
    };

    let mut variants = Vec::with_capacity(python_values.len() * numpy_values.len());
    for python in python_values {
        for numpy in numpy_values {
            variants.push(BuildVariant {
                package: recipe.name().to_string(),
                recipe_dir: recipe.path.clone(),
                python: python.clone(),
                numpy: numpy.clone(),
                resolved: None,
                status: BuildStatus::Unknown,
            });
        }
    }
    variants
}
