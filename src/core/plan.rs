//! Ordered build plan and plan export
//!
//! A plan is the variants that need building, arranged so every package's
//! dependencies are built before the package itself.

use serde::Serialize;
use std::path::Path;

use crate::core::variant::BuildVariant;

/// Ordered sequence of variants to build
#[derive(Debug, Default)]
pub struct BuildPlan {
    /// Variants in build order
    pub entries: Vec<BuildVariant>,
}

/// One plan entry as written to the plan file
#[derive(Debug, Serialize)]
struct PlanEntry<'a> {
    package: &'a str,
    python: &'a str,
    numpy: &'a str,
    artifact: Option<&'a str>,
    command: Option<&'a [String]>,
}

impl BuildPlan {
    /// Arrange variants to follow the package build order.
    ///
    /// All variants of a package stay together, in their expansion order;
    /// packages follow `order`.
    pub fn from_order(variants: Vec<BuildVariant>, order: &[String]) -> Self {
        let mut entries = Vec::with_capacity(variants.len());
        for name in order {
            entries.extend(variants.iter().filter(|v| &v.package == name).cloned());
        }
        Self { entries }
    }

    /// Number of variants in the plan
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the plan has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the plan as JSON to `path`
    pub fn export(&self, path: &Path) -> std::io::Result<()> {
        let entries: Vec<PlanEntry<'_>> = self
            .entries
            .iter()
            .map(|v| PlanEntry {
                package: &v.package,
                python: &v.python,
                numpy: &v.numpy,
                artifact: v.artifact_name(),
                command: v.resolved.as_ref().map(|r| r.command.as_slice()),
            })
            .collect();
        let json = serde_json::to_string_pretty(&entries)?;
        std::fs::write(path, json)
    }
}
