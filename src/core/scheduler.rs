//! Build-order scheduling
//!
//! Converts a dependency mapping into a deterministic linear build order.
//! Among all dependency-respecting orders this produces the one that always
//! prefers the alphabetically earliest eligible package, so identical inputs
//! give identical orders across runs.

use std::collections::BTreeSet;

use crate::core::graph::DependencyMapping;
use crate::error::SchedulerError;

/// Compute the build order for the mapping.
///
/// Each full pass over the remaining packages (in lexicographic order)
/// schedules every package whose dependencies are all already scheduled.
/// A pass that schedules nothing means the remainder can never be scheduled;
/// since each productive pass strictly shrinks the remaining set the loop
/// always terminates.
///
/// A dependency name that is not a key of the mapping is a configuration
/// error, reported before any scheduling as [`SchedulerError::MissingDependency`]
/// and distinct from a genuine [`SchedulerError::Cycle`].
pub fn resolve_build_order(mapping: &DependencyMapping) -> Result<Vec<String>, SchedulerError> {
    // Missing names would stall the worklist forever; reject them up front
    // so a config error is never reported as a cycle.
    for (package, deps) in mapping {
        for dep in deps {
            if !mapping.contains_key(dep) {
                return Err(SchedulerError::MissingDependency {
                    package: package.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }

    let mut remaining = mapping.clone();
    let mut order = Vec::with_capacity(mapping.len());
    let mut scheduled: BTreeSet<String> = BTreeSet::new();

    while !remaining.is_empty() {
        // BTreeMap keys are lexicographic, which is the tie-break. A package
        // is appended the moment its dependencies are all scheduled, so it
        // may land in the same pass as the dependency that freed it.
        let candidates: Vec<String> = remaining.keys().cloned().collect();
        let mut progress = false;
        for package in candidates {
            if remaining[&package].iter().all(|dep| scheduled.contains(dep)) {
                remaining.remove(&package);
                scheduled.insert(package.clone());
                order.push(package);
                progress = true;
            }
        }

        if !progress {
            return Err(SchedulerError::Cycle { remaining });
        }
    }

    Ok(order)
}
