//! Dependency graph construction
//!
//! Derives a name-level dependency mapping from the recipes being built.
//! Specifiers carry version pinning (`numpy >=1.11`) and selector text, so
//! each is reduced to its bare name before the build/run/test lists are
//! unioned. Dependencies outside the in-scope set are dropped; they cannot
//! be sequenced by this run and are assumed already satisfiable.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::recipe::Recipe;

/// Mapping from package name to its in-scope dependency names
pub type DependencyMapping = BTreeMap<String, BTreeSet<String>>;

/// Reduce a dependency specifier to its bare name.
///
/// Keeps the first whitespace-delimited token, dropping version pins and
/// selectors. Returns `None` for an all-whitespace specifier.
pub fn sanitize_name(spec: &str) -> Option<&str> {
    spec.split_whitespace().next()
}

/// Build the dependency mapping for the given recipes.
///
/// Each recipe contributes one node regardless of how many of its variants
/// are being built; callers pass the deduplicated recipe set.
pub fn build_dependency_mapping(recipes: &[&Recipe]) -> DependencyMapping {
    tracing::debug!("Building dependency graph for {} packages", recipes.len());

    let mut union: DependencyMapping = BTreeMap::new();
    for recipe in recipes {
        let reqs = &recipe.requirements;
        let deps: BTreeSet<String> = reqs
            .build
            .iter()
            .chain(reqs.run.iter())
            .chain(reqs.test.iter())
            .filter_map(|spec| sanitize_name(spec))
            .map(str::to_string)
            .collect();
        union.insert(recipe.name().to_string(), deps);
    }

    // Restrict each dependency set to packages we are actually building.
    let in_scope: BTreeSet<String> = union.keys().cloned().collect();
    for (name, deps) in &mut union {
        deps.retain(|dep| in_scope.contains(dep));
        tracing::debug!("{name} -> {deps:?}");
    }
    union
}
