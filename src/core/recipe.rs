//! Recipe (recipe.toml) parsing and folder discovery
//!
//! A recipe folder describes one buildable package: its name and the
//! build/run/test requirement lists. The recipes path either is a single
//! recipe folder or contains one sub-folder per recipe.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::config::defaults::RECIPE_FILE;
use crate::error::RecipeError;

/// One recipe definition (recipe.toml)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Recipe {
    /// Package metadata
    pub package: PackageMeta,

    /// Requirement lists
    #[serde(default)]
    pub requirements: Requirements,

    /// Folder the recipe was loaded from
    #[serde(skip)]
    pub path: PathBuf,
}

/// Package metadata in the recipe
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PackageMeta {
    /// Package name, unique per recipe folder
    pub name: String,
}

/// Requirement lists for the three dependency roles
///
/// Entries are raw specifiers: a bare name, optionally followed by version
/// pinning (`numpy >=1.11`) or selector text.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Requirements {
    /// Build-time requirements
    #[serde(default)]
    pub build: Vec<String>,

    /// Run-time requirements
    #[serde(default)]
    pub run: Vec<String>,

    /// Test-time requirements
    #[serde(default)]
    pub test: Vec<String>,
}

impl Recipe {
    /// Parse a recipe from TOML text
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, RecipeError> {
        let mut recipe: Recipe = toml::from_str(content).map_err(|source| RecipeError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        recipe.path = path.to_path_buf();
        Ok(recipe)
    }

    /// Load the recipe definition from a recipe folder
    pub fn load(dir: &Path) -> Result<Self, RecipeError> {
        let definition = dir.join(RECIPE_FILE);
        if !definition.is_file() {
            return Err(RecipeError::NotARecipe {
                path: dir.to_path_buf(),
            });
        }
        let content =
            std::fs::read_to_string(&definition).map_err(|error| RecipeError::ReadFile {
                path: definition.clone(),
                error: error.to_string(),
            })?;
        Self::from_toml(&content, dir)
    }

    /// Name of the package this recipe builds
    pub fn name(&self) -> &str {
        &self.package.name
    }
}

/// Discover recipes under `recipes_path`.
///
/// A path that directly contains a recipe.toml is a single recipe.
/// Otherwise every sub-folder holding a recipe.toml is a recipe, visited in
/// sorted order; plain files and folders without a definition are skipped.
pub fn discover(recipes_path: &Path) -> Result<Vec<Recipe>, RecipeError> {
    if !recipes_path.exists() {
        return Err(RecipeError::RecipesPathMissing {
            path: recipes_path.to_path_buf(),
        });
    }

    if recipes_path.join(RECIPE_FILE).is_file() {
        return Ok(vec![Recipe::load(recipes_path)?]);
    }

    let entries = std::fs::read_dir(recipes_path).map_err(|error| RecipeError::ListFolder {
        path: recipes_path.to_path_buf(),
        error: error.to_string(),
    })?;

    let mut folders: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    folders.sort();

    let mut recipes = Vec::new();
    for folder in folders {
        if !folder.join(RECIPE_FILE).is_file() {
            tracing::debug!("Skipping '{}': no {RECIPE_FILE}", folder.display());
            continue;
        }
        recipes.push(Recipe::load(&folder)?);
    }
    Ok(recipes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE_RECIPE: &str = r#"
[package]
name = "package-a"

[requirements]
build = ["python", "numpy x.x", "setuptools"]
run = ["python", "numpy >=1.11"]
test = ["pytest"]
"#;

    #[test]
    fn test_parse_recipe() {
        let recipe = Recipe::from_toml(SAMPLE_RECIPE, Path::new("/recipes/package-a")).unwrap();
        assert_eq!(recipe.name(), "package-a");
        assert_eq!(recipe.requirements.build.len(), 3);
        assert_eq!(recipe.requirements.run.len(), 2);
        assert_eq!(recipe.requirements.test, vec!["pytest"]);
        assert_eq!(recipe.path, PathBuf::from("/recipes/package-a"));
    }

    #[test]
    fn test_requirements_default_to_empty() {
        let recipe = Recipe::from_toml("[package]\nname = \"bare\"\n", Path::new("/r")).unwrap();
        assert!(recipe.requirements.build.is_empty());
        assert!(recipe.requirements.run.is_empty());
        assert!(recipe.requirements.test.is_empty());
    }

    #[test]
    fn test_load_missing_definition_is_not_a_recipe() {
        let dir = TempDir::new().unwrap();
        let err = Recipe::load(dir.path()).unwrap_err();
        assert!(matches!(err, RecipeError::NotARecipe { .. }));
    }

    #[test]
    fn test_discover_single_recipe_folder() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(RECIPE_FILE), "[package]\nname = \"solo\"\n").unwrap();

        let recipes = discover(dir.path()).unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].name(), "solo");
    }

    #[test]
    fn test_discover_sorted_and_skips_non_recipes() {
        let dir = TempDir::new().unwrap();
        for name in ["zeta", "alpha"] {
            let folder = dir.path().join(name);
            std::fs::create_dir(&folder).unwrap();
            std::fs::write(
                folder.join(RECIPE_FILE),
                format!("[package]\nname = \"{name}\"\n"),
            )
            .unwrap();
        }
        std::fs::create_dir(dir.path().join("not-a-recipe")).unwrap();
        std::fs::write(dir.path().join("README.md"), "docs").unwrap();

        let recipes = discover(dir.path()).unwrap();
        let names: Vec<&str> = recipes.iter().map(Recipe::name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_discover_missing_path() {
        let err = discover(Path::new("/no/such/recipes/path")).unwrap_err();
        assert!(matches!(err, RecipeError::RecipesPathMissing { .. }));
    }
}
