//! Default configuration values

/// Default python version to build for when none is requested
pub const DEFAULT_PYTHON: &str = "3.5";

/// Default numpy version to build against
pub const DEFAULT_NUMPY: &str = "1.11";

/// Default channel to check for pre-existing artifacts
pub const DEFAULT_CHANNEL: &str = "anaconda";

/// Default build tool executable
pub const DEFAULT_CONDA_PROGRAM: &str = "conda";

/// Recipe definition file name expected inside each recipe folder
pub const RECIPE_FILE: &str = "recipe.toml";

/// Build requirement entry that opts a recipe into the numpy axis
pub const NUMPY_PIN: &str = "numpy x.x";

/// Dependency name that opts a recipe into the python axis
pub const PYTHON_DEP: &str = "python";

/// Environment variable conda-build reads for the pinned numpy version
pub const CONDA_NPY_VAR: &str = "CONDA_NPY";

/// Folder under the system temp dir that collects per-run log files
pub const LOG_DIR_NAME: &str = "buildmatrix";

/// Archive extensions that mark a dry-run output path as a real artifact
pub const ARCHIVE_EXTENSIONS: &[&str] = &[".tar.bz2", ".conda"];
