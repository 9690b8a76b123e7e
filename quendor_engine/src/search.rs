use std::env;
use std::path::{Path, PathBuf};

use log::debug;

/// Directory name probed under the working and home directories.
pub const ZCODE_DIR: &str = "zcode";

/// Directories probed when locating programs, resources and configuration.
///
/// Built once from the environment by the binary; tests construct it by hand
/// so nothing in the library reads process-wide state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPaths {
    pub program_dirs: Vec<PathBuf>,
    pub config_dirs: Vec<PathBuf>,
}

impl SearchPaths {
    pub fn new(program_dirs: Vec<PathBuf>, config_dirs: Vec<PathBuf>) -> Self {
        SearchPaths {
            program_dirs,
            config_dirs,
        }
    }

    /// Standard layout rooted at `cwd` and `home`:
    /// programs in `cwd`, `cwd/zcode`, `home/zcode`, `$ZCODE_PATH`,
    /// `$QUENDOR_PATH`; configuration in `cwd`, `home`, `$QUENDOR_PATH`.
    pub fn standard(
        cwd: &Path,
        home: Option<&Path>,
        zcode_path: Option<PathBuf>,
        quendor_path: Option<PathBuf>,
    ) -> Self {
        let mut program_dirs = vec![cwd.to_path_buf(), cwd.join(ZCODE_DIR)];
        let mut config_dirs = vec![cwd.to_path_buf()];

        if let Some(home) = home {
            program_dirs.push(home.join(ZCODE_DIR));
            config_dirs.push(home.to_path_buf());
        }
        program_dirs.extend(zcode_path);
        if let Some(quendor_path) = quendor_path {
            program_dirs.push(quendor_path.clone());
            config_dirs.push(quendor_path);
        }

        SearchPaths::new(program_dirs, config_dirs)
    }

    /// Read `HOME`, `ZCODE_PATH` and `QUENDOR_PATH` from the environment.
    /// Unset or empty variables contribute no directory.
    pub fn from_env() -> Self {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let home = env_dir("HOME");
        SearchPaths::standard(
            &cwd,
            home.as_deref(),
            env_dir("ZCODE_PATH"),
            env_dir("QUENDOR_PATH"),
        )
    }

    pub fn locate_program(&self, name: &str) -> Result<PathBuf, Vec<PathBuf>> {
        locate_in(&self.program_dirs, name)
    }

    pub fn locate_config(&self, name: &str) -> Result<PathBuf, Vec<PathBuf>> {
        locate_in(&self.config_dirs, name)
    }
}

fn env_dir(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// First `dir/name` that is a regular file. On failure the directories
/// checked are handed back for the error report.
fn locate_in(dirs: &[PathBuf], name: &str) -> Result<PathBuf, Vec<PathBuf>> {
    for dir in dirs {
        let candidate = dir.join(name);
        debug!("Checking: {}", candidate.display());
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(dirs.to_vec())
}
