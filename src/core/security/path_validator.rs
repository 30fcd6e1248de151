use std::io;
use std::path::{Component, Path, PathBuf};

use crate::core::config::Config;

/// Errors that can occur during path validation
#[derive(Debug, thiserror::Error)]
pub enum PathSecurityError {
    #[error("Path '{path}' is outside allowed root directory '{root}'")]
    OutsideRootDirectory { path: PathBuf, root: PathBuf },

    #[error("Symlink '{path}' points outside allowed root directory")]
    SymlinkOutsideRoot { path: PathBuf },

    #[error("Symlinks are not allowed: '{path}'")]
    SymlinkNotAllowed { path: PathBuf },

    #[error("Path '{path}' must not contain '..' after its last existing directory")]
    ParentTraversal { path: PathBuf },

    #[error("Cannot canonicalize path '{path}': {error}")]
    CannotCanonicalize { path: PathBuf, error: io::Error },

    #[error("Path does not exist: '{path}'")]
    PathNotFound { path: PathBuf },

    #[error("IO error for path '{path}': {error}")]
    IoError { path: PathBuf, error: io::Error },
}

/// Validates that an existing path is within the configured security boundaries.
///
/// The path is canonicalized (resolving `.`, `..` and symlinks) and, when a
/// root is configured, must land inside it. With `allow_symlinks = false` a
/// path that is itself a symlink is rejected before it is resolved.
///
/// # Returns
///
/// * `Ok(PathBuf)` - The canonicalized, validated path
/// * `Err(PathSecurityError)` - If validation fails
///
/// # Examples
///
/// ```rust,ignore
/// let config = Config::from_env();
/// let safe_path = validate_path("/srv/data/report.csv", &config)?;
/// ```
pub fn validate_path(input_path: &str, config: &Config) -> Result<PathBuf, PathSecurityError> {
    let path = Path::new(input_path);

    let is_symlink = path.is_symlink();
    if is_symlink && !config.security.allow_symlinks {
        return Err(PathSecurityError::SymlinkNotAllowed {
            path: path.to_path_buf(),
        });
    }

    let canonical_path = canonicalize_path(path)?;

    let Some(canonical_root) = canonical_root(config)? else {
        return Ok(canonical_path);
    };

    if !canonical_path.starts_with(&canonical_root) {
        if is_symlink {
            return Err(PathSecurityError::SymlinkOutsideRoot {
                path: path.to_path_buf(),
            });
        }
        return Err(PathSecurityError::OutsideRootDirectory {
            path: canonical_path,
            root: canonical_root,
        });
    }

    Ok(canonical_path)
}

/// Validates a path that may not exist yet (a write or copy destination).
///
/// The nearest existing ancestor is validated like [`validate_path`]; the
/// components below it must be plain names. Returns the ancestor's canonical
/// form joined with those components.
pub fn validate_new_path(input_path: &str, config: &Config) -> Result<PathBuf, PathSecurityError> {
    let path = Path::new(input_path);
    if path.exists() || path.is_symlink() {
        return validate_path(input_path, config);
    }

    let mut missing = Vec::new();
    let mut ancestor = path;
    loop {
        match ancestor.parent() {
            Some(parent) => {
                if let Some(name) = ancestor.file_name() {
                    missing.push(name.to_os_string());
                } else {
                    return Err(PathSecurityError::ParentTraversal {
                        path: path.to_path_buf(),
                    });
                }
                ancestor = parent;
                let candidate = if ancestor.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    ancestor
                };
                if candidate.exists() {
                    ancestor = candidate;
                    break;
                }
            }
            None => {
                return Err(PathSecurityError::PathNotFound {
                    path: path.to_path_buf(),
                });
            }
        }
    }

    // `file_name` is None for a trailing `..`, so an escaped tail was caught above;
    // this guards `.` and other non-normal components.
    let tail: PathBuf = missing.into_iter().rev().collect();
    if tail.components().any(|c| !matches!(c, Component::Normal(_))) {
        return Err(PathSecurityError::ParentTraversal {
            path: path.to_path_buf(),
        });
    }

    let ancestor_str = ancestor.to_string_lossy();
    let base = validate_path(&ancestor_str, config)?;
    Ok(base.join(tail))
}

fn canonical_root(config: &Config) -> Result<Option<PathBuf>, PathSecurityError> {
    let Some(root) = &config.security.root_path else {
        return Ok(None);
    };
    root.canonicalize()
        .map(Some)
        .map_err(|e| PathSecurityError::IoError {
            path: root.clone(),
            error: e,
        })
}

fn canonicalize_path(path: &Path) -> Result<PathBuf, PathSecurityError> {
    path.canonicalize().map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            PathSecurityError::PathNotFound {
                path: path.to_path_buf(),
            }
        } else {
            PathSecurityError::CannotCanonicalize {
                path: path.to_path_buf(),
                error: e,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SecurityConfig;
    use std::fs;
    use tempfile::TempDir;

    fn config_with(root: Option<PathBuf>, allow_symlinks: bool) -> Config {
        let mut config = Config::default();
        config.security = SecurityConfig {
            root_path: root,
            allow_symlinks,
        };
        config
    }

    fn s(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[test]
    fn test_no_root_allows_existing_paths() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.txt");
        fs::write(&file, "x").unwrap();

        assert!(validate_path(s(&file), &config_with(None, true)).is_ok());
    }

    #[test]
    fn test_path_outside_root() {
        let root_dir = TempDir::new().unwrap();
        let outside_dir = TempDir::new().unwrap();
        let outside_file = outside_dir.path().join("outside.txt");
        fs::write(&outside_file, "x").unwrap();

        let config = config_with(Some(root_dir.path().to_path_buf()), true);
        assert!(matches!(
            validate_path(s(&outside_file), &config),
            Err(PathSecurityError::OutsideRootDirectory { .. })
        ));
    }

    #[test]
    fn test_dotdot_resolving_outside_root_blocked() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        fs::write(temp_dir.path().join("secret.txt"), "x").unwrap();

        let config = config_with(Some(subdir.clone()), true);
        let traversal = subdir.join("../secret.txt");
        assert!(matches!(
            validate_path(s(&traversal), &config),
            Err(PathSecurityError::OutsideRootDirectory { .. })
        ));
    }

    #[test]
    fn test_nonexistent_path() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_with(Some(temp_dir.path().to_path_buf()), true);
        let missing = temp_dir.path().join("nope.txt");
        assert!(matches!(
            validate_path(s(&missing), &config),
            Err(PathSecurityError::PathNotFound { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks() {
        use std::os::unix::fs::symlink;

        let root_dir = TempDir::new().unwrap();
        let outside_dir = TempDir::new().unwrap();
        let inside_target = root_dir.path().join("target.txt");
        let outside_target = outside_dir.path().join("target.txt");
        fs::write(&inside_target, "x").unwrap();
        fs::write(&outside_target, "x").unwrap();

        let inside_link = root_dir.path().join("inside.txt");
        let outside_link = root_dir.path().join("outside.txt");
        symlink(&inside_target, &inside_link).unwrap();
        symlink(&outside_target, &outside_link).unwrap();

        let allowed = config_with(Some(root_dir.path().to_path_buf()), true);
        assert!(validate_path(s(&inside_link), &allowed).is_ok());
        assert!(matches!(
            validate_path(s(&outside_link), &allowed),
            Err(PathSecurityError::SymlinkOutsideRoot { .. })
        ));

        let denied = config_with(Some(root_dir.path().to_path_buf()), false);
        assert!(matches!(
            validate_path(s(&inside_link), &denied),
            Err(PathSecurityError::SymlinkNotAllowed { .. })
        ));
    }

    #[test]
    fn test_new_path_inside_root() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_with(Some(temp_dir.path().to_path_buf()), true);

        let target = temp_dir.path().join("a/b/new.txt");
        let validated = validate_new_path(s(&target), &config).unwrap();
        assert!(validated.ends_with("a/b/new.txt"));
        assert!(validated.starts_with(temp_dir.path().canonicalize().unwrap()));
    }

    #[test]
    fn test_new_path_outside_root() {
        let root_dir = TempDir::new().unwrap();
        let outside_dir = TempDir::new().unwrap();
        let config = config_with(Some(root_dir.path().to_path_buf()), true);

        let target = outside_dir.path().join("new.txt");
        assert!(matches!(
            validate_new_path(s(&target), &config),
            Err(PathSecurityError::OutsideRootDirectory { .. })
        ));
    }

    #[test]
    fn test_new_path_rejects_dotdot_in_missing_tail() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_with(Some(temp_dir.path().to_path_buf()), true);

        let target = temp_dir.path().join("missing/../../escape.txt");
        assert!(matches!(
            validate_new_path(s(&target), &config),
            Err(PathSecurityError::ParentTraversal { .. })
        ));
    }

    #[test]
    fn test_new_path_existing_file_delegates() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("exists.txt");
        fs::write(&file, "x").unwrap();
        let config = config_with(Some(temp_dir.path().to_path_buf()), true);

        assert_eq!(
            validate_new_path(s(&file), &config).unwrap(),
            file.canonicalize().unwrap()
        );
    }
}
