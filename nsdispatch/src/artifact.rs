//! Backup artifact persistence.
//!
//! Each fetch produces two plain-text artifacts: the CLI-derived config at
//! `<path>-cli<ext>` and the API-derived config at the caller-supplied
//! path. Naming is deterministic so repeated fetches overwrite in place.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Derive the CLI artifact path by inserting `-cli` before the extension.
///
/// `configs/ns1.txt` becomes `configs/ns1-cli.txt`; an extensionless path
/// gets a bare `-cli` suffix.
pub fn cli_artifact_path(backup_path: &Path) -> PathBuf {
    let stem = backup_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_name = match backup_path.extension() {
        Some(ext) => format!("{stem}-cli.{}", ext.to_string_lossy()),
        None => format!("{stem}-cli"),
    };

    backup_path.with_file_name(file_name)
}

/// Write a processed configuration to its artifact path, creating parent
/// directories as needed.
pub fn write(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_path_with_extension() {
        let path = cli_artifact_path(Path::new("configs/ns1.txt"));
        assert_eq!(path, PathBuf::from("configs/ns1-cli.txt"));
    }

    #[test]
    fn test_cli_path_without_extension() {
        let path = cli_artifact_path(Path::new("backups/ns1"));
        assert_eq!(path, PathBuf::from("backups/ns1-cli"));
    }

    #[test]
    fn test_cli_path_bare_filename() {
        let path = cli_artifact_path(Path::new("ns1.cfg"));
        assert_eq!(path, PathBuf::from("ns1-cli.cfg"));
    }

    #[test]
    fn test_write_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deep/ns1.txt");
        write(&path, "save ns config").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "save ns config");
    }
}
