//! Declaration file collection

use std::path::{Path, PathBuf};

const DECL_EXTENSION: &str = "toml";

/// Collect declaration files from the given paths (files or directories).
///
/// Files named explicitly are taken whatever their extension; directories are
/// searched recursively for `*.toml`. The result is sorted so output order
/// does not depend on directory iteration order.
pub fn collect_decl_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            collect_in_dir(path, &mut files)?;
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            anyhow::bail!("no such file or directory: {}", path.display());
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn collect_in_dir(dir: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            collect_in_dir(&path, files)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(DECL_EXTENSION) {
            files.push(path);
        }
    }
    Ok(())
}

/// `<root>/<package path>/<name>.<extension>`
pub fn class_path(root: &Path, package: &str, name: &str, extension: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in package.split('.').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path.push(format!("{}.{}", name, extension));
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_path() {
        let root = Path::new("out");
        assert_eq!(
            class_path(root, "chaquopy.test", "Adder", "class"),
            Path::new("out/chaquopy/test/Adder.class")
        );
        assert_eq!(class_path(root, "", "Top", "java"), Path::new("out/Top.java"));
    }
}
