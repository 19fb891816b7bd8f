//! Assertions over a project after `tscfg-build` ran in it.
//!
//! Failures print the project tree, since a misplaced class file is usually
//! a package or output-root mix-up.

use std::path::Path;

/// Every file under `dir`, sorted, relative to `dir`
pub fn project_tree(dir: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(root, &path, out);
            } else if let Ok(relative) = path.strip_prefix(root) {
                out.push(relative.display().to_string());
            }
        }
    }

    let mut files = Vec::new();
    walk(dir, dir, &mut files);
    files.sort();
    files
}

/// The artifact at `$path` (relative to the project) exists and is not empty
#[macro_export]
macro_rules! assert_generated {
    ($env:expr, $path:expr) => {
        let artifact = $env.project_path($path);
        let size = std::fs::metadata(&artifact).map(|m| m.len()).ok();
        assert!(
            matches!(size, Some(n) if n > 0),
            "no generated artifact at {}\nproject tree:\n  {}",
            $path,
            $crate::common::project_tree($env.project_root.path()).join("\n  ")
        );
    };
}

/// Nothing was written at `$path`
#[macro_export]
macro_rules! assert_not_generated {
    ($env:expr, $path:expr) => {
        assert!(
            !$env.project_path($path).exists(),
            "unexpected artifact at {}\nproject tree:\n  {}",
            $path,
            $crate::common::project_tree($env.project_root.path()).join("\n  ")
        );
    };
}

/// Either output stream mentions `$needle`
#[macro_export]
macro_rules! assert_output_contains {
    ($result:expr, $needle:expr) => {
        assert!(
            $result.stdout.contains($needle) || $result.stderr.contains($needle),
            "neither stdout nor stderr mentions {:?}\n{}",
            $needle,
            $result.combined_output()
        );
    };
}
