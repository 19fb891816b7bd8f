//! Manifest loading and environment overrides

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{TscfgError, TscfgResult};

use super::types::Manifest;

/// Manifest file name looked up in the project directory
pub const MANIFEST_FILE: &str = "tscfg.toml";

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "TSCFG_";

/// Non-fatal manifest warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Load a manifest and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> TscfgResult<(Manifest, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path).map_err(|e| TscfgError::io(path, e))?;
    parse_with_warnings(&content, path)
}

/// Parse manifest text; `path` is only used for messages
pub fn parse_with_warnings(
    content: &str,
    path: &Path,
) -> TscfgResult<(Manifest, Vec<ConfigWarning>)> {
    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(content);

    let manifest: Manifest = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| TscfgError::manifest(path, e.to_string().trim_end()))?;

    let warnings = unknown_paths
        .into_iter()
        .map(|key_path| {
            let key = key_path
                .rsplit('.')
                .next()
                .unwrap_or(key_path.as_str())
                .to_string();
            ConfigWarning {
                line: find_line_number(content, &key),
                suggestion: suggest_key(&key),
                file: path.to_path_buf(),
                key,
            }
        })
        .collect();

    Ok((manifest, warnings))
}

/// Manifest for a project.
///
/// An explicit path must exist. Otherwise `tscfg.toml` in the project
/// directory is used when present, and built-in defaults when not. Returns
/// the manifest path used in messages alongside the manifest.
pub fn load_for_project(
    project_dir: &Path,
    explicit: Option<&Path>,
) -> TscfgResult<(Manifest, PathBuf, Vec<ConfigWarning>)> {
    let path = match explicit {
        Some(path) => project_dir.join(path),
        None => project_dir.join(MANIFEST_FILE),
    };

    if explicit.is_none() && !path.exists() {
        debug!(path = %path.display(), "no manifest, using defaults");
        return Ok((with_env_overrides(Manifest::default()), path, Vec::new()));
    }

    let (manifest, warnings) = load_with_warnings(&path)?;
    Ok((with_env_overrides(manifest), path, warnings))
}

/// Apply environment variable overrides (TSCFG_* prefix)
pub fn with_env_overrides(manifest: Manifest) -> Manifest {
    apply_env_overrides(manifest, |name| std::env::var(name).ok())
}

/// Apply overrides read through `lookup`, which receives full variable names
pub fn apply_env_overrides(
    mut manifest: Manifest,
    lookup: impl Fn(&str) -> Option<String>,
) -> Manifest {
    let var = |suffix: &str| lookup(&format!("{}{}", ENV_PREFIX, suffix));

    if let Some(package) = var("PACKAGE") {
        manifest.package = package.trim().to_string();
    }
    if let Some(indent) = var("CONFIG_INDENT") {
        manifest.options.config_indent = indent;
    }

    let flags: [(&str, &mut bool); 5] = [
        ("GENERATE_CONFIG_FILE", &mut manifest.options.generate_config_file),
        ("RECORDS", &mut manifest.options.records),
        ("GETTERS", &mut manifest.options.getters),
        ("OPTIONALS", &mut manifest.options.optionals),
        ("DURATIONS", &mut manifest.options.durations),
    ];
    for (suffix, slot) in flags {
        let Some(raw) = var(suffix) else { continue };
        match parse_bool(&raw) {
            Some(value) => *slot = value,
            None => warn!(
                variable = %format!("{}{}", ENV_PREFIX, suffix),
                value = %raw,
                "ignoring non-boolean environment override"
            ),
        }
    }

    manifest
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.trim_start().starts_with(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "package",
        "options",
        "units",
        "generate_config_file",
        "config_indent",
        "output_in_generated_sources",
        "generated_annotation",
        "getters",
        "records",
        "optionals",
        "durations",
        "generated_sources_dir",
        "main_sources_dir",
        "name",
        "spec",
        "config",
        "class",
    ];

    CANDIDATES
        .iter()
        .map(|candidate| (*candidate, edit_distance(unknown, candidate)))
        .filter(|(_, dist)| *dist <= 2)
        .min_by_key(|(_, dist)| *dist)
        .map(|(candidate, _)| candidate.to_string())
}

/// Levenshtein distance over chars
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ac) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, bc) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = (above + 1)
                .min(row[j] + 1)
                .min(diagonal + usize::from(ac != *bc));
            diagonal = above;
        }
    }
    row[b.len()]
}
