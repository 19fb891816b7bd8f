//! Manifest type definitions

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{TscfgError, TscfgResult};
use crate::models::{ClassStyle, GenerationOptions, SpecUnit, UnitDeclaration};
use crate::naming::resolve_unit;

/// Unit generated when the manifest declares none
pub const DEFAULT_UNIT_NAME: &str = "application";

/// `tscfg.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Package for every unit without its own
    #[serde(default)]
    pub package: String,

    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub units: Vec<UnitConfig>,
}

/// `[options]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsConfig {
    #[serde(default = "default_true")]
    pub generate_config_file: bool,

    #[serde(default = "default_config_indent")]
    pub config_indent: String,

    #[serde(default = "default_true")]
    pub output_in_generated_sources: bool,

    #[serde(default)]
    pub generated_annotation: bool,

    #[serde(default)]
    pub getters: bool,

    #[serde(default)]
    pub records: bool,

    #[serde(default)]
    pub optionals: bool,

    #[serde(default = "default_true")]
    pub durations: bool,

    #[serde(default = "default_generated_sources_dir")]
    pub generated_sources_dir: PathBuf,

    #[serde(default = "default_main_sources_dir")]
    pub main_sources_dir: PathBuf,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            generate_config_file: true,
            config_indent: default_config_indent(),
            output_in_generated_sources: true,
            generated_annotation: false,
            getters: false,
            records: false,
            optionals: false,
            durations: true,
            generated_sources_dir: default_generated_sources_dir(),
            main_sources_dir: default_main_sources_dir(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_config_indent() -> String {
    "  ".to_string()
}

fn default_generated_sources_dir() -> PathBuf {
    PathBuf::from(GenerationOptions::DEFAULT_GENERATED_SOURCES_DIR)
}

fn default_main_sources_dir() -> PathBuf {
    PathBuf::from(GenerationOptions::DEFAULT_MAIN_SOURCES_DIR)
}

/// One `[[units]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,

    #[serde(rename = "class", default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl From<&UnitConfig> for UnitDeclaration {
    fn from(unit: &UnitConfig) -> Self {
        UnitDeclaration {
            name: unit.name.clone(),
            spec: unit.spec.clone(),
            config: unit.config.clone(),
            package: unit.package.clone(),
            class_name: unit.class_name.clone(),
        }
    }
}

impl Manifest {
    /// Settings for the whole run; `file` names the manifest in errors
    pub fn generation_options(&self, file: &Path) -> TscfgResult<GenerationOptions> {
        let opts = &self.options;
        let class_style = match (opts.getters, opts.records) {
            (true, true) => {
                return Err(TscfgError::manifest(
                    file,
                    "options.getters and options.records cannot both be enabled",
                ))
            }
            (true, false) => ClassStyle::Getters,
            (false, true) => ClassStyle::Record,
            (false, false) => ClassStyle::Fields,
        };

        if !opts.config_indent.chars().all(|c| c == ' ' || c == '\t') {
            return Err(TscfgError::manifest(
                file,
                format!(
                    "options.config_indent must be spaces or tabs, got {:?}",
                    opts.config_indent
                ),
            ));
        }

        Ok(GenerationOptions {
            generate_config_file: opts.generate_config_file,
            config_indent: opts.config_indent.clone(),
            output_in_generated_sources: opts.output_in_generated_sources,
            generated_annotation: opts.generated_annotation,
            class_style,
            use_optionals: opts.optionals,
            use_durations: opts.durations,
            generated_sources_dir: opts.generated_sources_dir.clone(),
            main_sources_dir: opts.main_sources_dir.clone(),
        })
    }

    /// Declared units in order, or the single default unit
    pub fn unit_declarations(&self) -> Vec<UnitDeclaration> {
        if self.units.is_empty() {
            vec![UnitDeclaration::new(DEFAULT_UNIT_NAME)]
        } else {
            self.units.iter().map(UnitDeclaration::from).collect()
        }
    }

    /// Apply naming conventions to every unit and check the result
    pub fn resolve_units(&self, file: &Path) -> TscfgResult<Vec<SpecUnit>> {
        let units: Vec<SpecUnit> = self
            .unit_declarations()
            .iter()
            .map(|decl| resolve_unit(decl, &self.package))
            .collect();

        let mut seen = HashSet::new();
        for unit in &units {
            if unit.name.trim().is_empty() {
                return Err(TscfgError::manifest(file, "unit name must not be empty"));
            }
            if !seen.insert(unit.name.as_str()) {
                return Err(TscfgError::manifest(
                    file,
                    format!("duplicate unit name '{}'", unit.name),
                ));
            }
            if unit.config_path == unit.spec_path {
                return Err(TscfgError::manifest(
                    file,
                    format!(
                        "unit '{}' would overwrite its specification {}",
                        unit.name,
                        unit.spec_path.display()
                    ),
                ));
            }
        }
        Ok(units)
    }
}
