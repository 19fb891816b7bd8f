//! Naming conventions
//!
//! Derives the default configuration path, class name and package directory
//! for a unit. Explicit values always win over derived ones.

use std::path::{Path, PathBuf};

use crate::models::{SpecUnit, UnitDeclaration};

/// Suffix appended to every derived class name
pub const CLASS_SUFFIX: &str = "Config";

/// Directory searched for a unit's specification when none is given
pub const DEFAULT_SPEC_DIR: &str = "src/tscfg";

const SPEC_SUFFIXES: [&str; 2] = [".spec.conf", ".template.conf"];

/// Default specification path for a unit name: `src/tscfg/<name>.spec.conf`
pub fn default_spec_path(unit_name: &str) -> PathBuf {
    Path::new(DEFAULT_SPEC_DIR).join(format!("{}.spec.conf", unit_name))
}

/// Default output configuration path for a specification.
///
/// `app.spec.conf` and `app.template.conf` become `app.conf`. Other names
/// keep their stem and get a `.conf` extension.
pub fn default_config_path(spec_path: &Path) -> PathBuf {
    let Some(file_name) = spec_path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return spec_path.with_extension("conf");
    };

    for suffix in SPEC_SUFFIXES {
        if let Some(stem) = file_name.strip_suffix(suffix) {
            return spec_path.with_file_name(format!("{}.conf", stem));
        }
    }

    if file_name.ends_with(".conf") {
        spec_path.to_path_buf()
    } else {
        spec_path.with_extension("conf")
    }
}

/// Default class name for a specification.
///
/// Takes the last path segment up to its first `.`, replaces a leading run
/// of digits with `_`, drops anything outside `[A-Za-z0-9_]`, upper-cases
/// the first character and appends `Config`.
pub fn default_class_name(spec_path: &str) -> String {
    let segment = spec_path.rsplit(['/', '\\']).next().unwrap_or(spec_path);
    let stem = segment.split('.').next().unwrap_or(segment);

    let digits = stem.chars().take_while(|c| c.is_ascii_digit()).count();
    let mut name = String::with_capacity(stem.len() + CLASS_SUFFIX.len());
    if digits > 0 {
        name.push('_');
    }
    name.extend(
        stem.chars()
            .skip(digits)
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_'),
    );

    let mut chars = name.chars();
    let mut class_name = match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    };
    class_name.push_str(CLASS_SUFFIX);
    class_name
}

/// Directory for a package, relative to a source root; empty package is the root
pub fn package_path(package: &str) -> PathBuf {
    package
        .split('.')
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Explicit value if present, otherwise the derived default
pub fn resolve<T>(explicit: Option<T>, derived: impl FnOnce() -> T) -> T {
    explicit.unwrap_or_else(derived)
}

/// Apply the naming conventions to a declared unit.
///
/// The class name derives from the specification path even when an explicit
/// config path is given.
pub fn resolve_unit(decl: &UnitDeclaration, global_package: &str) -> SpecUnit {
    let spec_path = resolve(decl.spec.clone(), || default_spec_path(&decl.name));
    let config_path = resolve(decl.config.clone(), || default_config_path(&spec_path));
    let package = resolve(decl.package.clone(), || global_package.to_string());
    let class_name = resolve(decl.class_name.clone(), || {
        default_class_name(&spec_path.to_string_lossy())
    });

    SpecUnit {
        name: decl.name.clone(),
        spec_path,
        config_path,
        package,
        class_name,
    }
}

/// Relative path of the generated class file under its source root
pub fn class_file_path(unit: &SpecUnit) -> PathBuf {
    package_path(&unit.package).join(format!("{}.java", unit.class_name))
}
