//! Core data models for tscfg-build
//!
//! Defines the fundamental data structures used throughout the compiler:
//! - `Branch` / `Leaf` / `Node`: the object type tree parsed from a specification
//! - `ParsedSpec`: the tree plus its collected environment-variable bindings
//! - `SpecUnit`: one fully resolved configuration unit
//! - `GenerationOptions`: the per-run generation settings

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Unit used when a duration is represented as a raw number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Ns,
    Us,
    #[default]
    Ms,
    S,
    M,
    H,
    D,
}

impl DurationUnit {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ns" | "nanos" | "nanoseconds" => Some(DurationUnit::Ns),
            "us" | "micros" | "microseconds" => Some(DurationUnit::Us),
            "ms" | "millis" | "milliseconds" => Some(DurationUnit::Ms),
            "s" | "second" | "seconds" => Some(DurationUnit::S),
            "m" | "minute" | "minutes" => Some(DurationUnit::M),
            "h" | "hour" | "hours" => Some(DurationUnit::H),
            "d" | "day" | "days" => Some(DurationUnit::D),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DurationUnit::Ns => "ns",
            DurationUnit::Us => "us",
            DurationUnit::Ms => "ms",
            DurationUnit::S => "s",
            DurationUnit::M => "m",
            DurationUnit::H => "h",
            DurationUnit::D => "d",
        }
    }
}

/// Declared type of a leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LeafType {
    String,
    Integer,
    Long,
    Boolean,
    /// `unit` is only set by an explicit `duration:<unit>` hint
    Duration { unit: Option<DurationUnit> },
    List { element: Box<ListElement> },
    /// Untyped value (`any`)
    Any,
}

impl fmt::Display for LeafType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafType::String => write!(f, "string"),
            LeafType::Integer => write!(f, "int"),
            LeafType::Long => write!(f, "long"),
            LeafType::Boolean => write!(f, "boolean"),
            LeafType::Duration { unit: None } => write!(f, "duration"),
            LeafType::Duration { unit: Some(u) } => write!(f, "duration:{}", u.as_str()),
            LeafType::List { element } => write!(f, "[{}]", element),
            LeafType::Any => write!(f, "any"),
        }
    }
}

/// Element type of a list leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "of", rename_all = "lowercase")]
pub enum ListElement {
    Scalar(LeafType),
    Object(Branch),
}

impl fmt::Display for ListElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListElement::Scalar(ty) => write!(f, "{}", ty),
            ListElement::Object(_) => write!(f, "object"),
        }
    }
}

/// A scalar entry in the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leaf {
    pub ty: LeafType,
    /// Default literal, exactly as written in the specification
    pub default: Option<String>,
    /// A leaf with a default, or one marked with `?`, may be absent
    pub optional: bool,
    /// Environment variable overriding this leaf
    pub env_var: Option<String>,
}

impl Leaf {
    pub fn required(ty: LeafType) -> Self {
        Self {
            ty,
            default: None,
            optional: false,
            env_var: None,
        }
    }

    pub fn with_default(ty: LeafType, default: impl Into<String>) -> Self {
        Self {
            ty,
            default: Some(default.into()),
            optional: true,
            env_var: None,
        }
    }

    pub fn is_required(&self) -> bool {
        !self.optional
    }
}

/// A node of the object type tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum Node {
    Leaf(Leaf),
    Branch(Branch),
}

/// One keyed child of a branch, with its documentation comment lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub key: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub doc: Vec<String>,
    pub node: Node,
}

/// An ordered mapping of unique keys to child nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Branch {
    entries: Vec<Entry>,
}

impl Branch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.key == key)
    }

    /// Insert an entry keeping keys unique.
    ///
    /// Two branches under the same key merge recursively. Any other repeat
    /// replaces the earlier node in place, so the first position wins.
    pub fn insert(&mut self, entry: Entry) {
        let Some(existing) = self.get_mut(&entry.key) else {
            self.entries.push(entry);
            return;
        };
        if !entry.doc.is_empty() {
            existing.doc = entry.doc;
        }
        match (&mut existing.node, entry.node) {
            (Node::Branch(current), Node::Branch(incoming)) => {
                for child in incoming.entries {
                    current.insert(child);
                }
            }
            (slot, node) => *slot = node,
        }
    }

    /// Follow a dotted path to a leaf
    pub fn leaf(&self, path: &str) -> Option<&Leaf> {
        let mut branch = self;
        let mut parts = path.split('.').peekable();
        while let Some(part) = parts.next() {
            let entry = branch.get(part)?;
            match (&entry.node, parts.peek()) {
                (Node::Leaf(leaf), None) => return Some(leaf),
                (Node::Branch(next), Some(_)) => branch = next,
                _ => return None,
            }
        }
        None
    }
}

/// Association of a leaf with an overriding environment variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvBinding {
    /// Dotted key path of the leaf
    pub path: String,
    pub name: String,
}

/// Result of parsing one specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedSpec {
    pub root: Branch,
    pub env_bindings: Vec<EnvBinding>,
}

/// A configuration unit as declared, before defaults are applied
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnitDeclaration {
    pub name: String,
    pub spec: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub package: Option<String>,
    pub class_name: Option<String>,
}

impl UnitDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A fully resolved configuration unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecUnit {
    pub name: String,
    pub spec_path: PathBuf,
    pub config_path: PathBuf,
    pub package: String,
    pub class_name: String,
}

impl SpecUnit {
    /// File name of the specification, used in generated headers
    pub fn spec_file_name(&self) -> String {
        self.spec_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.spec_path.display().to_string())
    }
}

/// Shape of the generated class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassStyle {
    /// `public final` fields and an all-field constructor
    #[default]
    Fields,
    /// Private fields exposed through accessor methods
    Getters,
    /// Immutable Java record
    Record,
}

/// Settings fixed for a whole generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    pub generate_config_file: bool,
    pub config_indent: String,
    pub output_in_generated_sources: bool,
    pub generated_annotation: bool,
    pub class_style: ClassStyle,
    pub use_optionals: bool,
    pub use_durations: bool,
    pub generated_sources_dir: PathBuf,
    pub main_sources_dir: PathBuf,
}

impl GenerationOptions {
    pub const DEFAULT_GENERATED_SOURCES_DIR: &'static str = "build/generated/sources/tscfg/java";
    pub const DEFAULT_MAIN_SOURCES_DIR: &'static str = "src/main/java";

    /// Root directory the class file is placed under
    pub fn class_output_root(&self) -> &Path {
        if self.output_in_generated_sources {
            &self.generated_sources_dir
        } else {
            &self.main_sources_dir
        }
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            generate_config_file: true,
            config_indent: "  ".to_string(),
            output_in_generated_sources: true,
            generated_annotation: false,
            class_style: ClassStyle::Fields,
            use_optionals: false,
            use_durations: true,
            generated_sources_dir: PathBuf::from(Self::DEFAULT_GENERATED_SOURCES_DIR),
            main_sources_dir: PathBuf::from(Self::DEFAULT_MAIN_SOURCES_DIR),
        }
    }
}
