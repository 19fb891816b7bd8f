//! tscfg-build - configuration schema compiler
//!
//! Reads a HOCON-like specification whose values are type hints
//! (`"string | default"`, `"int?"`, `"duration:s | 30"`) and emits two
//! artifacts per unit: a resolved configuration file with environment
//! variable overrides, and a typed Java class mirroring the schema.

pub mod config;
pub mod error;
pub mod fs;
pub mod generator;
pub mod models;
pub mod naming;
pub mod orchestrator;
pub mod parser;
pub mod writer;

// Re-exports for convenience
pub use config::Manifest;
pub use error::{GenerationError, SchemaError, SchemaErrorKind, TscfgError, TscfgResult};
pub use fs::{FileSystem, LocalFs};
pub use generator::{ClassGenerator, ConfigTextGenerator};
pub use models::{
    Branch, ClassStyle, GenerationOptions, Leaf, LeafType, ParsedSpec, SpecUnit, UnitDeclaration,
};
pub use orchestrator::{GenerationEvent, GenerationReport, Orchestrator};
pub use parser::{parse_file, parse_spec};
pub use writer::{IdempotentWriter, WriteOutcome};
