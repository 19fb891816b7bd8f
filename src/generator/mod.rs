//! Artifact generators
//!
//! Both generators are pure functions of the parsed tree and the run's
//! `GenerationOptions`: the same input always yields byte-identical text.

pub mod class;
pub mod config_text;
pub mod escaping;

pub use class::ClassGenerator;
pub use config_text::ConfigTextGenerator;

/// Tool name recorded in headers and the generated-marker annotation
pub const GENERATOR_NAME: &str = "tscfg-build";

/// Origin line shared by both artifacts
pub(crate) fn origin_note(origin: &str) -> String {
    format!("Generated by {} from {}. Do not edit.", GENERATOR_NAME, origin)
}
