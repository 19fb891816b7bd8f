//! Common test utilities for tscfg-build CLI tests.
//!
//! This module provides:
//! - `TestEnv`: Isolated project directory plus helpers to run the binary
//! - Assertion macros: `assert_generated!`, `assert_output_contains!`, etc.
//! - Fixtures: Reusable specification and manifest constants

#![allow(dead_code)]

pub mod assertions;
pub mod env;
pub mod fixtures;

pub use assertions::*;
pub use env::*;
pub use fixtures::*;
