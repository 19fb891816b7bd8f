//! Test environment builder for isolated CLI testing.
//!
//! Provides `TestEnv` - a temp project directory seeded with specification
//! and manifest files, plus helpers to run `tscfg-build` inside it.

use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::SystemTime;

use tempfile::TempDir;

/// Environment variables that would leak host settings into a run
const ISOLATED_VARS: &[&str] = &[
    "RUST_LOG",
    "TSCFG_PACKAGE",
    "TSCFG_CONFIG_INDENT",
    "TSCFG_GENERATE_CONFIG_FILE",
    "TSCFG_RECORDS",
    "TSCFG_GETTERS",
    "TSCFG_OPTIONALS",
    "TSCFG_DURATIONS",
];

/// Result of running a CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Parse every stdout line as a JSON object
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| {
                serde_json::from_str(l)
                    .unwrap_or_else(|e| panic!("stdout line is not JSON ({}): {}", e, l))
            })
            .collect()
    }
}

/// Isolated project directory
pub struct TestEnv {
    pub project_root: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    pub fn builder() -> TestEnvBuilder {
        TestEnvBuilder::new()
    }

    /// Get path relative to project root
    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    /// Run the CLI from the project root
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    /// Run the CLI from the project root with extra env vars
    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(self.project_root.path()).args(args);
        for var in ISOLATED_VARS {
            cmd.env_remove(var);
        }
        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute tscfg-build");
        output_to_result(output)
    }

    /// Read a project file's content
    pub fn read_file(&self, relative_path: &str) -> String {
        std::fs::read_to_string(self.project_path(relative_path))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative_path, e))
    }

    /// Write a file to the project directory
    pub fn write_project_file(&self, relative_path: &str, content: &str) {
        let full_path = self.project_path(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
    }

    pub fn modified(&self, relative_path: &str) -> SystemTime {
        std::fs::metadata(self.project_path(relative_path))
            .and_then(|m| m.modified())
            .unwrap_or_else(|e| panic!("Failed to stat {}: {}", relative_path, e))
    }
}

fn output_to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

/// Builder for TestEnv with fluent API
#[derive(Default)]
pub struct TestEnvBuilder {
    files: Vec<(String, String)>,
    manifest: Option<String>,
}

impl TestEnvBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a specification under `src/tscfg/<name>.spec.conf`
    pub fn with_spec(mut self, name: &str, content: &str) -> Self {
        self.files
            .push((format!("src/tscfg/{}.spec.conf", name), content.to_string()));
        self
    }

    /// Add an arbitrary project file
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.push((path.to_string(), content.to_string()));
        self
    }

    /// Write `tscfg.toml`
    pub fn with_manifest(mut self, content: &str) -> Self {
        self.manifest = Some(content.to_string());
        self
    }

    pub fn build(self) -> TestEnv {
        let env = TestEnv {
            project_root: TempDir::new().expect("Failed to create temp dir"),
            bin: PathBuf::from(env!("CARGO_BIN_EXE_tscfg-build")),
        };
        for (path, content) in &self.files {
            env.write_project_file(path, content);
        }
        if let Some(manifest) = &self.manifest {
            env.write_project_file("tscfg.toml", manifest);
        }
        env
    }
}
