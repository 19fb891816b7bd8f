//! Generation orchestrator
//!
//! Runs every unit in declared order: read the specification, parse it,
//! render both artifacts, then hand them to the idempotent writer. All text
//! for a unit exists before the first write, so a unit that fails to parse
//! or generate leaves nothing new behind for itself.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{TscfgError, TscfgResult};
use crate::fs::FileSystem;
use crate::generator::{ClassGenerator, ConfigTextGenerator};
use crate::models::{GenerationOptions, SpecUnit};
use crate::naming::class_file_path;
use crate::parser::parse_spec;
use crate::writer::{ContentHash, IdempotentWriter, WriteOutcome};

/// Which artifact a file is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Class,
    Config,
}

/// Progress notifications, in the order things happen
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GenerationEvent {
    UnitStarted {
        unit: String,
        spec: PathBuf,
    },
    FileWritten {
        unit: String,
        kind: ArtifactKind,
        path: PathBuf,
        hash: ContentHash,
    },
    FileUnchanged {
        unit: String,
        kind: ArtifactKind,
        path: PathBuf,
        hash: ContentHash,
    },
    /// Dry run only: the file on disk differs from what would be generated
    FileStale {
        unit: String,
        kind: ArtifactKind,
        path: PathBuf,
        hash: ContentHash,
    },
    UnitFinished {
        unit: String,
        written: usize,
        unchanged: usize,
        stale: usize,
    },
}

/// One output file of a run
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub unit: String,
    pub kind: ArtifactKind,
    /// Path as declared, relative to the project directory unless absolute
    pub path: PathBuf,
    pub outcome: WriteOutcome,
    pub hash: ContentHash,
    /// Unified diff against the file on disk, set for stale files in a dry run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

/// Summary of a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub files: Vec<FileReport>,
}

impl GenerationReport {
    fn count(&self, outcome: WriteOutcome) -> usize {
        self.files.iter().filter(|f| f.outcome == outcome).count()
    }

    pub fn written(&self) -> usize {
        self.count(WriteOutcome::Written)
    }

    pub fn unchanged(&self) -> usize {
        self.count(WriteOutcome::Unchanged)
    }

    pub fn stale(&self) -> usize {
        self.count(WriteOutcome::WouldWrite)
    }

    /// True when no file was (or would be) changed
    pub fn is_up_to_date(&self) -> bool {
        self.files.iter().all(|f| !f.outcome.changed())
    }

    pub fn stale_files(&self) -> impl Iterator<Item = &FileReport> {
        self.files
            .iter()
            .filter(|f| f.outcome == WriteOutcome::WouldWrite)
    }
}

/// Drives generation for a list of resolved units
pub struct Orchestrator<'a, F: FileSystem> {
    fs: &'a F,
    options: &'a GenerationOptions,
    project_dir: PathBuf,
    dry_run: bool,
}

impl<'a, F: FileSystem> Orchestrator<'a, F> {
    pub fn new(fs: &'a F, options: &'a GenerationOptions) -> Self {
        Self {
            fs,
            options,
            project_dir: PathBuf::new(),
            dry_run: false,
        }
    }

    /// Directory relative unit paths are resolved against
    pub fn with_project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = dir.into();
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Generate every unit in order, stopping at the first failure
    pub fn run(
        &self,
        units: &[SpecUnit],
        mut on_event: impl FnMut(&GenerationEvent),
    ) -> TscfgResult<GenerationReport> {
        let writer = IdempotentWriter::new(self.fs).dry_run(self.dry_run);
        let mut report = GenerationReport::default();

        for unit in units {
            self.run_unit(unit, &writer, &mut report, &mut on_event)
                .map_err(|source| TscfgError::Unit {
                    unit: unit.name.clone(),
                    spec: unit.spec_path.clone(),
                    source: Box::new(source),
                })?;
        }

        info!(
            units = units.len(),
            written = report.written(),
            unchanged = report.unchanged(),
            stale = report.stale(),
            "generation finished"
        );
        Ok(report)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.project_dir.join(path)
    }

    /// Both artifacts for one unit, rendered but not yet written
    fn render(&self, unit: &SpecUnit) -> TscfgResult<Vec<(ArtifactKind, PathBuf, String)>> {
        let source = self.fs.read(&self.resolve(&unit.spec_path))?;
        let spec = parse_spec(&source, &unit.spec_path)?;
        debug!(
            unit = %unit.name,
            entries = spec.root.len(),
            env_bindings = spec.env_bindings.len(),
            "parsed specification"
        );

        let class_path = self.options.class_output_root().join(class_file_path(unit));
        let class_text = ClassGenerator::new(self.options).generate(&spec.root, unit)?;
        let mut outputs = vec![(ArtifactKind::Class, class_path, class_text)];

        if self.options.generate_config_file {
            let config_text =
                ConfigTextGenerator::new(self.options).generate(&spec.root, &unit.spec_file_name());
            outputs.push((ArtifactKind::Config, unit.config_path.clone(), config_text));
        }
        Ok(outputs)
    }

    fn run_unit(
        &self,
        unit: &SpecUnit,
        writer: &IdempotentWriter<'_, F>,
        report: &mut GenerationReport,
        on_event: &mut impl FnMut(&GenerationEvent),
    ) -> TscfgResult<()> {
        info!(unit = %unit.name, spec = %unit.spec_path.display(), "generating unit");
        on_event(&GenerationEvent::UnitStarted {
            unit: unit.name.clone(),
            spec: unit.spec_path.clone(),
        });

        let outputs = self.render(unit)?;

        let (mut written, mut unchanged, mut stale) = (0, 0, 0);
        for (kind, path, text) in outputs {
            let target = self.resolve(&path);
            let outcome = writer.write(&target, &text)?;
            let hash = ContentHash::from_content(&text);

            let mut diff = None;
            let (unit_name, event_path, event_hash) = (unit.name.clone(), path.clone(), hash.clone());
            let event = match outcome {
                WriteOutcome::Written => {
                    written += 1;
                    GenerationEvent::FileWritten {
                        unit: unit_name,
                        kind,
                        path: event_path,
                        hash: event_hash,
                    }
                }
                WriteOutcome::Unchanged => {
                    unchanged += 1;
                    GenerationEvent::FileUnchanged {
                        unit: unit_name,
                        kind,
                        path: event_path,
                        hash: event_hash,
                    }
                }
                WriteOutcome::WouldWrite => {
                    stale += 1;
                    let previous = writer.current(&target)?.unwrap_or_default();
                    diff = Some(unified_diff(&path, &previous, &text));
                    GenerationEvent::FileStale {
                        unit: unit_name,
                        kind,
                        path: event_path,
                        hash: event_hash,
                    }
                }
            };
            on_event(&event);

            report.files.push(FileReport {
                unit: unit.name.clone(),
                kind,
                path,
                outcome,
                hash,
                diff,
            });
        }

        on_event(&GenerationEvent::UnitFinished {
            unit: unit.name.clone(),
            written,
            unchanged,
            stale,
        });
        Ok(())
    }
}

fn unified_diff(path: &Path, old: &str, new: &str) -> String {
    use similar::TextDiff;
    TextDiff::from_lines(old, new)
        .unified_diff()
        .header(
            &format!("a/{}", path.display()),
            &format!("b/{}", path.display()),
        )
        .to_string()
}
