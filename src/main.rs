//! tscfg-build CLI - configuration schema compiler
//!
//! Usage: tscfg-build <COMMAND>
//!
//! Commands:
//!   generate  Generate classes and configuration files for every unit
//!   check     Verify generated files are up to date (CI)
//!   parse     Parse one specification and print its model

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use tscfg_build::config::{self, Manifest};
use tscfg_build::models::{Branch, Leaf, LeafType, ListElement, Node};
use tscfg_build::orchestrator::{GenerationEvent, GenerationReport, Orchestrator};
use tscfg_build::{parse_file, LocalFs};

/// tscfg-build - typed configuration classes from HOCON specifications
#[derive(Parser, Debug)]
#[command(name = "tscfg-build")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Emit one JSON object per event on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Project root that unit paths are relative to
    #[arg(long, default_value = ".", global = true)]
    project_dir: PathBuf,

    /// Manifest file (default: tscfg.toml in the project directory)
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate classes and configuration files for every unit
    Generate {
        #[command(flatten)]
        flags: GenerationFlags,
    },

    /// Verify generated files are up to date (exits non-zero if not)
    Check {
        #[command(flatten)]
        flags: GenerationFlags,
    },

    /// Parse one specification and print its model (debugging)
    Parse {
        /// Specification file
        spec: PathBuf,
    },
}

/// Overrides applied on top of the manifest and environment
#[derive(Args, Debug, Default, Clone)]
struct GenerationFlags {
    /// Generate Java records
    #[arg(long, conflicts_with = "getters")]
    records: bool,

    /// Generate private fields with getters
    #[arg(long)]
    getters: bool,

    /// Skip the configuration file
    #[arg(long)]
    no_config_file: bool,

    /// Indentation used in the configuration file
    #[arg(long, value_name = "STR")]
    indent: Option<String>,
}

impl GenerationFlags {
    fn apply(&self, manifest: &mut Manifest) {
        let options = &mut manifest.options;
        if self.records {
            options.records = true;
            options.getters = false;
        }
        if self.getters {
            options.getters = true;
            options.records = false;
        }
        if self.no_config_file {
            options.generate_config_file = false;
        }
        if let Some(indent) = &self.indent {
            options.config_indent = indent.clone();
        }
    }
}

fn log_filter(verbose: u8) -> String {
    match verbose {
        0 => "warn".to_string(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn init_tracing(verbose: u8) {
    let base_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| log_filter(verbose));
    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(verbose >= 3)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Generate { flags } => cmd_generate(&cli, flags),
        Commands::Check { flags } => cmd_check(&cli, flags),
        Commands::Parse { spec } => cmd_parse(&cli, spec),
    }
}

fn run(cli: &Cli, flags: &GenerationFlags, dry_run: bool) -> Result<GenerationReport> {
    let (mut manifest, manifest_path, warnings) =
        config::load_for_project(&cli.project_dir, cli.manifest.as_deref())?;
    for warning in &warnings {
        eprintln!("warning: {}", warning);
    }
    flags.apply(&mut manifest);

    let options = manifest.generation_options(&manifest_path)?;
    let units = manifest.resolve_units(&manifest_path)?;
    debug!(units = units.len(), dry_run, "resolved manifest");

    let fs = LocalFs::new();
    let report = Orchestrator::new(&fs, &options)
        .with_project_dir(&cli.project_dir)
        .dry_run(dry_run)
        .run(&units, |event| print_event(event, cli.json))?;
    Ok(report)
}

fn cmd_generate(cli: &Cli, flags: &GenerationFlags) -> Result<()> {
    let report = run(cli, flags, false)?;

    if cli.json {
        let summary = serde_json::json!({
            "event": "complete",
            "written": report.written(),
            "unchanged": report.unchanged(),
        });
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!(
            "Done: {} written, {} unchanged",
            report.written(),
            report.unchanged()
        );
    }
    Ok(())
}

fn cmd_check(cli: &Cli, flags: &GenerationFlags) -> Result<()> {
    let report = run(cli, flags, true)?;

    if cli.json {
        let stale: Vec<String> = report
            .stale_files()
            .map(|f| f.path.display().to_string())
            .collect();
        let summary = serde_json::json!({
            "event": "check",
            "up_to_date": report.is_up_to_date(),
            "stale": stale,
        });
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        for file in report.stale_files() {
            if let Some(diff) = &file.diff {
                print!("{}", diff);
            }
        }
        if report.is_up_to_date() {
            println!("All {} generated files are up to date", report.files.len());
        } else {
            println!(
                "{} of {} generated files are out of date; run `tscfg-build generate`",
                report.stale(),
                report.files.len()
            );
        }
    }

    if !report.is_up_to_date() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_parse(cli: &Cli, spec: &Path) -> Result<()> {
    let path = cli.project_dir.join(spec);
    let parsed = parse_file(&path).with_context(|| format!("parsing {}", path.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
        return Ok(());
    }

    let mut out = String::new();
    render_tree(&mut out, &parsed.root, 0);
    print!("{}", out);
    if !parsed.env_bindings.is_empty() {
        println!("\nEnvironment bindings:");
        for binding in &parsed.env_bindings {
            println!("  {} <- {}", binding.path, binding.name);
        }
    }
    Ok(())
}

fn print_event(event: &GenerationEvent, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!(error = %e, "failed to serialize event"),
        }
        return;
    }

    match event {
        GenerationEvent::UnitStarted { unit, spec } => {
            println!("{} ({})", unit, spec.display());
        }
        GenerationEvent::FileWritten { path, .. } => println!("  wrote      {}", path.display()),
        GenerationEvent::FileUnchanged { path, .. } => {
            println!("  unchanged  {}", path.display())
        }
        GenerationEvent::FileStale { path, .. } => println!("  stale      {}", path.display()),
        GenerationEvent::UnitFinished { .. } => {}
    }
}

fn render_tree(out: &mut String, branch: &Branch, depth: usize) {
    let pad = "  ".repeat(depth);
    for entry in branch.entries() {
        match &entry.node {
            Node::Branch(child) => {
                out.push_str(&format!("{}{} {{\n", pad, entry.key));
                render_tree(out, child, depth + 1);
                out.push_str(&format!("{}}}\n", pad));
            }
            Node::Leaf(leaf) => {
                out.push_str(&format!("{}{}: {}\n", pad, entry.key, describe_leaf(leaf)));
                if let Some(object) = list_object(leaf) {
                    render_tree(out, object, depth + 1);
                }
            }
        }
    }
}

/// Innermost object element of a (possibly nested) list leaf
fn list_object(leaf: &Leaf) -> Option<&Branch> {
    let mut ty = &leaf.ty;
    while let LeafType::List { element } = ty {
        match element.as_ref() {
            ListElement::Object(object) => return Some(object),
            ListElement::Scalar(inner) => ty = inner,
        }
    }
    None
}

fn describe_leaf(leaf: &Leaf) -> String {
    let mut text = leaf.ty.to_string();
    if let Some(default) = &leaf.default {
        text.push_str(&format!(" = {}", default));
    } else if leaf.optional {
        text.push_str(" (optional)");
    }
    if let Some(var) = &leaf.env_var {
        text.push_str(&format!(" [env {}]", var));
    }
    text
}
