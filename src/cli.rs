//! CLI: infer → schema, check documents against a schema, schema algebra.
use std::io::Read;
use std::path::{Path, PathBuf};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde_json::Value;

use variant_algebra::discriminant::{Discriminant, DEFAULT_DISCRIMINANT};
use variant_algebra::emit::emit_json_schema;
use variant_algebra::error::ValueError;
use variant_algebra::inference::Inference;
use variant_algebra::path_de::load_schema;
use variant_algebra::value::EnumValue;
use variant_algebra::{algebra, jq_exec};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// infer, check and combine tagged-union schemas over JSON/NDJSON documents
#[derive(Parser, Debug)]
#[command(version)]
pub struct CommandLineInterface {
    /// field holding the variant name
    #[arg(long, global = true, default_value = DEFAULT_DISCRIMINANT)]
    discriminant: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// infer a variant schema from sample documents
    Infer(InferOut),
    /// validate documents against a variant schema
    Check(CheckArgs),
    /// keys / pick / omit / merge / extend on schema files
    #[command(subcommand)]
    Schema(SchemaCommand),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is one document
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct InferOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// emit JSON Schema instead of the variant schema
    #[arg(long)]
    json_schema: bool,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct CheckArgs {
    #[command(flatten)]
    input_settings: InputSettings,

    /// variant schema file
    #[arg(long)]
    schema: PathBuf,
}

#[derive(Subcommand, Debug)]
enum SchemaCommand {
    /// print the variant names, one per line
    Keys { schema: PathBuf },
    /// keep only the named variants
    Pick {
        schema: PathBuf,
        #[arg(required = true)]
        names: Vec<String>,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// drop the named variants
    Omit {
        schema: PathBuf,
        #[arg(required = true)]
        names: Vec<String>,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// union of all schemas, same-named variants have their fields joined
    Merge {
        #[arg(required = true, num_args = 2..)]
        schemas: Vec<PathBuf>,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// add the variants of `with` to `schema`
    Extend {
        schema: PathBuf,
        with: PathBuf,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// render a schema file as JSON Schema
    JsonSchema {
        schema: PathBuf,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Feeds every selected document to `apply`, labelled with where it came from.
    fn load_process(&self, mut apply: impl FnMut(String, Value) -> Result<()>) -> Result<()> {
        let source_paths = resolve_inputs(self.input.as_slice())
            .context("failed to resolve input file paths")?;
        for source_path in source_paths {
            let label = source_path.to_string_lossy().to_string();
            let source = read_source(&source_path)
                .with_context(|| format!("failed to read source file {label}"))?;
            if self.ndjson {
                for (ix, line) in source.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let json_value = serde_json::from_str::<Value>(line)
                        .with_context(|| format!("failed to parse NDJSON line ({label}:{})", ix + 1))?;
                    self.select(format!("{label}:{}", ix + 1), json_value, &mut apply)?;
                }
            } else {
                let json_value = serde_json::from_str::<Value>(&source)
                    .with_context(|| format!("failed to parse JSON source file ({label})"))?;
                self.select(label, json_value, &mut apply)?;
            }
        }
        Ok(())
    }

    fn select(
        &self,
        label: String,
        json_value: Value,
        apply: &mut impl FnMut(String, Value) -> Result<()>,
    ) -> Result<()> {
        let json_value = match self.json_pointer.as_deref() {
            None => json_value,
            Some(ptr) => json_value
                .pointer(ptr)
                .cloned()
                .ok_or_else(|| anyhow!("JSON pointer {ptr} selects nothing in ({label})"))?,
        };
        match self.jq_expr.as_deref() {
            None => apply(label, json_value),
            Some(jq_expr) => {
                let outputs = jq_exec::run_jaq(jq_expr, &json_value)
                    .with_context(|| format!("failed to apply jq expression to ({label})"))?;
                for (ix, json_value) in outputs.into_iter().enumerate() {
                    apply(format!("{label}#{ix}"), json_value)?;
                }
                Ok(())
            }
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    fn discriminant(&self) -> Discriminant {
        Discriminant::new(self.discriminant.as_str())
    }

    pub fn run(&self) -> Result<()> {
        let discriminant = self.discriminant();
        match &self.cmd {
            Command::Infer(target) => {
                let mut inf = Inference::new(discriminant.clone());
                target.input_settings.load_process(|label, value| {
                    if let Err(err) = inf.observe_value(&value) {
                        tracing::warn!(%label, %err, "skipping document");
                    }
                    Ok(())
                })?;
                let schema = inf.solve();
                tracing::info!(
                    documents = inf.evidence().observations(),
                    rejected = inf.rejected(),
                    variants = schema.len(),
                    "inferred schema"
                );
                let rendered = if target.json_schema {
                    emit_json_schema(&schema, &discriminant)
                } else {
                    serde_json::to_value(&schema)?
                };
                write_output(target.out.as_deref(), &rendered)
            }
            Command::Check(target) => check(target, &discriminant),
            Command::Schema(cmd) => run_schema_command(cmd, &discriminant),
        }
    }
}

fn check(target: &CheckArgs, discriminant: &Discriminant) -> Result<()> {
    let schema = load_schema(&target.schema)?;
    schema.validate(discriminant)?;

    let mut documents = Vec::new();
    target.input_settings.load_process(|label, value| {
        documents.push((label, value));
        Ok(())
    })?;
    let total = documents.len();

    let verdicts: Vec<(String, Result<String, ValueError>)> = documents
        .into_par_iter()
        .map(|(label, value)| {
            let verdict = EnumValue::from_json(value, discriminant).and_then(|v| {
                v.conforms(&schema, discriminant)?;
                Ok(v.variant(discriminant).map(str::to_string).unwrap_or_default())
            });
            (label, verdict)
        })
        .collect();

    let mut counts: IndexMap<&str, usize> = schema.names().map(|name| (name, 0)).collect();
    let mut failures = Vec::new();
    for (label, verdict) in &verdicts {
        match verdict {
            Ok(variant) => {
                if let Some(n) = counts.get_mut(variant.as_str()) {
                    *n += 1;
                }
            }
            Err(err) => failures.push((label, err)),
        }
    }
    for (name, n) in &counts {
        let n = n.to_string();
        let n = if n == "0" { n.dimmed() } else { n.green() };
        println!("{n:>8}  {name}");
    }
    for (label, err) in &failures {
        eprintln!("{} {label}: {err}", "✗".red().bold());
    }
    if !failures.is_empty() {
        bail!("{} of {total} documents do not conform to {}", failures.len(), target.schema.display());
    }
    tracing::info!(documents = total, "all documents conform");
    Ok(())
}

fn run_schema_command(cmd: &SchemaCommand, discriminant: &Discriminant) -> Result<()> {
    let (schema, out) = match cmd {
        SchemaCommand::Keys { schema } => {
            for name in load_schema(schema)?.keys() {
                println!("{name}");
            }
            return Ok(());
        }
        SchemaCommand::Pick { schema, names, out } => (load_schema(schema)?.pick(names)?, out),
        SchemaCommand::Omit { schema, names, out } => (load_schema(schema)?.omit(names)?, out),
        SchemaCommand::Merge { schemas, out } => {
            let loaded = schemas.iter().map(|p| load_schema(p)).collect::<Result<Vec<_>>>()?;
            (algebra::merge(&loaded)?, out)
        }
        SchemaCommand::Extend { schema, with, out } => {
            (load_schema(schema)?.extend(&load_schema(with)?)?, out)
        }
        SchemaCommand::JsonSchema { schema, out } => {
            let schema = load_schema(schema)?;
            schema.validate(discriminant)?;
            return write_output(out.as_deref(), &emit_json_schema(&schema, discriminant));
        }
    };
    schema.validate(discriminant)?;
    write_output(out.as_deref(), &serde_json::to_value(&schema)?)
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn read_source(path: &Path) -> std::io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path)
}

fn write_output(out: Option<&Path>, value: &Value) -> Result<()> {
    let src = serde_json::to_string_pretty(value)?;
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, &src).with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            println!("{src}");
            Ok(())
        }
    }
}

/// Literal paths (and `-`) pass through; glob patterns expand and must match
/// at least one file.
fn resolve_inputs<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for input in inputs {
        let input = input.as_ref();
        if !is_glob(input) {
            out.push(PathBuf::from(input));
            continue;
        }
        let matched = glob::glob(input)
            .with_context(|| format!("invalid glob pattern {input}"))?
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("cannot read a match of {input}"))?;
        if matched.is_empty() {
            bail!("glob pattern matched no files: {input}");
        }
        out.extend(matched);
    }
    Ok(out)
}

fn is_glob(s: &str) -> bool {
    s.contains(['*', '?', '[', '{'])
}
