//! disorg command-line host
//!
//! Usage:
//!   disorg [PATH] [--in-place] [--precision N] [--no-reformat] [--values]
//!   disorg --functions
//!   disorg --describe NAME
//!
//! Reads a document (stdin when PATH is `-` or missing), recalculates every
//! table block and prints the result. Logging goes to stderr and is filtered
//! by `DISORG_LOG` (default `warn`).

use clap::Parser;
use disorg::{display_value, find_blocks, Disorg, EngineConfig, TableBlock};
use disorg_core::DisorgError;
use serde_json::{json, Value as JsonValue};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "disorg", version, about = "Recalculate formulas in plain-text tables")]
struct Args {
    /// Document to process; `-` or nothing reads stdin.
    path: Option<PathBuf>,

    /// Rewrite the file in place, only when a row changed.
    #[arg(long)]
    in_place: bool,

    /// Significant digits for transcendental functions and inexact division.
    #[arg(long, value_name = "N", default_value_t = EngineConfig::default().precision)]
    precision: u32,

    /// Keep column widths as they are.
    #[arg(long)]
    no_reformat: bool,

    /// Print the value of every formula cell as JSON instead of the document.
    #[arg(long, conflicts_with = "in_place")]
    values: bool,

    /// List the builtin functions as JSON.
    #[arg(long, conflicts_with_all = ["values", "in_place", "describe"])]
    functions: bool,

    /// Describe one builtin function or constant as JSON.
    #[arg(long, value_name = "NAME", conflicts_with_all = ["values", "in_place"])]
    describe: Option<String>,
}

impl Args {
    fn config(&self) -> EngineConfig {
        EngineConfig {
            precision: self.precision,
            reformat: !self.no_reformat,
        }
    }

    /// The file to read, or `None` for stdin
    fn file(&self) -> Option<&Path> {
        self.path.as_deref().filter(|p| *p != Path::new("-"))
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("--in-place needs a file path, not stdin")]
    InPlaceStdin,

    #[error(transparent)]
    Lookup(#[from] DisorgError),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    init_tracing();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "disorg failed");
            eprintln!("error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DISORG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: Args) -> Result<(), CliError> {
    if args.in_place && args.file().is_none() {
        return Err(CliError::InPlaceStdin);
    }
    let disorg = Disorg::with_config(args.config());

    if args.functions {
        println!("{}", serde_json::to_string_pretty(&disorg.list_functions(None))?);
        return Ok(());
    }
    if let Some(name) = &args.describe {
        println!("{}", serde_json::to_string_pretty(&disorg.help(Some(name.as_str()))?)?);
        return Ok(());
    }

    let text = read_input(args.file())?;

    if args.values {
        println!("{}", serde_json::to_string_pretty(&values_json(&disorg, &text))?);
        return Ok(());
    }

    let processed = disorg.process_document(&text);
    tracing::info!(
        blocks = processed.blocks.len(),
        changed = processed.changed(),
        "document processed"
    );

    if !args.in_place {
        print!("{}", processed.text);
        return Ok(());
    }

    if let (Some(path), true) = (args.file(), processed.changed()) {
        fs::write(path, &processed.text).map_err(|source| CliError::Write {
            path: path.display().to_string(),
            source,
        })?;
    }
    Ok(())
}

fn read_input(file: Option<&Path>) -> Result<String, CliError> {
    match file {
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.display().to_string(),
            source,
        }),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| CliError::Read {
                    path: "stdin".to_string(),
                    source,
                })?;
            Ok(text)
        }
    }
}

/// Every formula cell of every block, with its rendered and structured value
fn values_json(disorg: &Disorg, text: &str) -> JsonValue {
    let lines: Vec<&str> = text.split('\n').collect();
    let blocks: Vec<JsonValue> = find_blocks(&lines)
        .iter()
        .map(|block: &TableBlock| {
            let cells: Vec<JsonValue> = disorg
                .values(block)
                .into_iter()
                .map(|(coord, value)| {
                    json!({
                        "row": coord.row,
                        "col": coord.col,
                        "display": display_value(&value),
                        "value": value,
                    })
                })
                .collect();
            json!({ "start": block.start, "rows": block.height(), "cells": cells })
        })
        .collect();
    JsonValue::Array(blocks)
}
