// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! toyc - command-line front end for the toy language compiler
//!
//! Reads a source file (or `-e` code), compiles it and writes the function
//! table as a disassembly listing, JSON or hex-encoded bytecode.

mod cli;

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use toy_compiler::FunctionTable;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Emit};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so they never mix with emitted output.
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let (name, source) = read_source(cli)?;
    if source.len() > cli.max_source_size {
        bail!(
            "{} is {} bytes, over the {} byte limit",
            name,
            source.len(),
            cli.max_source_size
        );
    }

    let table = toy_compiler::compile(&source)
        .with_context(|| format!("failed to compile {}", name))?;
    debug!(source = %name, functions = table.len(), "compiled");

    let output = render(&table, cli.emit)?;
    match &cli.output {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => io::stdout()
            .lock()
            .write_all(&output)
            .context("failed to write to stdout")?,
    }
    Ok(())
}

fn read_source(cli: &Cli) -> Result<(String, String)> {
    if let Some(code) = &cli.eval {
        return Ok(("<eval>".to_string(), code.clone()));
    }
    let Some(path) = &cli.file else {
        bail!("no input: pass a FILE or --eval <CODE>");
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok((path.display().to_string(), source))
}

fn render(table: &FunctionTable, emit: Emit) -> Result<Vec<u8>> {
    let rendered = match emit {
        Emit::Disasm => table.to_string(),
        Emit::Json => {
            let mut json = serde_json::to_string_pretty(table)?;
            json.push('\n');
            json
        }
        Emit::Bytes => {
            let mut out = String::new();
            for (id, function) in table.iter().enumerate() {
                write!(out, "{}:", id)?;
                for byte in function.encode() {
                    write!(out, " {:02x}", byte)?;
                }
                out.push('\n');
            }
            out
        }
    };
    Ok(rendered.into_bytes())
}
