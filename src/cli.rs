//! CLI argument parsing for toyc.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Largest source file accepted by default, in bytes.
pub const DEFAULT_MAX_SOURCE_SIZE: usize = 64_000;

/// toyc - compile toy language source to VM bytecode
#[derive(Parser, Debug)]
#[command(name = "toyc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source file to compile
    #[arg(value_name = "FILE", required_unless_present = "eval", conflicts_with = "eval")]
    pub file: Option<PathBuf>,

    /// Compile source given on the command line
    #[arg(short, long, value_name = "CODE")]
    pub eval: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Emit::Disasm)]
    pub emit: Emit,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Reject sources larger than this many bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_SOURCE_SIZE)]
    pub max_source_size: usize,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// What to write for a compiled program.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emit {
    /// Human-readable listing of every function
    Disasm,
    /// The function table as JSON, opcodes by name
    Json,
    /// One line per function: id, then the encoded bytes in hex
    Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["toyc", "main.toy"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("main.toy")));
        assert_eq!(cli.emit, Emit::Disasm);
        assert_eq!(cli.max_source_size, DEFAULT_MAX_SOURCE_SIZE);
        assert!(cli.output.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_eval_with_json() {
        let cli = Cli::try_parse_from(["toyc", "-e", "print(1);", "--emit", "json", "-v"]).unwrap();
        assert_eq!(cli.eval.as_deref(), Some("print(1);"));
        assert_eq!(cli.emit, Emit::Json);
        assert!(cli.verbose);
    }

    #[test]
    fn test_requires_an_input() {
        assert!(Cli::try_parse_from(["toyc"]).is_err());
        assert!(Cli::try_parse_from(["toyc", "a.toy", "-e", "1;"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["toyc", "a.toy", "--emit", "wasm"]).is_err());
    }
}
