//! GPC Pascal Compiler Driver
//!
//! Reads a checked syntax tree serialized as JSON, runs the backend and
//! writes GNU x86-64 assembly. Parsing and semantic checking happen before
//! this tool runs.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gpc_backend::{compile, CodegenOptions, CodegenOutput};
use gpc_common::{CompilerError, ErrorReporter};
use gpc_frontend::program_from_json;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "gpc")]
#[command(about = "GPC Pascal Compiler backend")]
#[command(version)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a syntax tree to an assembly file
    Compile {
        /// Input syntax tree (JSON)
        input: PathBuf,

        /// Output assembly file, defaults to the input with a .s extension
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of expression registers (2 or 3)
        #[arg(long, default_value_t = 3)]
        registers: usize,

        /// Interleave comments naming each source statement
        #[arg(long)]
        comments: bool,
    },

    /// Generate code without writing it, reporting diagnostics only
    Check {
        /// Input syntax tree (JSON)
        input: PathBuf,

        /// Number of expression registers (2 or 3)
        #[arg(long, default_value_t = 3)]
        registers: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Compile {
            input,
            output,
            registers,
            comments,
        } => {
            let output_path = output.unwrap_or_else(|| input.with_extension("s"));
            compile_file(&input, &output_path, registers, comments)
        }
        Commands::Check { input, registers } => {
            let result = generate(&input, registers, false)?;
            report(&result.reporter);
            println!("{}: {} functions, ok", input.display(), result.program.functions.len());
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Name recorded in the `.file` directive: the source file, not the tree
fn source_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    format!("{}.p", stem)
}

fn generate(input: &Path, registers: usize, comments: bool) -> Result<CodegenOutput> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let program = program_from_json(&text)
        .with_context(|| format!("Invalid syntax tree in {}", input.display()))?;

    let options = CodegenOptions {
        register_count: registers,
        emit_comments: comments,
        source_name: source_name(input),
    };
    info!("compiling {} with {:?}", input.display(), options);

    match compile(&program, options) {
        Ok(output) => Ok(output),
        Err(CompilerError::CodegenError { location, message }) => {
            let mut reporter = ErrorReporter::new();
            reporter.error(message, location);
            report(&reporter);
            bail!("Compilation of {} failed", input.display())
        }
        Err(err) => bail!("{}", err),
    }
}

fn compile_file(input: &Path, output_path: &Path, registers: usize, comments: bool) -> Result<()> {
    let result = generate(input, registers, comments)?;
    report(&result.reporter);

    fs::write(output_path, &result.assembly)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    info!("assembly written to {}", output_path.display());
    Ok(())
}

fn report(reporter: &ErrorReporter) {
    reporter.print_diagnostics();
    if reporter.has_errors() || reporter.warning_count() > 0 {
        eprintln!("{}", reporter.summary());
    }
}
