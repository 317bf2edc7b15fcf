//! Command line interface for adaptex.
//!
//! `expand` runs one document through the expander, `editor` opens the
//! terminal editing session and `primitives` lists the built-in macros.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::thread;

use clap::{ArgAction, Parser, Subcommand};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use thiserror::Error;

use crate::atoms::Primitive;
use crate::engine::{ConfigError, EngineConfig, MacroProcessor, EXPANSION_STACK_SIZE};
use crate::errors::{print_error, ExpansionError};
use crate::logging;
use crate::runtime::{NullPrompt, TerminalPrompt};

// ============================================================================
// CLI ARGUMENTS
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "adaptex",
    version,
    about = "A text macro expander with adaptive delimiters."
)]
pub struct AdaptexArgs {
    /// Log more (-v info, -vv debug, -vvv trace); RUST_LOG applies otherwise.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Engine configuration file (JSON, or YAML for .yaml/.yml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Ceiling on nested expansions; overrides the config file.
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,
    #[command(subcommand)]
    pub command: ArgsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ArgsCommand {
    /// Expand the concatenation of the input files.
    Expand {
        /// Input files, concatenated in the order given.
        #[arg(short, long = "input", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
        /// Write the result here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Never prompt: `input text` keeps its initial text.
        #[arg(long)]
        batch: bool,
    },
    /// Edit and expand a document in the terminal.
    Editor,
    /// List the primitives with their arity.
    Primitives,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not read '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not write '{}'", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Expansion(#[from] ExpansionError),
    #[error("could not start the expansion thread")]
    Spawn(#[source] io::Error),
}

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

pub fn run() {
    let args = AdaptexArgs::parse();
    match logging::level_for_verbosity(args.verbose) {
        Some(level) => logging::init_with_level(level),
        None => logging::init_from_env(),
    }

    if let Err(error) = execute_on_expansion_stack(args) {
        report(error);
        process::exit(1);
    }
}

/// Runs `execute` on a thread sized for the deepest allowed expansion.
pub fn execute_on_expansion_stack(args: AdaptexArgs) -> Result<(), CliError> {
    let worker = thread::Builder::new()
        .name("adaptex".to_string())
        .stack_size(EXPANSION_STACK_SIZE)
        .spawn(move || execute(args))
        .map_err(CliError::Spawn)?;
    match worker.join() {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

pub fn execute(args: AdaptexArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref(), args.max_depth)?;
    match args.command {
        ArgsCommand::Expand {
            inputs,
            output,
            batch,
        } => expand_files(config, &inputs, output.as_deref(), batch),
        ArgsCommand::Editor => {
            crate::repl::run_editor(config);
            Ok(())
        }
        ArgsCommand::Primitives => {
            print_primitives();
            Ok(())
        }
    }
}

pub fn load_config(path: Option<&Path>, max_depth: Option<usize>) -> Result<EngineConfig, CliError> {
    let mut config = match path {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(max_depth) = max_depth {
        config.max_depth = max_depth;
    }
    Ok(config)
}

// ============================================================================
// COMMANDS
// ============================================================================

fn expand_files(
    mut config: EngineConfig,
    inputs: &[PathBuf],
    output: Option<&Path>,
    batch: bool,
) -> Result<(), CliError> {
    let document = read_inputs(inputs)?;
    config.source_name = inputs
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(" + ");

    let processor = MacroProcessor::new(config);
    let mut processor = if batch {
        processor.with_prompt(NullPrompt)
    } else {
        processor.with_prompt(TerminalPrompt::stdio())
    };
    let expanded = processor.expand(&document)?;

    match output {
        Some(path) => {
            std::fs::write(path, &expanded).map_err(|source| CliError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            print_success(&format!(
                "wrote {} bytes to {}",
                expanded.len(),
                path.display()
            ));
        }
        None => {
            let mut stdout = io::stdout();
            let written = stdout.write_all(expanded.as_bytes()).and_then(|()| stdout.flush());
            written.map_err(|source| CliError::Write {
                path: PathBuf::from("<stdout>"),
                source,
            })?;
        }
    }
    Ok(())
}

/// Reads and concatenates the input files in order.
pub fn read_inputs(inputs: &[PathBuf]) -> Result<String, CliError> {
    let mut document = String::new();
    for path in inputs {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.clone(),
            source,
        })?;
        document.push_str(&text);
    }
    Ok(document)
}

// ============================================================================
// OUTPUT FUNCTIONS
// ============================================================================

fn print_primitives() {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    for primitive in Primitive::ALL {
        let _ = stdout.set_color(ColorSpec::new().set_bold(true));
        let _ = write!(stdout, "  {:<20}", primitive.name());
        let _ = stdout.reset();
        let _ = writeln!(
            stdout,
            " {:<12} {}",
            primitive.arity().to_string(),
            primitive.summary()
        );
    }
}

fn print_success(message: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
    let _ = writeln!(stdout, "{}", message);
    let _ = stdout.reset();
}

/// Prints a CLI failure; expansion errors get the full miette rendering.
pub fn report(error: CliError) {
    let error = match error {
        CliError::Expansion(error) => return print_error(error),
        other => other,
    };

    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(stderr, "error");
    let _ = stderr.reset();
    let _ = write!(stderr, ": {}", error);
    let mut cause = std::error::Error::source(&error);
    while let Some(inner) = cause {
        let _ = write!(stderr, ": {}", inner);
        cause = std::error::Error::source(inner);
    }
    let _ = writeln!(stderr);
}
