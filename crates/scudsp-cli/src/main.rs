use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use scudsp::{Instruction, ListingConfig, Program};

mod model;
use model::{hex_dump, load_image, load_source, InputError};

#[derive(Parser, Debug)]
#[command(author, version, about = "SCU DSP assembler and disassembler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble a source listing into big-endian instruction words
    Compile {
        /// Assembly source
        input: PathBuf,
        /// Write the binary image here
        output: Option<PathBuf>,
        /// Don't print the hex dump
        #[arg(short, long)]
        quiet: bool,
    },
    /// Decode a binary image back into assembly
    Decompile {
        /// Binary image (length must be a multiple of 4 bytes)
        input: PathBuf,
        /// Write the listing here instead of stdout
        output: Option<PathBuf>,
        /// Output format: text or json
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Listing options as JSON (see `ListingConfig`)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Override the column width of compound rows
        #[arg(long)]
        column_width: Option<usize>,
        /// Don't synthesise labels for branch targets
        #[arg(long)]
        no_auto_labels: bool,
        /// Prefix for synthesised labels
        #[arg(long)]
        label_prefix: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, serde::Serialize)]
struct ProgramOut<'a> {
    words: Vec<String>,
    labels: BTreeMap<&'a str, usize>,
    instructions: &'a [Instruction],
}

fn load_config(path: Option<&Path>) -> Result<ListingConfig> {
    let Some(path) = path else {
        return Ok(ListingConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn emit(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text).with_context(|| format!("writing {}", path.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.cmd {
        Command::Compile { input, output, quiet } => {
            let source = load_source(&input)?;
            let program = Program::from_text(&source).with_context(|| format!("assembling {}", input.display()))?;
            debug!(instructions = program.len(), "compiled");
            if !quiet {
                print!("{}", hex_dump(&program.words()));
            }
            if let Some(path) = output {
                std::fs::write(&path, program.to_bytes()).with_context(|| format!("writing {}", path.display()))?;
            }
        }
        Command::Decompile { input, output, format, config, column_width, no_auto_labels, label_prefix } => {
            let mut cfg = load_config(config.as_deref())?;
            if let Some(w) = column_width {
                cfg.column_width = w;
            }
            if no_auto_labels {
                cfg.auto_labels = false;
            }
            if let Some(p) = label_prefix {
                cfg.label_prefix = p;
            }
            let bytes = load_image(&input)?;
            let program =
                Program::from_bytes_with(&bytes, &cfg).with_context(|| format!("decoding {}", input.display()))?;
            debug!(instructions = program.len(), "decompiled");
            let text = match format {
                OutputFormat::Text => program.listing(&cfg),
                OutputFormat::Json => {
                    let out = ProgramOut {
                        words: program.words().iter().map(|w| format!("{w:#010x}")).collect(),
                        labels: program.context().labels().iter().map(|(k, v)| (k.as_str(), *v)).collect(),
                        instructions: program.instructions(),
                    };
                    serde_json::to_string_pretty(&out)? + "\n"
                }
            };
            emit(output.as_deref(), &text)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            let code = err.downcast_ref::<InputError>().map_or(1, InputError::exit_code);
            ExitCode::from(code)
        }
    }
}
