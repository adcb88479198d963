use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::actuator::NullActuator;
use crate::config::Config;
use crate::engine::Engine;
use crate::interpreter::{preview, tokenize, validate, LoopMode};
use crate::script::NoopScriptSink;

#[derive(Parser)]
#[command(name = "keyrun")]
#[command(about = "Keyrun - macro interpreter and runner", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a macro file for structural errors
    Validate {
        /// Macro file to check
        file: PathBuf,
    },

    /// Print the dry-run trace of a macro file
    Preview {
        /// Macro file to trace
        file: PathBuf,

        /// Replay loop bodies per iteration instead of announcing once
        #[arg(long)]
        replay_loops: bool,
    },

    /// Run a macro file. Effects are logged unless an injection
    /// backend is wired in by the embedder.
    Run {
        /// Macro file to run
        file: PathBuf,

        /// Milliseconds before the first instruction
        #[arg(long)]
        initial_delay: Option<u64>,

        /// Milliseconds between commands
        #[arg(long)]
        command_delay: Option<u64>,

        /// Milliseconds after the last instruction
        #[arg(long)]
        post_delay: Option<u64>,
    },
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Validate { file } => {
            let program = tokenize(&read_macro(&file)?);
            match validate(&program) {
                Ok(()) => println!("Macro is valid."),
                Err(error) => {
                    eprintln!("Validation failed: {}", error);
                    std::process::exit(1);
                }
            }
        }

        Commands::Preview { file, replay_loops } => {
            let program = tokenize(&read_macro(&file)?);
            validate(&program).context("macro failed validation")?;

            let mode = if replay_loops {
                LoopMode::Replay
            } else {
                config.preview_mode()
            };
            for line in preview(&program, mode)? {
                println!("{}", line);
            }
        }

        Commands::Run {
            file,
            initial_delay,
            command_delay,
            post_delay,
        } => {
            let program = tokenize(&read_macro(&file)?);

            let mut run_config = config.run_config();
            if let Some(ms) = initial_delay {
                run_config.initial_delay_ms = ms;
            }
            if let Some(ms) = command_delay {
                run_config.command_delay_ms = ms;
            }
            if let Some(ms) = post_delay {
                run_config.post_delay_ms = ms;
            }

            let engine = Engine::new(Arc::new(NullActuator), Arc::new(NoopScriptSink));
            let handle = engine.start(program, run_config)?;

            // Ctrl-c requests a cooperative stop; the run finishes its
            // current instruction first
            let cancel = handle.cancel_token();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            });

            let mut progress = handle.progress();
            tokio::spawn(async move {
                while progress.changed().await.is_ok() {
                    let p = *progress.borrow_and_update();
                    info!(executed = p.executed, total = p.total, "progress");
                }
            });

            let report = handle.wait().await?;
            if report.cancelled {
                println!("Run cancelled after {} instruction(s).", report.executed);
            } else {
                println!(
                    "Run complete: {} instruction(s) executed, {} warning(s).",
                    report.executed,
                    report.warnings.len()
                );
            }
        }
    }

    Ok(())
}

fn read_macro(file: &Path) -> Result<String> {
    std::fs::read_to_string(file)
        .with_context(|| format!("failed to read macro file {}", file.display()))
}
