//! Tracetree CLI - render and check execution trace captures

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracetree::{Capture, FixSuggestion, Recorder, Renderer, ScopeFilter, TraceError};

#[derive(Parser)]
#[command(name = "tracetree")]
#[command(about = "Tracetree - execution trace recorder and renderer")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a raw capture as an indented trace
    Render {
        /// Path to the capture file (JSON array of raw events)
        capture: PathBuf,

        /// Scope-inclusion token matched against file paths (empty accepts all)
        #[arg(short, long, default_value = "")]
        filter: String,

        /// Render each event as it is recorded instead of buffering the log
        #[arg(short, long)]
        stream: bool,
    },

    /// Check a capture's structural invariants (balanced CALL/RET pairs)
    Check {
        /// Path to the capture file (JSON array of raw events)
        capture: PathBuf,

        /// Scope-inclusion token matched against file paths (empty accepts all)
        #[arg(short, long, default_value = "")]
        filter: String,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Render {
            capture,
            filter,
            stream,
        } => render_capture(&capture, &filter, stream),
        Commands::Check { capture, filter } => check_capture(&capture, &filter),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn render_capture(path: &Path, token: &str, stream: bool) -> Result<(), TraceError> {
    let capture = Capture::from_path(path)?;
    let mut recorder = Recorder::new(ScopeFilter::new(token));
    let log = recorder.log();
    let mut renderer = Renderer::new();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if stream {
        // Streaming variant: indent state only depends on the preceding
        // event, so rendering as we record preserves the exact output.
        let mut cursor = 0;
        for event in capture.events() {
            Capture::fire(event, &mut recorder);
            while let Some(record) = log.get(cursor) {
                writeln!(out, "{}", renderer.render_event(&record)?)?;
                cursor += 1;
            }
        }
    } else {
        capture.drive(&mut recorder);
        renderer.render_all(&log, &mut out)?;
    }

    Ok(())
}

fn check_capture(path: &Path, token: &str) -> Result<(), TraceError> {
    let capture = Capture::from_path(path)?;
    let mut recorder = Recorder::new(ScopeFilter::new(token));
    capture.drive(&mut recorder);

    let log = recorder.log();
    let stats = log.verify_balanced()?;

    println!(
        "{} Capture '{}' is structurally balanced",
        "✓".green(),
        path.display()
    );
    println!("  Events: {}", log.len());
    println!(
        "  Calls: {} | Returns: {} | Lines: {}",
        stats.calls, stats.returns, stats.lines
    );
    println!("  Max call depth: {}", stats.max_depth);

    Ok(())
}
