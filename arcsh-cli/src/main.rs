//! arcsh CLI - Browse an archive from an interactive shell.
//!
//! Usage:
//!   arcsh <config.yaml> [--trace]
//!
//! The configuration names the archive to mount and the hostname shown in the
//! prompt, and optionally a startup script:
//!
//!   archive_path: virtual_fs.tar
//!   hostname: my_host
//!   startup_script: startup.sh
//!
//! Commands: ls [path], cd <path>, pwd, tail <file> [-N], exit

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use crossterm::style::{style, Stylize};
use crossterm::tty::IsTty;
use tokio::sync::mpsc as tokio_mpsc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use arcsh_core::{load_archive_from_path, ArchiveTree, Shell, ShellConfig, ShellConsole};

/// Archive shell CLI
#[derive(Parser, Debug)]
#[command(name = "arcsh")]
#[command(about = "Browse an archive as a read-only filesystem")]
struct Args {
    /// YAML configuration file
    config: PathBuf,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long)]
    trace: bool,
}

/// Console writing to the process's stdout.
struct TerminalConsole {
    /// Style the prompt (only when stdout is a terminal)
    styled: bool,
}

impl TerminalConsole {
    fn new() -> Self {
        Self {
            styled: std::io::stdout().is_tty(),
        }
    }
}

impl ShellConsole for TerminalConsole {
    fn write_line(&mut self, line: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        let _ = writeln!(handle, "{}", line);
        let _ = handle.flush();
    }

    fn write_prompt(&mut self, prompt: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        if self.styled {
            let _ = write!(handle, "{}", style(prompt).bold());
        } else {
            let _ = write!(handle, "{}", prompt);
        }
        let _ = handle.flush();
    }
}

fn init_tracing(trace: bool) {
    let filter = if trace {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Read stdin lines on a dedicated thread so a blocked read never holds up
/// shutdown.
fn spawn_line_reader() -> tokio_mpsc::UnboundedReceiver<String> {
    let (line_tx, line_rx) = tokio_mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        break; // Shell finished
                    }
                }
                Err(e) => {
                    warn!("Failed to read input: {}", e);
                    break;
                }
            }
        }
    });
    line_rx
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.trace);

    let config = match ShellConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let entries = match load_archive_from_path(&config.archive_path) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!(
                "Archive {} does not exist or is not a valid archive: {}",
                config.archive_path.display(),
                e
            );
            std::process::exit(1);
        }
    };
    info!(
        archive = %config.archive_path.display(),
        entries = entries.len(),
        "Loaded archive"
    );

    let tree = Arc::new(ArchiveTree::build(entries));
    let mut shell = Shell::from_config(&config, tree, TerminalConsole::new());

    if let Some(script) = &config.startup_script {
        if let Err(e) = shell.run_startup_script(script) {
            warn!("Failed to run startup script {}: {}", script.display(), e);
        }
    }

    let mut line_rx = spawn_line_reader();

    while shell.is_running() {
        shell.show_prompt();
        tokio::select! {
            line = line_rx.recv() => match line {
                Some(line) => {
                    shell.execute_line(line.trim());
                }
                None => {
                    // EOF
                    println!();
                    break;
                }
            },
            interrupted = tokio::signal::ctrl_c() => {
                interrupted?;
                println!();
                break;
            }
        }
    }

    Ok(())
}
