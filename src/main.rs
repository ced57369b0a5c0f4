//! PebbleKV - An In-Memory Key-Value Store
//!
//! This is the main entry point for the PebbleKV shell.
//! It sets up logging and the shared store, then runs an interactive
//! session on stdin/stdout.

use pebblekv::commands::CommandHandler;
use pebblekv::session::Session;
use pebblekv::storage::SharedStore;
use tokio::io::BufReader;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const PROMPT: &str = "pebblekv> ";

/// Shell configuration
#[derive(Debug, Default)]
struct Config {
    /// Skip the banner
    quiet: bool,
    /// Don't print a prompt before each command (useful for piped input)
    no_prompt: bool,
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> Self {
        let mut config = Config::default();

        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--quiet" | "-q" => config.quiet = true,
                "--no-prompt" => config.no_prompt = true,
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("PebbleKV version {}", pebblekv::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", arg);
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        config
    }
}

fn print_help() {
    println!(
        r#"
PebbleKV - An In-Memory Key-Value Store

USAGE:
    pebblekv [OPTIONS]

OPTIONS:
    -q, --quiet          Don't print the startup banner
        --no-prompt      Don't print a prompt before each command
    -v, --version        Print version information
    -h, --help           Print this help message

EXAMPLES:
    pebblekv                                   # Interactive shell
    printf 'SET a 1\nGET a\n' | pebblekv -q --no-prompt

SESSION:
    pebblekv> SET name "Ariz" EX 60
    OK
    pebblekv> GET name
    "Ariz"
    pebblekv> TTL name
    (integer) 60
    pebblekv> KEYS n*
    1) "name"

Set RUST_LOG (e.g. RUST_LOG=debug) to control log output on stderr.
"#
    );
}

fn print_banner() {
    println!(
        r#"
PebbleKV v{} - In-Memory Key-Value Store
──────────────────────────────────────────
Type commands, one per line. QUIT or Ctrl+D to exit.
"#,
        pebblekv::VERSION
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = Config::from_args();

    // Set up logging; replies own stdout, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if !config.quiet {
        print_banner();
    }

    let store = SharedStore::new();
    let handler = CommandHandler::new(store.clone());

    let mut session = Session::new(
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        handler,
    );
    if !config.no_prompt {
        session = session.with_prompt(PROMPT);
    }

    // Without a signal handler the shell still ends on EOF or QUIT
    let shutdown = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Interrupt received, stopping shell..."),
            Err(e) => {
                warn!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    let interrupted = tokio::select! {
        result = session.run() => {
            result?;
            false
        }
        _ = shutdown => true,
    };

    info!(
        keys = store.len(),
        memory_usage = store.memory_usage(),
        "Shell shutdown complete"
    );

    if interrupted {
        // stdin reads park a blocking thread that would hold the runtime open
        std::process::exit(0);
    }

    Ok(())
}
