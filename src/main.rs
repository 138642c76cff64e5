//! codepad - Multi-File Code Playground
//!
//! Command-line entry point. The binary is a thin shell: it installs the
//! error report handler, wires up tracing, and hands the arguments to the
//! CLI layer, which drives the workspace controller.

use std::error::Error;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    color_eyre::install()?;
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    codepad::cli::execute_cli(&args).await
}

/// Logs go to stderr so command output stays clean; `RUST_LOG` overrides
/// the default filter.
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("codepad=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
