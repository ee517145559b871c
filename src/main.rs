use adiftools::{cli::Cli, commands};
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for diagnostics on stderr
///
/// Per-record warnings are always shown; `--debug` turns on everything.
fn init_tracing(debug: bool) {
    let mut filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy();
    if debug {
        filter = filter.add_directive(tracing::Level::TRACE.into());
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    commands::run(args)
}
