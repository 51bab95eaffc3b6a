use anyhow::Result;
use gconc::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Log to stderr; `RUST_LOG` wins over the default level.
fn init_tracing(debug: bool) {
    let default = if debug { "gconc=debug" } else { "gconc=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.common.debug);
    cli.execute()
}
