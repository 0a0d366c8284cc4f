use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use habitkeep::cli::{self, Cli};
use habitkeep::config::AppConfig;

const DEFAULT_FILTER: &str = "habitkeep=info,habitkeep_core=info";

/// Initialize tracing on stderr so stdout carries only command output.
fn init_tracing(configured: Option<&str>) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .ok()
            .or_else(|| configured.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_FILTER.into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();
    init_tracing(config.log_filter.as_deref());

    let stdout = std::io::stdout();
    cli::run(cli, &config, &mut stdout.lock())
}
