use clap::Parser;
use product_grid::{CliArgs, LoggingConfig, ServerConfig, init_logging, run_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logging_config = LoggingConfig::from_env();
    let _guard = init_logging(logging_config)?;

    let cli = CliArgs::parse();
    let config = ServerConfig::from_args(cli)?;

    // Validate configuration before server startup (fail-fast)
    config.validate()?;

    run_server(config).await
}
