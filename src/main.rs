use clap::Parser;
use nf_dispatch::cli::{run_cli, Cli};
use nf_dispatch::logging::{init_logging_with_config, LogConfig};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging_with_config(&LogConfig::from_env())?;

    if let Err(err) = run_cli(cli) {
        tracing::error!(error = %format!("{err:#}"), "currency-nf exiting with failure");
        return Err(err);
    }
    Ok(())
}
