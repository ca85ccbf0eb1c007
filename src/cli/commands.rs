use crate::config::{SharedConfig, DEFAULT_SHARED_CONFIG_PATH, SHARED_CONFIG_ENV};
use crate::currency::{self, CurrencyTable};
use crate::error::NfError;
use crate::ids::NfId;
use crate::registry::HandlerRegistry;
use crate::runtime::NfRuntime;
use crate::runtime_config::RuntimeConfig;
use crate::transport::json_lines::{JsonLinesRx, JsonLinesTx};
use crate::transport::{TransportRx, TransportTx};
use crate::worker_pool::NfContext;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Command-line interface for a currency service network function
#[derive(Debug, Parser)]
#[command(name = "currency-nf")]
#[command(about = "Currency service network function", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Id of this network function in the shared configuration
    #[arg(value_parser = clap::value_parser!(u8).range(1..))]
    pub nf_id: u8,

    /// Shared configuration file (network functions and routes)
    #[arg(long, env = SHARED_CONFIG_ENV, default_value = DEFAULT_SHARED_CONFIG_PATH)]
    pub config: PathBuf,

    /// Currency rate file (JSON object of code to rate against EUR)
    #[arg(long, env = "NF_CURRENCY_DATA")]
    pub currency_data: Option<PathBuf>,
}

/// Resolve configuration, start the network function on stdin/stdout and wait for it.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    run_with_transport(&cli, JsonLinesRx::stdin(), JsonLinesTx::stdout())
}

/// Same as [`run_cli`] over the given transport.
///
/// Configuration and currency data are resolved before any unit starts, so an unknown
/// `NF_ID` or an unreadable file fails without touching the transport.
pub fn run_with_transport<R, T>(cli: &Cli, transport_rx: R, transport_tx: T) -> anyhow::Result<()>
where
    R: TransportRx + 'static,
    T: TransportTx + 'static,
{
    let nf_id = NfId(cli.nf_id);

    let shared = SharedConfig::load(&cli.config).with_context(|| {
        format!(
            "Failed to load shared configuration from {}",
            cli.config.display()
        )
    })?;
    let entry = shared.nf(nf_id).ok_or(NfError::UnknownNf { id: nf_id })?;

    if entry.name != currency::SERVICE_NAME {
        error!(
            nf_id = %nf_id,
            configured_name = %entry.name,
            expected_name = currency::SERVICE_NAME,
            "Configured network function name does not match this service"
        );
    }

    let table = match &cli.currency_data {
        Some(path) => CurrencyTable::from_json_file(path)
            .with_context(|| format!("Failed to load currency data from {}", path.display()))?,
        None => CurrencyTable::builtin(),
    };
    info!(currencies = ?table.codes(), "Currency table ready");

    let mut registry = HandlerRegistry::new();
    currency::register_all(&mut registry, Arc::new(table));

    let context = Arc::new(NfContext::new(
        nf_id,
        entry.name.clone(),
        registry,
        shared.route_table(),
    ));

    let running = NfRuntime::start(
        context,
        entry.n_threads,
        RuntimeConfig::from_env(),
        transport_rx,
        transport_tx,
    )
    .context("Failed to start network function")?;

    running.wait().context("Network function terminated with an error")?;
    info!(nf_id = %nf_id, "Network function shut down cleanly");
    Ok(())
}
