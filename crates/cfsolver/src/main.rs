mod cli;

use anyhow::Context;
use cf_common::SolverConfig;
use cf_dns01::DnsProvider;
use clap::Parser;
use cli::{Cli, Command};
use tracing::info;

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,cfsolver=debug,cf_dns01=debug"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let config = SolverConfig::load(cli.env_file.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Config => {
            println!("{}", config.to_json_redacted()?);
        }
        Command::Timeout => {
            let provider = DnsProvider::from_config(&config)?;
            let (timeout, interval) = provider.timeout();
            println!("timeout={}s interval={}s", timeout.as_secs(), interval.as_secs());
        }
        Command::FindZone { fqdn } => {
            let provider = DnsProvider::from_config(&config)?;
            let zone = provider.find_zone(&fqdn).await?;
            println!("{}", serde_json::to_string_pretty(&zone)?);
        }
        Command::Present(args) => {
            let provider = DnsProvider::from_config(&config)?;
            let fqdn = args.fqdn();
            provider.present(&args.domain, &fqdn, &args.value).await?;
            info!(fqdn = %fqdn, "Challenge record presented");
        }
        Command::Cleanup(args) => {
            let provider = DnsProvider::from_config(&config)?;
            let fqdn = args.fqdn();
            provider.cleanup(&args.domain, &fqdn, &args.value).await?;
            info!(fqdn = %fqdn, "Challenge record cleaned up");
        }
    }

    Ok(())
}
