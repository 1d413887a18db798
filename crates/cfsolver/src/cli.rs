use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Solve ACME DNS-01 challenges with Cloudflare.
///
/// Credentials come from CLOUDFLARE_EMAIL with CLOUDFLARE_API_KEY, or from
/// CLOUDFLARE_API_TOKEN, optionally read from a .env file.
#[derive(Parser, Debug)]
#[command(name = "cfsolver")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// .env file to read CLOUDFLARE_* variables from (defaults to ./.env when present)
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Publish the challenge TXT record
    Present(ChallengeArgs),

    /// Remove the challenge TXT record
    Cleanup(ChallengeArgs),

    /// Print the zone a FQDN belongs to
    FindZone {
        /// Fully-qualified name, e.g. _acme-challenge.www.example.com.
        fqdn: String,
    },

    /// Print the recommended propagation timeout and polling interval
    Timeout,

    /// Print the effective configuration with secrets masked
    Config,
}

#[derive(Args, Debug)]
pub struct ChallengeArgs {
    /// Domain being validated, e.g. www.example.com or *.example.com
    pub domain: String,

    /// Challenge value (the key authorization digest)
    pub value: String,

    /// Record name, defaults to _acme-challenge.<domain>.
    #[arg(long)]
    pub fqdn: Option<String>,
}

impl ChallengeArgs {
    pub fn fqdn(&self) -> String {
        self.fqdn
            .clone()
            .unwrap_or_else(|| cf_dns01::challenge_fqdn(&self.domain))
    }
}
