//! Payout Allocation CLI
//!
//! Command-line interface for computing payout allocations.

mod client;
mod commands;
mod style;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use payout_allocation::Config;
use style::*;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "payout")]
#[command(author = "CortexLM")]
#[command(version)]
#[command(about = "Payout Allocation - Split vault payouts across reward buckets", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Allocation server URL (computes locally when omitted)
    #[arg(short, long, env = "PAYOUT_SERVER", global = true)]
    server: Option<String>,

    /// Configuration file
    #[arg(
        short,
        long,
        env = "PAYOUT_CONFIG",
        default_value = "config.toml",
        global = true
    )]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the allocation of a single payout
    #[command(visible_alias = "a")]
    Allocate {
        #[command(flatten)]
        input: commands::PayoutInput,

        /// Share of the payout for one beneficiary (percent)
        #[arg(long)]
        share: Option<String>,
    },

    /// Compute a split payout, one allocation per beneficiary
    #[command(visible_alias = "sp")]
    Split {
        #[command(flatten)]
        input: commands::PayoutInput,

        /// JSON array of beneficiaries
        #[arg(short, long)]
        beneficiaries: PathBuf,
    },

    /// Run the allocation server
    #[command(visible_alias = "serve")]
    Server {
        /// Host to bind
        #[arg(long, env = "PAYOUT_HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "PAYOUT_PORT")]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt().with_env_filter("debug").init();
    } else if matches!(cli.command, Commands::Server { .. }) {
        tracing_subscriber::fmt().with_env_filter("info").init();
    }

    let result = run(cli).await;

    if let Err(e) = result {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_from(&cli.config)?;
    let server = cli.server.as_deref();

    match cli.command {
        Commands::Allocate { input, share } => {
            commands::allocate::run(server, &config, &input, share.as_deref()).await
        }
        Commands::Split {
            input,
            beneficiaries,
        } => commands::split::run(server, &config, &input, &beneficiaries).await,
        Commands::Server { host, port } => {
            print_banner();
            commands::server::run(config, host, port).await
        }
    }
}

pub fn print_banner() {
    println!();
    println!(
        "  {} {}",
        style_bold(&style_cyan("Payout Allocation")),
        style_dim(&format!("v{}", VERSION))
    );
    println!();
}
