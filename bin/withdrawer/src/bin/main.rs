//! CLI for driving OP Stack L2→L1 withdrawals through their lifecycle:
//! initiate on L2, prove against a dispute game, resolve the game, and
//! finalize on L1.

use clap::{Args, Parser, Subcommand, ValueEnum};
use config::{NetworkConfig, NetworkType};
use tracing_subscriber::EnvFilter;
use withdrawer::{
    config::FileConfig,
    parse::{parse_address_strict, parse_tx_hash, parse_wei},
    Contracts, Endpoints,
};
use withdrawal::state::ScanSource;

#[derive(Parser)]
#[command(name = "withdrawer")]
#[command(about = "Drives OP Stack L2->L1 withdrawals: list, init, prove, finalize")]
struct Cli {
    /// Network preset supplying default contract addresses
    #[arg(long, value_enum, default_value = "sepolia", global = true)]
    network: Network,

    /// Optional TOML config file; flags override it
    #[arg(long, global = true)]
    config: Option<String>,

    /// Emit JSON logs
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Network {
    Mainnet,
    Sepolia,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Source {
    /// L2StandardBridge WithdrawalInitiated events
    Bridge,
    /// Raw L2ToL1MessagePasser MessagePassed events
    MessagePasser,
}

#[derive(Args, Clone)]
struct EndpointArgs {
    /// Url for L1 execution client
    #[arg(long)]
    l1_rpc_url: Option<String>,

    /// Url for L2 execution client
    #[arg(long)]
    l2_rpc_url: Option<String>,
}

#[derive(Args, Clone)]
struct ContractArgs {
    /// Contract address for OptimismPortal2 (proxy)
    #[arg(long)]
    portal_address: Option<String>,

    /// Contract address for DisputeGameFactory (proxy)
    #[arg(long)]
    dispute_game_factory_address: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Lists all ongoing withdrawals and their statuses
    List {
        #[command(flatten)]
        endpoints: EndpointArgs,

        #[command(flatten)]
        contracts: ContractArgs,

        /// Account to check for previous withdrawals
        #[arg(long)]
        account: String,

        /// Which L2 event stream to scan
        #[arg(long, value_enum, default_value = "bridge")]
        source: Source,

        /// First L2 block to scan
        #[arg(long, default_value_t = 0)]
        from_block: u64,
    },

    /// Initialize a new withdrawal
    Init {
        #[command(flatten)]
        endpoints: EndpointArgs,

        /// Private key of the withdrawing account
        #[arg(long, env = "PRIVATE_KEY")]
        private_key: String,

        /// Amount to withdraw from L2 to L1 (wei)
        #[arg(long)]
        amount: String,
    },

    /// Prove a withdrawal transaction
    Prove {
        #[command(flatten)]
        endpoints: EndpointArgs,

        #[command(flatten)]
        contracts: ContractArgs,

        /// Private key of the proof submitter
        #[arg(long, env = "PRIVATE_KEY")]
        private_key: String,

        /// The L2 withdrawal transaction hash
        #[arg(long)]
        tx: String,
    },

    /// Finalize a withdrawal transaction, assumes the private key is the
    /// prover's
    Finalize {
        #[command(flatten)]
        endpoints: EndpointArgs,

        #[command(flatten)]
        contracts: ContractArgs,

        /// Private key of the finalizing account
        #[arg(long, env = "PRIVATE_KEY")]
        private_key: String,

        /// The L2 withdrawal transaction hash
        #[arg(long)]
        tx: String,
    },
}

/// Flags win over the config file; the file wins over the network preset.
struct Resolved {
    endpoints: Endpoints,
    contracts: Contracts,
}

fn resolve(
    endpoints: &EndpointArgs,
    contracts: &ContractArgs,
    file: &FileConfig,
    network: &NetworkConfig,
) -> eyre::Result<Resolved> {
    let l1_rpc_url = endpoints
        .l1_rpc_url
        .clone()
        .or_else(|| file.l1_rpc_url.clone())
        .ok_or_else(|| eyre::eyre!("--l1-rpc-url is required (flag or config file)"))?;
    let l2_rpc_url = endpoints
        .l2_rpc_url
        .clone()
        .or_else(|| file.l2_rpc_url.clone())
        .ok_or_else(|| eyre::eyre!("--l2-rpc-url is required (flag or config file)"))?;

    let portal = match &contracts.portal_address {
        Some(raw) => parse_address_strict(raw)?,
        None => file.portal_address.unwrap_or(network.l1.portal),
    };
    let dispute_game_factory = match &contracts.dispute_game_factory_address {
        Some(raw) => parse_address_strict(raw)?,
        None => file
            .dispute_game_factory_address
            .unwrap_or(network.l1.dispute_game_factory),
    };

    Ok(Resolved {
        endpoints: Endpoints {
            l1_rpc_url,
            l2_rpc_url,
        },
        contracts: Contracts {
            portal,
            dispute_game_factory,
        },
    })
}

fn resolve_l2_url(endpoints: &EndpointArgs, file: &FileConfig) -> eyre::Result<String> {
    endpoints
        .l2_rpc_url
        .clone()
        .or_else(|| file.l2_rpc_url.clone())
        .ok_or_else(|| eyre::eyre!("--l2-rpc-url is required (flag or config file)"))
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let file = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    let network = NetworkConfig::from_network_type(match cli.network {
        Network::Mainnet => NetworkType::Mainnet,
        Network::Sepolia => NetworkType::Testnet,
    });

    match &cli.command {
        Command::List {
            endpoints,
            contracts,
            account,
            source,
            from_block,
        } => {
            let resolved = resolve(endpoints, contracts, &file, &network)?;
            let account = parse_address_strict(account)?;
            let source = match source {
                Source::Bridge => ScanSource::StandardBridge,
                Source::MessagePasser => ScanSource::MessagePasser,
            };

            withdrawer::run_list(
                &resolved.endpoints,
                resolved.contracts,
                account,
                source,
                *from_block,
            )
            .await
        }

        Command::Init {
            endpoints,
            private_key,
            amount,
        } => {
            let l2_rpc_url = resolve_l2_url(endpoints, &file)?;
            let amount = parse_wei(amount)?;

            withdrawer::run_init(&l2_rpc_url, private_key, amount).await
        }

        Command::Prove {
            endpoints,
            contracts,
            private_key,
            tx,
        } => {
            let resolved = resolve(endpoints, contracts, &file, &network)?;
            let tx = parse_tx_hash(tx)?;

            withdrawer::run_prove(&resolved.endpoints, resolved.contracts, private_key, tx).await
        }

        Command::Finalize {
            endpoints,
            contracts,
            private_key,
            tx,
        } => {
            let resolved = resolve(endpoints, contracts, &file, &network)?;
            let tx = parse_tx_hash(tx)?;

            withdrawer::run_finalize(&resolved.endpoints, resolved.contracts, private_key, tx)
                .await
        }
    }
}
