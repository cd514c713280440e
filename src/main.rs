use alloy::primitives::TxHash;
use clap::{Args, Parser, Subcommand};
use std::error::Error;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;

use newchain_faucet::blockchain::{BlockchainClient, ChainGateway, KeyVault, KeystoreVault};
use newchain_faucet::config::{
    load_config, read_config, save_config, ConfigError, FaucetConfig, DEFAULT_CONFIG_FILE,
};
use newchain_faucet::faucet::passphrase::read_new_passphrase;
use newchain_faucet::faucet::{ConfiguredPassphrase, PassphraseSource, TerminalPrompt};
use newchain_faucet::http::{AppState, HttpServer};
use newchain_faucet::lifecycle::{bootstrap, signals, Shutdown};
use newchain_faucet::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "newchain-faucet", version, about = "Faucet service for NewChain")]
struct Cli {
    /// Config file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// NewChain JSON-RPC endpoint
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Keystore directory
    #[arg(long, global = true)]
    wallet_path: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the faucet HTTP server
    Start(StartArgs),
    /// Write a config file interactively
    Init,
    /// Manage keystore accounts
    #[command(subcommand)]
    Account(AccountCommand),
    /// Print the receipt of a transaction
    Receipt {
        /// Transaction hash
        tx_hash: String,
    },
    /// Print the version
    Version,
}

#[derive(Args)]
struct StartArgs {
    /// Funding address
    #[arg(short, long)]
    from: Option<String>,

    /// Amount sent per request
    #[arg(short, long)]
    amount: Option<String>,

    /// Unit of the amount (NEW or WEI)
    #[arg(short, long)]
    unit: Option<String>,

    /// Listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum AccountCommand {
    /// Create new accounts
    New {
        /// How many accounts to create
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,
    },
    /// List accounts in the keystore
    List,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match &cli.command {
        Command::Start(args) => load_config(&cli.config, |config| {
            apply_global_overrides(config, &cli);
            apply_start_overrides(config, args);
        })?,
        Command::Init => {
            // `init` is how a missing config file comes into existence.
            let mut config = match read_config(&cli.config) {
                Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                    FaucetConfig::default()
                }
                other => other?,
            };
            apply_global_overrides(&mut config, &cli);
            config
        }
        _ => {
            let mut config = read_config(&cli.config)?;
            apply_global_overrides(&mut config, &cli);
            config
        }
    };
    logging::init_logging(&config.observability);

    match cli.command {
        Command::Start(_) => start(config).await,
        Command::Init => init(&cli.config, config).await,
        Command::Account(AccountCommand::New { count }) => account_new(&config, count).await,
        Command::Account(AccountCommand::List) => account_list(&config).await,
        Command::Receipt { tx_hash } => receipt(&config, &tx_hash).await,
        Command::Version => {
            println!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn apply_global_overrides(config: &mut FaucetConfig, cli: &Cli) {
    if let Some(rpc_url) = &cli.rpc_url {
        config.chain.rpc_url = rpc_url.clone();
    }
    if let Some(wallet_path) = &cli.wallet_path {
        config.wallet.path = wallet_path.clone();
    }
}

fn apply_start_overrides(config: &mut FaucetConfig, args: &StartArgs) {
    if let Some(from) = &args.from {
        config.faucet.from = from.clone();
    }
    if let Some(amount) = &args.amount {
        config.faucet.amount = amount.clone();
    }
    if let Some(unit) = &args.unit {
        config.faucet.unit = unit.clone();
    }
    if let Some(port) = args.port {
        config.listener.bind_address = match config.listener.bind_address.parse::<SocketAddr>() {
            Ok(mut addr) => {
                addr.set_port(port);
                addr.to_string()
            }
            Err(_) => format!("0.0.0.0:{}", port),
        };
    }
}

async fn start(config: FaucetConfig) -> Result<(), Box<dyn Error>> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        rpc_url = %config.chain.rpc_url,
        wallet = %config.wallet.path,
        "newchain-faucet starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let gateway: Arc<dyn ChainGateway> = Arc::new(BlockchainClient::new(&config.chain)?);
    let vault: Arc<dyn KeyVault> = Arc::new(KeystoreVault::new(&config.wallet.path));
    let passphrase: Arc<dyn PassphraseSource> = match &config.faucet.password {
        Some(password) => Arc::new(ConfiguredPassphrase::new(password.clone())),
        None => Arc::new(TerminalPrompt),
    };

    let services = bootstrap(&config, gateway, vault, passphrase).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    HttpServer::new(&config.timeouts, AppState::from(&services))
        .run(listener, shutdown.subscribe())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn init(default_path: &Path, mut config: FaucetConfig) -> Result<(), Box<dyn Error>> {
    let path = PathBuf::from(ask("Config file", &default_path.to_string_lossy())?);
    config.wallet.path = ask("Keystore directory", &config.wallet.path)?;
    config.chain.rpc_url = ask("NewChain RPC URL", &config.chain.rpc_url)?;

    let create = ask("Create a new funding account? (y/n)", "y")?;
    if create.eq_ignore_ascii_case("y") || create.eq_ignore_ascii_case("yes") {
        let vault = KeystoreVault::new(&config.wallet.path);
        let passphrase = read_new_passphrase()?;
        let account = vault.new_account(&passphrase).await?;
        println!("New account: {}", account.address);
        config.faucet.from = account.address.to_string();
    } else {
        config.faucet.from = ask("Funding address", &config.faucet.from)?;
    }

    save_config(&path, &config)?;
    println!("Config written to {}", path.display());
    Ok(())
}

async fn account_new(config: &FaucetConfig, count: u32) -> Result<(), Box<dyn Error>> {
    let vault = KeystoreVault::new(&config.wallet.path);
    let passphrase = read_new_passphrase()?;
    for _ in 0..count {
        let account = vault.new_account(&passphrase).await?;
        println!("{}", account.address);
    }
    Ok(())
}

async fn account_list(config: &FaucetConfig) -> Result<(), Box<dyn Error>> {
    let vault = KeystoreVault::new(&config.wallet.path);
    let accounts = vault.list_accounts().await?;
    if accounts.is_empty() {
        println!("No accounts in {}", vault.dir().display());
    }
    for account in accounts {
        match account.keyfile {
            Some(keyfile) => println!("{} {}", account.address, keyfile.display()),
            None => println!("{}", account.address),
        }
    }
    Ok(())
}

async fn receipt(config: &FaucetConfig, tx_hash: &str) -> Result<(), Box<dyn Error>> {
    let hash: TxHash = tx_hash.trim().parse()?;
    let client = BlockchainClient::new(&config.chain)?;
    match client.get_transaction_receipt(hash).await? {
        Some(receipt) => println!("{}", serde_json::to_string_pretty(&receipt)?),
        None => println!("No receipt for {} yet", hash),
    }
    Ok(())
}

/// Ask `question` on the terminal; an empty answer keeps `default`.
fn ask(question: &str, default: &str) -> io::Result<String> {
    print!("{} [{}]: ", question, default);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let answer = line.trim();
    Ok(if answer.is_empty() {
        default.to_string()
    } else {
        answer.to_string()
    })
}
