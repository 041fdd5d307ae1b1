use std::io::Write as _;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::EnvFilter;

use onboardx_wallet_lib::{
    AppConfig, Cluster, Dispatch, InputValidator, LocalKeyProvider, SolanaRpcClient, UserIdentity,
    ViewState, WalletApp, DEFAULT_AIRDROP_LAMPORTS, DEFAULT_TRANSFER_LAMPORTS, DEMO_SIGN_MESSAGE,
};

#[derive(Debug, Parser)]
#[command(name = "onboardx", about = "Embedded-wallet onboarding demo for Solana devnet")]
struct Cli {
    /// RPC endpoint (overrides ONBOARDX_RPC_URL)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Network: devnet, testnet or mainnet-beta (overrides ONBOARDX_NETWORK)
    #[arg(long)]
    network: Option<Cluster>,

    /// App display name (overrides ONBOARDX_APP_NAME)
    #[arg(long)]
    app_name: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    if let Some(network) = cli.network {
        config.network.cluster = network;
        config.network.rpc_url = network.rpc_url().to_string();
    }
    if let Some(url) = cli.rpc_url {
        config.network.rpc_url = url;
    }
    if let Some(name) = cli.app_name {
        config.branding.app_name = name;
    }

    let validator = InputValidator::new().context("building input validator")?;
    let ledger = Arc::new(
        SolanaRpcClient::new(&config.network.rpc_url, config.network.commitment)
            .context("starting RPC client")?,
    );
    let provider = Arc::new(LocalKeyProvider::new(
        Arc::clone(&ledger),
        UserIdentity {
            email: None,
            display_name: Some("Local demo key".to_string()),
        },
    ));
    let app_name = config.branding.app_name.clone();
    let app = WalletApp::new(config, provider, ledger).context("initializing wallet")?;

    println!(
        "{} — {} via {}",
        app_name,
        app.config().network.cluster.as_str(),
        app.config().network.rpc_url
    );
    println!("Commands: login logout balance airdrop [sol] sign [text] send [sol] status quit");
    print_panel(&app_name, &app.view());

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();
        let Some(line) = lines.next_line().await.context("reading input")? else {
            break;
        };

        let mut parts = line.split_whitespace();
        let dispatch = match parts.next() {
            None => continue,
            Some("login") => Some(app.login().await),
            Some("logout") => Some(app.logout().await),
            Some("balance") => Some(app.show_balance().await),
            Some("airdrop") => match parse_lamports(&validator, parts.next(), DEFAULT_AIRDROP_LAMPORTS) {
                Ok(lamports) => Some(app.airdrop(lamports).await),
                Err(message) => {
                    println!("{}", message);
                    continue;
                }
            },
            Some("send") => match parse_lamports(&validator, parts.next(), DEFAULT_TRANSFER_LAMPORTS) {
                Ok(lamports) => Some(app.send(lamports).await),
                Err(message) => {
                    println!("{}", message);
                    continue;
                }
            },
            Some("sign") => {
                let rest = parts.collect::<Vec<_>>().join(" ");
                let text = if rest.is_empty() { DEMO_SIGN_MESSAGE } else { &rest };
                Some(app.sign_message(text).await)
            }
            Some("status") => None,
            Some("quit") | Some("exit") => break,
            Some(other) => {
                println!("Unknown command '{}'; try 'status' or 'quit'", other);
                continue;
            }
        };

        if dispatch == Some(Dispatch::Busy) {
            println!("Another action is still running; this one was dropped.");
        }
        print_panel(&app_name, &app.view());
    }

    Ok(())
}

fn parse_lamports(
    validator: &InputValidator,
    raw: Option<&str>,
    default: u64,
) -> Result<u64, String> {
    match raw {
        None => Ok(default),
        Some(raw) => validator
            .validate_amount_sol(raw)
            .map_err(|e| e.to_string()),
    }
}

fn print_panel(app_name: &str, view: &ViewState) {
    println!("── {} ──", app_name);
    println!(" status  : {}", view.status);
    println!(
        " user    : {}",
        view.identity
            .as_ref()
            .and_then(|identity| identity.label())
            .unwrap_or("-")
    );
    println!(" address : {}", view.address.as_deref().unwrap_or("-"));
    println!(
        " balance : {}",
        view.balance_sol
            .map(|sol| format!("{} SOL", onboardx_wallet_lib::format_sol(sol)))
            .unwrap_or_else(|| "-".to_string())
    );
    println!(" log     : {}", view.log);
}
