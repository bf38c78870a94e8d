//! Obol node binary.
//!
//! `obol serve` runs a full node: TCP acceptor, gossip fan-out, and the
//! mining loop. `obol send` and `obol balance` submit the corresponding
//! wire message to a running node.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use obol_core::constants::DEFAULT_PORT;
use obol_node::{client, miner, node, server, Message, Node, NodeConfig};
use obol_wallet::Wallet;

/// Obol: a pedagogical proof-of-work blockchain node.
#[derive(Parser)]
#[command(name = "obol", version, about)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full node: accept peer messages, gossip, and mine.
    Serve(ServeArgs),
    /// Ask a running node to pay belushis to an address.
    Send(SendArgs),
    /// Query the summed UTXO value of an address.
    Balance(BalanceArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// TCP port the peer protocol listens on (all interfaces).
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Path of the raw private-key wallet file.
    #[arg(long, default_value = "wallet.dat")]
    wallet: PathBuf,

    /// Disable the mining loop (relay-only node).
    #[arg(long)]
    no_mine: bool,
}

#[derive(Args)]
struct SendArgs {
    /// Recipient address.
    addr: String,
    /// Amount in belushis.
    amount: u64,

    /// Node to submit through.
    #[arg(long, default_value_t = format!("127.0.0.1:{DEFAULT_PORT}"))]
    node: String,
}

#[derive(Args)]
struct BalanceArgs {
    /// Address to query.
    addr: String,

    /// Node to query.
    #[arg(long, default_value_t = format!("127.0.0.1:{DEFAULT_PORT}"))]
    node: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Send(args) => send(args).await,
        Commands::Balance(args) => balance(args).await,
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let config = NodeConfig {
        listen_port: args.port,
        wallet_path: args.wallet,
        ..NodeConfig::default()
    };

    let wallet = Wallet::load_or_create(&config.wallet_path)
        .with_context(|| format!("opening wallet {}", config.wallet_path.display()))?;
    info!("your address is {}", wallet.address());

    let (node, gossip_rx) = Node::new(&config, wallet);
    tokio::spawn(node::run_gossip(gossip_rx));

    node.bootstrap();
    info!("chain height {}", node.chain().height());

    if !config.peers.is_empty() {
        info!("syncing from peers: {:?}", config.peers);
        node.sync_with_peers().await;
    }

    if !args.no_mine {
        tokio::spawn(miner::mine_forever(node.clone()));
    }

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.listen_port))
        .await
        .with_context(|| format!("binding port {}", config.listen_port))?;
    info!("[p2p] listening on {}", config.listen_port);

    server::serve(node, listener).await?;
    Ok(())
}

async fn send(args: SendArgs) -> Result<()> {
    // Success is implicit: the node closes the connection without a reply.
    client::send_to_peer(
        &args.node,
        &Message::Send {
            addr: args.addr,
            value: args.amount,
        },
    )
    .await
    .with_context(|| format!("sending to node {}", args.node))?;
    Ok(())
}

async fn balance(args: BalanceArgs) -> Result<()> {
    let reply = client::request(&args.node, &Message::Balance { addr: args.addr })
        .await
        .with_context(|| format!("querying node {}", args.node))?;
    println!("{reply}");
    Ok(())
}

fn init_logging(level: &str) {
    use tracing_subscriber::filter::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
