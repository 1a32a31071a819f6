use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};
use x1_consensus::consensus::serialize;
use x1_consensus::p2p::message::decode_headers;
use x1_consensus::{Network, NetworkProfile};

#[derive(Parser)]
#[command(name = "X1 Genesis")]
#[command(about = "Forges and checks X1 genesis blocks and decodes header announcements.", long_about = None)]
struct Args {
    /// Use the specified network (mainnet, testnet, regtest).
    #[arg(short, long, default_value = "mainnet")]
    pub network: Network,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Disable colored output.
    #[arg(long, default_value_t = false)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Forge the genesis block of the selected network and print it.
    Genesis {
        /// Print the serialized block as hex instead of a summary.
        #[arg(long, default_value_t = false)]
        raw: bool,
    },
    /// Decode a hex encoded headers announcement.
    Headers {
        /// Message payload in hex.
        hex: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    init_tracing(&args)?;

    let profile = NetworkProfile::build(args.network).inspect_err(|e| {
        error!(network = %args.network, "Failed to build network profile: {e}");
    })?;

    match args.command {
        Command::Genesis { raw } => print_genesis(&profile, raw),
        Command::Headers { hex } => print_headers(&hex)?,
    }

    Ok(())
}

fn print_genesis(profile: &NetworkProfile, raw: bool) {
    let genesis = profile.genesis();
    if raw {
        println!("{}", hex::encode(serialize(genesis.block())));
        return;
    }

    let header = genesis.header();
    println!("network:     {}", profile.network());
    println!("magic:       {}", profile.magic());
    println!("port:        {}", profile.default_port());
    println!("rpc port:    {}", profile.rpc_port());
    println!("hash:        {}", genesis.hash());
    println!("merkle root: {}", genesis.merkle_root());
    println!("version:     {}", header.version);
    println!("time:        {}", header.time);
    println!("bits:        {:#010x}", header.bits.to_consensus());
    println!("nonce:       {}", header.nonce);
}

fn print_headers(payload: &str) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = hex::decode(payload.trim())?;
    let headers = decode_headers(&bytes)?;
    info!(count = headers.len(), "Decoded headers announcement");

    for (i, header) in headers.iter().enumerate() {
        println!(
            "{i}: {} version={} prev={} time={} bits={:#010x} nonce={}",
            header.block_hash(),
            header.version,
            header.prev_blockhash,
            header.time,
            header.bits.to_consensus(),
            header.nonce
        );
    }
    Ok(())
}

fn init_tracing(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let level = match args.log_level.as_str() {
        "error" => tracing::Level::ERROR,
        "warn" => tracing::Level::WARN,
        "info" => tracing::Level::INFO,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => {
            eprintln!(
                "Invalid log level: {}. Using 'info' as default.",
                args.log_level
            );
            tracing::Level::INFO
        }
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let use_ansi = std::io::IsTerminal::is_terminal(&std::io::stderr()) && !args.no_color;

    let subscriber = Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_level(true)
            .with_target(true)
            .with_ansi(use_ansi)
            .with_timer(ChronoUtc::rfc_3339()),
    );

    subscriber.try_init()?;

    Ok(())
}
