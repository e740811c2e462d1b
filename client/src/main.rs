use clap::Parser;
use client::input::HELP;
use client::network::{BoxError, Client};
use client::replication::Replicator;
use log::info;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Relay URL to connect to
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:3000")]
    server: String,

    /// Session id used to tag outgoing snapshots (random if omitted)
    #[arg(long)]
    id: Option<String>,

    /// Clock tick interval in milliseconds
    #[arg(short = 't', long, default_value = "1000")]
    tick_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let player_id = args.id.unwrap_or_else(Replicator::generate_player_id);

    info!("Starting client...");
    println!("{}", HELP);

    let mut client =
        Client::connect(&args.server, player_id, Duration::from_millis(args.tick_ms)).await?;

    client.run().await?;

    Ok(())
}
