//! `deepboard-cli`: headless terminal client for the whiteboard relay.

mod join;
mod replay;


use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use client::config::ConfigError;
use client::prefs::PrefsError;
use client::relay::RelayError;
use client::session::SessionError;
use frames::RoomId;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("no display name; pass --name or set DEEPBOARD_NAME")]
    MissingName,
    #[error("relay unreachable at {0}")]
    Offline(String),
    #[error("timed out connecting to {0}")]
    ConnectTimeout(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Relay(#[from] RelayError),
    #[error(transparent)]
    Prefs(#[from] PrefsError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    BadLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("png output failed: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Parser, Debug)]
#[command(name = "deepboard-cli", about = "Deep Boards terminal client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a fresh room code.
    NewRoom,
    /// Join a room, print its events, and send stdin lines as chat.
    Join(JoinArgs),
    /// Render a JSON-lines capture of draw ops to a PNG.
    Replay(ReplayArgs),
}

#[derive(Args, Debug)]
struct JoinArgs {
    #[arg(long)]
    room: String,

    #[arg(long, env = "DEEPBOARD_NAME")]
    name: Option<String>,

    #[arg(long, env = "DEEPBOARD_URL")]
    url: Option<String>,

    #[arg(long, help = "Prefs file; defaults to the user data directory")]
    prefs: Option<PathBuf>,

    #[arg(long, help = "Write the board as seen by this client to a PNG on exit")]
    save: Option<PathBuf>,

    #[arg(long, default_value_t = 1280, value_parser = clap::value_parser!(u32).range(1..=MAX_DIMENSION))]
    width: u32,

    #[arg(long, default_value_t = 720, value_parser = clap::value_parser!(u32).range(1..=MAX_DIMENSION))]
    height: u32,
}

#[derive(Args, Debug)]
struct ReplayArgs {
    #[arg(long, help = "Input file path, or - for stdin")]
    input: String,

    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 1280, value_parser = clap::value_parser!(u32).range(1..=MAX_DIMENSION))]
    width: u32,

    #[arg(long, default_value_t = 720, value_parser = clap::value_parser!(u32).range(1..=MAX_DIMENSION))]
    height: u32,
}

/// Largest accepted board edge in pixels.
const MAX_DIMENSION: i64 = 8192;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Command::NewRoom => {
            println!("{}", RoomId::generate());
            Ok(())
        }
        Command::Join(args) => join::run(args).await,
        Command::Replay(args) => replay::run(&args),
    }
}
