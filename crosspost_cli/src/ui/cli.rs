use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use std::path::{Path, PathBuf};

use crosspost_core::utils::time::{format_timestamp, humanize, now_timestamp};
use crosspost_core::{ConnectionError, ConnectionManager, Platform, PostRef, Settings};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "crosspost", version, subcommand_required = true)]
pub struct Args {
    /// Settings file (defaults to the per-user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report whether runs are paused by the rate-limit gate
    Check,
    /// Connect to the configured platforms
    Connect {
        /// Platform to connect; repeatable, defaults to every configured one
        #[arg(long = "platform", value_enum)]
        platforms: Vec<PlatformArg>,
    },
    /// Show the current Bluesky rate-limit budget
    RateLimit,
    /// Print the handle of the account a Bluesky post replies to
    ReplyTo {
        /// at:// URI of the parent post
        #[arg(long)]
        uri: String,
        /// CID of the parent post
        #[arg(long, default_value = "")]
        cid: String,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PlatformArg {
    Bluesky,
    Mastodon,
    TwitterApi,
    TwitterClient,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Bluesky => Platform::Bluesky,
            PlatformArg::Mastodon => Platform::Mastodon,
            PlatformArg::TwitterApi => Platform::TwitterApi,
            PlatformArg::TwitterClient => Platform::TwitterClient,
        }
    }
}

pub async fn run_cli(args: Args) -> Result<(), ConnectionError> {
    let settings = load_settings(args.config.as_deref())?;
    let connection_manager = ConnectionManager::new(settings)?;

    match args.command {
        Command::Check => run_check(&connection_manager),
        Command::Connect { platforms } => run_connect(&connection_manager, platforms).await,
        Command::RateLimit => run_rate_limit(&connection_manager).await,
        Command::ReplyTo { uri, cid } => run_reply_to(&connection_manager, uri, cid).await,
    }
}

/// An explicit `--config` must exist; the default location may be missing,
/// in which case nothing is configured.
fn load_settings(path: Option<&Path>) -> Result<Settings, ConnectionError> {
    if let Some(path) = path {
        return Settings::load(path);
    }
    let path = Settings::default_path()?;
    if path.exists() {
        Settings::load(&path)
    } else {
        warn!("No settings file at {}, no platform is configured.", path.display());
        Ok(Settings::default())
    }
}

fn run_check(connection_manager: &ConnectionManager) -> Result<(), ConnectionError> {
    if connection_manager.is_rate_limited()? {
        let until = connection_manager.rate_limit_gate().blocked_until()?;
        match until {
            Some(ts) => println!(
                "Paused until {} ({}).",
                format_timestamp(ts),
                humanize(ts, now_timestamp())
            ),
            None => println!("Paused."),
        }
    } else {
        println!("Not paused.");
    }
    Ok(())
}

/// `true` when this run should go ahead.
fn gate_open(connection_manager: &ConnectionManager) -> Result<bool, ConnectionError> {
    if connection_manager.is_rate_limited()? {
        info!("Rate limit gate is closed, skipping this run.");
        return Ok(false);
    }
    Ok(true)
}

async fn run_connect(
    connection_manager: &ConnectionManager,
    platforms: Vec<PlatformArg>,
) -> Result<(), ConnectionError> {
    if !gate_open(connection_manager)? {
        return Ok(());
    }

    let platforms: Vec<Platform> = if platforms.is_empty() {
        connection_manager.configured_platforms()
    } else {
        platforms.into_iter().map(Platform::from).collect()
    };
    if platforms.is_empty() {
        warn!("Nothing to connect: no platform is configured.");
        return Ok(());
    }

    for platform in &platforms {
        connection_manager.connect(*platform).await?;
        println!("Connected to {}.", platform);
    }
    if platforms.contains(&Platform::Bluesky) {
        print_rate_limit(connection_manager).await?;
    }
    Ok(())
}

async fn run_rate_limit(connection_manager: &ConnectionManager) -> Result<(), ConnectionError> {
    if !gate_open(connection_manager)? {
        return Ok(());
    }
    print_rate_limit(connection_manager).await
}

async fn print_rate_limit(connection_manager: &ConnectionManager) -> Result<(), ConnectionError> {
    let client = connection_manager.bluesky().await?;
    match client.get_rate_limit() {
        Some(snapshot) => println!(
            "Bluesky rate limit: {} of {} remaining, resets {}.",
            snapshot.remaining,
            snapshot.limit,
            format_timestamp(snapshot.reset)
        ),
        None => println!("Bluesky rate limit: not reported yet."),
    }
    Ok(())
}

async fn run_reply_to(
    connection_manager: &ConnectionManager,
    uri: String,
    cid: String,
) -> Result<(), ConnectionError> {
    if !gate_open(connection_manager)? {
        return Ok(());
    }
    let client = connection_manager.bluesky().await?;
    let handle = client.get_reply_to_user(&PostRef { uri, cid }).await;
    println!("{}", handle);
    Ok(())
}
