use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;
use url::Url;

use gposync::{
    DEFAULT_BASE_URL, Device, Episode, EpisodeStatus, HttpGateway, Identity, Subscription,
    SyncEngine, listener, read_snapshot, write_snapshot,
};

// Emoji with fallback for terminals without Unicode support
static ANTENNA: Emoji<'_, '_> = Emoji("📡 ", "");
static DEVICE: Emoji<'_, '_> = Emoji("📱 ", "[d] ");
static PODCAST: Emoji<'_, '_> = Emoji("🎧 ", "[p] ");
static EPISODE: Emoji<'_, '_> = Emoji("🎵 ", "[e] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static UPLOAD: Emoji<'_, '_> = Emoji("📤 ", "[^] ");

/// Keep a local copy of a gpodder.net subscription catalog in sync
#[derive(Parser, Debug)]
#[command(name = "gposync")]
#[command(about = "Synchronize podcast subscriptions with a gpodder.net catalog")]
#[command(version)]
struct Args {
    /// Base URL of the catalog service
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    server: String,

    /// Path of the local state file
    #[arg(long, default_value = "gposync.json")]
    state: PathBuf,

    /// Account name on the catalog service
    #[arg(short, long)]
    username: String,

    /// Account password
    #[arg(short, long, env = "GPOSYNC_PASSWORD", hide_env_values = true)]
    password: String,

    /// Echo the engine's internal progress lines
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the devices registered for the account
    Devices,

    /// Select the device whose subscriptions to follow
    Select {
        /// Device identifier as shown by `devices`
        device_id: String,
    },

    /// Fetch and apply everything that changed since the last sync
    Sync,

    /// List the synchronized subscriptions
    Subscriptions,

    /// List synchronized episodes, optionally for a single subscription
    Episodes {
        /// Subscription title to filter by
        title: Option<String>,
    },

    /// Report an episode state change back to the catalog
    Push {
        /// Episode URL as shown by `episodes`
        url: String,

        /// New state for the episode
        #[arg(value_enum)]
        status: StatusArg,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StatusArg {
    New,
    Play,
    Download,
    Delete,
}

impl From<StatusArg> for EpisodeStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::New => EpisodeStatus::New,
            StatusArg::Play => EpisodeStatus::Play,
            StatusArg::Download => EpisodeStatus::Download,
            StatusArg::Delete => EpisodeStatus::Delete,
        }
    }
}

/// Print every change the engine announces while a command runs
fn register_listeners(engine: &mut SyncEngine<HttpGateway>, verbose: bool) {
    let notifier = engine.notifier_mut();

    notifier.device_added.add(listener(|device: &Device| {
        println!("  {} device {}", "+".green().bold(), device.id.bold());
    }));
    notifier.device_removed.add(listener(|device: &Device| {
        println!("  {} device {}", "-".red().bold(), device.id.bold());
    }));
    notifier
        .device_selected
        .add(listener(|selection: &Option<Device>| match selection {
            Some(device) => {
                println!("  {} now following {}", "*".cyan().bold(), device.id.bold())
            }
            None => println!(
                "  {} the followed device is gone",
                "*".yellow().bold()
            ),
        }));
    notifier
        .subscription_added
        .add(listener(|subscription: &Subscription| {
            println!("  {} {}", "+".green().bold(), subscription.title.bold());
        }));
    notifier
        .subscription_removed
        .add(listener(|subscription: &Subscription| {
            println!("  {} {}", "-".red().bold(), subscription.title.bold());
        }));
    notifier.episodes_added.add(listener(|set: &[Episode]| {
        println!(
            "  {} episode set grew to {}",
            "~".green(),
            set.len().to_string().cyan()
        );
    }));
    notifier.episodes_removed.add(listener(|set: &[Episode]| {
        println!(
            "  {} episode set shrank to {}",
            "~".yellow(),
            set.len().to_string().cyan()
        );
    }));
    notifier.watermark.add(listener(|value: &i64| {
        println!("  {} cursor at {}", "@".dimmed(), value.to_string().dimmed());
    }));

    if verbose {
        notifier.log.add(Arc::new(|line: &str| {
            println!("  {}", line.dimmed());
        }));
    }
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .unwrap(),
    );
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    bar.set_message(message.to_string());
    bar
}

fn save(engine: &SyncEngine<HttpGateway>, path: &Path) -> Result<()> {
    write_snapshot(&engine.snapshot(), path)
        .with_context(|| format!("Failed to write the state file {}", path.display()))
}

fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn print_episode(episode: &Episode) {
    let released = episode
        .released
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    println!(
        "{EPISODE}[{}] {} {}",
        episode.status.to_string().yellow(),
        truncate(&episode.title, 60).bold(),
        released.dimmed()
    );
    if let Some(url) = &episode.url {
        println!("   {}", url.as_str().dimmed());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    println!(
        "\n{}{} {}\n",
        ANTENNA,
        "gposync".bold().magenta(),
        "- Subscription Sync".dimmed()
    );

    let base = Url::parse(&args.server).context("Invalid server URL")?;
    let mut engine = SyncEngine::new(HttpGateway::new(base));
    engine.set_identity(Identity::new(&args.username, &args.password));

    if args.state.exists() {
        let snapshot = read_snapshot(&args.state).context("Failed to read the state file")?;
        engine.initialize(snapshot);
    }

    register_listeners(&mut engine, args.verbose);

    match args.command {
        Command::Devices => {
            let bar = spinner("Fetching devices...");
            engine
                .fetch_devices()
                .await
                .context("Failed to fetch devices")?;
            bar.finish_and_clear();

            let selected_id = engine.selected_device().map(|device| device.id.clone());
            for device in engine.devices() {
                let marker = if selected_id.as_deref() == Some(device.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{DEVICE}{} {} {} {}",
                    marker.cyan().bold(),
                    device.id.bold(),
                    device.caption,
                    format!("({})", device.kind).dimmed()
                );
            }
            save(&engine, &args.state)?;
        }

        Command::Select { device_id } => {
            let bar = spinner("Fetching devices...");
            engine
                .fetch_devices()
                .await
                .context("Failed to fetch devices")?;
            bar.finish_and_clear();

            let device = engine
                .device(&device_id)
                .cloned()
                .with_context(|| format!("No device with id '{}'", device_id))?;
            engine.set_selected_device(Some(device));

            println!("\n{SUCCESS}Following {}", device_id.bold().green());
            save(&engine, &args.state)?;
        }

        Command::Sync => {
            let bar = spinner("Syncing...");
            engine.sync().await.context("Sync failed")?;
            bar.finish_and_clear();

            println!(
                "\n{SUCCESS}{} {} subscriptions, {} episodes, cursor at {}",
                "In sync:".bold().green(),
                engine.subscriptions().len().to_string().cyan(),
                engine.episodes().len().to_string().cyan(),
                engine.watermark().to_string().dimmed()
            );
            save(&engine, &args.state)?;
        }

        Command::Subscriptions => {
            for subscription in engine.subscriptions() {
                println!("{PODCAST}{}", subscription.title.bold());
                let description = subscription.description_text();
                if !description.is_empty() {
                    println!("   {}", truncate(&description, 76).dimmed());
                }
            }
            println!(
                "\n{} subscriptions",
                engine.subscriptions().len().to_string().cyan()
            );
        }

        Command::Episodes { title } => {
            let episodes: Vec<&Episode> = match &title {
                Some(title) => engine.episodes_for(title).iter().collect(),
                None => engine.episodes().iter().collect(),
            };
            for episode in &episodes {
                print_episode(episode);
            }
            println!("\n{} episodes", episodes.len().to_string().cyan());
        }

        Command::Push { url, status } => {
            let target = Url::parse(&url).context("Invalid episode URL")?;
            let mut episode = engine
                .episodes()
                .iter()
                .find(|held| held.url.as_ref() == Some(&target))
                .cloned()
                .with_context(|| format!("No episode with url '{}'", url))?;
            episode.status = status.into();

            let bar = spinner("Pushing update...");
            engine
                .push_update(&episode)
                .await
                .context("Failed to push the update")?;
            bar.finish_and_clear();

            println!(
                "\n{UPLOAD}Reported {} as {}",
                truncate(&episode.title, 60).bold(),
                episode.status.to_string().green()
            );
        }
    }

    Ok(())
}
