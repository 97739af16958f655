//! bunk3r: BUNK3R command-line client
//!
//! Commands:
//!   publish [--caption TEXT] FILE...   - encrypt media locally and create a post
//!   decrypt INPUT --key --iv --type -o - decrypt one downloaded media blob
//!   sms wait ORDER_ID                  - wait for the SMS code of a virtual number
//!   config show                        - display current configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use bunk3r_core::config::{expand_tilde, Bunk3rConfig};
use bunk3r_publish::{ApiClient, MediaQueue, ProgressFn, Publisher};
use bunk3r_sms::{HttpSmsSource, PollState, SmsPoller};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "bunk3r",
    version,
    about = "BUNK3R client",
    long_about = "bunk3r: publish end-to-end encrypted media, decrypt feed media, and wait for SMS codes"
)]
struct Cli {
    /// Path to config.toml
    #[arg(
        long,
        short = 'c',
        env = "BUNK3R_CONFIG",
        default_value = "~/.config/bunk3r/config.toml"
    )]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides [log].level
    #[arg(long, env = "BUNK3R_LOG")]
    log: Option<String>,

    /// Log format; overrides [log].format
    #[arg(long)]
    log_format: Option<LogFormat>,

    /// Telegram WebApp init data sent with every API request
    #[arg(long, env = "BUNK3R_INIT_DATA", hide_env_values = true, global = true)]
    init_data: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt media files and create a publication
    ///
    /// Each file gets its own AES-256-GCM key; keys are sent alongside the
    /// ciphertext in the encryption_metadata field.
    Publish {
        /// Post caption (required when no files are given)
        #[arg(long, default_value = "")]
        caption: String,
        /// Media files, attached in the order given
        files: Vec<PathBuf>,
    },

    /// Decrypt a media blob downloaded from the feed
    Decrypt {
        /// Encrypted input file
        input: PathBuf,
        /// Base64 AES-256 key from the post metadata
        #[arg(long)]
        key: String,
        /// Base64 12-byte IV from the post metadata
        #[arg(long)]
        iv: String,
        /// Original MIME type
        #[arg(long = "type")]
        mime: String,
        /// Where to write the plaintext
        #[arg(long, short = 'o')]
        output: PathBuf,
    },

    /// Virtual-number SMS
    Sms {
        #[command(subcommand)]
        action: SmsAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum SmsAction {
    /// Poll until the SMS code for an order arrives
    Wait {
        /// Order id returned by the purchase endpoint
        order_id: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = expand_tilde(&cli.config);
    let config = Bunk3rConfig::load(&config_path)
        .with_context(|| format!("loading config: {}", config_path.display()))?;

    let level = cli.log.as_deref().unwrap_or(config.log.level.as_str());
    let format = cli.log_format.clone().unwrap_or(match config.log.format.as_str() {
        "json" => LogFormat::Json,
        _ => LogFormat::Text,
    });
    init_logging(level, &format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        "bunk3r starting"
    );

    let init_data = cli.init_data.map(SecretString::from);

    match cli.command {
        Commands::Publish { caption, files } => cmd_publish(&config, init_data, &caption, &files).await,
        Commands::Decrypt { input, key, iv, mime, output } => {
            cmd_decrypt(&input, &key, &iv, &mime, &output).await
        }
        Commands::Sms { action: SmsAction::Wait { order_id } } => {
            cmd_sms_wait(&config, init_data, &order_id).await
        }
        Commands::Config { action: ConfigAction::Show } => cmd_config_show(&config, &config_path),
    }
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // logs go to stderr so stdout stays clean for codes and ids
    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

// ── Progress bar helpers ──────────────────────────────────────────────────────

fn make_progress_bar(total: u64, prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template("{prefix:.bold} [{bar:40.cyan/blue}] {pos}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn make_spinner(prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{prefix:.bold} {spinner} {elapsed} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

// ── `bunk3r publish` ──────────────────────────────────────────────────────────

async fn cmd_publish(
    config: &Bunk3rConfig,
    init_data: Option<SecretString>,
    caption: &str,
    files: &[PathBuf],
) -> Result<()> {
    if init_data.is_none() {
        warn!("BUNK3R_INIT_DATA not set; the server will likely refuse the request");
    }

    let mut queue = MediaQueue::new(config.limits.clone());
    let report = queue.add_paths(files).await.context("selecting media")?;
    for rejection in &report.rejected {
        println!("  skipped {}: {}", rejection.name, rejection.reason);
    }
    if !report.rejected.is_empty() && report.accepted == 0 && !files.is_empty() {
        anyhow::bail!("none of the selected files can be attached");
    }

    let total_bytes: u64 = queue.files().iter().map(|f| f.size()).sum();
    println!(
        "Publishing {} file(s), {} → {}",
        queue.len(),
        fmt_bytes(total_bytes),
        config.api.base_url,
    );

    let client = ApiClient::new(config.api.clone(), init_data).context("building API client")?;
    let publisher = Publisher::new(client);

    let pb = make_progress_bar(100, "publish");
    let pb_clone = pb.clone();
    let progress: ProgressFn = Box::new(move |done, total, msg| {
        pb_clone.set_length(total);
        pb_clone.set_position(done);
        pb_clone.set_message(msg.to_string());
    });

    let response = match publisher.publish(caption, &mut queue, Some(&progress)).await {
        Ok(r) => r,
        Err(e) => {
            pb.abandon_with_message("failed".to_string());
            return Err(e).context("publishing");
        }
    };

    pb.finish_with_message("done".to_string());
    println!();
    println!("Published:");
    match response.publication_id {
        Some(id) => println!("  id:     {id}"),
        None => println!("  id:     (not returned)"),
    }
    println!("  files:  {}", report.accepted);

    Ok(())
}

// ── `bunk3r decrypt` ──────────────────────────────────────────────────────────

async fn cmd_decrypt(input: &Path, key: &str, iv: &str, mime: &str, output: &Path) -> Result<()> {
    let ciphertext = tokio::fs::read(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;

    let blob = bunk3r_crypto::decrypt_media(&ciphertext, key, iv, mime)
        .with_context(|| format!("could not decrypt {}", input.display()))?;

    tokio::fs::write(output, &blob.bytes)
        .await
        .with_context(|| format!("writing {}", output.display()))?;

    println!(
        "Decrypted {} → {} ({}, {})",
        input.display(),
        output.display(),
        blob.mime,
        fmt_bytes(blob.bytes.len() as u64),
    );
    Ok(())
}

// ── `bunk3r sms wait` ─────────────────────────────────────────────────────────

async fn cmd_sms_wait(
    config: &Bunk3rConfig,
    init_data: Option<SecretString>,
    order_id: &str,
) -> Result<()> {
    let source = HttpSmsSource::new(config.api.clone(), &config.sms, init_data)
        .context("building SMS status client")?;
    let poller = SmsPoller::from_config(source, &config.sms);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let pb = make_spinner("sms");
    pb.set_message(format!("waiting for order {order_id}"));

    let state = poller.run(order_id, cancel).await;

    match state {
        PollState::Received { code } => {
            pb.finish_and_clear();
            println!("{code}");
            Ok(())
        }
        PollState::Closed(status) => {
            pb.abandon_with_message(status.to_string());
            anyhow::bail!("order {order_id} ended without an SMS: {status}")
        }
        PollState::Cancelled => {
            pb.abandon_with_message("cancelled".to_string());
            anyhow::bail!("cancelled")
        }
        PollState::TimedOut => {
            pb.abandon_with_message("timed out".to_string());
            anyhow::bail!(
                "no SMS for order {order_id} after {}s",
                config.sms.max_wait_secs
            )
        }
        PollState::Idle | PollState::Polling { .. } => {
            anyhow::bail!("poller stopped in a non-terminal state")
        }
    }
}

// ── `bunk3r config show` ──────────────────────────────────────────────────────

fn cmd_config_show(config: &Bunk3rConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn fmt_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
