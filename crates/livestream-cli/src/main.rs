mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing_subscriber::{fmt, EnvFilter};

use livestream_core::{
    Element, EventKind, FailurePolicy, HttpLoader, Poller, PollerConfig, StatusBoard,
    StatusCodeFilter, Visibility, DEFAULT_ENDPOINT,
};

use crate::config::AppConfig;

fn version_string() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");

    if GIT_HASH.is_empty() {
        VERSION
    } else {
        // Called once; lives for the program's lifetime.
        Box::leak(format!("{VERSION} ({GIT_HASH})").into_boxed_str())
    }
}

/// Livestream status monitor: detect which channels are broadcasting.
#[derive(Parser)]
#[command(name = "livestream-monitor", version = version_string(), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the poller and serve channel status over HTTP.
    Serve {
        /// Listen address (e.g. 0.0.0.0:8080). Overrides config file.
        #[arg(short, long)]
        listen: Option<SocketAddr>,

        /// Path to TOML config file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run the poller in the terminal (no API server).
    Watch {
        /// Status endpoint URL.
        #[arg(long, default_value = DEFAULT_ENDPOINT)]
        endpoint: String,

        /// Channel to monitor; repeat for several. Defaults to mainhall, elc, ladies.
        #[arg(long = "channel")]
        channels: Vec<String>,

        /// Poll interval in milliseconds.
        #[arg(long, default_value_t = 60_000, value_parser = clap::value_parser!(u64).range(1..))]
        poll_interval: u64,

        /// Only accept 2xx embedded status codes.
        #[arg(long, default_value_t = false)]
        strict_status: bool,

        /// Retry the same channels after a failed query instead of dropping them.
        #[arg(long, default_value_t = false)]
        keep_poll_set_on_failure: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { listen, config } => {
            run_serve(listen, config).await;
        }
        Commands::Watch {
            endpoint,
            channels,
            poll_interval,
            strict_status,
            keep_poll_set_on_failure,
        } => {
            fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
                )
                .init();

            let mut config = PollerConfig::default()
                .with_endpoint(endpoint)
                .with_poll_interval(poll_interval);
            if !channels.is_empty() {
                config = config.with_channels(channels);
            }
            if strict_status {
                config = config.with_status_filter(StatusCodeFilter::Strict);
            }
            if keep_poll_set_on_failure {
                config = config.with_failure_policy(FailurePolicy::KeepPollSet);
            }
            run_watch(config).await;
        }
    }
}

async fn run_serve(listen_override: Option<SocketAddr>, config_path: Option<PathBuf>) {
    let app_config = if let Some(ref path) = config_path {
        match AppConfig::load(path) {
            Ok(c) => {
                init_tracing(&c.server.log_format);
                tracing::info!(path = %path.display(), "Loaded config file");
                c
            }
            Err(e) => {
                init_tracing("pretty");
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
    } else {
        init_tracing("pretty");
        AppConfig::default()
    };

    let listen = listen_override.unwrap_or(app_config.server.listen);
    let poller_config = app_config.poller.to_poller_config();

    let loader = match HttpLoader::from_config(&poller_config) {
        Ok(l) => Arc::new(l),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            std::process::exit(1);
        }
    };

    let board = Arc::new(StatusBoard::new(
        app_config.presentation.clone(),
        poller_config.channels.clone(),
    ));

    let mut poller = Poller::new(poller_config, loader, board.clone());
    if let Some(ref id) = app_config.poller.id {
        poller = poller.with_poller_id(id);
    }
    let poller = Arc::new(poller);

    if let Err(e) = poller.start().await {
        tracing::error!(error = %e, "Failed to start poller");
        std::process::exit(1);
    }

    let state = livestream_api::state::AppState::new(poller.clone(), board);

    tracing::info!(%listen, "Starting livestream status API server");
    if let Err(e) =
        livestream_api::serve_with_state(listen, state, livestream_api::shutdown_signal()).await
    {
        tracing::error!(error = %e, "Server failed");
        poller.stop().await;
        std::process::exit(1);
    }

    tracing::info!("Shutdown signal received, stopping poller...");
    poller.stop().await;
    tracing::info!("Shutdown complete");
}

async fn run_watch(config: PollerConfig) {
    if let Err(e) = config::validate_poller(
        &config.endpoint,
        &config.channels,
        config.poll_interval.as_millis() as u64,
    ) {
        eprintln!("{} {}", style("error:").red().bold(), e);
        std::process::exit(2);
    }

    let loader = match HttpLoader::from_config(&config) {
        Ok(l) => Arc::new(l),
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    let board = Arc::new(StatusBoard::new(
        Default::default(),
        config.channels.clone(),
    ));

    let multi = MultiProgress::new();
    multi
        .println(format!(
            "{} {}",
            style("livestream-monitor").bold(),
            style(env!("CARGO_PKG_VERSION")).dim()
        ))
        .ok();
    multi
        .println(format!(
            "  {} {}",
            style("endpoint:").dim(),
            style(&config.endpoint).bold()
        ))
        .ok();
    multi
        .println(format!(
            "  {} {}",
            style("channels:").dim(),
            config.channels.join(", ")
        ))
        .ok();
    multi
        .println(format!(
            "  {} {}ms",
            style("poll:    ").dim(),
            config.poll_interval.as_millis()
        ))
        .ok();
    multi
        .println(format!(
            "  {} {} / {}",
            style("policy:  ").dim(),
            config.status_filter,
            config.failure_policy
        ))
        .ok();
    multi.println("").ok();
    multi
        .println(format!("{}", style("Press Ctrl+C to stop").dim()))
        .ok();
    multi.println("").ok();

    let poller = Poller::new(config, loader, board.clone());
    if let Err(e) = poller.start().await {
        eprintln!("{} {}", style("error:").red().bold(), e);
        std::process::exit(1);
    }

    let msg_style = match ProgressStyle::with_template("{wide_msg}") {
        Ok(s) => s,
        Err(_) => ProgressStyle::default_spinner(),
    };
    let status_bar = multi.add(ProgressBar::new_spinner().with_style(msg_style));
    status_bar.set_message(format!(
        "{}\n  {}",
        format_separator(0),
        style("Waiting for first status query...").dim()
    ));

    let mut last_seen: Option<String> = None;

    let shutdown = livestream_api::shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(1)) => {}
            _ = &mut shutdown => {
                status_bar.finish_and_clear();
                multi.println(format!("\n{}", style("Poller stopped.").dim())).ok();
                poller.stop().await;
                return;
            }
        }

        let events = poller.get_events().await;
        let fresh: Vec<_> = events
            .iter()
            .take_while(|ev| last_seen.as_deref() != Some(ev.id.as_str()))
            .collect();
        for ev in fresh.iter().rev() {
            let ts = ev.timestamp.format("%H:%M:%S");
            let kind_str = format!("{:<8}", ev.kind.to_string());
            let colored_kind = match ev.kind {
                EventKind::ChannelOnline => style(kind_str).green().bold(),
                EventKind::ChannelOffline => style(kind_str).dim(),
                EventKind::ChannelDropped => style(kind_str).yellow(),
                EventKind::QueryFailed => style(kind_str).red().bold(),
            };
            multi
                .println(format!(
                    "  {}  {} {:<12} {}",
                    style(ts).dim(),
                    colored_kind,
                    ev.channel.as_deref().unwrap_or("-"),
                    ev.details
                ))
                .ok();
        }
        if let Some(newest) = events.first() {
            last_seen = Some(newest.id.clone());
        }

        let stats = poller.stats().await;
        if stats.cycles == 0 {
            continue;
        }
        let mut status_lines = vec![format_separator(stats.cycles)];
        for e in board.elements().await {
            status_lines.push(format_element(&e, &stats.poll_set));
        }
        status_bar.set_message(status_lines.join("\n"));
    }
}

fn format_element(e: &Element, poll_set: &[String]) -> String {
    let badge = match e.visibility {
        Some(Visibility::Online) => style("ONLINE ").green().bold(),
        Some(Visibility::Offline) => style("OFFLINE").red(),
        None => style("UNKNOWN").dim(),
    };
    let polling = if poll_set.contains(&e.channel) {
        style("polling").dim()
    } else {
        style("settled").dim()
    };
    format!("  {:<12} {}  {}", e.channel, badge, polling)
}

fn format_separator(cycle: u64) -> String {
    let label = if cycle == 0 {
        String::new()
    } else {
        format!(" cycle {} ", cycle)
    };
    let width = 54usize.saturating_sub(label.len());
    format!(
        "{}{}{}",
        style("──").dim(),
        style(label).dim().bold(),
        style("─".repeat(width)).dim()
    )
}

fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_format {
        "json" => {
            fmt().with_env_filter(filter).json().init();
        }
        _ => {
            fmt().with_env_filter(filter).init();
        }
    }
}
