//! KGI - headless block-DAG timeline driver
//!
//! Runs the timeline poller against a simulated DAG or a recorded snapshot
//! file and logs one summary line per tick.
//!
//! Usage:
//!   # Follow the head of a simulated DAG
//!   cargo run -p kgi-app
//!
//!   # Jump to a height, stop after five ticks
//!   cargo run -p kgi-app -- --height 1200 --ticks 5
//!
//!   # Replay a recorded snapshot
//!   cargo run -p kgi-app -- --source fixture --fixture snapshot.json --query '?daaScore=42'

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use kgi_client::{
    DataSource, Listeners, NavigationInput, TimelineFrame, TimelineHandle, spawn_timeline,
};
use kgi_types::BlockHash;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod fixture;
mod simulated;

use fixture::FixtureSource;
use simulated::SimulatedDag;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    /// Deterministic growing DAG
    Simulated,
    /// JSON snapshot file (see --fixture)
    Fixture,
}

/// Headless driver for the block-DAG timeline.
#[derive(Parser, Debug)]
#[command(name = "kgi")]
#[command(about = "Poll a block-DAG and lay it out as a timeline")]
struct Args {
    /// Settings file (defaults to ~/.config/kgi/timeline.ron)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Track this height
    #[arg(long)]
    height: Option<u64>,

    /// Track the block with this hash
    #[arg(long)]
    hash: Option<String>,

    /// Track the block with this DAA score
    #[arg(long)]
    daa_score: Option<u64>,

    /// Navigation query string, e.g. '?height=10'; explicit flags win
    #[arg(long)]
    query: Option<String>,

    /// Viewport width in pixels
    #[arg(long)]
    width: Option<f64>,

    /// Viewport height in pixels
    #[arg(long)]
    height_px: Option<f64>,

    /// Stop after this many ticks (0 runs until Ctrl-C)
    #[arg(long, default_value_t = 0)]
    ticks: u64,

    #[arg(long, value_enum, default_value_t = SourceKind::Simulated)]
    source: SourceKind,

    /// Snapshot file for --source fixture
    #[arg(long)]
    fixture: Option<PathBuf>,
}

impl Args {
    fn navigation(&self) -> NavigationInput {
        let mut navigation = self
            .query
            .as_deref()
            .map(NavigationInput::from_query)
            .unwrap_or_default();
        if self.height.is_some() {
            navigation.height = self.height;
        }
        if let Some(hash) = &self.hash {
            navigation.hash = Some(BlockHash::new(hash.as_str()));
        }
        if self.daa_score.is_some() {
            navigation.daa_score = self.daa_score;
        }
        navigation
    }
}

fn init_logging() -> tracing_appender::non_blocking::WorkerGuard {
    let log_dir = std::env::var("KGI_LOG_DIR").unwrap_or_else(|_| "/tmp".to_string());
    let file_appender = tracing_appender::rolling::never(&log_dir, "kgi.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Debug for the poller, info for layout, warn for everything else
            "kgi_app=debug,kgi_client=debug,kgi_layout=info,warn".into()
        }))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting KGI timeline - logging to {}/kgi.log", log_dir);
    guard
}

fn listeners() -> Listeners {
    Listeners::new()
        .on_tracking_changed(|head| info!(tracking_head = head, "tracking changed"))
        .on_fetch_failing_changed(|failing| {
            if failing {
                warn!("backend unreachable, showing last good timeline");
            } else {
                info!("backend reachable again");
            }
        })
        .on_block_information_changed(|info| {
            info!(
                block = %info.block.block_hash.short(),
                height = info.block.height,
                color = %info.block.color,
                parents = info.parent_hashes.len(),
                children = info.child_hashes.len(),
                "selected block"
            );
        })
}

fn describe(frame: &TimelineFrame) -> String {
    let lowest = frame.heights.iter().map(|h| h.group.height).min();
    let highest = frame.heights.iter().map(|h| h.group.height).max();
    let range = match (lowest, highest) {
        (Some(lo), Some(hi)) => format!("{lo}..={hi}"),
        _ => "empty".to_string(),
    };
    let added = frame.blocks.iter().filter(|b| b.is_new).count();
    let chain = frame.edges.iter().filter(|e| e.is_in_chain).count();
    format!(
        "{} | heights {range} | {} blocks (+{added}) {} edges ({chain} chain) | offset x {:.0}{}{}",
        frame.target,
        frame.blocks.len(),
        frame.edges.len(),
        frame.offset.x,
        if frame.is_animating { " (easing)" } else { "" },
        if frame.fetch_failing { " | FETCH FAILING" } else { "" },
    )
}

async fn run(handle: &TimelineHandle, max_ticks: u64, cancel: CancellationToken) -> Result<()> {
    let mut ticks = handle.ticks();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("interrupted");
                break;
            }
            changed = ticks.changed() => {
                if changed.is_err() {
                    warn!("timeline stopped");
                    break;
                }
                let summary = ticks.borrow_and_update().clone();
                let frame = handle.frame().await?;
                let outcome = summary.last_outcome.map_or("-", |kind| kind.as_str());
                info!("tick {} [{} {}] {}", summary.ticks, summary.mode, outcome, describe(&frame));
                if max_ticks > 0 && summary.ticks >= max_ticks {
                    break;
                }
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging();

    let mut settings = config::load_settings(args.config.as_deref());
    if let Some(width) = args.width {
        settings.timeline.viewport_width = width;
    }
    if let Some(height) = args.height_px {
        settings.timeline.viewport_height = height;
    }

    let source: Arc<dyn DataSource> = match args.source {
        SourceKind::Simulated => Arc::new(SimulatedDag::new(settings.simulation.clone())),
        SourceKind::Fixture => {
            let path = args
                .fixture
                .as_deref()
                .context("--fixture is required with --source fixture")?;
            Arc::new(
                FixtureSource::load(path)
                    .with_context(|| format!("loading fixture {}", path.display()))?,
            )
        }
    };

    let navigation = args.navigation();
    let handle = spawn_timeline(settings.timeline, navigation, source, listeners());

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    run(&handle, args.ticks, cancel).await?;

    if let Some(backend) = handle.app_config().await? {
        info!("backend: {backend}");
    }
    info!("navigation: {:?}", handle.navigation().await?.to_query());
    handle.shutdown()?;
    Ok(())
}
