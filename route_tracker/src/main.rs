use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use route_tracker::{
    gpx_util, provider_channel, LocationTracker, MapController, SimulatedProvider, TrackerConfig,
};
use geo_types::LineString;
use route_tracker_lib::{geo_util::path_length, PermissionState, TrackingAction};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "route_tracker")]
#[command(about = "Live route tracking driven by a recorded GPX track", long_about = None)]
struct Cli {
    /// Tracker settings as `key = value` lines
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a GPX track through the tracker as if it were a live device
    Replay {
        gpx_file: PathBuf,
        /// Permission state before the user is asked
        #[arg(long, default_value = "undetermined")]
        initial: PermissionState,
        /// How the user answers the authorization prompt
        #[arg(long, default_value = "authorized-full")]
        grant: PermissionState,
        /// Delay between replayed fixes
        #[arg(long, default_value_t = 0)]
        interval_ms: u64,
        /// Start with the map in free mode instead of following the user
        #[arg(long)]
        free: bool,
        /// Print the session summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the point count and travelled distance of a GPX track
    Distance { gpx_file: PathBuf },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TrackerConfig::load(path).with_context(|| format!("loading config {:?}", path))?,
        None => TrackerConfig::default(),
    };

    match cli.command {
        Commands::Replay { gpx_file, initial, grant, interval_ms, free, json } => {
            replay(&config, gpx_file, initial, grant, Duration::from_millis(interval_ms), free, json).await
        }
        Commands::Distance { gpx_file } => {
            let route = gpx_util::read_route(&gpx_file).with_context(|| format!("reading route {:?}", gpx_file))?;
            let path: LineString = route.iter().map(|fix| fix.position).collect();
            println!("{}\t{:.1}m", route.len(), path_length(&path));
            Ok(())
        }
    }
}

async fn replay(
    config: &TrackerConfig,
    gpx_file: PathBuf,
    initial: PermissionState,
    grant: PermissionState,
    interval: Duration,
    free: bool,
    json: bool,
) -> anyhow::Result<()> {
    let route = gpx_util::read_route(&gpx_file).with_context(|| format!("reading route {:?}", gpx_file))?;

    let (event_tx, event_rx) = provider_channel();
    let provider = SimulatedProvider::new(route, initial, grant, interval, event_tx);
    let mut tracker = LocationTracker::new(provider, config);

    let fixes = tracker.subscribe_fixes();
    let mut notices = tracker.subscribe_notices();

    if let TrackingAction::Notify(notice) = tracker.request_tracking_start() {
        println!("Tracking unavailable: {}", notice);
        return Ok(());
    }

    let mut controller = MapController::new(config.region_span_m);
    if free {
        controller.toggle_view_mode();
    }
    controller.start_session(Utc::now());

    // Kept alive so the controller keeps listening for button presses
    let (_command_tx, command_rx) = mpsc::channel(8);
    let (update_tx, mut update_rx) = mpsc::channel(config.update_buffer);
    let controller = tokio::spawn(controller.run(fixes, command_rx, update_tx));

    let presenter = tokio::spawn(async move {
        let mut polyline = LineString::new(Vec::new());
        while let Some(update) = update_rx.recv().await {
            if let Some(vertex) = update.path_vertex {
                polyline.0.push(vertex.into());
            }
            if let Some(statistics) = update.statistics {
                tracing::info!("{}", statistics);
            }
            if let Some(region) = update.recenter {
                tracing::debug!("Centering map on ({}, {})", region.center.y(), region.center.x());
            }
        }
        polyline
    });

    let notice_log = tokio::spawn(async move {
        let mut count = 0;
        while let Ok(notice) = notices.recv().await {
            if notice.is_permission() {
                tracing::warn!("Tracking unavailable: {}", notice);
            } else {
                tracing::error!("Notice: {}", notice);
            }
            count += 1;
        }
        count
    });

    tracker.run(event_rx).await;

    let summary = controller.await?;
    let polyline = presenter.await?;
    tracing::info!("Drew {} path vertices, {:.1}m", polyline.0.len(), path_length(&polyline));
    let notice_count = notice_log.await?;

    match summary {
        Some(summary) if json => println!("{}", serde_json::to_string_pretty(&summary)?),
        Some(summary) => println!("{}", summary),
        None => println!("No session recorded"),
    }
    if notice_count > 0 {
        println!("{} notice(s) reported", notice_count);
    }

    Ok(())
}
