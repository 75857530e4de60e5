use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use pace_tracker_lib::Command;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracker::{
    config::TrackerConfig,
    controller::SessionController,
    display::{format_status, ConsoleDisplay},
    event, gpx_util, logging,
    provider::GpxReplayProvider,
    runtime,
    ticker::IntervalTicker,
};

const HELP: &str = "commands: start, pause, resume, stop, status, quit";

/// Replays a GPX route as a live location feed and tracks time, distance
/// and pace of one activity.
#[derive(Parser, Debug)]
#[clap(version, about)]
struct Cli {
    /// GPX file to replay as the location feed
    #[clap(short, long)]
    gpx: PathBuf,

    /// JSON config file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// playback rate of the route, overrides the config
    #[clap(short = 's', long)]
    replay_speed: Option<f64>,

    /// directory for tracker.log, overrides the config
    #[clap(long)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut TrackerConfig) {
        if let Some(speed) = self.replay_speed {
            config.replay_speed = speed;
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = dir.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = TrackerConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate(cli.config.as_deref().unwrap_or(Path::new("<command line>")))?;

    logging::init(&config.log_dir).context("failed to set up logging")?;
    tracing::info!("Starting pace tracker...");

    let route = gpx_util::read_gpx(&cli.gpx)?;
    let point_count = route.points.len();
    let (events_tx, events_rx) = event::channel();
    let provider = GpxReplayProvider::new(route.points, config.replay_speed, events_tx.clone());
    tracing::info!(
        "Loaded route {:?}, {:.0} m over {} points",
        route.title,
        provider.route_length_meters(),
        point_count
    );
    let ticker = IntervalTicker::new(events_tx.clone());
    let display = ConsoleDisplay::new(std::io::stdout());
    let controller = SessionController::new(provider, ticker, display, config.watch.clone());

    let (handle, task) = runtime::spawn(controller, events_tx, events_rx);

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "status" => println!("{}", format_status(&handle.status())),
            "help" => println!("{HELP}"),
            input => match input.parse::<Command>() {
                Ok(command) => handle.command(command),
                Err(err) => println!("{err}, {HELP}"),
            },
        }
    }

    handle.shutdown();
    let controller = task.await.context("session task panicked")?;
    tracing::info!("Final {}", format_status(&controller.status()));

    Ok(())
}
