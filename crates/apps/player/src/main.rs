use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use playback::{PlaybackOutcome, SceneOptions, TripScene};
use routing::{DEFAULT_OSRM_URL, OfflineRouter, OsrmRouter, RoadRouter};
use scene::{Viewport, World};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use trip::{Mode, RouteProfile, Stop, build_segments, validate_stops};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless trip playback")]
struct Args {
    /// Road router base URL (default: TRIP_ROUTER_URL or the public OSRM demo)
    #[arg(long)]
    router_url: Option<String>,

    /// Give up on a road lookup after this many milliseconds
    #[arg(long, default_value_t = 10_000)]
    router_timeout_ms: u64,

    /// Never call the road router; ground legs fly arcs
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a trip against the headless renderer
    Play {
        /// Trip file: {"stops": [...], "modes": [...]}
        #[arg(long)]
        trip: PathBuf,

        /// Scene options JSON; missing fields keep their defaults
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Preset::Globe)]
        preset: Preset,

        /// Basemap key (satellite, light, dark, terrain)
        #[arg(long)]
        basemap: Option<String>,

        /// Host frame rate
        #[arg(long, default_value_t = 60.0)]
        fps: f64,

        /// Sleep between frames instead of running as fast as possible
        #[arg(long)]
        realtime: bool,

        /// Write the final frame as PNG
        #[arg(long)]
        export: Option<PathBuf>,

        /// Output size, WIDTHxHEIGHT
        #[arg(long, default_value = "1280x720")]
        size: String,
    },

    /// Build the legs of a trip and print them as JSON
    Route {
        #[arg(long)]
        trip: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Debug, Copy, Clone)]
enum Preset {
    Globe,
    FlatMap,
}

#[derive(Deserialize, Debug)]
struct TripFile {
    stops: Vec<Stop>,
    #[serde(default)]
    modes: Vec<Mode>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let router: Box<dyn RoadRouter> = if args.offline {
        Box::new(OfflineRouter)
    } else {
        let url = args.router_url.unwrap_or_else(|| {
            env::var("TRIP_ROUTER_URL").unwrap_or_else(|_| DEFAULT_OSRM_URL.to_string())
        });
        Box::new(OsrmRouter::new(url).with_timeout(Duration::from_millis(args.router_timeout_ms)))
    };

    match args.command {
        Command::Play {
            trip,
            config,
            preset,
            basemap,
            fps,
            realtime,
            export,
            size,
        } => {
            let mut options = load_options(config.as_deref(), preset).await?;
            if let Some(key) = basemap {
                options.basemap = scene::Basemap::from_key(&key);
            }
            let viewport = parse_size(&size)?;
            play(&trip, options, router.as_ref(), fps, realtime, export.as_deref(), viewport).await?
        }
        Command::Route { trip, config } => {
            let options = load_options(config.as_deref(), Preset::Globe).await?;
            route(&trip, &options.route, router.as_ref()).await?
        }
    }

    Ok(())
}

async fn load_trip(path: &Path) -> Result<TripFile, Box<dyn std::error::Error>> {
    let text = tokio::fs::read_to_string(path).await?;
    let trip: TripFile = serde_json::from_str(&text)?;
    validate_stops(&trip.stops)?;
    Ok(trip)
}

async fn load_options(
    path: Option<&Path>,
    preset: Preset,
) -> Result<SceneOptions, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        let text = tokio::fs::read_to_string(path).await?;
        return Ok(SceneOptions::from_json(&text)?);
    }
    Ok(match preset {
        Preset::Globe => SceneOptions::default(),
        Preset::FlatMap => SceneOptions::flat_map(),
    })
}

fn parse_size(size: &str) -> Result<Viewport, Box<dyn std::error::Error>> {
    let (w, h) = size
        .split_once('x')
        .ok_or_else(|| format!("size must look like 1280x720, got {size:?}"))?;
    Ok(Viewport {
        width: w.trim().parse()?,
        height: h.trim().parse()?,
    })
}

async fn play(
    trip_path: &Path,
    options: SceneOptions,
    router: &dyn RoadRouter,
    fps: f64,
    realtime: bool,
    export: Option<&Path>,
    viewport: Viewport,
) -> Result<(), Box<dyn std::error::Error>> {
    let trip = load_trip(trip_path).await?;
    let dt = 1.0 / fps.max(1.0);

    let mut scene = TripScene::create(
        World::with_viewport(viewport),
        trip.stops,
        trip.modes,
        options,
        router,
    )
    .await?;

    let completion = scene.play(|arrival| {
        info!(
            leg = arrival.leg_index,
            city = %arrival.stop.city,
            country = %arrival.stop.country,
            km = arrival.km.round(),
            "arrived"
        );
    });

    let mut frames = 0u64;
    while scene.tick(dt) {
        frames += 1;
        if realtime {
            tokio::time::sleep(Duration::from_secs_f64(dt)).await;
        }
    }

    let outcome = completion.wait().await;
    info!(?outcome, frames, seconds = frames as f64 * dt, "playback finished");

    if let Some(path) = export {
        let image = scene.export_frame()?;
        tokio::fs::write(path, &image.png).await?;
        info!(path = %path.display(), width = image.width, height = image.height, "exported frame");
    }
    scene.destroy();

    if outcome != PlaybackOutcome::Completed {
        return Err(format!("playback ended with {outcome:?}").into());
    }
    Ok(())
}

async fn route(
    trip_path: &Path,
    profile: &RouteProfile,
    router: &dyn RoadRouter,
) -> Result<(), Box<dyn std::error::Error>> {
    let trip = load_trip(trip_path).await?;
    let segments = build_segments(&trip.stops, &trip.modes, profile, router).await;
    let summary: Vec<_> = segments
        .iter()
        .enumerate()
        .map(|(i, segment)| segment.summary(i))
        .collect();
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
