use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use expedition::{
    config::{ConfigLoader, GameConfig},
    engine::{Command, EngineBuilder},
    session::GameState,
    stats::{format_clock, Weather},
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Expedition Antarctica survival game")]
struct Cli {
    #[command(subcommand)]
    command: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Play a headless run for a fixed number of frames
    Run(RunArgs),
    /// Serve the browser front end
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
struct Overrides {
    /// Path to the game config YAML file
    #[arg(long, default_value = "configs/antarctica.yaml")]
    config: PathBuf,

    /// Override the config seed (entropy when neither is set)
    #[arg(long)]
    seed: Option<u64>,

    /// Override the session weather: clear, snow or blizzard
    #[arg(long)]
    weather: Option<Weather>,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    overrides: Overrides,

    /// Frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Simulated frames per second
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Keys held for the whole run, comma separated (e.g. "d,Shift")
    #[arg(long, value_delimiter = ',')]
    hold: Vec<String>,
}

#[derive(Debug, Args)]
struct ServeArgs {
    #[command(flatten)]
    overrides: Overrides,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Frames per second pushed to the browser
    #[arg(long, default_value_t = 60.0)]
    fps: f64,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("expedition=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

fn load_config(overrides: &Overrides) -> Result<(GameConfig, u64)> {
    let loader = ConfigLoader::new(".");
    let mut config = loader.load(&overrides.config)?;
    if let Some(weather) = overrides.weather {
        config.weather = weather;
    }
    let seed = overrides
        .seed
        .or(config.seed)
        .unwrap_or_else(rand::random::<u64>);
    Ok((config, seed))
}

fn frame_duration(fps: f64) -> Result<Duration> {
    if !(fps.is_finite() && fps > 0.0) {
        bail!("--fps must be positive, got {fps}");
    }
    Ok(Duration::from_secs_f64(1.0 / fps))
}

fn run(args: RunArgs) -> Result<()> {
    let (config, seed) = load_config(&args.overrides)?;
    let dt = frame_duration(args.fps)?;
    let mut engine = EngineBuilder::standard(&config, seed).build();
    let mut session = engine.create_session(&config);
    info!(name = %config.name, seed, weather = ?config.weather, "headless run");

    engine.command(&mut session, Command::Start);
    for key in &args.hold {
        let held = engine.command(
            &mut session,
            Command::Key {
                key: key.clone(),
                pressed: true,
            },
        );
        if !held {
            warn!(key = %key, "not a game key, ignoring");
        }
    }

    let mut ended_at = None;
    engine
        .run_with_hook(&mut session, args.frames, dt, |frame| {
            if ended_at.is_none() && frame.state == GameState::GameOver {
                ended_at = Some(frame.frame);
            }
        })
        .context("headless run failed")?;

    let stats = session.stats();
    match (session.final_report(), ended_at) {
        (Some(report), Some(frame)) => println!(
            "Expedition lost at frame {frame}. Survived {}, research {}, score {}",
            report.time, report.research, report.score
        ),
        _ => println!(
            "Expedition '{}' ran {} frames ({} ticks). Time {}, health {:.1}, warmth {:.1}, stamina {:.1}, research {}",
            config.name,
            engine.current_frame(),
            engine.current_tick(),
            format_clock(stats.survival_time),
            stats.health,
            stats.warmth,
            stats.stamina,
            stats.research
        ),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Mode::Run(args) => run(args),
        Mode::Serve(args) => {
            let (config, seed) = load_config(&args.overrides)?;
            let frame_interval = frame_duration(args.fps)?;
            web::run(WebServerConfig {
                config,
                seed,
                host: args.host,
                port: args.port,
                frame_interval,
            })
            .await
        }
    }
}
