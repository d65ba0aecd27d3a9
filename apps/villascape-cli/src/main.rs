use clap::{Parser, Subcommand};
use std::fmt::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use villascape_kernel::{SceneConfig, SceneContext, SunCycle};
use villascape_render::{DebugTextRenderer, FrameDriver, RenderView, Renderer, StaticView};
use villascape_tools::SceneInspector;

#[derive(Parser)]
#[command(name = "villascape-cli", about = "Headless tool for the villa scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the sun state for one hour, or a table for the whole day
    Sun {
        /// Hour of day in [0, 24]
        #[arg(long)]
        hour: Option<f32>,
    },
    /// Build the scene and drive it headless for a number of frames
    Run {
        /// Number of frames to drive
        #[arg(short, long, default_value = "10")]
        ticks: u64,
        /// Hour of day (overrides the config)
        #[arg(long)]
        hour: Option<f32>,
        /// Placement seed (overrides the config)
        #[arg(short, long)]
        seed: Option<u64>,
        /// Scene config file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Simulated frame length in milliseconds
        #[arg(long, default_value = "16")]
        frame_ms: u64,
        /// List every part in the final frame
        #[arg(long)]
        parts: bool,
    },
    /// Print the default scene config as JSON
    Config,
}

/// One line per whole hour with the model's light position and intensity.
fn sun_table(cycle: &SunCycle) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "hour      x       y       z   intensity");
    for hour in 0..=24 {
        let state = cycle.state_at(hour as f32);
        let p = state.position;
        let _ = writeln!(
            out,
            "{hour:>4} {:>7.2} {:>7.2} {:>7.2} {:>9.2}",
            p.x, p.y, p.z, state.intensity
        );
    }
    out
}

fn load_config(
    path: Option<&PathBuf>,
    seed: Option<u64>,
    hour: Option<f32>,
) -> anyhow::Result<SceneConfig> {
    let mut config = match path {
        Some(path) => SceneConfig::from_json_file(path)?,
        None => SceneConfig::default(),
    };
    if seed.is_some() {
        config.seed = seed;
    }
    if let Some(hour) = hour {
        config.start_hour.0 = hour;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("villascape-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", villascape_render::crate_info());
            let config = SceneConfig::default();
            println!(
                "defaults: {} houses, trees every {} in [{}, {}], sun radius {}",
                config.houses.count,
                config.trees.step,
                config.trees.min,
                config.trees.max,
                config.sun.radius
            );
        }
        Commands::Sun { hour } => {
            let cycle = SunCycle::default();
            match hour {
                Some(hour) => {
                    let state = cycle.state_at(hour);
                    let p = state.position;
                    println!(
                        "hour={hour:.2} position=({:.3}, {:.3}, {:.3}) intensity={:.3}",
                        p.x, p.y, p.z, state.intensity
                    );
                }
                None => print!("{}", sun_table(&cycle)),
            }
        }
        Commands::Run {
            ticks,
            hour,
            seed,
            config,
            frame_ms,
            parts,
        } => {
            let config = load_config(config.as_ref(), seed, hour)?;
            let mut ctx = SceneContext::build(&config)?;
            let mut driver = FrameDriver::new();
            let dt = Duration::from_millis(frame_ms);
            let renderer = if parts {
                DebugTextRenderer::verbose()
            } else {
                DebugTextRenderer::new()
            };

            let mut last = None;
            for _ in 0..ticks {
                last = Some(driver.tick(&mut ctx, dt, &mut StaticView, &renderer));
            }
            let frame =
                last.unwrap_or_else(|| renderer.render(&ctx.scene, &RenderView::from(&ctx.camera)));
            print!("{frame}");
            println!("{}", SceneInspector::summary(&ctx));
            let tracked = [
                SceneInspector::sun(&ctx),
                SceneInspector::inspect_part(&ctx, ctx.cloud_part()),
            ];
            for part in tracked.into_iter().flatten() {
                println!("{part}");
            }
        }
        Commands::Config => {
            println!("{}", SceneConfig::default().to_json_pretty()?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sun_table_covers_the_day() {
        let table = sun_table(&SunCycle::default());
        assert_eq!(table.lines().count(), 26);
        assert!(table.lines().nth(13).unwrap().trim_start().starts_with("12"));
    }

    #[test]
    fn flags_override_defaults() {
        let config = load_config(None, Some(4), Some(7.5)).unwrap();
        assert_eq!(config.seed, Some(4));
        assert_eq!(config.start_hour.0, 7.5);
        assert_eq!(config.houses, SceneConfig::default().houses);
    }

    #[test]
    fn run_command_parses() {
        let cli = Cli::parse_from(["villascape-cli", "run", "--ticks", "5", "--seed", "1"]);
        assert!(matches!(
            cli.command,
            Commands::Run {
                ticks: 5,
                seed: Some(1),
                ..
            }
        ));
    }
}
