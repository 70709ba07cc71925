use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tilegen_geom::Vec2;
use tilegen_rules::config::load_rule_sets_from_path;
use tilegen_runtime::{ClearPolicy, RecordingHost, Speed, TilemapGenerator};
use tilegen_world::worldgen::Mode;
use tilegen_world::{WorldGenConfig, load_config_from_path};

mod canvas;
mod snapshot;
mod watch;

#[derive(Parser, Debug)]
#[command(name = "tilegen")]
#[command(about = "Procedural 2D tile-world generator")]
struct Cli {
    /// World description (TOML)
    #[arg(short, long, default_value = "assets/worlds/default.toml")]
    config: PathBuf,

    /// Extra rule-set files; their sets replace same-named ones in the world config
    #[arg(short, long)]
    rules: Vec<PathBuf>,

    /// Worker threads for generation passes (defaults to the global rayon pool)
    #[arg(long)]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one window and print it.
    Render {
        /// Window centre, world x (defaults to the configured static position)
        #[arg(short, long)]
        x: Option<f32>,

        /// Window centre, world y
        #[arg(short, long)]
        y: Option<f32>,

        /// Window side in cells (defaults to the configured size)
        #[arg(short, long)]
        size: Option<i32>,

        #[arg(long, value_enum, default_value = "immediate")]
        speed: SpeedArg,

        /// Also write the placed tiles as TOML
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Skip the ASCII picture
        #[arg(short, long)]
        quiet: bool,
    },
    /// Walk a focus through an infinite world, streaming tiles as it goes.
    Walk {
        #[arg(long, default_value = "240")]
        ticks: usize,

        /// Focus velocity in world units per second
        #[arg(long, default_value = "6.0")]
        dx: f32,

        #[arg(long, default_value = "0.0")]
        dy: f32,

        /// Seconds per tick
        #[arg(long, default_value = "0.033")]
        dt: f32,

        #[arg(short, long)]
        quiet: bool,
    },
    /// Regenerate and reprint whenever the config file changes.
    Watch,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SpeedArg {
    Immediate,
    Budgeted,
}

impl From<SpeedArg> for Speed {
    fn from(s: SpeedArg) -> Self {
        match s {
            SpeedArg::Immediate => Speed::Immediate,
            SpeedArg::Budgeted => Speed::Budgeted,
        }
    }
}

fn load(cli: &Cli) -> Result<WorldGenConfig, Box<dyn Error>> {
    let mut cfg = load_config_from_path(&cli.config)?;
    for path in &cli.rules {
        cfg.merge_rule_sets(load_rule_sets_from_path(path)?);
    }
    Ok(cfg)
}

fn build(
    cli: &Cli,
    cfg: &WorldGenConfig,
) -> Result<TilemapGenerator<RecordingHost>, Box<dyn Error>> {
    let generator = TilemapGenerator::new(cfg, RecordingHost::new())?;
    Ok(match cli.workers {
        Some(n) => generator.with_workers(n)?,
        None => generator,
    })
}

/// Runs ticks until nothing is pending. Returns the tick count.
fn drain(generator: &mut TilemapGenerator<RecordingHost>, dt: f32) -> usize {
    let mut ticks = 0;
    while !generator.is_idle() {
        generator.advance(dt);
        ticks += 1;
    }
    ticks
}

fn render(
    cli: &Cli,
    x: Option<f32>,
    y: Option<f32>,
    size: Option<i32>,
    speed: SpeedArg,
    out: Option<&PathBuf>,
    quiet: bool,
) -> Result<(), Box<dyn Error>> {
    let cfg = load(cli)?;
    let mut generator = build(cli, &cfg)?;
    let origin = generator.catalog().static_position;
    let center = Vec2::new(x.unwrap_or(origin.x), y.unwrap_or(origin.y));
    let size = size.unwrap_or(generator.catalog().size);
    let report = generator.generate_centered(center, size, speed.into(), ClearPolicy::NoClear);
    let ticks = drain(&mut generator, 1.0 / 60.0);
    if ticks > 0 {
        log::info!("streamed in {ticks} ticks");
    }
    log::info!("{:?}", report.stats);

    let host = generator.host();
    if !quiet {
        print!("{}", canvas::render(host));
    }
    println!(
        "{} tiles placed, {} with colliders",
        host.tiles.len(),
        host.colliders()
    );
    if let Some(path) = out {
        snapshot::write_snapshot(host, path)?;
    }
    Ok(())
}

fn walk(
    cli: &Cli,
    ticks: usize,
    velocity: Vec2,
    dt: f32,
    quiet: bool,
) -> Result<(), Box<dyn Error>> {
    let mut cfg = load(cli)?;
    if cfg.mode != Mode::Infinite {
        log::info!("switching {:?} to infinite mode for the walk", cli.config);
        cfg.mode = Mode::Infinite;
    }
    let mut generator = build(cli, &cfg)?;
    let mut focus = generator.catalog().static_position;
    generator.set_focus(Some(focus));
    generator.start();

    let (mut placed, mut removed, mut regenerations) = (0, 0, 0);
    for _ in 0..ticks {
        focus += velocity * dt;
        generator.set_focus(Some(focus));
        let tick = generator.advance(dt);
        placed += tick.placed;
        removed += tick.removed;
        if tick.regenerated {
            regenerations += 1;
            log::debug!("regenerated around ({:.1}, {:.1})", focus.x, focus.y);
        }
    }
    let tail = drain(&mut generator, dt);

    if !quiet {
        print!("{}", canvas::render(generator.host()));
    }
    println!(
        "walked to ({:.1}, {:.1}): {regenerations} regenerations, {placed} placed, {removed} removed, {tail} ticks to settle",
        focus.x, focus.y
    );
    Ok(())
}

fn watch(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let cfg = load(cli)?;
    let mut generator = build(cli, &cfg)?;
    if generator.start().is_some() {
        drain(&mut generator, 1.0 / 60.0);
        print!("{}", canvas::render(generator.host()));
    } else {
        log::info!("generate_on_start is off; waiting for a config change");
    }

    let watcher = watch::ConfigWatcher::new(&cli.config)?;
    log::info!("watching {:?}", cli.config);
    while watcher.wait(Duration::from_millis(150)) {
        let cfg = match load(cli) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("config reload failed: {e}");
                continue;
            }
        };
        if let Err(e) = generator.set_config(&cfg) {
            log::warn!("config rejected: {e}");
            continue;
        }
        generator.generate(Speed::Immediate, ClearPolicy::NoClear);
        print!("{}", canvas::render(generator.host()));
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match &cli.command {
        None => render(&cli, None, None, None, SpeedArg::Immediate, None, false),
        Some(Command::Render {
            x,
            y,
            size,
            speed,
            out,
            quiet,
        }) => render(&cli, *x, *y, *size, *speed, out.as_ref(), *quiet),
        Some(Command::Walk {
            ticks,
            dx,
            dy,
            dt,
            quiet,
        }) => walk(&cli, *ticks, Vec2::new(*dx, *dy), *dt, *quiet),
        Some(Command::Watch) => watch(&cli),
    }
}
