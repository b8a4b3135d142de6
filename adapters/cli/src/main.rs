#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Lane Defence scenario headlessly.

mod placement;

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use lane_defence_core::{Event, GameStatus};
use lane_defence_simulation::{Simulation, MAX_SPEED, MIN_SPEED};
use log::{debug, info, warn};

use placement::TowerPlacement;

/// Plays a Lane Defence scenario without a window and prints the outcome.
#[derive(Debug, Parser)]
#[command(name = "lane-defence", version, about)]
struct Cli {
    /// Scenario document, either `.json` or `.toml`.
    #[arg(long, default_value = "assets/templates.json")]
    config: PathBuf,
    /// Wall-clock seconds to simulate.
    #[arg(long, default_value_t = 300.0)]
    duration: f32,
    /// Frames rendered per wall-clock second.
    #[arg(long, default_value_t = 60)]
    fps: u32,
    /// Speed multiplier applied to every frame.
    #[arg(
        long,
        default_value_t = MIN_SPEED,
        value_parser = clap::value_parser!(u32).range(i64::from(MIN_SPEED)..=i64::from(MAX_SPEED))
    )]
    speed: u32,
    /// Tower to build before the first frame, as `Name@x,y`. May be repeated.
    #[arg(long = "tower", value_name = "NAME@X,Y")]
    towers: Vec<TowerPlacement>,
    /// Skip the pause between waves whenever the field is clear.
    #[arg(long)]
    skip_waves: bool,
    /// Buy every affordable upgrade after each completed wave.
    #[arg(long)]
    auto_upgrade: bool,
    /// Overrides the scenario's random seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Default)]
struct Tally {
    kills: u32,
    leaks: u32,
    waves: u32,
}

impl Tally {
    fn record(&mut self, event: &Event) -> bool {
        match event {
            Event::EnemyKilled { .. } => self.kills += 1,
            Event::EnemyLeaked { enemy, damage } => {
                self.leaks += 1;
                debug!("enemy {} leaked {} damage", enemy.get(), damage.get());
            }
            Event::WaveCompleted {
                wave,
                reward,
                income,
            } => {
                self.waves += 1;
                info!(
                    "wave {wave} completed, reward {} and income {}",
                    reward.get(),
                    income.get()
                );
                return true;
            }
            Event::EnemySpawnRejected { template, error } => {
                warn!("could not spawn {template}: {error}");
            }
            _ => {}
        }
        false
    }
}

/// Entry point for the Lane Defence command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    ensure!(cli.fps > 0, "--fps must be positive");
    ensure!(
        cli.duration.is_finite() && cli.duration >= 0.0,
        "--duration must be a non-negative number of seconds"
    );

    let mut scenario = lane_defence_config::load(&cli.config)
        .with_context(|| format!("failed to load scenario from {}", cli.config.display()))?;
    if let Some(seed) = cli.seed {
        scenario.rules.rng_seed = seed;
    }
    let mut simulation = Simulation::new(scenario).context("scenario cannot be played")?;
    println!("{}", simulation.welcome_banner());
    let _ = simulation.set_speed(cli.speed);

    for placement in &cli.towers {
        match simulation.place_tower(&placement.template, placement.position) {
            Ok(tower) => info!("placed {placement} as tower {}", tower.get()),
            Err(reason) => warn!("could not place {placement}: {reason}"),
        }
    }

    let frame = Duration::from_secs_f64(1.0 / f64::from(cli.fps));
    let frames = (f64::from(cli.duration) * f64::from(cli.fps)).round() as u64;
    let mut tally = Tally::default();
    for _ in 0..frames {
        let mut wave_completed = false;
        for event in simulation.tick(frame) {
            wave_completed |= tally.record(event);
        }
        if wave_completed && cli.auto_upgrade {
            upgrade_all(&mut simulation);
        }
        if cli.skip_waves {
            let _ = simulation.skip_wave();
        }
        if simulation.status() != GameStatus::Ongoing {
            break;
        }
    }

    print_summary(&simulation, &tally);
    Ok(())
}

fn upgrade_all(simulation: &mut Simulation) {
    let towers: Vec<_> = simulation.towers().iter().map(|tower| tower.id).collect();
    for tower in towers {
        while let Ok(level) = simulation.upgrade_tower(tower) {
            info!("tower {} upgraded to level {level}", tower.get());
        }
    }
}

fn print_summary(simulation: &Simulation, tally: &Tally) {
    let outcome = match simulation.status() {
        GameStatus::Ongoing => "still running",
        GameStatus::Victory => "victory",
        GameStatus::Defeat => "defeat",
    };
    println!("Outcome: {outcome}");
    println!("Wave: {} ({} completed)", simulation.wave(), tally.waves);
    println!(
        "Base: {}/{}",
        simulation.base_health().get(),
        simulation.base_max_health().get()
    );
    println!("Gold: {}", simulation.gold().get());
    println!("Kills: {} Leaks: {}", tally.kills, tally.leaks);
    for tower in simulation.towers().iter() {
        println!(
            "  {} #{} at ({}, {}) level {}/{} dealt {}",
            tower.template,
            tower.id.get(),
            tower.position.x,
            tower.position.y,
            tower.level,
            tower.max_level,
            tower.total_damage
        );
    }
}
