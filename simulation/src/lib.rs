#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame-driven facade over the Lane Defence world and its systems.
//!
//! A [`Simulation`] owns the authoritative world, the wave director and the
//! frame clock. Presentation layers call [`Simulation::tick`] once per frame
//! and translate player input into the intent methods. Every intent is
//! resolved synchronously before the call returns.

mod clock;

use std::time::Duration;

use glam::Vec2;
use lane_defence_core::{
    Catalog, Command, ConfigurationError, EnemyView, Event, GameStatus, Gold, Health,
    PlacementError, ProjectileView, SaleError, Scenario, TowerId, TowerView, UpgradeError,
    WaveSchedule, WaveStatus,
};
use lane_defence_system_wave_director::WaveDirector;
use lane_defence_world::{self as world, query, PathModel, World};
use log::{debug, info};

use clock::FrameClock;

pub use clock::{MAX_SPEED, MIN_SPEED};

/// Single-threaded game session.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    director: WaveDirector,
    schedule: WaveSchedule,
    clock: FrameClock,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Simulation {
    /// Builds a session from a loaded scenario.
    pub fn new(scenario: Scenario) -> Result<Self, ConfigurationError> {
        let Scenario {
            catalog,
            path,
            schedule,
            rules,
        } = scenario;
        let clock = FrameClock::new(rules.max_frame_dt);
        let world = World::new(catalog, path, rules)?;
        info!(
            "{} {} waves scheduled",
            query::welcome_banner(&world),
            schedule.len()
        );
        Ok(Self {
            world,
            director: WaveDirector::new(),
            schedule,
            clock,
            commands: Vec::new(),
            events: Vec::new(),
        })
    }

    /// Advances the session by one rendered frame.
    ///
    /// The frame delta is clamped and scaled by the speed multiplier. The
    /// wave director runs first, then enemies, towers and projectiles. Once
    /// the session has been won or lost no further time elapses and the
    /// returned slice is empty.
    pub fn tick(&mut self, frame_dt: Duration) -> &[Event] {
        self.events.clear();
        if query::status(&self.world) != GameStatus::Ongoing {
            return &self.events;
        }

        let dt = self.clock.scale(frame_dt);
        self.commands.clear();
        self.director.handle(dt, &self.schedule, &mut self.commands);
        self.commands.push(Command::Tick { dt });
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
        &self.events
    }

    /// Places a tower centred on `position`.
    pub fn place_tower(
        &mut self,
        template: &str,
        position: Vec2,
    ) -> Result<TowerId, PlacementError> {
        let events = self.intent(Command::PlaceTower {
            template: template.to_owned(),
            position,
        });
        events
            .into_iter()
            .find_map(|event| match event {
                Event::TowerPlaced { tower, .. } => Some(Ok(tower)),
                Event::TowerPlacementRejected { reason, .. } => Some(Err(reason)),
                _ => None,
            })
            .unwrap_or(Err(PlacementError::UnknownTemplate))
    }

    /// Sells a tower and returns the credited refund.
    pub fn sell_tower(&mut self, tower: TowerId) -> Result<Gold, SaleError> {
        let events = self.intent(Command::SellTower { tower });
        events
            .into_iter()
            .find_map(|event| match event {
                Event::TowerSold { refund, .. } => Some(Ok(refund)),
                Event::TowerSaleRejected { reason, .. } => Some(Err(reason)),
                _ => None,
            })
            .unwrap_or(Err(SaleError::MissingTower))
    }

    /// Purchases the next upgrade tier and returns the level reached.
    pub fn upgrade_tower(&mut self, tower: TowerId) -> Result<usize, UpgradeError> {
        let events = self.intent(Command::UpgradeTower { tower });
        events
            .into_iter()
            .find_map(|event| match event {
                Event::TowerUpgraded { level, .. } => Some(Ok(level)),
                Event::TowerUpgradeRejected { reason, .. } => Some(Err(reason)),
                _ => None,
            })
            .unwrap_or(Err(UpgradeError::MissingTower))
    }

    /// Cuts the pause before the next wave short.
    ///
    /// Only allowed between waves while no enemy is alive; returns whether
    /// the countdown was forced.
    pub fn skip_wave(&mut self) -> bool {
        let skipped = self
            .director
            .skip_wave(query::live_enemy_count(&self.world));
        if skipped {
            debug!(
                "pause before wave {} skipped",
                self.director.wave().saturating_add(1)
            );
        }
        skipped
    }

    /// Changes the speed multiplier, clamped into `MIN_SPEED..=MAX_SPEED`.
    pub fn set_speed(&mut self, speed: u32) -> u32 {
        self.clock.set_speed(speed)
    }

    fn intent(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        events
    }

    /// Current speed multiplier.
    #[must_use]
    pub fn speed(&self) -> u32 {
        self.clock.speed()
    }

    /// Banner adapters may show on startup.
    #[must_use]
    pub fn welcome_banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    /// Currency available to the player.
    #[must_use]
    pub fn gold(&self) -> Gold {
        query::gold(&self.world)
    }

    /// Remaining base health.
    #[must_use]
    pub fn base_health(&self) -> Health {
        query::base_health(&self.world)
    }

    /// Health the base started with.
    #[must_use]
    pub fn base_max_health(&self) -> Health {
        query::base_max_health(&self.world)
    }

    /// One-based number of the current wave, zero before the first wave.
    #[must_use]
    pub fn wave(&self) -> u32 {
        self.director.wave()
    }

    /// Detailed state of the wave director.
    #[must_use]
    pub fn wave_status(&self) -> WaveStatus {
        self.director.status()
    }

    /// Outcome of the session so far.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        query::status(&self.world)
    }

    /// Snapshot of the enemies on the path.
    #[must_use]
    pub fn enemies(&self) -> EnemyView {
        query::enemy_view(&self.world)
    }

    /// Snapshot of the placed towers.
    #[must_use]
    pub fn towers(&self) -> TowerView {
        query::tower_view(&self.world)
    }

    /// Snapshot of the projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> ProjectileView {
        query::projectile_view(&self.world)
    }

    /// Path followed by every enemy.
    #[must_use]
    pub fn path(&self) -> &PathModel {
        query::path(&self.world)
    }

    /// Templates the session was built with.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        query::catalog(&self.world)
    }
}
