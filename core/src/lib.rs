#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then reports [`Event`] values
//! describing what actually happened. Read access flows through immutable
//! snapshot views such as [`EnemyView`] and [`TowerView`].

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod templates;

pub use templates::{
    default_path, Burst, Catalog, DamageType, DeathSpawnCapability, EnemyTemplate, Rules,
    Scenario, SpawnerCapability, TargetingMode, TowerTemplate, UpgradeTier, Wave, WaveSchedule,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Lane Defence.";

/// Percentage of the total upgrade spend that is added to a tower's resale value.
pub const UPGRADE_RESALE_PERCENT: i64 = 70;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances enemies, towers and projectiles by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a fresh enemy enter the path at its first waypoint.
    SpawnEnemy {
        /// Name of the enemy template to instantiate.
        template: String,
    },
    /// Requests placement of a tower centred on the provided position.
    PlaceTower {
        /// Name of the tower template to construct.
        template: String,
        /// Centre of the tower footprint in world units.
        position: Vec2,
    },
    /// Requests that a tower be sold for its resale value.
    SellTower {
        /// Identifier of the tower being sold.
        tower: TowerId,
    },
    /// Requests that a tower purchase the next tier of its upgrade ladder.
    UpgradeTower {
        /// Identifier of the tower being upgraded.
        tower: TowerId,
    },
    /// Pays out the reward of a finished wave plus the income of income towers.
    CompleteWave {
        /// One-based number of the wave that just finished.
        wave: u32,
        /// Currency granted for surviving the wave.
        reward: Gold,
    },
    /// Signals that the wave schedule has been exhausted.
    ConcludeSchedule,
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the world.
    EnemySpawned {
        /// Identifier assigned to the new enemy.
        enemy: EnemyId,
        /// Template the enemy was built from.
        template: String,
        /// Reason the enemy exists.
        origin: SpawnOrigin,
    },
    /// Reports that a spawn was aborted because its template could not be resolved.
    EnemySpawnRejected {
        /// Template name that was requested.
        template: String,
        /// Configuration problem that prevented the spawn.
        error: ConfigurationError,
    },
    /// Confirms that an enemy's health reached zero.
    EnemyKilled {
        /// Identifier of the enemy that died.
        enemy: EnemyId,
        /// Template the enemy was built from.
        template: String,
    },
    /// Confirms that an enemy reached the end of the path.
    EnemyLeaked {
        /// Identifier of the enemy that leaked.
        enemy: EnemyId,
        /// Health the enemy still carried, which is applied to the base.
        damage: Health,
    },
    /// Reports that the base lost health.
    BaseDamaged {
        /// Health removed from the base, after clamping at zero.
        amount: u32,
        /// Health remaining after the hit.
        remaining: Health,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Template the tower was built from.
        template: String,
        /// Centre of the tower footprint.
        position: Vec2,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Template requested for placement.
        template: String,
        /// Position provided in the placement request.
        position: Vec2,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower purchased an upgrade tier.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Level reached after the upgrade.
        level: usize,
    },
    /// Reports that an upgrade request was rejected.
    TowerUpgradeRejected {
        /// Identifier of the tower targeted by the request.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that a tower was sold.
    TowerSold {
        /// Identifier of the tower that was removed.
        tower: TowerId,
        /// Currency credited for the sale.
        refund: Gold,
    },
    /// Reports that a sale request was rejected.
    TowerSaleRejected {
        /// Identifier of the tower targeted by the request.
        tower: TowerId,
        /// Specific reason the sale failed.
        reason: SaleError,
    },
    /// Confirms that a tower discharged against a primary target.
    TowerFired {
        /// Identifier of the tower that fired.
        tower: TowerId,
        /// Primary target selected by the tower.
        target: EnemyId,
        /// Number of enemies damaged immediately by the shot.
        hits: u32,
    },
    /// Confirms that a splash tower launched a projectile.
    ProjectileLaunched {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that launched the projectile.
        tower: TowerId,
        /// Fixed point the projectile travels toward.
        target: Vec2,
    },
    /// Confirms that a projectile reached its target point and exploded.
    ProjectileDetonated {
        /// Identifier of the projectile that exploded.
        projectile: ProjectileId,
        /// Number of enemies caught in the blast.
        hits: u32,
    },
    /// Confirms that a wave finished and its rewards were paid.
    WaveCompleted {
        /// One-based number of the finished wave.
        wave: u32,
        /// Reward configured for the wave.
        reward: Gold,
        /// Combined payout of all income towers.
        income: Gold,
    },
    /// Announces that the base fell. Emitted at most once per session.
    Defeat,
    /// Announces that the schedule was survived. Emitted at most once per session.
    Victory,
}

/// Describes why an enemy entered the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnOrigin {
    /// Spawned at the path start by the wave schedule.
    Wave,
    /// Emitted periodically by a living spawner enemy.
    Spawner {
        /// Enemy that produced the clone.
        parent: EnemyId,
    },
    /// Released when another enemy died.
    Death {
        /// Enemy whose death produced the clone.
        parent: EnemyId,
    },
}

/// Overall outcome of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// The session is still being played.
    #[default]
    Ongoing,
    /// The wave schedule was exhausted while the base still stood.
    Victory,
    /// The base health reached zero.
    Defeat,
}

/// Externally visible state of the wave director.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WavePhase {
    /// Waiting for the countdown before the next wave starts.
    BetweenWaves,
    /// Spawning the bursts of the current wave.
    Bursting,
    /// Every burst of the wave has been spawned; the trailing pause is next.
    PostBurstPause,
    /// The schedule has been exhausted.
    Terminal,
}

/// Read-only summary of the wave director used by presentation layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveStatus {
    /// One-based number of the current wave, zero before the first wave.
    pub wave: u32,
    /// Current phase of the director.
    pub phase: WavePhase,
    /// Seconds left before the director acts again.
    pub countdown: f32,
    /// Whether the player may skip the remaining pause.
    pub can_skip: bool,
}

/// Amount of in-game currency. Arithmetic saturates instead of wrapping.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Gold(i64);

impl Gold {
    /// No currency.
    pub const ZERO: Self = Self(0);

    /// Creates a currency amount.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric amount.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }

    /// Adds two amounts, saturating at the numeric bounds.
    #[must_use]
    pub const fn saturating_add(self, other: Gold) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts two amounts, saturating at the numeric bounds.
    #[must_use]
    pub const fn saturating_sub(self, other: Gold) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Resale portion of an amount spent on upgrades, floored.
    #[must_use]
    pub const fn resale_share(self) -> Self {
        Self(self.0.saturating_mul(UPGRADE_RESALE_PERCENT) / 100)
    }
}

/// Hit points carried by an enemy or the base.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Health(u32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the health value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether no health remains.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Removes up to `amount` points, stopping at zero.
    #[must_use]
    pub const fn saturating_sub(self, amount: u32) -> Self {
        Self(self.0.saturating_sub(amount))
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Template the enemy was built from.
    pub template: String,
    /// Current position in world units.
    pub position: Vec2,
    /// Remaining health.
    pub health: Health,
    /// Health the enemy spawned with.
    pub max_health: Health,
    /// Cumulative distance travelled along the path.
    pub progress: f32,
    /// Index of the waypoint the enemy is heading toward.
    pub segment: usize,
    /// Whether only detecting towers can target the enemy.
    pub hidden: bool,
    /// Visual diameter supplied by the template.
    pub size: f32,
}

/// Read-only snapshot describing all enemies on the path.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Next purchasable tier of a tower's upgrade ladder.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeOffer {
    /// Price of the tier.
    pub price: Gold,
    /// Display name of the tier.
    pub name: String,
    /// Display description of the tier.
    pub description: String,
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Template the tower was built from.
    pub template: String,
    /// Centre of the tower footprint.
    pub position: Vec2,
    /// Number of upgrade tiers purchased.
    pub level: usize,
    /// Length of the upgrade ladder.
    pub max_level: usize,
    /// Current damage per hit, or income per wave for income towers.
    pub damage: u32,
    /// Current targeting radius.
    pub range: f32,
    /// Current seconds between shots.
    pub fire_rate: f32,
    /// Whether the tower can target hidden enemies.
    pub detection: bool,
    /// Whether the tower pays income instead of firing.
    pub income: bool,
    /// Facing angle in degrees.
    pub facing: f32,
    /// Damage dealt over the tower's lifetime.
    pub total_damage: u64,
    /// Currency refunded when the tower is sold.
    pub resale: Gold,
    /// Next tier available for purchase, if any.
    pub next_upgrade: Option<UpgradeOffer>,
}

/// Read-only snapshot describing all placed towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of towers captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Tower that launched the projectile.
    pub tower: TowerId,
    /// Current position in world units.
    pub position: Vec2,
    /// Fixed point the projectile detonates at.
    pub target: Vec2,
    /// Radius of the explosion.
    pub blast_radius: f32,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectiles in launch order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of projectiles captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum PlacementError {
    /// No tower template with the requested name exists.
    #[error("unknown tower template")]
    UnknownTemplate,
    /// The player cannot afford the tower.
    #[error("insufficient funds")]
    InsufficientFunds,
    /// The position is too close to an existing tower.
    #[error("overlaps an existing tower")]
    Overlapping,
    /// The position intersects the path corridor.
    #[error("blocks the enemy path")]
    OnPath,
}

/// Reasons an upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    MissingTower,
    /// Every tier of the ladder has been purchased.
    #[error("tower is already at its maximum level")]
    MaxLevel,
    /// The player cannot afford the next tier.
    #[error("insufficient funds")]
    InsufficientFunds,
}

/// Reasons a sale request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum SaleError {
    /// No tower with the provided identifier exists.
    #[error("no such tower")]
    MissingTower,
}

/// Problems with the read-only configuration supplied to the core.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ConfigurationError {
    /// An enemy template name could not be resolved.
    #[error("\"{0}\" enemy is not in enemy templates")]
    UnknownEnemy(String),
    /// A tower template name could not be resolved.
    #[error("\"{0}\" tower is not in tower templates")]
    UnknownTower(String),
    /// The path does not contain enough waypoints to form a segment.
    #[error("path needs at least two waypoints, found {waypoints}")]
    PathTooShort {
        /// Number of waypoints supplied.
        waypoints: usize,
    },
}
