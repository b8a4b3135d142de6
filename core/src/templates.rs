//! Read-only configuration supplied to the core before the first tick.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{ConfigurationError, Gold, Health};

/// Periodic reproduction carried by spawner enemies.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnerCapability {
    /// Template of the enemies produced.
    pub spawns: String,
    /// Seconds between bursts.
    pub cooldown: f32,
    /// Enemies produced per burst.
    pub quantity: u32,
    /// Seconds between individual spawns inside a burst.
    pub spawn_rate: f32,
}

/// Enemies released when the carrier dies.
#[derive(Clone, Debug, PartialEq)]
pub enum DeathSpawnCapability {
    /// Exactly one enemy picked uniformly at random from the candidates.
    RandomChoice {
        /// Template names that may be released.
        candidates: Vec<String>,
    },
    /// A fixed number of enemies of a single template.
    Fixed {
        /// Template of the released enemies.
        spawns: String,
        /// Number of enemies released.
        quantity: u32,
    },
}

/// Definition of an enemy type.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyTemplate {
    /// Unique template name.
    pub name: String,
    /// Health the enemy spawns with.
    pub max_health: Health,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Visual diameter.
    pub size: f32,
    /// Display colour forwarded to presentation layers.
    pub color: String,
    /// Whether only detecting towers can target the enemy.
    pub hidden: bool,
    /// Periodic reproduction, if any.
    pub spawner: Option<SpawnerCapability>,
    /// Reproduction on death, if any.
    pub death_spawn: Option<DeathSpawnCapability>,
}

/// Rule a tower uses to pick its primary target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetingMode {
    /// Prefer the enemy furthest along the path.
    #[default]
    First,
    /// Prefer the enemy with the greatest maximum health.
    Strongest,
}

/// How a tower delivers its damage.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DamageType {
    /// Damages only the primary target.
    #[default]
    Direct,
    /// Damages every candidate inside a cone centred on the facing angle.
    ArcAoe {
        /// Full width of the cone in degrees.
        arc_degrees: f32,
    },
    /// Launches a projectile that explodes at the target's position.
    Splash {
        /// Radius of the explosion.
        blast_radius: f32,
    },
}

/// Single tier of a tower's upgrade ladder.
///
/// Stat fields left as `None` keep the tower's current value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpgradeTier {
    /// Price of the tier.
    pub price: Gold,
    /// Replacement damage.
    pub damage: Option<u32>,
    /// Replacement range.
    pub range: Option<f32>,
    /// Replacement seconds between shots.
    pub fire_rate: Option<f32>,
    /// Replacement detection capability.
    pub detection: Option<bool>,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
}

/// Definition of a tower type.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerTemplate {
    /// Unique template name.
    pub name: String,
    /// Damage per hit, or income per wave for income towers.
    pub damage: u32,
    /// Seconds between shots.
    pub fire_rate: f32,
    /// Targeting radius.
    pub range: f32,
    /// Purchase price.
    pub cost: Gold,
    /// Display colour forwarded to presentation layers.
    pub color: String,
    /// Primary target selection rule.
    pub mode: TargetingMode,
    /// Whether the tower can target hidden enemies.
    pub detection: bool,
    /// Damage delivery.
    pub damage_type: DamageType,
    /// Whether the tower pays income at wave transitions instead of firing.
    pub income: bool,
    /// Projectile travel speed for splash towers, `None` for the session default.
    pub projectile_speed: Option<f32>,
    /// Ordered upgrade ladder.
    pub upgrades: Vec<UpgradeTier>,
}

/// Library of enemy and tower templates.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    enemies: BTreeMap<String, EnemyTemplate>,
    towers: BTreeMap<String, TowerTemplate>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an enemy template, replacing any template with the same name.
    pub fn insert_enemy(&mut self, template: EnemyTemplate) {
        let _ = self.enemies.insert(template.name.clone(), template);
    }

    /// Registers a tower template, replacing any template with the same name.
    pub fn insert_tower(&mut self, template: TowerTemplate) {
        let _ = self.towers.insert(template.name.clone(), template);
    }

    /// Resolves an enemy template by name.
    pub fn enemy(&self, name: &str) -> Result<&EnemyTemplate, ConfigurationError> {
        self.enemies
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownEnemy(name.to_owned()))
    }

    /// Resolves a tower template by name.
    pub fn tower(&self, name: &str) -> Result<&TowerTemplate, ConfigurationError> {
        self.towers
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownTower(name.to_owned()))
    }

    /// Iterator over enemy templates ordered by name.
    pub fn enemies(&self) -> impl Iterator<Item = &EnemyTemplate> {
        self.enemies.values()
    }

    /// Iterator over tower templates ordered by name.
    pub fn towers(&self) -> impl Iterator<Item = &TowerTemplate> {
        self.towers.values()
    }

    /// Lists enemy names referenced by the schedule or by reproduction
    /// capabilities that have no template.
    #[must_use]
    pub fn dangling_references(&self, schedule: &WaveSchedule) -> Vec<String> {
        let mut referenced: Vec<&str> = Vec::new();
        for (_, wave) in schedule.iter() {
            referenced.extend(wave.bursts.iter().map(|burst| burst.enemy.as_str()));
        }
        for template in self.enemies.values() {
            if let Some(spawner) = &template.spawner {
                referenced.push(spawner.spawns.as_str());
            }
            match &template.death_spawn {
                Some(DeathSpawnCapability::RandomChoice { candidates }) => {
                    referenced.extend(candidates.iter().map(String::as_str));
                }
                Some(DeathSpawnCapability::Fixed { spawns, .. }) => referenced.push(spawns),
                None => {}
            }
        }

        let mut missing: Vec<String> = referenced
            .into_iter()
            .filter(|name| !self.enemies.contains_key(*name))
            .map(str::to_owned)
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }
}

/// Timed sub-sequence of a wave spawning one enemy type at fixed intervals.
#[derive(Clone, Debug, PartialEq)]
pub struct Burst {
    /// Template of the spawned enemies.
    pub enemy: String,
    /// Number of enemies spawned.
    pub quantity: u32,
    /// Seconds between consecutive spawns.
    pub cooldown: f32,
}

/// One wave of the schedule: its bursts followed by the trailing pause.
#[derive(Clone, Debug, PartialEq)]
pub struct Wave {
    /// Bursts spawned in order. Never empty once loaded.
    pub bursts: Vec<Burst>,
    /// Seconds to wait after the last burst before the next wave.
    pub wait: f32,
    /// Currency granted when the next wave begins.
    pub reward: Gold,
}

/// Ordered mapping from one-based wave numbers to waves.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaveSchedule {
    waves: BTreeMap<u32, Wave>,
}

impl WaveSchedule {
    /// Creates an empty schedule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the wave under the provided number, replacing any previous entry.
    pub fn insert(&mut self, number: u32, wave: Wave) {
        let _ = self.waves.insert(number, wave);
    }

    /// Looks up a wave by its one-based number.
    #[must_use]
    pub fn wave(&self, number: u32) -> Option<&Wave> {
        self.waves.get(&number)
    }

    /// Number of waves in the schedule.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    /// Reports whether the schedule contains no waves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Iterator over `(number, wave)` pairs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Wave)> {
        self.waves.iter().map(|(number, wave)| (*number, wave))
    }
}

/// Numeric rules of a session.
#[derive(Clone, Debug, PartialEq)]
pub struct Rules {
    /// Currency available before the first purchase.
    pub starting_gold: Gold,
    /// Health of the base.
    pub base_health: Health,
    /// Minimum distance between the centres of two towers.
    pub tower_spacing: f32,
    /// Minimum distance between a tower centre and the path polyline.
    pub path_clearance: f32,
    /// Upper bound applied to a single frame's delta before speed scaling.
    pub max_frame_dt: Duration,
    /// Projectile speed used by splash towers without their own.
    pub projectile_speed: f32,
    /// Seed for random reproduction choices.
    pub rng_seed: u64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            starting_gold: Gold::new(550),
            base_health: Health::new(250),
            tower_spacing: 50.0,
            path_clearance: 30.0,
            max_frame_dt: Duration::from_millis(100),
            projectile_speed: 600.0,
            rng_seed: 0x5eed_1a4e_d3fe_4ce5,
        }
    }
}

/// Everything the core needs before the first tick.
#[derive(Clone, Debug)]
pub struct Scenario {
    /// Enemy and tower templates.
    pub catalog: Catalog,
    /// Waypoints every enemy follows.
    pub path: Vec<Vec2>,
    /// Waves to play.
    pub schedule: WaveSchedule,
    /// Numeric rules.
    pub rules: Rules,
}

/// Default route laid out on a 1920×1080 field.
#[must_use]
pub fn default_path() -> Vec<Vec2> {
    vec![
        Vec2::new(480.0, 1080.0),
        Vec2::new(480.0, 216.0),
        Vec2::new(1440.0, 216.0),
        Vec2::new(1440.0, 864.0),
        Vec2::new(960.0, 864.0),
        Vec2::new(960.0, 432.0),
        Vec2::new(1920.0, 432.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grunt(name: &str) -> EnemyTemplate {
        EnemyTemplate {
            name: name.to_owned(),
            max_health: Health::new(10),
            speed: 100.0,
            size: 20.0,
            color: "#ffffff".to_owned(),
            hidden: false,
            spawner: None,
            death_spawn: None,
        }
    }

    #[test]
    fn unknown_enemy_lookup_reports_configuration_error() {
        let catalog = Catalog::new();
        assert_eq!(
            catalog.enemy("Ghost"),
            Err(ConfigurationError::UnknownEnemy("Ghost".to_owned()))
        );
    }

    #[test]
    fn dangling_references_cover_schedule_and_capabilities() {
        let mut catalog = Catalog::new();
        let mut witch = grunt("Witch");
        witch.spawner = Some(SpawnerCapability {
            spawns: "Bat".to_owned(),
            cooldown: 5.0,
            quantity: 2,
            spawn_rate: 0.5,
        });
        witch.death_spawn = Some(DeathSpawnCapability::RandomChoice {
            candidates: vec!["Normal".to_owned(), "Imp".to_owned()],
        });
        catalog.insert_enemy(witch);
        catalog.insert_enemy(grunt("Normal"));

        let mut schedule = WaveSchedule::new();
        schedule.insert(
            1,
            Wave {
                bursts: vec![Burst {
                    enemy: "Golem".to_owned(),
                    quantity: 1,
                    cooldown: 1.0,
                }],
                wait: 5.0,
                reward: Gold::new(10),
            },
        );

        assert_eq!(
            catalog.dangling_references(&schedule),
            vec!["Bat".to_owned(), "Golem".to_owned(), "Imp".to_owned()]
        );
    }

    #[test]
    fn default_path_forms_polyline() {
        assert!(default_path().len() >= 2);
    }
}
