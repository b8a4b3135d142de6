//! Serde mirror of the configuration document and its conversion into core types.

use std::collections::BTreeMap;

use glam::Vec2;
use lane_defence_core::{
    default_path, Burst, Catalog, ConfigurationError, DamageType, DeathSpawnCapability,
    EnemyTemplate, Gold, Health, Rules, Scenario, SpawnerCapability, TargetingMode,
    TowerTemplate, UpgradeTier, Wave, WaveSchedule,
};
use serde::{de::IgnoredAny, Deserialize};

use crate::ConfigError;

const WAVE_KEY_PREFIX: &str = "wave";

#[derive(Debug, Deserialize)]
pub(crate) struct RawDocument {
    #[serde(default)]
    path: Option<Vec<[f32; 2]>>,
    #[serde(default)]
    rules: RawRules,
    #[serde(default)]
    enemies: BTreeMap<String, RawEnemy>,
    #[serde(default)]
    towers: BTreeMap<String, RawTower>,
    #[serde(default)]
    route: BTreeMap<String, Vec<RawWaveEvent>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRules {
    starting_gold: Option<i64>,
    base_health: Option<u32>,
    tower_spacing: Option<f32>,
    path_clearance: Option<f32>,
    max_frame_dt_ms: Option<u64>,
    projectile_speed: Option<f32>,
    rng_seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawEnemy {
    maxhealth: u32,
    speed: f32,
    #[serde(default = "default_size")]
    size: f32,
    #[serde(default)]
    color: String,
    #[serde(default)]
    hidden: bool,
    #[serde(default)]
    attributes: RawEnemyAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct RawEnemyAttributes {
    spawn: Option<RawSpawn>,
    death_spawn: Option<RawDeathSpawn>,
}

#[derive(Debug, Deserialize)]
struct RawSpawn {
    name: String,
    cooldown: f32,
    quantity: u32,
    spawnrate: f32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDeathSpawn {
    Candidates(Vec<String>),
    Fixed { name: String, quantity: u32 },
}

#[derive(Debug, Deserialize)]
struct RawTower {
    damage: u32,
    firerate: f32,
    range: f32,
    cost: i64,
    #[serde(default)]
    color: String,
    #[serde(default)]
    mode: TargetingMode,
    #[serde(default)]
    upgrades: Vec<RawUpgrade>,
    #[serde(default)]
    attributes: RawTowerAttributes,
    blastradius: Option<f32>,
    aoeangle: Option<f32>,
    projectilespeed: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTowerAttributes {
    #[serde(default)]
    detection: bool,
    #[serde(default)]
    damage_type: RawDamageType,
    #[serde(default)]
    money_tower: bool,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum RawDamageType {
    #[default]
    Direct,
    #[serde(alias = "aoe")]
    ArcAoe,
    Splash,
}

#[derive(Debug, Deserialize)]
struct RawUpgrade {
    price: i64,
    damage: Option<u32>,
    range: Option<f32>,
    firerate: Option<f32>,
    detection: Option<bool>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    desc: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawWaveEvent {
    Burst {
        name: String,
        quantity: u32,
        cooldown: f32,
    },
    Pause(f32, i64),
    Unrecognised(IgnoredAny),
}

fn default_size() -> f32 {
    20.0
}

impl RawDocument {
    pub(crate) fn into_scenario(self) -> Result<Scenario, ConfigError> {
        let path = match self.path {
            Some(points) => points.into_iter().map(Vec2::from).collect(),
            None => default_path(),
        };
        if path.len() < 2 {
            return Err(ConfigurationError::PathTooShort {
                waypoints: path.len(),
            }
            .into());
        }

        let mut catalog = Catalog::new();
        for (name, raw) in self.enemies {
            catalog.insert_enemy(raw.into_template(name));
        }
        for (name, raw) in self.towers {
            catalog.insert_tower(raw.into_template(name)?);
        }

        let mut schedule = WaveSchedule::new();
        for (key, events) in self.route {
            let number = parse_wave_key(&key)?;
            schedule.insert(number, parse_wave(&key, events)?);
        }

        Ok(Scenario {
            catalog,
            path,
            schedule,
            rules: self.rules.into_rules(),
        })
    }
}

impl RawRules {
    fn into_rules(self) -> Rules {
        let defaults = Rules::default();
        Rules {
            starting_gold: self
                .starting_gold
                .map_or(defaults.starting_gold, Gold::new),
            base_health: self.base_health.map_or(defaults.base_health, Health::new),
            tower_spacing: self.tower_spacing.unwrap_or(defaults.tower_spacing),
            path_clearance: self.path_clearance.unwrap_or(defaults.path_clearance),
            max_frame_dt: self
                .max_frame_dt_ms
                .map_or(defaults.max_frame_dt, std::time::Duration::from_millis),
            projectile_speed: self.projectile_speed.unwrap_or(defaults.projectile_speed),
            rng_seed: self.rng_seed.unwrap_or(defaults.rng_seed),
        }
    }
}

impl RawEnemy {
    fn into_template(self, name: String) -> EnemyTemplate {
        let RawEnemyAttributes { spawn, death_spawn } = self.attributes;
        EnemyTemplate {
            name,
            max_health: Health::new(self.maxhealth),
            speed: self.speed,
            size: self.size,
            color: self.color,
            hidden: self.hidden,
            spawner: spawn.map(|spawn| SpawnerCapability {
                spawns: spawn.name,
                cooldown: spawn.cooldown,
                quantity: spawn.quantity,
                spawn_rate: spawn.spawnrate,
            }),
            death_spawn: death_spawn.map(|death| match death {
                RawDeathSpawn::Candidates(candidates) => {
                    DeathSpawnCapability::RandomChoice { candidates }
                }
                RawDeathSpawn::Fixed { name, quantity } => DeathSpawnCapability::Fixed {
                    spawns: name,
                    quantity,
                },
            }),
        }
    }
}

impl RawTower {
    fn into_template(self, name: String) -> Result<TowerTemplate, ConfigError> {
        let damage_type = match self.attributes.damage_type {
            RawDamageType::Direct => DamageType::Direct,
            RawDamageType::ArcAoe => DamageType::ArcAoe {
                arc_degrees: self.aoeangle.ok_or_else(|| ConfigError::MissingStat {
                    tower: name.clone(),
                    stat: "aoeangle",
                })?,
            },
            RawDamageType::Splash => DamageType::Splash {
                blast_radius: self.blastradius.ok_or_else(|| ConfigError::MissingStat {
                    tower: name.clone(),
                    stat: "blastradius",
                })?,
            },
        };

        Ok(TowerTemplate {
            name,
            damage: self.damage,
            fire_rate: self.firerate,
            range: self.range,
            cost: Gold::new(self.cost),
            color: self.color,
            mode: self.mode,
            detection: self.attributes.detection,
            damage_type,
            income: self.attributes.money_tower,
            projectile_speed: self.projectilespeed,
            upgrades: self.upgrades.into_iter().map(RawUpgrade::into_tier).collect(),
        })
    }
}

impl RawUpgrade {
    /// Zero-valued stats mean "unchanged".
    fn into_tier(self) -> UpgradeTier {
        UpgradeTier {
            price: Gold::new(self.price),
            damage: self.damage.filter(|damage| *damage > 0),
            range: self.range.filter(|range| *range > 0.0),
            fire_rate: self.firerate.filter(|rate| *rate > 0.0),
            detection: self.detection,
            name: self.name,
            description: self.desc,
        }
    }
}

fn parse_wave_key(key: &str) -> Result<u32, ConfigError> {
    key.strip_prefix(WAVE_KEY_PREFIX)
        .and_then(|digits| digits.parse::<u32>().ok())
        .filter(|number| *number > 0)
        .ok_or_else(|| ConfigError::InvalidWaveKey(key.to_owned()))
}

fn parse_wave(key: &str, events: Vec<RawWaveEvent>) -> Result<Wave, ConfigError> {
    let malformed = |reason: &'static str| ConfigError::MalformedWave {
        wave: key.to_owned(),
        reason,
    };

    let mut bursts = Vec::new();
    let mut pause = None;
    for event in events {
        if pause.is_some() {
            return Err(malformed("entries follow the trailing [wait, reward] pause"));
        }
        match event {
            RawWaveEvent::Burst {
                name,
                quantity,
                cooldown,
            } => bursts.push(Burst {
                enemy: name,
                quantity,
                cooldown,
            }),
            RawWaveEvent::Pause(wait, reward) => pause = Some((wait, reward)),
            RawWaveEvent::Unrecognised(_) => {
                return Err(malformed(
                    "entry is neither a burst nor a [wait, reward] pause",
                ))
            }
        }
    }

    if bursts.is_empty() {
        return Err(malformed("wave has no bursts"));
    }
    let (wait, reward) = pause.ok_or_else(|| malformed("missing trailing [wait, reward] pause"))?;
    Ok(Wave {
        bursts,
        wait,
        reward: Gold::new(reward),
    })
}
