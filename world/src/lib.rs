#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Lane Defence.
//!
//! The world owns every live entity (enemies, towers, projectiles) together
//! with the currency ledger and the base. It is mutated exclusively through
//! [`apply`] and inspected through the [`query`] module.

mod enemies;
mod ledger;
mod path;
mod projectiles;
mod towers;

use glam::Vec2;
use lane_defence_core::{
    Catalog, Command, ConfigurationError, DamageType, EnemyId, Event, GameStatus, Rules,
    SpawnOrigin, WELCOME_BANNER,
};
use lane_defence_system_tower_targeting::TowerTargeting;
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use enemies::{Anchor, EnemyRegistry};
use ledger::{Base, Economy};
use projectiles::{Launch, ProjectileField};
use towers::TowerRegistry;

pub use path::{PathModel, PathStep};

/// Represents the authoritative Lane Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    catalog: Catalog,
    rules: Rules,
    path: PathModel,
    economy: Economy,
    base: Base,
    enemies: EnemyRegistry,
    towers: TowerRegistry,
    projectiles: ProjectileField,
    targeting: TowerTargeting,
    rng: ChaCha8Rng,
    status: GameStatus,
}

impl World {
    /// Creates a world ready for the first tick.
    pub fn new(
        catalog: Catalog,
        waypoints: Vec<Vec2>,
        rules: Rules,
    ) -> Result<Self, ConfigurationError> {
        let path = PathModel::new(waypoints)?;
        Ok(Self {
            banner: WELCOME_BANNER,
            economy: Economy::new(rules.starting_gold),
            base: Base::new(rules.base_health),
            rng: ChaCha8Rng::seed_from_u64(rules.rng_seed),
            enemies: EnemyRegistry::new(),
            towers: TowerRegistry::new(),
            projectiles: ProjectileField::new(),
            targeting: TowerTargeting::new(),
            status: GameStatus::Ongoing,
            catalog,
            rules,
            path,
        })
    }

    fn advance_enemies(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        for leak in self.enemies.advance(&self.path, dt) {
            out_events.push(Event::EnemyLeaked {
                enemy: leak.enemy,
                damage: leak.health,
            });

            let before = self.base.health();
            let fell = self.base.decrease(leak.health.get());
            let remaining = self.base.health();
            out_events.push(Event::BaseDamaged {
                amount: before.get() - remaining.get(),
                remaining,
            });

            if fell && self.status == GameStatus::Ongoing {
                info!("base fell after enemy {} leaked", leak.enemy.get());
                self.status = GameStatus::Defeat;
                out_events.push(Event::Defeat);
            }
        }
        self.enemies.drain_pending(&self.catalog, out_events);
    }

    fn fire_towers(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        for id in self.towers.ids() {
            let Some(tower) = self.towers.get_mut(id) else {
                continue;
            };
            if tower.income {
                continue;
            }

            tower.cooldown = (tower.cooldown - dt).max(0.0);
            let candidates = self
                .enemies
                .in_range(tower.position, tower.range, tower.detection);
            let Some(acquisition) = self
                .targeting
                .acquire(tower.mode, tower.position, candidates)
            else {
                continue;
            };
            tower.facing = acquisition.facing;
            if tower.cooldown > 0.0 {
                continue;
            }
            tower.cooldown = tower.fire_rate;

            let primary = acquisition.primary.enemy;
            let hits: Vec<EnemyId> = match tower.damage_type {
                DamageType::Direct => vec![primary],
                DamageType::ArcAoe { arc_degrees } => self
                    .targeting
                    .arc_hits(tower.position, tower.facing, arc_degrees)
                    .to_vec(),
                DamageType::Splash { blast_radius } => {
                    let projectile = self.projectiles.launch(Launch {
                        tower: id,
                        origin: tower.position,
                        target: acquisition.primary.position,
                        speed: tower
                            .projectile_speed
                            .unwrap_or(self.rules.projectile_speed),
                        blast_radius,
                        damage: tower.damage,
                    });
                    out_events.push(Event::TowerFired {
                        tower: id,
                        target: primary,
                        hits: 0,
                    });
                    out_events.push(Event::ProjectileLaunched {
                        projectile,
                        tower: id,
                        target: acquisition.primary.position,
                    });
                    continue;
                }
            };

            let damage = tower.damage;
            for enemy in &hits {
                tower.record_damage(damage);
                let _ = self.enemies.take_damage(
                    *enemy,
                    damage,
                    &mut self.rng,
                    &mut self.economy,
                    out_events,
                );
            }
            out_events.push(Event::TowerFired {
                tower: id,
                target: primary,
                hits: count(hits.len()),
            });
        }
        self.enemies.drain_pending(&self.catalog, out_events);
    }

    fn resolve_projectiles(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        for detonation in self.projectiles.advance(dt) {
            let victims = self
                .enemies
                .within_blast(detonation.point, detonation.blast_radius);
            for enemy in &victims {
                if let Some(tower) = self.towers.get_mut(detonation.tower) {
                    tower.record_damage(detonation.damage);
                }
                let _ = self.enemies.take_damage(
                    *enemy,
                    detonation.damage,
                    &mut self.rng,
                    &mut self.economy,
                    out_events,
                );
            }
            out_events.push(Event::ProjectileDetonated {
                projectile: detonation.projectile,
                hits: count(victims.len()),
            });
        }
        self.enemies.drain_pending(&self.catalog, out_events);
    }

    fn place_tower(&mut self, template: String, position: Vec2, out_events: &mut Vec<Event>) {
        let validated = self.towers.validate_placement(
            &self.catalog,
            &template,
            position,
            &self.economy,
            &self.path,
            &self.rules,
        );
        match validated {
            Ok(definition) => {
                self.economy.debit(definition.cost);
                let tower = self.towers.insert(definition, position);
                debug!("placed {template} tower {} at {position}", tower.get());
                out_events.push(Event::TowerPlaced {
                    tower,
                    template,
                    position,
                });
            }
            Err(reason) => {
                debug!("rejected {template} tower at {position}: {reason}");
                out_events.push(Event::TowerPlacementRejected {
                    template,
                    position,
                    reason,
                });
            }
        }
    }
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            if world.status != GameStatus::Ongoing {
                return;
            }
            out_events.push(Event::TimeAdvanced { dt });
            let seconds = dt.as_secs_f32();
            world.advance_enemies(seconds, out_events);
            world.fire_towers(seconds, out_events);
            world.resolve_projectiles(seconds, out_events);
        }
        Command::SpawnEnemy { template } => {
            let anchor = Anchor::path_start(&world.path);
            let _ = world.enemies.spawn(
                &world.catalog,
                &template,
                anchor,
                SpawnOrigin::Wave,
                out_events,
            );
        }
        Command::PlaceTower { template, position } => {
            world.place_tower(template, position, out_events);
        }
        Command::SellTower { tower } => match world.towers.sell(tower, &mut world.economy) {
            Ok(refund) => {
                debug!("sold tower {} for {}", tower.get(), refund.get());
                out_events.push(Event::TowerSold { tower, refund });
            }
            Err(reason) => out_events.push(Event::TowerSaleRejected { tower, reason }),
        },
        Command::UpgradeTower { tower } => {
            match world.towers.upgrade(tower, &mut world.economy) {
                Ok(level) => {
                    debug!("upgraded tower {} to level {level}", tower.get());
                    out_events.push(Event::TowerUpgraded { tower, level });
                }
                Err(reason) => out_events.push(Event::TowerUpgradeRejected { tower, reason }),
            }
        }
        Command::CompleteWave { wave, reward } => {
            let income = world.towers.income_total();
            world.economy.credit(reward);
            world.economy.credit(income);
            debug!(
                "wave {wave} completed: reward {}, income {}",
                reward.get(),
                income.get()
            );
            out_events.push(Event::WaveCompleted {
                wave,
                reward,
                income,
            });
        }
        Command::ConcludeSchedule => {
            if world.status == GameStatus::Ongoing && !world.base.health().is_zero() {
                info!("wave schedule exhausted, base survived");
                world.status = GameStatus::Victory;
                out_events.push(Event::Victory);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use lane_defence_core::{
        Catalog, EnemyView, GameStatus, Gold, Health, ProjectileView, Rules, TowerView,
    };

    use super::{PathModel, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Currency currently available to the player.
    #[must_use]
    pub fn gold(world: &World) -> Gold {
        world.economy.gold()
    }

    /// Remaining base health.
    #[must_use]
    pub fn base_health(world: &World) -> Health {
        world.base.health()
    }

    /// Health the base started with.
    #[must_use]
    pub fn base_max_health(world: &World) -> Health {
        world.base.max_health()
    }

    /// Outcome of the session so far.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.status
    }

    /// Number of enemies currently alive on the path.
    #[must_use]
    pub fn live_enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Captures a read-only view of the enemies on the path.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        world.enemies.view()
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        world.towers.view()
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        world.projectiles.view()
    }

    /// Path followed by every enemy.
    #[must_use]
    pub fn path(world: &World) -> &PathModel {
        &world.path
    }

    /// Templates the world was built with.
    #[must_use]
    pub fn catalog(world: &World) -> &Catalog {
        &world.catalog
    }

    /// Numeric rules of the session.
    #[must_use]
    pub fn rules(world: &World) -> &Rules {
        &world.rules
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use lane_defence_core::{EnemyTemplate, Gold, Health, TargetingMode, TowerId, TowerTemplate};

    fn world_with_normal() -> World {
        let mut catalog = Catalog::new();
        catalog.insert_enemy(EnemyTemplate {
            name: "Normal".to_owned(),
            max_health: Health::new(10),
            speed: 100.0,
            size: 20.0,
            color: "#ffffff".to_owned(),
            hidden: false,
            spawner: None,
            death_spawn: None,
        });
        catalog.insert_tower(TowerTemplate {
            name: "Bank".to_owned(),
            damage: 25,
            fire_rate: 1.0,
            range: 100.0,
            cost: Gold::new(150),
            color: "#ffff00".to_owned(),
            mode: TargetingMode::First,
            detection: false,
            damage_type: DamageType::Direct,
            income: true,
            projectile_speed: None,
            upgrades: Vec::new(),
        });
        World::new(
            catalog,
            vec![Vec2::new(0.0, 0.0), Vec2::new(300.0, 0.0)],
            Rules::default(),
        )
        .expect("valid world")
    }

    #[test]
    fn new_world_uses_rules_defaults() {
        let world = world_with_normal();
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
        assert_eq!(query::gold(&world), Gold::new(550));
        assert_eq!(query::base_health(&world), Health::new(250));
        assert_eq!(query::status(&world), GameStatus::Ongoing);
        assert_eq!(query::path(&world).len(), 2);
    }

    #[test]
    fn world_rejects_degenerate_path() {
        let result = World::new(Catalog::new(), vec![Vec2::ZERO], Rules::default());
        assert!(matches!(
            result,
            Err(ConfigurationError::PathTooShort { waypoints: 1 })
        ));
    }

    #[test]
    fn spawned_enemy_starts_at_first_waypoint() {
        let mut world = world_with_normal();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                template: "Normal".to_owned(),
            },
            &mut events,
        );
        let snapshot = query::enemy_view(&world).into_vec().remove(0);
        assert_eq!(snapshot.position, Vec2::ZERO);
        assert_eq!(snapshot.segment, 1);
        assert_eq!(query::live_enemy_count(&world), 1);
    }

    #[test]
    fn wave_completion_pays_reward_and_income() {
        let mut world = world_with_normal();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                template: "Bank".to_owned(),
                position: Vec2::new(100.0, 100.0),
            },
            &mut events,
        );
        assert_eq!(query::gold(&world), Gold::new(400));

        events.clear();
        apply(
            &mut world,
            Command::CompleteWave {
                wave: 1,
                reward: Gold::new(50),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::WaveCompleted {
                wave: 1,
                reward: Gold::new(50),
                income: Gold::new(25),
            }]
        );
        assert_eq!(query::gold(&world), Gold::new(475));
    }

    #[test]
    fn income_towers_never_fire() {
        let mut world = world_with_normal();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                template: "Bank".to_owned(),
                position: Vec2::new(0.0, 40.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnEnemy {
                template: "Normal".to_owned(),
            },
            &mut events,
        );
        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::TowerFired { .. })));
    }

    #[test]
    fn missing_tower_intents_are_rejected() {
        let mut world = world_with_normal();
        let mut events = Vec::new();
        let ghost = TowerId::new(42);
        apply(&mut world, Command::SellTower { tower: ghost }, &mut events);
        apply(&mut world, Command::UpgradeTower { tower: ghost }, &mut events);
        assert_eq!(
            events,
            vec![
                Event::TowerSaleRejected {
                    tower: ghost,
                    reason: lane_defence_core::SaleError::MissingTower,
                },
                Event::TowerUpgradeRejected {
                    tower: ghost,
                    reason: lane_defence_core::UpgradeError::MissingTower,
                },
            ]
        );
    }

    #[test]
    fn victory_is_declared_once() {
        let mut world = world_with_normal();
        let mut events = Vec::new();
        apply(&mut world, Command::ConcludeSchedule, &mut events);
        apply(&mut world, Command::ConcludeSchedule, &mut events);
        assert_eq!(events, vec![Event::Victory]);
        assert_eq!(query::status(&world), GameStatus::Victory);

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );
        assert!(events.is_empty());
    }
}
