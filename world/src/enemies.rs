//! Live enemy bookkeeping, path advancement and reproduction chains.

use std::collections::{BTreeMap, VecDeque};

use glam::Vec2;
use lane_defence_core::{
    Catalog, ConfigurationError, DeathSpawnCapability, EnemyId, EnemySnapshot, EnemyView, Event,
    Gold, Health, SpawnOrigin, SpawnerCapability,
};
use lane_defence_system_tower_targeting::Candidate;
use log::warn;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::{ledger::Economy, path::PathModel};

/// Where a freshly created enemy appears on the path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Anchor {
    pub(crate) position: Vec2,
    pub(crate) segment: usize,
    pub(crate) progress: f32,
}

impl Anchor {
    /// Start of the path, heading toward the second waypoint.
    pub(crate) fn path_start(path: &PathModel) -> Self {
        Self {
            position: path.start(),
            segment: 1,
            progress: 0.0,
        }
    }
}

/// Reproduction waiting to be materialised after the current pass.
#[derive(Clone, Debug, PartialEq)]
struct PendingSpawn {
    template: String,
    anchor: Anchor,
    origin: SpawnOrigin,
}

/// Per-instance timers of a spawner enemy.
#[derive(Clone, Debug)]
struct SpawnerState {
    capability: SpawnerCapability,
    cooldown: f32,
    queued: u32,
    burst_timer: f32,
}

impl SpawnerState {
    fn new(capability: SpawnerCapability) -> Self {
        Self {
            cooldown: capability.cooldown,
            capability,
            queued: 0,
            burst_timer: 0.0,
        }
    }

    /// Advances the timers and reports whether a clone is due this tick.
    fn step(&mut self, dt: f32) -> bool {
        self.cooldown -= dt;
        if self.cooldown <= 0.0 {
            self.queued = self.capability.quantity;
            self.cooldown = self.capability.cooldown;
        }

        if self.queued == 0 {
            return false;
        }

        self.burst_timer -= dt;
        if self.burst_timer > 0.0 {
            return false;
        }
        self.queued -= 1;
        self.burst_timer = self.capability.spawn_rate;
        true
    }
}

#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    template: String,
    position: Vec2,
    segment: usize,
    progress: f32,
    health: Health,
    max_health: Health,
    speed: f32,
    size: f32,
    hidden: bool,
    spawner: Option<SpawnerState>,
    death_spawn: Option<DeathSpawnCapability>,
}

impl Enemy {
    fn anchor(&self) -> Anchor {
        Anchor {
            position: self.position,
            segment: self.segment,
            progress: self.progress,
        }
    }

    fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            template: self.template.clone(),
            position: self.position,
            health: self.health,
            max_health: self.max_health,
            progress: self.progress,
            segment: self.segment,
            hidden: self.hidden,
            size: self.size,
        }
    }
}

/// Enemy that reached the end of the path during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Leak {
    pub(crate) enemy: EnemyId,
    pub(crate) health: Health,
}

/// Registry that owns live enemies and allocates their identifiers.
#[derive(Debug)]
pub(crate) struct EnemyRegistry {
    entries: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: EnemyId,
    pending: VecDeque<PendingSpawn>,
}

impl EnemyRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
            pending: VecDeque::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Instantiates an enemy from its template and reports the outcome.
    ///
    /// Unknown templates abort the spawn with [`Event::EnemySpawnRejected`].
    pub(crate) fn spawn(
        &mut self,
        catalog: &Catalog,
        template: &str,
        anchor: Anchor,
        origin: SpawnOrigin,
        out_events: &mut Vec<Event>,
    ) -> Result<EnemyId, ConfigurationError> {
        let definition = match catalog.enemy(template) {
            Ok(definition) => definition,
            Err(error) => {
                warn!("enemy spawn aborted: {error}");
                out_events.push(Event::EnemySpawnRejected {
                    template: template.to_owned(),
                    error: error.clone(),
                });
                return Err(error);
            }
        };

        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        let enemy = Enemy {
            id,
            template: definition.name.clone(),
            position: anchor.position,
            segment: anchor.segment,
            progress: anchor.progress,
            health: definition.max_health,
            max_health: definition.max_health,
            speed: definition.speed,
            size: definition.size,
            hidden: definition.hidden,
            spawner: definition.spawner.clone().map(SpawnerState::new),
            death_spawn: definition.death_spawn.clone(),
        };
        let _ = self.entries.insert(id, enemy);
        out_events.push(Event::EnemySpawned {
            enemy: id,
            template: definition.name.clone(),
            origin,
        });
        Ok(id)
    }

    /// Materialises every queued reproduction, including chains queued by
    /// the spawns themselves.
    pub(crate) fn drain_pending(&mut self, catalog: &Catalog, out_events: &mut Vec<Event>) {
        while let Some(pending) = self.pending.pop_front() {
            let _ = self.spawn(
                catalog,
                &pending.template,
                pending.anchor,
                pending.origin,
                out_events,
            );
        }
    }

    /// Runs spawner timers and path movement for every live enemy.
    ///
    /// Enemies that pass the final waypoint are removed and returned so the
    /// caller can charge their remaining health to the base.
    pub(crate) fn advance(&mut self, path: &PathModel, dt: f32) -> Vec<Leak> {
        let mut leaks = Vec::new();
        let ids: Vec<EnemyId> = self.entries.keys().copied().collect();
        for id in ids {
            let Some(enemy) = self.entries.get_mut(&id) else {
                continue;
            };

            let anchor = enemy.anchor();
            if let Some(spawner) = enemy.spawner.as_mut() {
                if spawner.step(dt) {
                    self.pending.push_back(PendingSpawn {
                        template: spawner.capability.spawns.clone(),
                        anchor,
                        origin: SpawnOrigin::Spawner { parent: id },
                    });
                }
            }

            let step = path.step(enemy.position, enemy.segment, enemy.speed * dt);
            enemy.position = step.position;
            enemy.segment = step.segment;
            enemy.progress += step.travelled;

            if path.is_finished(enemy.segment) {
                if let Some(leaked) = self.entries.remove(&id) {
                    leaks.push(Leak {
                        enemy: id,
                        health: leaked.health,
                    });
                }
            }
        }
        leaks
    }

    /// Applies damage to an enemy, clamped to its remaining health.
    ///
    /// The clamped amount is credited to the economy and returned. An enemy
    /// that reaches zero queues its death reproduction and is removed.
    pub(crate) fn take_damage(
        &mut self,
        id: EnemyId,
        amount: u32,
        rng: &mut ChaCha8Rng,
        economy: &mut Economy,
        out_events: &mut Vec<Event>,
    ) -> u32 {
        let Some(enemy) = self.entries.get_mut(&id) else {
            return 0;
        };

        let dealt = amount.min(enemy.health.get());
        enemy.health = enemy.health.saturating_sub(dealt);
        economy.credit(Gold::new(i64::from(dealt)));

        if !enemy.health.is_zero() {
            return dealt;
        }

        let anchor = enemy.anchor();
        let origin = SpawnOrigin::Death { parent: id };
        match &enemy.death_spawn {
            Some(DeathSpawnCapability::RandomChoice { candidates }) => {
                if let Some(choice) = candidates.choose(rng) {
                    self.pending.push_back(PendingSpawn {
                        template: choice.clone(),
                        anchor,
                        origin,
                    });
                }
            }
            Some(DeathSpawnCapability::Fixed { spawns, quantity }) => {
                for _ in 0..*quantity {
                    self.pending.push_back(PendingSpawn {
                        template: spawns.clone(),
                        anchor,
                        origin,
                    });
                }
            }
            None => {}
        }

        if let Some(dead) = self.entries.remove(&id) {
            out_events.push(Event::EnemyKilled {
                enemy: id,
                template: dead.template,
            });
        }
        dealt
    }

    /// Live enemies within `radius` of `center` that a tower may engage.
    ///
    /// Hidden enemies are included only when `can_target_hidden` is set.
    pub(crate) fn in_range(
        &self,
        center: Vec2,
        radius: f32,
        can_target_hidden: bool,
    ) -> impl Iterator<Item = Candidate> + '_ {
        self.entries
            .values()
            .filter(move |enemy| !enemy.hidden || can_target_hidden)
            .filter(move |enemy| enemy.position.distance(center) <= radius)
            .map(|enemy| Candidate {
                enemy: enemy.id,
                position: enemy.position,
                progress: enemy.progress,
                max_health: enemy.max_health,
            })
    }

    /// Identifiers of every live enemy within `radius` of `center`,
    /// regardless of visibility.
    pub(crate) fn within_blast(&self, center: Vec2, radius: f32) -> Vec<EnemyId> {
        self.entries
            .values()
            .filter(|enemy| enemy.position.distance(center) <= radius)
            .map(|enemy| enemy.id)
            .collect()
    }

    pub(crate) fn view(&self) -> EnemyView {
        EnemyView::from_snapshots(self.entries.values().map(Enemy::snapshot).collect())
    }
}
