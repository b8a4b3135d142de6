//! Projectiles launched by splash towers.

use glam::Vec2;
use lane_defence_core::{ProjectileId, ProjectileSnapshot, ProjectileView, TowerId};

#[derive(Clone, Debug)]
struct Projectile {
    id: ProjectileId,
    tower: TowerId,
    position: Vec2,
    target: Vec2,
    speed: f32,
    blast_radius: f32,
    damage: u32,
}

/// Projectile that reached its target point during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Detonation {
    pub(crate) projectile: ProjectileId,
    pub(crate) tower: TowerId,
    pub(crate) point: Vec2,
    pub(crate) blast_radius: f32,
    pub(crate) damage: u32,
}

/// Parameters of a projectile at launch time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Launch {
    pub(crate) tower: TowerId,
    pub(crate) origin: Vec2,
    pub(crate) target: Vec2,
    pub(crate) speed: f32,
    pub(crate) blast_radius: f32,
    pub(crate) damage: u32,
}

/// In-flight projectiles keyed by launch order.
#[derive(Debug)]
pub(crate) struct ProjectileField {
    entries: Vec<Projectile>,
    next_projectile_id: ProjectileId,
}

impl ProjectileField {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    pub(crate) fn launch(&mut self, launch: Launch) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
        self.entries.push(Projectile {
            id,
            tower: launch.tower,
            position: launch.origin,
            target: launch.target,
            speed: launch.speed,
            blast_radius: launch.blast_radius,
            damage: launch.damage,
        });
        id
    }

    /// Moves every projectile toward its fixed target point.
    ///
    /// A projectile that would reach or pass the point this tick is removed
    /// and reported instead of overshooting.
    pub(crate) fn advance(&mut self, dt: f32) -> Vec<Detonation> {
        let mut detonations = Vec::new();
        self.entries.retain_mut(|projectile| {
            let offset = projectile.target - projectile.position;
            let remaining = offset.length();
            let travel = projectile.speed * dt;
            if travel >= remaining {
                detonations.push(Detonation {
                    projectile: projectile.id,
                    tower: projectile.tower,
                    point: projectile.target,
                    blast_radius: projectile.blast_radius,
                    damage: projectile.damage,
                });
                return false;
            }
            projectile.position += offset / remaining * travel;
            true
        });
        detonations
    }

    pub(crate) fn view(&self) -> ProjectileView {
        ProjectileView::from_snapshots(
            self.entries
                .iter()
                .map(|projectile| ProjectileSnapshot {
                    id: projectile.id,
                    tower: projectile.tower,
                    position: projectile.position,
                    target: projectile.target,
                    blast_radius: projectile.blast_radius,
                })
                .collect(),
        )
    }
}
