//! Authoritative tower state, placement validation and the upgrade ladder.

use std::collections::BTreeMap;

use glam::Vec2;
use lane_defence_core::{
    Catalog, DamageType, Gold, PlacementError, Rules, SaleError, TargetingMode, TowerId,
    TowerSnapshot, TowerTemplate, TowerView, UpgradeError, UpgradeOffer, UpgradeTier,
};
use log::warn;

use crate::{ledger::Economy, path::PathModel};

/// Runtime state of a placed tower.
#[derive(Clone, Debug)]
pub(crate) struct Tower {
    pub(crate) id: TowerId,
    template: String,
    pub(crate) position: Vec2,
    pub(crate) mode: TargetingMode,
    pub(crate) damage_type: DamageType,
    pub(crate) income: bool,
    pub(crate) projectile_speed: Option<f32>,
    pub(crate) damage: u32,
    pub(crate) range: f32,
    pub(crate) fire_rate: f32,
    pub(crate) detection: bool,
    pub(crate) cooldown: f32,
    pub(crate) facing: f32,
    total_damage: u64,
    cost: Gold,
    upgrade_spend: Gold,
    level: usize,
    upgrades: Vec<UpgradeTier>,
}

impl Tower {
    fn from_template(id: TowerId, template: &TowerTemplate, position: Vec2) -> Self {
        Self {
            id,
            template: template.name.clone(),
            position,
            mode: template.mode,
            damage_type: template.damage_type,
            income: template.income,
            projectile_speed: template.projectile_speed,
            damage: template.damage,
            range: template.range,
            fire_rate: template.fire_rate,
            detection: template.detection,
            cooldown: 0.0,
            facing: 0.0,
            total_damage: 0,
            cost: template.cost,
            upgrade_spend: Gold::ZERO,
            level: 0,
            upgrades: template.upgrades.clone(),
        }
    }

    /// Adds damage to the lifetime counter.
    pub(crate) fn record_damage(&mut self, amount: u32) {
        self.total_damage = self.total_damage.saturating_add(u64::from(amount));
    }

    /// Build cost plus the resale share of everything spent on upgrades,
    /// floored once over the total.
    fn resale(&self) -> Gold {
        self.cost.saturating_add(self.upgrade_spend.resale_share())
    }

    fn next_tier(&self) -> Option<&UpgradeTier> {
        self.upgrades.get(self.level)
    }

    fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            template: self.template.clone(),
            position: self.position,
            level: self.level,
            max_level: self.upgrades.len(),
            damage: self.damage,
            range: self.range,
            fire_rate: self.fire_rate,
            detection: self.detection,
            income: self.income,
            facing: self.facing,
            total_damage: self.total_damage,
            resale: self.resale(),
            next_upgrade: self.next_tier().map(|tier| UpgradeOffer {
                price: tier.price,
                name: tier.name.clone(),
                description: tier.description.clone(),
            }),
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, Tower>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Checks a placement request without mutating anything.
    ///
    /// Reasons are checked in a fixed order: template, funds, spacing, path.
    pub(crate) fn validate_placement<'a>(
        &self,
        catalog: &'a Catalog,
        template: &str,
        position: Vec2,
        economy: &Economy,
        path: &PathModel,
        rules: &Rules,
    ) -> Result<&'a TowerTemplate, PlacementError> {
        let definition = catalog.tower(template).map_err(|error| {
            warn!("tower placement refused: {error}");
            PlacementError::UnknownTemplate
        })?;

        if !economy.can_afford(definition.cost) {
            return Err(PlacementError::InsufficientFunds);
        }

        if self
            .entries
            .values()
            .any(|tower| tower.position.distance(position) < rules.tower_spacing)
        {
            return Err(PlacementError::Overlapping);
        }

        if path.distance_to(position) < rules.path_clearance {
            return Err(PlacementError::OnPath);
        }

        Ok(definition)
    }

    /// Stores a new tower built from `template` and returns its identifier.
    pub(crate) fn insert(&mut self, template: &TowerTemplate, position: Vec2) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self
            .entries
            .insert(id, Tower::from_template(id, template, position));
        id
    }

    /// Purchases the next tier of the tower's ladder.
    pub(crate) fn upgrade(
        &mut self,
        id: TowerId,
        economy: &mut Economy,
    ) -> Result<usize, UpgradeError> {
        let tower = self
            .entries
            .get_mut(&id)
            .ok_or(UpgradeError::MissingTower)?;
        let tier = tower.next_tier().cloned().ok_or(UpgradeError::MaxLevel)?;
        if !economy.can_afford(tier.price) {
            return Err(UpgradeError::InsufficientFunds);
        }

        economy.debit(tier.price);
        if let Some(damage) = tier.damage {
            tower.damage = damage;
        }
        if let Some(range) = tier.range {
            tower.range = range;
        }
        if let Some(fire_rate) = tier.fire_rate {
            tower.fire_rate = fire_rate;
        }
        if let Some(detection) = tier.detection {
            tower.detection = detection;
        }
        tower.upgrade_spend = tower.upgrade_spend.saturating_add(tier.price);
        tower.level += 1;
        Ok(tower.level)
    }

    /// Removes the tower and credits its resale value.
    pub(crate) fn sell(&mut self, id: TowerId, economy: &mut Economy) -> Result<Gold, SaleError> {
        let tower = self.entries.remove(&id).ok_or(SaleError::MissingTower)?;
        let refund = tower.resale();
        economy.credit(refund);
        Ok(refund)
    }

    /// Combined per-wave payout of every income tower.
    pub(crate) fn income_total(&self) -> Gold {
        self.entries
            .values()
            .filter(|tower| tower.income)
            .fold(Gold::ZERO, |total, tower| {
                total.saturating_add(Gold::new(i64::from(tower.damage)))
            })
    }

    /// Identifiers of every placed tower in ascending order.
    pub(crate) fn ids(&self) -> Vec<TowerId> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut Tower> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn view(&self) -> TowerView {
        TowerView::from_snapshots(self.entries.values().map(Tower::snapshot).collect())
    }
}
