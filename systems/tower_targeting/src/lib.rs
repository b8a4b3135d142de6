#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that selects tower targets and resolves firing arcs.
//!
//! The system never touches the world directly. Callers feed it the enemies a
//! tower is allowed to engage (already filtered by range and detection) and it
//! reports which one is the primary target, where the tower should face, and
//! which candidates fall inside an area-of-effect cone.

use glam::Vec2;
use lane_defence_core::{EnemyId, Health, TargetingMode};

/// Tolerance applied to the inclusive arc boundary, in degrees.
const ARC_TOLERANCE_DEGREES: f32 = 1e-3;

/// Enemy eligible to be engaged by a tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Identifier of the enemy.
    pub enemy: EnemyId,
    /// Position of the enemy at the time of the query.
    pub position: Vec2,
    /// Cumulative distance the enemy travelled along the path.
    pub progress: f32,
    /// Health the enemy spawned with.
    pub max_health: Health,
}

/// Primary target chosen for a tower together with the resulting facing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Acquisition {
    /// Candidate selected as the primary target.
    pub primary: Candidate,
    /// Bearing from the tower to the primary target in degrees.
    pub facing: f32,
}

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    candidates: Vec<Candidate>,
    hits: Vec<EnemyId>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the provided candidates and selects the primary target.
    ///
    /// Candidates are retained until the next call so that [`Self::arc_hits`]
    /// can evaluate the same set the primary was chosen from.
    pub fn acquire<I>(
        &mut self,
        mode: TargetingMode,
        origin: Vec2,
        candidates: I,
    ) -> Option<Acquisition>
    where
        I: IntoIterator<Item = Candidate>,
    {
        self.candidates.clear();
        self.candidates.extend(candidates);

        let primary = select_primary(mode, &self.candidates)?;
        Some(Acquisition {
            primary,
            facing: bearing_degrees(origin, primary.position),
        })
    }

    /// Candidates captured by the most recent [`Self::acquire`] call.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Lists the captured candidates whose bearing lies inside the cone.
    ///
    /// The cone is centred on `facing` and spans `arc_degrees` in total. The
    /// boundary is inclusive.
    pub fn arc_hits(&mut self, origin: Vec2, facing: f32, arc_degrees: f32) -> &[EnemyId] {
        self.hits.clear();
        let half_arc = arc_degrees / 2.0;
        for candidate in &self.candidates {
            let bearing = bearing_degrees(origin, candidate.position);
            if within_arc(facing, bearing, half_arc) {
                self.hits.push(candidate.enemy);
            }
        }
        &self.hits
    }
}

/// Picks the primary target among `candidates` according to `mode`.
///
/// `First` prefers the greatest path progress and `Strongest` the greatest
/// maximum health. Ties resolve to the earliest candidate in iteration order.
#[must_use]
pub fn select_primary(mode: TargetingMode, candidates: &[Candidate]) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for candidate in candidates {
        let replace = match &best {
            None => true,
            Some(existing) => match mode {
                TargetingMode::First => candidate.progress > existing.progress,
                TargetingMode::Strongest => candidate.max_health > existing.max_health,
            },
        };
        if replace {
            best = Some(*candidate);
        }
    }
    best
}

/// Bearing from `from` toward `to` in degrees, normalized to (-180, 180].
#[must_use]
pub fn bearing_degrees(from: Vec2, to: Vec2) -> f32 {
    let offset = to - from;
    normalize_degrees(offset.y.atan2(offset.x).to_degrees())
}

/// Wraps an angle in degrees into the half-open range (-180, 180].
#[must_use]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle % 360.0;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

fn within_arc(facing: f32, bearing: f32, half_arc: f32) -> bool {
    normalize_degrees(bearing - facing).abs() <= half_arc + ARC_TOLERANCE_DEGREES
}
