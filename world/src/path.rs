//! Immutable polyline followed by every enemy.

use glam::Vec2;
use lane_defence_core::ConfigurationError;

/// Ordered waypoints shared by all enemies. Never mutated after load.
#[derive(Clone, Debug, PartialEq)]
pub struct PathModel {
    waypoints: Vec<Vec2>,
}

/// Outcome of advancing an entity along the path for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathStep {
    /// Position after the step.
    pub position: Vec2,
    /// Index of the waypoint the entity is now heading toward.
    pub segment: usize,
    /// Distance actually covered, which is less than requested when a
    /// waypoint was reached.
    pub travelled: f32,
}

impl PathModel {
    /// Builds a path from at least two waypoints.
    pub fn new(waypoints: Vec<Vec2>) -> Result<Self, ConfigurationError> {
        if waypoints.len() < 2 {
            return Err(ConfigurationError::PathTooShort {
                waypoints: waypoints.len(),
            });
        }
        Ok(Self { waypoints })
    }

    /// Number of waypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always false; a path holds at least two waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoint at the provided index, if any.
    #[must_use]
    pub fn waypoint(&self, index: usize) -> Option<Vec2> {
        self.waypoints.get(index).copied()
    }

    /// All waypoints in travel order.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// First waypoint, where wave spawns appear.
    #[must_use]
    pub fn start(&self) -> Vec2 {
        self.waypoints[0]
    }

    /// Reports whether the segment index lies past the final waypoint.
    #[must_use]
    pub fn is_finished(&self, segment: usize) -> bool {
        segment >= self.waypoints.len()
    }

    /// Moves `position` up to `distance` toward the waypoint at `segment`.
    ///
    /// When the waypoint is within reach the position snaps onto it and the
    /// segment advances. Any distance left over past the waypoint is dropped
    /// rather than carried into the next segment, so entities lose part of a
    /// tick's movement at every corner.
    #[must_use]
    pub fn step(&self, position: Vec2, segment: usize, distance: f32) -> PathStep {
        let Some(goal) = self.waypoint(segment) else {
            return PathStep {
                position,
                segment,
                travelled: 0.0,
            };
        };

        let offset = goal - position;
        let remaining = offset.length();
        if remaining <= distance {
            return PathStep {
                position: goal,
                segment: segment + 1,
                travelled: remaining,
            };
        }

        PathStep {
            position: position + offset / remaining * distance,
            segment,
            travelled: distance,
        }
    }

    /// Shortest distance from `point` to any segment of the polyline.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.waypoints
            .windows(2)
            .map(|pair| distance_to_segment(point, pair[0], pair[1]))
            .fold(f32::INFINITY, f32::min)
    }
}

fn distance_to_segment(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let span = end - start;
    let length_sq = span.length_squared();
    if length_sq == 0.0 {
        return point.distance(start);
    }
    let t = ((point - start).dot(span) / length_sq).clamp(0.0, 1.0);
    point.distance(start + span * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shape() -> PathModel {
        PathModel::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 100.0),
        ])
        .expect("valid path")
    }

    #[test]
    fn short_paths_are_rejected() {
        assert_eq!(
            PathModel::new(vec![Vec2::ZERO]),
            Err(ConfigurationError::PathTooShort { waypoints: 1 })
        );
    }

    #[test]
    fn step_moves_toward_waypoint() {
        let path = l_shape();
        let step = path.step(Vec2::ZERO, 1, 30.0);
        assert_eq!(step.position, Vec2::new(30.0, 0.0));
        assert_eq!(step.segment, 1);
        assert_eq!(step.travelled, 30.0);
    }

    #[test]
    fn leftover_distance_is_discarded_at_corner() {
        let path = l_shape();
        let step = path.step(Vec2::new(90.0, 0.0), 1, 25.0);
        assert_eq!(step.position, Vec2::new(100.0, 0.0));
        assert_eq!(step.segment, 2);
        assert_eq!(step.travelled, 10.0);
    }

    #[test]
    fn reaching_last_waypoint_finishes_path() {
        let path = l_shape();
        let step = path.step(Vec2::new(100.0, 95.0), 2, 10.0);
        assert_eq!(step.segment, 3);
        assert!(path.is_finished(step.segment));
        assert!(!path.is_finished(2));
    }

    #[test]
    fn stepping_past_the_end_is_inert() {
        let path = l_shape();
        let position = Vec2::new(100.0, 100.0);
        let step = path.step(position, 3, 50.0);
        assert_eq!(step.position, position);
        assert_eq!(step.travelled, 0.0);
    }

    #[test]
    fn distance_to_measures_nearest_segment() {
        let path = l_shape();
        assert_eq!(path.distance_to(Vec2::new(50.0, 20.0)), 20.0);
        assert_eq!(path.distance_to(Vec2::new(130.0, 50.0)), 30.0);
        assert_eq!(path.distance_to(Vec2::new(-30.0, -40.0)), 50.0);
    }
}
