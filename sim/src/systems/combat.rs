//! Combat resolution: target choice, reach, and attack outcomes.
//!
//! A unit always has a target. It is the nearest opposing unit found in the
//! spatial grid, or the opposing base when none is nearby. Inside reach the
//! unit stands still and strikes whenever its cooldown allows; outside reach
//! it steers toward the target.

use crate::components::{AttackTimer, CombatStats, Position, Side};
use crate::config::SimConfig;
use crate::spatial::SpatialEntry;
use bevy_ecs::prelude::*;

/// What a unit is fighting this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Unit(Entity),
    Base(Side),
}

/// Decision for one unit this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Engagement {
    /// In reach. `strike` is set when the cooldown has elapsed.
    Attack { strike: bool },
    /// Out of reach; steer toward the target.
    Advance,
}

/// Nearest candidate by squared distance. Ties go to the first seen.
pub fn nearest<I>(pos: &Position, candidates: I) -> Option<SpatialEntry>
where
    I: IntoIterator<Item = SpatialEntry>,
{
    let mut best: Option<(SpatialEntry, f32)> = None;
    for entry in candidates {
        let dist_sq = entry.distance_sq(pos);
        match best {
            Some((_, best_sq)) if dist_sq >= best_sq => {}
            _ => best = Some((entry, dist_sq)),
        }
    }
    best.map(|(entry, _)| entry)
}

/// Reach against `target`, in current canvas pixels. Bases are wide, so
/// they get a flat buffer on top of the unit's own range.
pub fn effective_range(range: f32, target: &Target, scale: f32, config: &SimConfig) -> f32 {
    match target {
        Target::Unit(_) => range * scale,
        Target::Base(_) => (range + config.base_range_buffer) * scale,
    }
}

/// Attack-or-move decision for a unit at `pos` facing a target at `target_pos`
/// that it can hit from `reach` away.
pub fn engage(
    pos: &Position,
    target_pos: &Position,
    reach: f32,
    stats: &CombatStats,
    timer: &AttackTimer,
    now_ms: f64,
) -> Engagement {
    if pos.distance_sq(target_pos) <= reach * reach {
        Engagement::Attack {
            strike: timer.ready(now_ms, stats.cooldown_ms),
        }
    } else {
        Engagement::Advance
    }
}

/// Damage dealt to a unit per strike, in whole points.
pub fn unit_damage(stats: &CombatStats) -> f32 {
    stats.damage.floor().max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32, x: f32, y: f32) -> SpatialEntry {
        SpatialEntry {
            entity: Entity::from_raw(id),
            x,
            y,
            side: Side::Enemy,
        }
    }

    #[test]
    fn test_nearest_picks_minimum_distance() {
        let origin = Position::new(0.0, 0.0);
        let found = nearest(&origin, vec![entry(1, 30.0, 0.0), entry(2, 0.0, 12.0), entry(3, 20.0, 20.0)]);
        assert_eq!(found.map(|e| e.entity), Some(Entity::from_raw(2)));
        assert_eq!(nearest(&origin, Vec::new()), None);
    }

    #[test]
    fn test_base_reach_includes_buffer() {
        let config = SimConfig::default();
        let unit = effective_range(30.0, &Target::Unit(Entity::from_raw(1)), 2.0, &config);
        let base = effective_range(30.0, &Target::Base(Side::Enemy), 2.0, &config);
        assert_eq!(unit, 60.0);
        assert_eq!(base, (30.0 + config.base_range_buffer) * 2.0);
    }

    #[test]
    fn test_engage_respects_cooldown() {
        let stats = CombatStats::default();
        let reach = stats.range;
        let here = Position::new(100.0, 100.0);
        let close = Position::new(120.0, 100.0);
        let far = Position::new(200.0, 100.0);

        let fresh = AttackTimer::default();
        let cooling = AttackTimer { last_attack_ms: Some(900.0) };

        assert_eq!(
            engage(&here, &close, reach, &stats, &fresh, 1000.0),
            Engagement::Attack { strike: true }
        );
        assert_eq!(
            engage(&here, &close, reach, &stats, &cooling, 1000.0),
            Engagement::Attack { strike: false }
        );
        assert_eq!(
            engage(&here, &far, reach, &stats, &fresh, 1000.0),
            Engagement::Advance
        );
    }
}
