//! Steering model: pursuit, lane adherence and separation, blended into a
//! desired velocity that the actual velocity eases toward.

use crate::components::{Position, UnitId, Velocity};
use crate::config::SimConfig;
use crate::field::Battlefield;

/// Minimum distance used in separation, so overlapping units do not blow up.
const MIN_SEPARATION_DIST: f32 = 1.0;

/// Everything the steering model needs to know about one unit this tick.
#[derive(Debug, Clone, Copy)]
pub struct Steering {
    pub id: UnitId,
    pub position: Position,
    pub target: Position,
    pub lane_center: f32,
    /// Archetype speed before scaling.
    pub speed: f32,
}

/// Pursuit term: toward the target, with vertical movement damped.
pub fn pursuit(s: &Steering, scale: f32, config: &SimConfig) -> Velocity {
    let dx = s.target.x - s.position.x;
    let dy = s.target.y - s.position.y;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist < 0.001 {
        return Velocity::default();
    }
    let speed = s.speed * config.move_multiplier * scale;
    Velocity::new(
        dx / dist * speed,
        dy / dist * speed * config.vertical_damping,
    )
}

/// Lane term: a weak vertical pull, only once the unit has drifted past the threshold.
pub fn lane_pull(s: &Steering, scale: f32, config: &SimConfig) -> Velocity {
    let offset = s.lane_center - s.position.y;
    if offset.abs() <= config.lane_threshold * scale {
        return Velocity::default();
    }
    let strength = config.lane_weight * s.speed * config.move_multiplier * scale;
    Velocity::new(0.0, offset.signum() * strength)
}

/// Separation term: push away from each close friendly, inversely to distance.
///
/// Friendlies stacked exactly on `id` are split along the vertical axis, the
/// lower id upward and the higher id downward.
pub fn separation(
    id: UnitId,
    position: &Position,
    friendlies: &[(UnitId, Position)],
    scale: f32,
    config: &SimConfig,
) -> Velocity {
    let radius = config.separation_radius * scale;
    let radius_sq = radius * radius;
    let mut push = Velocity::default();
    for (other_id, other) in friendlies {
        let dx = position.x - other.x;
        let dy = position.y - other.y;
        let dist_sq = dx * dx + dy * dy;
        if dist_sq >= radius_sq {
            continue;
        }
        if dist_sq == 0.0 {
            let away = if id < *other_id { -1.0 } else { 1.0 };
            push.vy += away * config.separation_weight * scale / MIN_SEPARATION_DIST;
            continue;
        }
        let dist = dist_sq.sqrt().max(MIN_SEPARATION_DIST);
        let strength = config.separation_weight * scale / dist;
        push.vx += dx / dist * strength;
        push.vy += dy / dist * strength;
    }
    push
}

/// Sum of the three steering terms.
pub fn desired_velocity(
    s: &Steering,
    friendlies: &[(UnitId, Position)],
    scale: f32,
    config: &SimConfig,
) -> Velocity {
    let p = pursuit(s, scale, config);
    let l = lane_pull(s, scale, config);
    let sep = separation(s.id, &s.position, friendlies, scale, config);
    Velocity::new(p.vx + l.vx + sep.vx, p.vy + l.vy + sep.vy)
}

/// Ease velocity toward `desired`, advance one tick, and keep the unit on the canvas.
pub fn integrate(
    position: Position,
    velocity: Velocity,
    desired: Velocity,
    field: &Battlefield,
    config: &SimConfig,
) -> (Position, Velocity) {
    let vel = Velocity::new(
        velocity.vx + (desired.vx - velocity.vx) * config.acceleration,
        velocity.vy + (desired.vy - velocity.vy) * config.acceleration,
    );
    let moved = Position::new(position.x + vel.vx, position.y + vel.vy);
    (field.clamp(moved, config), vel)
}
