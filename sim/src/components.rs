//! ECS Components for the Bastion Lanes simulation.
//!
//! Components are pure data containers attached to unit entities.
//! All game logic lives in systems that query these components.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// 2D position on the battlefield in canvas pixels (x grows toward the enemy base).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// 2D velocity vector, in pixels per tick.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

impl Velocity {
    pub fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }

    pub fn magnitude(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    pub fn stop(&mut self) {
        self.vx = 0.0;
        self.vy = 0.0;
    }
}

/// Lane index (0..LANE_COUNT) the unit is nudged to stay within.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane(pub u8);

/// Number of parallel corridors on the battlefield.
pub const LANE_COUNT: u8 = 3;

/// Spatial grid cell the unit occupied at the last rebuild.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridCell(pub Option<(i32, i32)>);

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Monotonic unit identifier. Spawn order doubles as roster order.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Which army a unit fights for.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Player-controlled.
    #[default]
    Ally,
    /// AI-controlled wave units.
    Enemy,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Ally => Side::Enemy,
            Side::Enemy => Side::Ally,
        }
    }

    /// Allies act before enemies each tick.
    pub fn turn_order(self) -> u8 {
        match self {
            Side::Ally => 0,
            Side::Enemy => 1,
        }
    }
}

/// Unit class. Base stats live in [`crate::stats`].
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    #[default]
    Barbarian,
    Archer,
    Horse,
    Knight,
}

impl Archetype {
    pub const ALL: [Archetype; 4] = [
        Archetype::Barbarian,
        Archetype::Archer,
        Archetype::Horse,
        Archetype::Knight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Archetype::Barbarian => "Barbarian",
            Archetype::Archer => "Archer",
            Archetype::Horse => "Horse",
            Archetype::Knight => "Knight",
        }
    }
}

/// Tick timestamp (wall clock, ms) of the spawn. Used by renderers for the entry animation.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnedAt(pub f64);

// ============================================================================
// COMBAT COMPONENTS
// ============================================================================

/// Health of a unit or base. Always kept within `[0, max]`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn damage(&mut self, amount: f32) {
        self.current = (self.current - amount).clamp(0.0, self.max);
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount).clamp(0.0, self.max);
    }

    pub fn reset(&mut self) {
        self.current = self.max;
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Per-unit combat stats after upgrades and wave scaling.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    /// Damage dealt per landed attack (whole points).
    pub damage: f32,
    /// Attack range at reference scale, in pixels.
    pub range: f32,
    /// Minimum wall-clock time between attacks.
    pub cooldown_ms: f64,
    /// Movement speed at reference scale.
    pub speed: f32,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            damage: 10.0,
            range: 30.0,
            cooldown_ms: 1000.0,
            speed: 1.6,
        }
    }
}

/// Wall-clock timestamp of the last landed attack.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackTimer {
    pub last_attack_ms: Option<f64>,
}

impl AttackTimer {
    pub fn ready(&self, now_ms: f64, cooldown_ms: f64) -> bool {
        match self.last_attack_ms {
            None => true,
            Some(last) => now_ms - last >= cooldown_ms,
        }
    }
}

/// Currency granted to the player when this unit dies.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub gold: u32,
    pub diamonds: u32,
}

// ============================================================================
// BUNDLE HELPERS
// ============================================================================

/// Bundle for spawning a complete unit entity.
#[derive(Bundle, Default, Clone)]
pub struct UnitBundle {
    pub id: UnitId,
    pub side: Side,
    pub archetype: Archetype,
    pub position: Position,
    pub velocity: Velocity,
    pub health: Health,
    pub stats: CombatStats,
    pub timer: AttackTimer,
    pub lane: Lane,
    pub spawned_at: SpawnedAt,
    pub cell: GridCell,
    pub reward: Reward,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_is_clamped() {
        let mut health = Health::new(50.0);
        health.damage(80.0);
        assert_eq!(health.current, 0.0);
        assert!(!health.is_alive());

        health.heal(500.0);
        assert_eq!(health.current, 50.0);
    }

    #[test]
    fn test_attack_timer_cooldown() {
        let mut timer = AttackTimer::default();
        assert!(timer.ready(0.0, 1000.0));

        timer.last_attack_ms = Some(500.0);
        assert!(!timer.ready(1499.0, 1000.0));
        assert!(timer.ready(1500.0, 1000.0));
    }

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::Ally.opponent(), Side::Enemy);
        assert_eq!(Side::Enemy.opponent(), Side::Ally);
        assert!(Side::Ally.turn_order() < Side::Enemy.turn_order());
    }
}
