//! Battlefield geometry and the two bases.

use crate::components::{Health, Position, Side, LANE_COUNT};
use crate::config::SimConfig;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Canvas dimensions as reported by the host.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Battlefield {
    pub width: f32,
    pub height: f32,
    /// Current width over the reference width.
    pub scale: f32,
}

impl Default for Battlefield {
    fn default() -> Self {
        Self::new(800.0, 400.0, 800.0)
    }
}

impl Battlefield {
    pub fn new(width: f32, height: f32, reference_width: f32) -> Self {
        let scale = if reference_width > 0.0 { width / reference_width } else { 1.0 };
        Self { width, height, scale }
    }

    /// Vertical centre of a lane.
    pub fn lane_center(&self, lane: u8) -> f32 {
        let lane = lane.min(LANE_COUNT - 1) as f32;
        self.height * (lane + 1.0) / (LANE_COUNT as f32 + 1.0)
    }

    /// Reference point units aim at when targeting a side's base.
    pub fn base_position(&self, side: Side, config: &SimConfig) -> Position {
        let inset = config.base_inset * self.scale;
        let x = match side {
            Side::Ally => inset,
            Side::Enemy => self.width - inset,
        };
        Position::new(x, self.height / 2.0)
    }

    /// Clamp a position into the playable area.
    pub fn clamp(&self, pos: Position, config: &SimConfig) -> Position {
        let min = config.edge_margin;
        let max_x = (self.width - config.edge_margin - config.sprite_margin).max(min);
        let max_y = (self.height - config.edge_margin - config.sprite_margin).max(min);
        Position::new(pos.x.clamp(min, max_x), pos.y.clamp(min, max_y))
    }
}

/// A side's base. Only the player base has damage reduction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Base {
    pub health: Health,
    pub defense_percent: u32,
}

impl Base {
    pub fn new(max_health: f32, defense_percent: u32) -> Self {
        Self {
            health: Health::new(max_health),
            defense_percent,
        }
    }

    /// Damage after defense. Reduced hits always deal at least one point.
    pub fn mitigate(&self, damage: f32) -> f32 {
        let raw = damage.floor();
        if self.defense_percent == 0 {
            return raw;
        }
        let kept = (100 - self.defense_percent.min(100)) as f32 / 100.0;
        (raw * kept).floor().max(1.0)
    }

    /// Apply a hit, returning the damage actually dealt.
    pub fn take_hit(&mut self, damage: f32) -> f32 {
        let dealt = self.mitigate(damage);
        self.health.damage(dealt);
        dealt
    }

    pub fn is_destroyed(&self) -> bool {
        !self.health.is_alive()
    }
}

#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bases {
    pub player: Base,
    pub enemy: Base,
}

impl Bases {
    pub fn get(&self, side: Side) -> &Base {
        match side {
            Side::Ally => &self.player,
            Side::Enemy => &self.enemy,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut Base {
        match side {
            Side::Ally => &mut self.player,
            Side::Enemy => &mut self.enemy,
        }
    }
}

impl Default for Bases {
    fn default() -> Self {
        Self {
            player: Base::new(crate::economy::PLAYER_BASE_HEALTH, 0),
            enemy: Base::new(SimConfig::default().enemy_base_health, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defense_reduction() {
        let base = Base::new(200.0, 20);
        assert_eq!(base.mitigate(10.0), 8.0);
        assert_eq!(base.mitigate(1.0), 1.0);
        assert_eq!(Base::new(150.0, 0).mitigate(7.9), 7.0);
    }

    #[test]
    fn test_take_hit_clamps() {
        let mut base = Base::new(5.0, 0);
        assert_eq!(base.take_hit(10.0), 10.0);
        assert_eq!(base.health.current, 0.0);
        assert!(base.is_destroyed());
    }

    #[test]
    fn test_geometry_scales_with_width() {
        let config = SimConfig::default();
        let field = Battlefield::new(1600.0, 400.0, config.reference_width);
        assert_eq!(field.scale, 2.0);
        assert_eq!(field.base_position(Side::Ally, &config).x, 100.0);
        assert_eq!(field.base_position(Side::Enemy, &config).x, 1500.0);
        assert_eq!(field.lane_center(0), 100.0);
        assert_eq!(field.lane_center(2), 300.0);
    }

    #[test]
    fn test_clamp_keeps_sprite_inside() {
        let config = SimConfig::default();
        let field = Battlefield::default();
        let clamped = field.clamp(Position::new(-50.0, 900.0), &config);
        assert_eq!(clamped, Position::new(10.0, 370.0));
    }
}
