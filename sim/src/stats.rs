//! Archetype base stats and stat derivation.
//!
//! Allies take upgrade multipliers, enemies take wave scaling. Both start
//! from the same per-archetype table.

use crate::components::{Archetype, CombatStats, Reward};
use crate::economy::UpgradeLevels;
use serde::{Deserialize, Serialize};

/// Per-wave health growth for enemy units.
pub const HEALTH_GROWTH: f32 = 1.12;
/// Per-wave damage growth for enemy units.
pub const DAMAGE_GROWTH: f32 = 1.08;
/// Stat bonus per unit upgrade level.
pub const UPGRADE_STEP: f32 = 0.10;

/// Unscaled stats for an archetype.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeStats {
    pub health: f32,
    pub damage: f32,
    pub range: f32,
    pub cooldown_ms: f64,
    pub speed: f32,
    /// Gold the player pays to field one.
    pub cost: u32,
    /// Kill reward at wave 0.
    pub reward_gold: u32,
    pub reward_diamonds: u32,
}

// Ranges stay inside one grid cell at reference scale: the 3x3 neighbour
// query only sees opponents that close.
const BARBARIAN: ArchetypeStats = ArchetypeStats {
    health: 100.0,
    damage: 10.0,
    range: 30.0,
    cooldown_ms: 1000.0,
    speed: 1.6,
    cost: 10,
    reward_gold: 4,
    reward_diamonds: 0,
};

const ARCHER: ArchetypeStats = ArchetypeStats {
    health: 60.0,
    damage: 8.0,
    range: 48.0,
    cooldown_ms: 1200.0,
    speed: 1.4,
    cost: 20,
    reward_gold: 6,
    reward_diamonds: 0,
};

const HORSE: ArchetypeStats = ArchetypeStats {
    health: 150.0,
    damage: 14.0,
    range: 32.0,
    cooldown_ms: 900.0,
    speed: 2.8,
    cost: 35,
    reward_gold: 9,
    reward_diamonds: 0,
};

const KNIGHT: ArchetypeStats = ArchetypeStats {
    health: 300.0,
    damage: 22.0,
    range: 35.0,
    cooldown_ms: 1300.0,
    speed: 1.2,
    cost: 60,
    reward_gold: 15,
    reward_diamonds: 1,
};

impl Archetype {
    pub fn base_stats(self) -> &'static ArchetypeStats {
        match self {
            Archetype::Barbarian => &BARBARIAN,
            Archetype::Archer => &ARCHER,
            Archetype::Horse => &HORSE,
            Archetype::Knight => &KNIGHT,
        }
    }

    pub fn cost(self) -> u32 {
        self.base_stats().cost
    }
}

/// Fully derived stats for one spawned unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitStats {
    pub max_health: f32,
    pub combat: CombatStats,
    pub reward: Reward,
}

/// Stats for a player-spawned unit. Allies never yield a reward.
pub fn ally_stats(archetype: Archetype, upgrades: &UpgradeLevels) -> UnitStats {
    let base = archetype.base_stats();
    let health_mult = 1.0 + upgrades.unit_health as f32 * UPGRADE_STEP;
    let damage_mult = 1.0 + upgrades.unit_damage as f32 * UPGRADE_STEP;
    UnitStats {
        max_health: (base.health * health_mult).floor(),
        combat: CombatStats {
            damage: (base.damage * damage_mult).floor(),
            range: base.range,
            cooldown_ms: base.cooldown_ms,
            speed: base.speed,
        },
        reward: Reward::default(),
    }
}

/// Stats for an enemy of `archetype` at `wave` (1-based).
pub fn scaled_stats(archetype: Archetype, wave: u32) -> UnitStats {
    let base = archetype.base_stats();
    let steps = wave.saturating_sub(1) as i32;
    UnitStats {
        max_health: (base.health * HEALTH_GROWTH.powi(steps)).floor(),
        combat: CombatStats {
            damage: (base.damage * DAMAGE_GROWTH.powi(steps)).floor(),
            range: base.range,
            cooldown_ms: base.cooldown_ms,
            speed: base.speed,
        },
        reward: Reward {
            gold: base.reward_gold + wave,
            diamonds: base.reward_diamonds,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaling_is_monotonic() {
        for archetype in Archetype::ALL {
            for wave in 1..30 {
                let lo = scaled_stats(archetype, wave);
                let hi = scaled_stats(archetype, wave + 1);
                assert!(hi.max_health >= lo.max_health, "{archetype:?} health at wave {wave}");
                assert!(hi.combat.damage >= lo.combat.damage, "{archetype:?} damage at wave {wave}");
                assert!(hi.reward.gold > lo.reward.gold);
            }
        }
    }

    #[test]
    fn test_ranges_fit_the_neighbour_query() {
        let cell = crate::config::SimConfig::default().cell_size;
        for archetype in Archetype::ALL {
            assert!(archetype.base_stats().range <= cell, "{archetype:?} outranges the grid");
        }
    }

    #[test]
    fn test_health_outgrows_damage() {
        let wave_one = scaled_stats(Archetype::Barbarian, 1);
        let wave_ten = scaled_stats(Archetype::Barbarian, 10);
        let health_ratio = wave_ten.max_health / wave_one.max_health;
        let damage_ratio = wave_ten.combat.damage / wave_one.combat.damage;
        assert!(health_ratio > damage_ratio);
    }

    #[test]
    fn test_wave_one_is_unscaled() {
        let stats = scaled_stats(Archetype::Archer, 1);
        assert_eq!(stats.max_health, 60.0);
        assert_eq!(stats.combat.damage, 8.0);
        assert_eq!(stats.reward.gold, 7);
    }

    #[test]
    fn test_ally_upgrades() {
        let upgrades = UpgradeLevels {
            unit_health: 2,
            unit_damage: 5,
            ..Default::default()
        };
        let stats = ally_stats(Archetype::Barbarian, &upgrades);
        assert_eq!(stats.max_health, 120.0);
        assert_eq!(stats.combat.damage, 15.0);
        assert_eq!(stats.reward, Reward::default());
    }
}
