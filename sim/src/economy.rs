//! Currencies, upgrade levels and the meta-progression shop.
//!
//! Gold is earned and spent within an encounter. Diamonds and upgrade levels
//! persist and are spent in the shop.

use crate::error::SimError;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Highest purchasable level for leveled upgrades.
pub const MAX_UPGRADE_LEVEL: u32 = 10;
/// Defense reduction per level, in percent.
pub const DEFENSE_PERCENT_PER_LEVEL: u32 = 10;
/// Cap on base damage reduction, in percent.
pub const MAX_DEFENSE_PERCENT: u32 = 60;
/// Player base health before upgrades.
pub const PLAYER_BASE_HEALTH: f32 = 200.0;
/// Player base health per base-health level.
pub const PLAYER_BASE_HEALTH_PER_LEVEL: f32 = 50.0;
/// Diamond price of the knight unlock.
pub const KNIGHT_UNLOCK_COST: u32 = 25;

/// Persistent upgrade counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeLevels {
    pub unit_health: u32,
    pub unit_damage: u32,
    pub base_health: u32,
    pub base_defense: u32,
    pub gold_rate: u32,
    pub knight_unlocked: bool,
}

impl UpgradeLevels {
    pub fn player_base_max_health(&self) -> f32 {
        PLAYER_BASE_HEALTH + self.base_health as f32 * PLAYER_BASE_HEALTH_PER_LEVEL
    }

    pub fn defense_percent(&self) -> u32 {
        (self.base_defense * DEFENSE_PERCENT_PER_LEVEL).min(MAX_DEFENSE_PERCENT)
    }

    /// Passive income multiplier: +25% per level.
    pub fn gold_rate_multiplier(&self) -> f32 {
        1.0 + self.gold_rate as f32 * 0.25
    }
}

/// Shop entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    UnitHealth,
    UnitDamage,
    BaseHealth,
    BaseDefense,
    GoldRate,
    KnightUnlock,
}

impl UpgradeKind {
    /// Diamond price of the next level, given the current one.
    pub fn cost(self, current_level: u32) -> u32 {
        match self {
            UpgradeKind::KnightUnlock => KNIGHT_UNLOCK_COST,
            UpgradeKind::UnitHealth | UpgradeKind::UnitDamage => 5 * (current_level + 1),
            UpgradeKind::BaseHealth | UpgradeKind::BaseDefense => 4 * (current_level + 1),
            UpgradeKind::GoldRate => 3 * (current_level + 1),
        }
    }
}

/// Wallet and upgrades. The only place currencies are mutated.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Economy {
    pub gold: u32,
    pub diamonds: u32,
    pub upgrades: UpgradeLevels,
    /// Fractional passive gold not yet paid out.
    #[serde(skip)]
    pub income_carry: f32,
}

impl Economy {
    pub fn credit(&mut self, gold: u32, diamonds: u32) {
        self.gold = self.gold.saturating_add(gold);
        self.diamonds = self.diamonds.saturating_add(diamonds);
    }

    pub fn spend_gold(&mut self, amount: u32) -> Result<(), SimError> {
        if self.gold < amount {
            return Err(SimError::InsufficientGold {
                needed: amount,
                available: self.gold,
            });
        }
        self.gold -= amount;
        Ok(())
    }

    /// Accrue passive income for `delta_ms` of active play.
    pub fn accrue_income(&mut self, base_per_second: f32, delta_ms: f64) -> u32 {
        let per_second = base_per_second * self.upgrades.gold_rate_multiplier();
        self.income_carry += per_second * (delta_ms / 1000.0) as f32;
        let whole = self.income_carry.floor();
        self.income_carry -= whole;
        let paid = whole as u32;
        self.gold = self.gold.saturating_add(paid);
        paid
    }

    pub fn level(&self, kind: UpgradeKind) -> u32 {
        let up = &self.upgrades;
        match kind {
            UpgradeKind::UnitHealth => up.unit_health,
            UpgradeKind::UnitDamage => up.unit_damage,
            UpgradeKind::BaseHealth => up.base_health,
            UpgradeKind::BaseDefense => up.base_defense,
            UpgradeKind::GoldRate => up.gold_rate,
            UpgradeKind::KnightUnlock => up.knight_unlocked as u32,
        }
    }

    /// Buy one level of `kind`. Returns the new level.
    pub fn purchase(&mut self, kind: UpgradeKind) -> Result<u32, SimError> {
        let level = self.level(kind);
        match kind {
            UpgradeKind::KnightUnlock if self.upgrades.knight_unlocked => {
                return Err(SimError::AlreadyUnlocked);
            }
            UpgradeKind::KnightUnlock => {}
            _ if level >= MAX_UPGRADE_LEVEL => return Err(SimError::MaxLevel(kind)),
            _ => {}
        }

        let cost = kind.cost(level);
        if self.diamonds < cost {
            return Err(SimError::InsufficientDiamonds {
                needed: cost,
                available: self.diamonds,
            });
        }
        self.diamonds -= cost;

        let up = &mut self.upgrades;
        let new_level = match kind {
            UpgradeKind::UnitHealth => bump(&mut up.unit_health),
            UpgradeKind::UnitDamage => bump(&mut up.unit_damage),
            UpgradeKind::BaseHealth => bump(&mut up.base_health),
            UpgradeKind::BaseDefense => bump(&mut up.base_defense),
            UpgradeKind::GoldRate => bump(&mut up.gold_rate),
            UpgradeKind::KnightUnlock => {
                up.knight_unlocked = true;
                1
            }
        };
        Ok(new_level)
    }
}

fn bump(level: &mut u32) -> u32 {
    *level += 1;
    *level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_spends_diamonds() {
        let mut economy = Economy {
            diamonds: 20,
            ..Default::default()
        };
        assert_eq!(economy.purchase(UpgradeKind::BaseDefense).unwrap(), 1);
        assert_eq!(economy.purchase(UpgradeKind::BaseDefense).unwrap(), 2);
        // 4 + 8 spent
        assert_eq!(economy.diamonds, 8);
        assert_eq!(economy.upgrades.defense_percent(), 20);
    }

    #[test]
    fn test_purchase_rejects_without_change() {
        let mut economy = Economy {
            diamonds: 3,
            ..Default::default()
        };
        let before = economy.clone();
        assert!(matches!(
            economy.purchase(UpgradeKind::UnitDamage),
            Err(SimError::InsufficientDiamonds { needed: 5, available: 3 })
        ));
        assert_eq!(economy, before);
    }

    #[test]
    fn test_knight_unlock_is_one_off() {
        let mut economy = Economy {
            diamonds: 100,
            ..Default::default()
        };
        economy.purchase(UpgradeKind::KnightUnlock).unwrap();
        assert!(economy.upgrades.knight_unlocked);
        assert!(matches!(
            economy.purchase(UpgradeKind::KnightUnlock),
            Err(SimError::AlreadyUnlocked)
        ));
        assert_eq!(economy.diamonds, 100 - KNIGHT_UNLOCK_COST);
    }

    #[test]
    fn test_max_level() {
        let mut economy = Economy {
            diamonds: 10_000,
            ..Default::default()
        };
        for _ in 0..MAX_UPGRADE_LEVEL {
            economy.purchase(UpgradeKind::GoldRate).unwrap();
        }
        assert!(matches!(
            economy.purchase(UpgradeKind::GoldRate),
            Err(SimError::MaxLevel(UpgradeKind::GoldRate))
        ));
    }

    #[test]
    fn test_defense_is_capped() {
        let upgrades = UpgradeLevels {
            base_defense: 9,
            ..Default::default()
        };
        assert_eq!(upgrades.defense_percent(), MAX_DEFENSE_PERCENT);
    }

    #[test]
    fn test_income_carries_fractions() {
        let mut economy = Economy::default();
        assert_eq!(economy.accrue_income(1.0, 600.0), 0);
        assert_eq!(economy.accrue_income(1.0, 600.0), 1);
        assert_eq!(economy.gold, 1);
    }
}
