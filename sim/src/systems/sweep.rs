//! Death sweep and economy payout.
//!
//! Dead units are collected first and despawned through `Commands`, so the
//! roster is never mutated while it is being iterated. Their rewards are paid
//! out in one batch per tick.

use crate::components::{Health, Reward};
use crate::config::SimConfig;
use crate::economy::Economy;
use crate::spatial::SpatialGrid;
use crate::state::{PendingRewards, SimClock};
use bevy_ecs::prelude::*;
use tracing::debug;

/// System that removes units at zero health and banks their rewards.
pub fn death_sweep_system(
    mut commands: Commands,
    mut grid: ResMut<SpatialGrid>,
    mut pending: ResMut<PendingRewards>,
    query: Query<(Entity, &Health, &Reward)>,
) {
    let dead: Vec<(Entity, Reward)> = query
        .iter()
        .filter(|(_, health, _)| !health.is_alive())
        .map(|(entity, _, reward)| (entity, *reward))
        .collect();

    if dead.is_empty() {
        return;
    }

    for (entity, reward) in &dead {
        pending.gold += reward.gold;
        pending.diamonds += reward.diamonds;
        commands.entity(*entity).despawn();
    }
    grid.mark_dirty();
    debug!(swept = dead.len(), gold = pending.gold, diamonds = pending.diamonds, "death sweep");
}

/// System that pays out the batched kill rewards.
pub fn reward_payout_system(mut pending: ResMut<PendingRewards>, mut economy: ResMut<Economy>) {
    if *pending == PendingRewards::default() {
        return;
    }
    economy.credit(pending.gold, pending.diamonds);
    *pending = PendingRewards::default();
}

/// System that accrues passive gold for the time elapsed since the last tick.
pub fn passive_income_system(
    config: Res<SimConfig>,
    clock: Res<SimClock>,
    mut economy: ResMut<Economy>,
) {
    economy.accrue_income(config.base_gold_per_second, clock.delta_ms);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::UnitBundle;

    fn sweep_world() -> (World, Schedule) {
        let mut world = World::new();
        let mut grid = SpatialGrid::default();
        grid.rebuild(std::iter::empty());
        world.insert_resource(grid);
        world.insert_resource(PendingRewards::default());
        world.insert_resource(Economy::default());

        let mut schedule = Schedule::default();
        schedule.add_systems((death_sweep_system, reward_payout_system).chain());
        (world, schedule)
    }

    #[test]
    fn test_sweep_collects_rewards_once() {
        let (mut world, mut schedule) = sweep_world();
        let mut dead = Health::new(40.0);
        dead.damage(40.0);

        world.spawn(UnitBundle {
            health: dead,
            reward: Reward { gold: 5, diamonds: 1 },
            ..Default::default()
        });
        world.spawn(UnitBundle {
            health: dead,
            reward: Reward { gold: 7, diamonds: 0 },
            ..Default::default()
        });
        let survivor = world
            .spawn(UnitBundle {
                reward: Reward { gold: 100, diamonds: 0 },
                ..Default::default()
            })
            .id();

        schedule.run(&mut world);
        let economy = world.resource::<Economy>();
        assert_eq!((economy.gold, economy.diamonds), (12, 1));

        // A second sweep finds nothing left to collect.
        schedule.run(&mut world);
        let economy = world.resource::<Economy>();
        assert_eq!((economy.gold, economy.diamonds), (12, 1));

        let mut query = world.query::<Entity>();
        let remaining: Vec<_> = query.iter(&world).collect();
        assert_eq!(remaining, vec![survivor]);
        assert!(world.resource::<SpatialGrid>().is_dirty());
    }

    #[test]
    fn test_passive_income_uses_delta() {
        let mut world = World::new();
        world.insert_resource(SimConfig::default());
        world.insert_resource(Economy::default());
        world.insert_resource(SimClock { now_ms: 5000.0, delta_ms: 3000.0 });

        let mut schedule = Schedule::default();
        schedule.add_systems(passive_income_system);
        schedule.run(&mut world);

        assert_eq!(world.resource::<Economy>().gold, 3);
    }
}
