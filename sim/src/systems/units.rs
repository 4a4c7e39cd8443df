//! Per-unit update: every ally, then every enemy, resolves combat or moves.
//!
//! Units act one at a time and damage lands immediately, so a unit killed
//! earlier in the tick loses its own turn. Target candidates come from the
//! grid built at the start of the tick.

use crate::components::*;
use crate::config::SimConfig;
use crate::events::{DamageTarget, SimEvent, SimEvents, SoundCue};
use crate::field::{Bases, Battlefield};
use crate::spatial::SpatialGrid;
use crate::state::{DefeatSignal, SimClock};
use crate::systems::combat::{effective_range, engage, nearest, unit_damage, Engagement, Target};
use crate::systems::movement::{desired_velocity, integrate, Steering};
use bevy_ecs::prelude::*;

type UnitQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static UnitId,
        &'static Side,
        &'static Lane,
        &'static CombatStats,
        &'static mut Position,
        &'static mut Velocity,
        &'static mut Health,
        &'static mut AttackTimer,
    ),
>;

fn live_position(units: &UnitQuery, entity: Entity) -> Option<Position> {
    units
        .get(entity)
        .ok()
        .filter(|(.., health, _)| health.is_alive())
        .map(|(_, _, _, _, _, pos, ..)| *pos)
}

/// System that runs combat and movement for every unit.
#[allow(clippy::too_many_arguments)]
pub fn unit_update_system(
    config: Res<SimConfig>,
    field: Res<Battlefield>,
    clock: Res<SimClock>,
    grid: Res<SpatialGrid>,
    mut bases: ResMut<Bases>,
    mut events: ResMut<SimEvents>,
    mut defeat: ResMut<DefeatSignal>,
    mut units: UnitQuery,
) {
    let mut order: Vec<(u8, UnitId, Entity)> = units
        .iter()
        .map(|(entity, id, side, ..)| (side.turn_order(), *id, entity))
        .collect();
    order.sort_unstable();

    let scale = field.scale;
    let now_ms = clock.now_ms;

    for (_, _, entity) in order {
        let Ok((_, &id, &side, &lane, &stats, &pos, _, health, &timer)) = units.get(entity) else {
            continue;
        };
        if !health.is_alive() {
            continue;
        }

        // Nearest live opponent, else the opposing base.
        let candidates = grid
            .query_nearby(&pos, side, true)
            .into_iter()
            .filter(|entry| live_position(&units, entry.entity).is_some());
        let (target, target_pos) = match nearest(&pos, candidates) {
            Some(entry) => {
                let at = live_position(&units, entry.entity).unwrap_or(Position::new(entry.x, entry.y));
                (Target::Unit(entry.entity), at)
            }
            None => {
                let defender = side.opponent();
                (Target::Base(defender), field.base_position(defender, &config))
            }
        };

        let reach = effective_range(stats.range, &target, scale, &config);
        match engage(&pos, &target_pos, reach, &stats, &timer, now_ms) {
            Engagement::Attack { strike } => {
                if let Ok((.., mut vel, _, mut timer)) = units.get_mut(entity) {
                    vel.stop();
                    if strike {
                        timer.last_attack_ms = Some(now_ms);
                    }
                }
                if !strike {
                    continue;
                }
                match target {
                    Target::Unit(victim) => {
                        let dealt = unit_damage(&stats);
                        if let Ok((_, victim_id, .., mut victim_health, _)) = units.get_mut(victim) {
                            victim_health.damage(dealt);
                            events.push(SimEvent::Damage {
                                target: DamageTarget::Unit(victim_id.0),
                                x: target_pos.x,
                                y: target_pos.y,
                                amount: dealt,
                            });
                        }
                        events.sound(SoundCue::AttackLanded);
                    }
                    Target::Base(defender) => {
                        let base = bases.get_mut(defender);
                        let dealt = base.take_hit(stats.damage);
                        let destroyed = base.is_destroyed();
                        events.push(SimEvent::Damage {
                            target: DamageTarget::Base(defender),
                            x: target_pos.x,
                            y: target_pos.y,
                            amount: dealt,
                        });
                        events.sound(SoundCue::BaseHit);
                        if defender == Side::Ally && destroyed {
                            defeat.0 = true;
                            break;
                        }
                    }
                }
            }
            Engagement::Advance => {
                let friendlies: Vec<(UnitId, Position)> = grid
                    .query_nearby(&pos, side, false)
                    .into_iter()
                    .filter(|entry| entry.entity != entity)
                    .filter_map(|entry| {
                        let (_, other_id, ..) = units.get(entry.entity).ok()?;
                        Some((*other_id, Position::new(entry.x, entry.y)))
                    })
                    .collect();
                let steering = Steering {
                    id,
                    position: pos,
                    target: target_pos,
                    lane_center: field.lane_center(lane.0),
                    speed: stats.speed,
                };
                let desired = desired_velocity(&steering, &friendlies, scale, &config);
                if let Ok((_, _, _, _, _, mut p, mut v, ..)) = units.get_mut(entity) {
                    let (next_pos, next_vel) = integrate(*p, *v, desired, &field, &config);
                    *p = next_pos;
                    *v = next_vel;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Base;
    use crate::spatial::spatial_grid_update_system;

    fn combat_world() -> (World, Schedule) {
        let mut world = World::new();
        world.insert_resource(SimConfig::default());
        world.insert_resource(Battlefield::default());
        world.insert_resource(SimClock { now_ms: 10_000.0, delta_ms: 16.0 });
        world.insert_resource(SpatialGrid::default());
        world.insert_resource(Bases::default());
        world.insert_resource(SimEvents::default());
        world.insert_resource(DefeatSignal::default());

        let mut schedule = Schedule::default();
        schedule.add_systems((spatial_grid_update_system, unit_update_system).chain());
        (world, schedule)
    }

    fn unit(id: u32, side: Side, x: f32, y: f32) -> UnitBundle {
        UnitBundle {
            id: UnitId(id),
            side,
            position: Position::new(x, y),
            lane: Lane(1),
            ..Default::default()
        }
    }

    #[test]
    fn test_units_in_reach_hold_position_and_trade_blows() {
        let (mut world, mut schedule) = combat_world();
        let ally = world.spawn(unit(0, Side::Ally, 300.0, 200.0)).id();
        let enemy = world.spawn(unit(1, Side::Enemy, 320.0, 200.0)).id();

        schedule.run(&mut world);

        assert_eq!(world.get::<Position>(ally), Some(&Position::new(300.0, 200.0)));
        assert_eq!(world.get::<Position>(enemy), Some(&Position::new(320.0, 200.0)));
        assert_eq!(world.get::<Health>(ally).unwrap().current, 90.0);
        assert_eq!(world.get::<Health>(enemy).unwrap().current, 90.0);

        // Cooldown has not elapsed on the next frame.
        world.resource_mut::<SimClock>().now_ms += 16.0;
        schedule.run(&mut world);
        assert_eq!(world.get::<Health>(enemy).unwrap().current, 90.0);
    }

    #[test]
    fn test_unit_killed_earlier_in_tick_loses_its_turn() {
        let (mut world, mut schedule) = combat_world();
        let mut ally = unit(0, Side::Ally, 300.0, 200.0);
        ally.stats.damage = 500.0;
        world.spawn(ally);
        let enemy = world.spawn(unit(1, Side::Enemy, 320.0, 200.0)).id();

        schedule.run(&mut world);

        assert_eq!(world.get::<Health>(enemy).unwrap().current, 0.0);
        let timer = world.get::<AttackTimer>(enemy).unwrap();
        assert_eq!(timer.last_attack_ms, None);
    }

    #[test]
    fn test_archer_strikes_across_a_cell_boundary_at_full_range() {
        let (mut world, mut schedule) = combat_world();
        let archer = Archetype::Archer.base_stats();
        let ally = world
            .spawn(UnitBundle {
                archetype: Archetype::Archer,
                stats: CombatStats {
                    damage: archer.damage,
                    range: archer.range,
                    ..Default::default()
                },
                ..unit(0, Side::Ally, 290.0, 200.0)
            })
            .id();
        let enemy = world.spawn(unit(1, Side::Enemy, 290.0 + archer.range - 1.0, 200.0)).id();

        schedule.run(&mut world);

        assert_eq!(world.get::<Position>(ally), Some(&Position::new(290.0, 200.0)));
        let health = world.get::<Health>(enemy).unwrap();
        assert_eq!(health.current, health.max - archer.damage);
    }

    #[test]
    fn test_out_of_reach_unit_advances_on_base() {
        let (mut world, mut schedule) = combat_world();
        let ally = world.spawn(unit(0, Side::Ally, 200.0, 200.0)).id();

        schedule.run(&mut world);

        let pos = world.get::<Position>(ally).unwrap();
        assert!(pos.x > 200.0, "moved toward the enemy base");
        let vel = world.get::<Velocity>(ally).unwrap();
        assert!(vel.vx > 0.0);
    }

    #[test]
    fn test_stacked_allies_drift_apart() {
        let (mut world, mut schedule) = combat_world();
        let first = world.spawn(unit(0, Side::Ally, 200.0, 200.0)).id();
        let second = world.spawn(unit(1, Side::Ally, 200.0, 200.0)).id();

        schedule.run(&mut world);

        let a = *world.get::<Position>(first).unwrap();
        let b = *world.get::<Position>(second).unwrap();
        assert!(a.y < 200.0, "lower id pushed up");
        assert!(b.y > 200.0, "higher id pushed down");
    }

    #[test]
    fn test_defended_base_hit_and_defeat_signal() {
        let (mut world, mut schedule) = combat_world();
        world.resource_mut::<Bases>().player = Base::new(200.0, 20);
        world.resource_mut::<Bases>().player.health.current = 8.0;
        // Player base sits at (50, 200); reach against it is 30 + 40.
        world.spawn(unit(0, Side::Enemy, 100.0, 200.0));
        world.spawn(unit(1, Side::Enemy, 105.0, 200.0));

        schedule.run(&mut world);

        let bases = world.resource::<Bases>();
        assert_eq!(bases.player.health.current, 0.0);
        assert!(world.resource::<DefeatSignal>().0);

        // The second enemy never struck: processing stopped at defeat.
        let mut timers = world.query::<(&UnitId, &AttackTimer)>();
        let struck: Vec<u32> = timers
            .iter(&world)
            .filter(|(_, t)| t.last_attack_ms.is_some())
            .map(|(id, _)| id.0)
            .collect();
        assert_eq!(struck, vec![0]);
    }
}
