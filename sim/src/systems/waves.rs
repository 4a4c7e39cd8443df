//! Wave controller: enemy rosters, spawning, and encounter termination.

use crate::components::*;
use crate::config::SimConfig;
use crate::economy::Economy;
use crate::events::{SimEvent, SimEvents, SoundCue};
use crate::field::{Base, Bases, Battlefield};
use crate::spatial::SpatialGrid;
use crate::state::{DefeatSignal, EncounterState, Outcome, Roster, SimClock, SimRng, WaveState};
use crate::stats::{ally_stats, scaled_stats, UnitStats};
use bevy_ecs::prelude::*;
use rand::Rng;
use tracing::{debug, info};

/// Distance in front of a base where fresh units appear, at reference scale.
const SPAWN_OFFSET: f32 = 40.0;
/// Spacing between successive enemy columns.
const COLUMN_SPACING: f32 = 25.0;
/// Half-width of the random spawn offset on each axis.
const SPAWN_JITTER: f32 = 8.0;

/// Enemy head-count per archetype for one wave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaveRoster {
    pub barbarians: u32,
    pub archers: u32,
    pub horses: u32,
    pub knights: u32,
}

impl WaveRoster {
    pub fn count(&self, archetype: Archetype) -> u32 {
        match archetype {
            Archetype::Barbarian => self.barbarians,
            Archetype::Archer => self.archers,
            Archetype::Horse => self.horses,
            Archetype::Knight => self.knights,
        }
    }

    pub fn total(&self) -> u32 {
        Archetype::ALL.iter().map(|a| self.count(*a)).sum()
    }

    /// One archetype per enemy, in spawn order.
    pub fn units(&self) -> impl Iterator<Item = Archetype> + '_ {
        Archetype::ALL
            .into_iter()
            .flat_map(move |a| std::iter::repeat(a).take(self.count(a) as usize))
    }
}

/// Roster for `wave`. Barbarians grow every other wave; the other archetypes
/// join at later thresholds.
pub fn compute_roster(wave: u32) -> WaveRoster {
    WaveRoster {
        barbarians: 3 + wave / 2,
        archers: if wave >= 3 { 1 + (wave - 3) / 2 } else { 0 },
        horses: if wave >= 5 { 1 + (wave - 5) / 3 } else { 0 },
        knights: if wave >= 8 { 1 + (wave - 8) / 4 } else { 0 },
    }
}

fn jitter(rng: &mut SimRng) -> f32 {
    rng.0.gen_range(-SPAWN_JITTER..=SPAWN_JITTER)
}

fn unit_bundle(
    id: u32,
    side: Side,
    archetype: Archetype,
    stats: UnitStats,
    position: Position,
    lane: u8,
    now_ms: f64,
) -> UnitBundle {
    UnitBundle {
        id: UnitId(id),
        side,
        archetype,
        position,
        velocity: Velocity::default(),
        health: Health::new(stats.max_health),
        stats: stats.combat,
        timer: AttackTimer::default(),
        lane: Lane(lane),
        spawned_at: SpawnedAt(now_ms),
        cell: GridCell::default(),
        reward: stats.reward,
    }
}

/// Enemy units for `wave`, spread round-robin over the lanes in columns
/// marching back from the enemy base.
pub fn roster_bundles(
    wave: u32,
    field: &Battlefield,
    config: &SimConfig,
    rng: &mut SimRng,
    roster: &mut Roster,
    now_ms: f64,
) -> Vec<UnitBundle> {
    let front = field.width - (config.base_inset + SPAWN_OFFSET) * field.scale;
    let wave_roster = compute_roster(wave);
    wave_roster
        .units()
        .enumerate()
        .map(|(i, archetype)| {
            let lane = (i % LANE_COUNT as usize) as u8;
            let column = (i / LANE_COUNT as usize) as f32;
            let x = front - column * COLUMN_SPACING * field.scale + jitter(rng) * field.scale;
            let y = field.lane_center(lane) + jitter(rng) * field.scale;
            let position = field.clamp(Position::new(x, y), config);
            unit_bundle(
                roster.next_id(),
                Side::Enemy,
                archetype,
                scaled_stats(archetype, wave),
                position,
                lane,
                now_ms,
            )
        })
        .collect()
}

/// A player unit in front of the player base, on the next lane in rotation.
pub fn ally_bundle(
    archetype: Archetype,
    economy: &Economy,
    field: &Battlefield,
    config: &SimConfig,
    rng: &mut SimRng,
    roster: &mut Roster,
    now_ms: f64,
) -> UnitBundle {
    let lane = roster.next_ally_lane();
    let x = (config.base_inset + SPAWN_OFFSET) * field.scale + jitter(rng) * field.scale;
    let y = field.lane_center(lane) + jitter(rng) * field.scale;
    unit_bundle(
        roster.next_id(),
        Side::Ally,
        archetype,
        ally_stats(archetype, &economy.upgrades),
        field.clamp(Position::new(x, y), config),
        lane,
        now_ms,
    )
}

/// System that advances the wave once the enemy base falls.
///
/// Both rosters are cleared, the enemy base is rebuilt and the clear reward
/// is paid. Past the last wave the encounter is won; otherwise the next
/// roster marches in immediately.
#[allow(clippy::too_many_arguments)]
pub fn wave_progress_system(
    mut commands: Commands,
    config: Res<SimConfig>,
    field: Res<Battlefield>,
    clock: Res<SimClock>,
    mut state: ResMut<EncounterState>,
    mut waves: ResMut<WaveState>,
    mut bases: ResMut<Bases>,
    mut economy: ResMut<Economy>,
    mut rng: ResMut<SimRng>,
    mut roster: ResMut<Roster>,
    mut grid: ResMut<SpatialGrid>,
    mut events: ResMut<SimEvents>,
    units: Query<(Entity, &Health, &Reward), With<UnitId>>,
) {
    if !state.is_active() || !bases.enemy.is_destroyed() {
        return;
    }

    waves.current += 1;
    bases.enemy = Base::new(config.enemy_base_health, 0);

    // Units killed this tick have not been swept yet; they are paid here
    // before the field is cleared.
    let mut bounty = Reward::default();
    for (entity, health, reward) in &units {
        if !health.is_alive() {
            bounty.gold += reward.gold;
            bounty.diamonds += reward.diamonds;
        }
        commands.entity(entity).despawn();
    }
    grid.mark_dirty();
    economy.credit(bounty.gold, bounty.diamonds);

    let gold = config.wave_clear_reward(waves.current);
    economy.credit(gold, config.wave_clear_diamonds);
    events.push(SimEvent::WaveCleared { wave: waves.current });
    info!(wave = waves.current, gold, diamonds = config.wave_clear_diamonds, "enemy base destroyed");

    if waves.current > waves.max {
        *state = EncounterState::Terminated(Outcome::Victory);
        events.push(SimEvent::EncounterEnded(Outcome::Victory));
        events.sound(SoundCue::Victory);
        info!(waves = waves.max, "encounter won");
        return;
    }

    let bundles = roster_bundles(waves.current, &field, &config, &mut rng, &mut roster, clock.now_ms);
    debug!(wave = waves.current, enemies = bundles.len(), "spawning wave");
    commands.spawn_batch(bundles);
}

fn check_defeat(
    state: &mut EncounterState,
    bases: &Bases,
    signal: &mut DefeatSignal,
    events: &mut SimEvents,
) {
    let lost = signal.0 || bases.player.is_destroyed();
    signal.0 = false;
    if !state.is_active() || !lost {
        return;
    }
    *state = EncounterState::Terminated(Outcome::Defeat);
    events.push(SimEvent::EncounterEnded(Outcome::Defeat));
    events.sound(SoundCue::Defeat);
    info!("player base destroyed, encounter lost");
}

/// System that ends the encounter when the player base has fallen.
/// Runs before the wave check so a simultaneous wave clear cannot mask a defeat.
pub fn defeat_check_system(
    mut state: ResMut<EncounterState>,
    bases: Res<Bases>,
    mut signal: ResMut<DefeatSignal>,
    mut events: ResMut<SimEvents>,
) {
    check_defeat(&mut state, &bases, &mut signal, &mut events);
}

/// Last check of the tick, after wave progression.
pub fn final_defeat_check_system(
    mut state: ResMut<EncounterState>,
    bases: Res<Bases>,
    mut signal: ResMut<DefeatSignal>,
    mut events: ResMut<SimEvents>,
) {
    check_defeat(&mut state, &bases, &mut signal, &mut events);
}
