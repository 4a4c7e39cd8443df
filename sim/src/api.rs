//! Public API for the simulation.
//!
//! This module provides the main interface for the host (a browser canvas, a
//! native window, a headless test) to drive the simulation.
//!
//! ## Ticking
//!
//! The host calls `tick(now_ms)` once per frame with its wall clock. Only an
//! `Active` encounter changes; a paused or terminated one is left untouched,
//! and time spent paused never reaches the economy or the movement model.
//! Attack cooldowns are wall-clock based, so they keep running across a pause.

use crate::bridge::{self, AudioSink, Renderer};
use crate::components::*;
use crate::config::SimConfig;
use crate::economy::{Economy, UpgradeKind};
use crate::error::SimError;
use crate::events::{SimEvent, SimEvents, SoundCue};
use crate::field::{Base, Bases, Battlefield};
use crate::spatial::{spatial_grid_update_system, SpatialGrid};
use crate::state::*;
use crate::systems::*;
use crate::world::Snapshot;
use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, info, warn};

/// Notice shown when a tick fails unexpectedly.
const TICK_FAILURE_NOTICE: &str = "Something went wrong, the battle continues";

/// The main simulation world container.
///
/// Holds the ECS world and schedule, providing a clean API for:
/// - Starting, pausing and resetting encounters
/// - Stepping the simulation forward
/// - Player actions (spawning, shop purchases)
/// - Extracting snapshots and save data
pub struct SimWorld {
    world: World,
    schedule: Schedule,
    tick: u64,
    /// Host time of the previous `tick` call, active or not.
    last_frame_ms: Option<f64>,
    selected: Archetype,
}

impl SimWorld {
    /// Create a new simulation world with default configuration.
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Create a new simulation world with custom configuration.
    pub fn with_config(config: SimConfig) -> Self {
        let mut world = World::new();

        world.insert_resource(Battlefield::new(800.0, 400.0, config.reference_width));
        world.insert_resource(SpatialGrid::new(config.cell_size));
        world.insert_resource(Bases {
            player: Base::new(crate::economy::PLAYER_BASE_HEALTH, 0),
            enemy: Base::new(config.enemy_base_health, 0),
        });
        world.insert_resource(WaveState {
            current: 1,
            max: config.max_wave,
        });
        world.insert_resource(SimRng::seeded(config.seed));
        world.insert_resource(Economy::default());
        world.insert_resource(EncounterState::default());
        world.insert_resource(SimClock::default());
        world.insert_resource(PendingRewards::default());
        world.insert_resource(DefeatSignal::default());
        world.insert_resource(Roster::default());
        world.insert_resource(SimEvents::default());
        world.insert_resource(config);

        // One chain, one thread. Commands issued by the sweep are applied
        // before the grid update sees the roster.
        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.add_systems(
            (
                death_sweep_system,
                reward_payout_system,
                passive_income_system,
                spatial_grid_update_system,
                unit_update_system,
                defeat_check_system,
                wave_progress_system,
                final_defeat_check_system,
            )
                .chain(),
        );

        Self {
            world,
            schedule,
            tick: 0,
            last_frame_ms: None,
            selected: Archetype::Barbarian,
        }
    }

    // ========================================================================
    // ENCOUNTER CONTROL
    // ========================================================================

    /// Start an encounter at the current wave. Only valid from `Idle`.
    pub fn start_encounter(&mut self, now_ms: f64) -> Result<(), SimError> {
        if *self.world.resource::<EncounterState>() != EncounterState::Idle {
            return Err(self.reject(SimError::NotIdle));
        }

        let wave = self.world.resource::<WaveState>().current;
        let config = self.world.resource::<SimConfig>().clone();
        let field = *self.world.resource::<Battlefield>();
        let bundles = self.world.resource_scope(|world, mut rng: Mut<SimRng>| {
            let mut roster = world.resource_mut::<Roster>();
            roster_bundles(wave, &field, &config, &mut rng, &mut roster, now_ms)
        });
        let enemies = bundles.len();
        self.world.spawn_batch(bundles);
        self.world.resource_mut::<SpatialGrid>().mark_dirty();

        *self.world.resource_mut::<SimClock>() = SimClock {
            now_ms,
            delta_ms: 0.0,
        };
        self.last_frame_ms = Some(now_ms);
        *self.world.resource_mut::<EncounterState>() = EncounterState::Active;
        info!(wave, enemies, "encounter started");
        Ok(())
    }

    /// Flip between `Active` and `Paused`. Other states are unaffected.
    pub fn toggle_pause(&mut self) -> EncounterState {
        let mut state = self.world.resource_mut::<EncounterState>();
        *state = match *state {
            EncounterState::Active => EncounterState::Paused,
            EncounterState::Paused => EncounterState::Active,
            other => other,
        };
        let state = *state;
        debug!(?state, "pause toggled");
        state
    }

    /// Back to `Idle`: wave 1, no units, full bases, no in-run gold.
    /// Diamonds and upgrades are kept.
    pub fn reset(&mut self) {
        let mut query = self.world.query_filtered::<Entity, With<UnitId>>();
        let units: Vec<Entity> = query.iter(&self.world).collect();
        for entity in units {
            self.world.despawn(entity);
        }

        let enemy_health = self.world.resource::<SimConfig>().enemy_base_health;
        let mut economy = self.world.resource_mut::<Economy>();
        economy.gold = 0;
        economy.income_carry = 0.0;
        let upgrades = economy.upgrades;

        *self.world.resource_mut::<Bases>() = Bases {
            player: Base::new(upgrades.player_base_max_health(), upgrades.defense_percent()),
            enemy: Base::new(enemy_health, 0),
        };
        self.world.resource_mut::<WaveState>().current = 1;
        self.world.resource_mut::<SpatialGrid>().clear();
        self.world.resource_mut::<SpatialGrid>().mark_dirty();
        *self.world.resource_mut::<PendingRewards>() = PendingRewards::default();
        *self.world.resource_mut::<DefeatSignal>() = DefeatSignal::default();
        *self.world.resource_mut::<Roster>() = Roster::default();
        *self.world.resource_mut::<SimClock>() = SimClock::default();
        *self.world.resource_mut::<EncounterState>() = EncounterState::Idle;
        self.last_frame_ms = None;
        info!("encounter reset");
    }

    // ========================================================================
    // TICK
    // ========================================================================

    /// Advance one frame. Returns the encounter state after the frame.
    pub fn tick(&mut self, now_ms: f64) -> EncounterState {
        let max_delta = self.world.resource::<SimConfig>().max_frame_delta_ms;
        let delta_ms = self
            .last_frame_ms
            .map(|last| (now_ms - last).clamp(0.0, max_delta))
            .unwrap_or(0.0);
        self.last_frame_ms = Some(now_ms);

        let state = *self.world.resource::<EncounterState>();
        if !state.is_active() {
            return state;
        }

        *self.world.resource_mut::<SimClock>() = SimClock { now_ms, delta_ms };

        let world = &mut self.world;
        let schedule = &mut self.schedule;
        if let Err(cause) = panic::catch_unwind(AssertUnwindSafe(|| schedule.run(world))) {
            let reason = cause
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| cause.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown".to_string());
            error!(tick = self.tick, %reason, "tick failed, keeping partial state");
            if let Some(mut events) = self.world.get_resource_mut::<SimEvents>() {
                events.notice(TICK_FAILURE_NOTICE);
            }
        }

        self.tick += 1;
        *self.world.resource::<EncounterState>()
    }

    // ========================================================================
    // PLAYER ACTIONS
    // ========================================================================

    pub fn select_archetype(&mut self, archetype: Archetype) {
        self.selected = archetype;
    }

    pub fn selected_archetype(&self) -> Archetype {
        self.selected
    }

    /// Spawn the selected archetype for the player.
    pub fn spawn_selected(&mut self) -> Result<(), SimError> {
        self.spawn_ally(self.selected)
    }

    /// Buy and spawn a player unit at the player base.
    pub fn spawn_ally(&mut self, archetype: Archetype) -> Result<(), SimError> {
        if !self.world.resource::<EncounterState>().is_active() {
            return Err(self.reject(SimError::NotActive));
        }
        if archetype == Archetype::Knight && !self.world.resource::<Economy>().upgrades.knight_unlocked {
            return Err(self.reject(SimError::Locked(archetype)));
        }
        let spent = self.world.resource_mut::<Economy>().spend_gold(archetype.cost());
        if let Err(err) = spent {
            return Err(self.reject(err));
        }

        let config = self.world.resource::<SimConfig>().clone();
        let field = *self.world.resource::<Battlefield>();
        let now_ms = self.world.resource::<SimClock>().now_ms;
        let bundle = self.world.resource_scope(|world, mut rng: Mut<SimRng>| {
            let economy = world.resource::<Economy>().clone();
            let mut roster = world.resource_mut::<Roster>();
            ally_bundle(archetype, &economy, &field, &config, &mut rng, &mut roster, now_ms)
        });
        debug!(archetype = archetype.name(), id = bundle.id.0, lane = bundle.lane.0, "ally spawned");
        self.world.spawn(bundle);
        self.world.resource_mut::<SpatialGrid>().mark_dirty();
        self.world.resource_mut::<SimEvents>().sound(SoundCue::UnitSpawned);
        Ok(())
    }

    /// Buy one level of `kind` in the shop. Returns the new level.
    pub fn purchase_upgrade(&mut self, kind: UpgradeKind) -> Result<u32, SimError> {
        let purchased = self.world.resource_mut::<Economy>().purchase(kind);
        let level = match purchased {
            Ok(level) => level,
            Err(err) => return Err(self.reject(err)),
        };

        let upgrades = self.world.resource::<Economy>().upgrades;
        let mut bases = self.world.resource_mut::<Bases>();
        match kind {
            UpgradeKind::BaseHealth => {
                let new_max = upgrades.player_base_max_health();
                let gained = new_max - bases.player.health.max;
                bases.player.health.max = new_max;
                bases.player.health.heal(gained);
            }
            UpgradeKind::BaseDefense => {
                bases.player.defense_percent = upgrades.defense_percent();
            }
            _ => {}
        }
        info!(?kind, level, "upgrade purchased");
        Ok(level)
    }

    /// Canvas resized. Distances and speeds scale from the next tick.
    pub fn resize(&mut self, width: f32, height: f32) {
        let reference = self.world.resource::<SimConfig>().reference_width;
        *self.world.resource_mut::<Battlefield>() = Battlefield::new(width, height, reference);
        self.world.resource_mut::<SpatialGrid>().mark_dirty();
        debug!(width, height, "battlefield resized");
    }

    fn reject(&mut self, err: SimError) -> SimError {
        warn!(error = %err, "request rejected");
        self.world.resource_mut::<SimEvents>().notice(err.to_string());
        err
    }

    // ========================================================================
    // OUTPUT
    // ========================================================================

    /// Get a snapshot of the current simulation state.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot::from_world(&mut self.world, self.tick)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        self.snapshot().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.world.resource_mut::<SimEvents>().drain()
    }

    /// Draw the current state and play pending cues. Drains the event queue.
    pub fn present(&mut self, renderer: Option<&mut dyn Renderer>, audio: Option<&mut dyn AudioSink>) {
        let snapshot = self.snapshot();
        let events = self.drain_events();
        bridge::present(&snapshot, &events, renderer, audio);
    }

    pub fn save_data(&self) -> SaveData {
        let economy = self.world.resource::<Economy>();
        let bases = self.world.resource::<Bases>();
        SaveData {
            wave: self.world.resource::<WaveState>().current,
            gold: economy.gold,
            diamonds: economy.diamonds,
            player_base_health: bases.player.health.current,
            enemy_base_health: bases.enemy.health.current,
            selected_archetype: self.selected,
            upgrades: economy.upgrades,
        }
    }

    /// Restore a save. Only valid from `Idle`; the next `start_encounter`
    /// resumes at the saved wave.
    pub fn load_save(&mut self, save: &SaveData) -> Result<(), SimError> {
        if *self.world.resource::<EncounterState>() != EncounterState::Idle {
            return Err(self.reject(SimError::NotIdle));
        }

        let (max_wave, enemy_max) = {
            let config = self.world.resource::<SimConfig>();
            (config.max_wave, config.enemy_base_health)
        };
        let mut economy = self.world.resource_mut::<Economy>();
        economy.gold = save.gold;
        economy.diamonds = save.diamonds;
        economy.upgrades = save.upgrades;
        economy.income_carry = 0.0;

        let mut player = Base::new(
            save.upgrades.player_base_max_health(),
            save.upgrades.defense_percent(),
        );
        player.health.current = save.player_base_health.clamp(0.0, player.health.max);
        let mut enemy = Base::new(enemy_max, 0);
        enemy.health.current = save.enemy_base_health.clamp(0.0, enemy_max);
        // A save taken at zero health would end the encounter on its first tick.
        if player.is_destroyed() {
            player.health.reset();
        }
        if enemy.is_destroyed() {
            enemy.health.reset();
        }
        *self.world.resource_mut::<Bases>() = Bases { player, enemy };

        self.world.resource_mut::<WaveState>().current = save.wave.clamp(1, max_wave);
        self.selected = save.selected_archetype;
        info!(wave = save.wave, gold = save.gold, "save loaded");
        Ok(())
    }

    /// Restore a save from its JSON form.
    pub fn load_save_json(&mut self, data: &str) -> Result<(), SimError> {
        let save = SaveData::from_json(data).map_err(|err| self.reject(err))?;
        self.load_save(&save)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Get the number of ticks that ran the schedule.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn state(&self) -> EncounterState {
        *self.world.resource::<EncounterState>()
    }

    pub fn wave(&self) -> u32 {
        self.world.resource::<WaveState>().current
    }

    pub fn economy(&self) -> &Economy {
        self.world.resource::<Economy>()
    }

    pub fn bases(&self) -> &Bases {
        self.world.resource::<Bases>()
    }

    pub fn battlefield(&self) -> &Battlefield {
        self.world.resource::<Battlefield>()
    }

    pub fn unit_count(&mut self, side: Side) -> usize {
        let mut query = self.world.query::<&Side>();
        query.iter(&self.world).filter(|s| **s == side).count()
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}
