//! Basic demonstration of the Bastion Lanes simulation.
//!
//! Run with: RUST_LOG=debug cargo run --example basic_demo

use bastion_sim::{Archetype, EncounterState, FrameScheduler, Side, SimWorld};

const FRAME_MS: f64 = 1000.0 / 60.0;

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    println!("=== Bastion Lanes - Simulation Demo ===\n");

    let mut sim = SimWorld::new();
    sim.world_mut().resource_mut::<bastion_sim::Economy>().gold = 40;
    if let Err(err) = sim.start_encounter(0.0) {
        eprintln!("could not start: {err}");
        return;
    }

    let mut scheduler = FrameScheduler::new();
    let stop = scheduler.stop_handle();
    let mut now_ms = 0.0;
    let mut frame = 0u64;

    // Roughly two minutes of play at 60 fps.
    while frame < 7200 {
        now_ms += FRAME_MS;
        frame += 1;

        // Buy a barbarian whenever there is gold for one, an archer every tenth time.
        let pick = if frame % 600 == 0 { Archetype::Archer } else { Archetype::Barbarian };
        if sim.economy().gold >= pick.cost() {
            let _ = sim.spawn_ally(pick);
        }

        if !scheduler.frame(&mut sim, now_ms) {
            break;
        }
        sim.drain_events();

        if frame % 600 == 0 {
            print_status(&mut sim, now_ms);
        }
        if frame == 5400 {
            println!("\n--- Host asked to stop ---\n");
            stop.stop();
        }
    }

    print_status(&mut sim, now_ms);
    match sim.state() {
        EncounterState::Terminated(outcome) => println!("\nEncounter over: {outcome:?}"),
        state => println!("\nStopped while {state:?}"),
    }

    println!("\n=== Final Snapshot (JSON) ===\n");
    match sim.snapshot().to_json_pretty() {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("snapshot failed: {err}"),
    }

    println!("\n=== Save Data (JSON) ===\n");
    match sim.save_data().to_json() {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("save failed: {err}"),
    }
}

fn print_status(sim: &mut SimWorld, now_ms: f64) {
    let allies = sim.unit_count(Side::Ally);
    let enemies = sim.unit_count(Side::Enemy);
    let bases = *sim.bases();
    println!(
        "t={:>6.1}s wave={:>2} gold={:>4} allies={:>2} enemies={:>2} player_base={:>5.0} enemy_base={:>5.0}",
        now_ms / 1000.0,
        sim.wave(),
        sim.economy().gold,
        allies,
        enemies,
        bases.player.health.current,
        bases.enemy.health.current,
    );
}
