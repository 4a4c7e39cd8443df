use bastion_sim::{Economy, SimConfig, SimWorld, WaveState};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

const FRAME_MS: f64 = 16.0;

/// An active encounter at `wave` with `allies` player units on the field.
fn crowded_world(wave: u32, allies: usize) -> SimWorld {
    let mut sim = SimWorld::with_config(SimConfig {
        max_wave: 100,
        ..Default::default()
    });
    sim.world_mut().resource_mut::<WaveState>().current = wave;
    sim.world_mut().resource_mut::<Economy>().gold = u32::MAX / 2;
    sim.start_encounter(0.0).expect("fresh world is idle");
    for _ in 0..allies {
        sim.spawn_selected().expect("gold is plentiful");
    }
    sim
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for (wave, allies) in [(1, 5), (10, 40), (40, 150)] {
        group.bench_function(format!("wave_{wave}_allies_{allies}"), |b| {
            b.iter_batched(
                || crowded_world(wave, allies),
                |mut sim| {
                    let mut now = 0.0;
                    for _ in 0..60 {
                        now += FRAME_MS;
                        black_box(sim.tick(now));
                    }
                    sim
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
