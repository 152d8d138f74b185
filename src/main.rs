//! Skier Simulation
//!
//! Headless demo run. Pass a JSON config path to override the defaults;
//! `RUST_LOG` controls verbosity.

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use skier_sim::{
    TICK_RATE, VERSION,
    core::vec3::Vec3,
    game::{
        collision::ContactTracker,
        config::RunConfig,
        events::GameEventData,
        host::HeadlessHost,
        input::InputFrame,
        state::{ObstacleKind, RunState},
        tick::{fixed_tick, replay_run, TickInput},
    },
};

/// Demo length in ticks (20 seconds)
const DEMO_TICKS: u32 = 1000;

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    let config = match std::env::args().nth(1) {
        Some(path) => RunConfig::load(&path).with_context(|| format!("loading config {path}"))?,
        None => RunConfig::default(),
    };

    info!("Skier Sim v{}", VERSION);
    info!("Tick Rate: {} Hz (dt = {})", TICK_RATE, config.fixed_dt);

    demo_run(&config);
    Ok(())
}

/// Scripted steering: straight, carve left, straight, carve right.
fn scripted_input(t: u32) -> InputFrame {
    let frame = match t % 400 {
        0..=149 => InputFrame::with_axes(0.0, 0.0),
        150..=199 => InputFrame::with_axes(-1.0, -1.0),
        200..=349 => InputFrame::with_axes(0.0, 0.0),
        _ => InputFrame::with_axes(1.0, -1.0),
    };
    if t == 150 || t == 600 {
        frame.with_boost()
    } else {
        frame
    }
}

/// Skier plus one obstacle of each kind down the fall line.
fn build_run(config: &RunConfig, host: &mut HeadlessHost) -> RunState {
    let mut state = RunState::new();

    let skier = state.spawn_skier(Vec3::ZERO, config.skier.clone());
    host.insert_body(skier, Vec3::ZERO);

    let course = [
        (ObstacleKind::Slowdown { factor: config.default_slowdown_factor }, Vec3::new(0.0, 0.0, -20.0)),
        (ObstacleKind::Plain, Vec3::new(0.0, 0.0, -45.0)),
        (ObstacleKind::Knockback, Vec3::new(0.0, 0.0, -70.0)),
    ];
    for (kind, position) in course {
        state.spawn_obstacle(kind, position);
    }

    state
}

/// Demo function to exercise the simulation.
fn demo_run(config: &RunConfig) {
    info!("=== Starting Demo Run ===");

    let mut host = HeadlessHost::new();
    let mut state = build_run(config, &mut host);
    for event in state.take_events() {
        info!("Tick {}: {:?}", event.tick, event.data);
    }

    let mut tracker = ContactTracker::new();
    let mut recorded: Vec<TickInput> = Vec::with_capacity(DEMO_TICKS as usize);
    let mut live_events = Vec::new();

    info!("Running {} ticks...", DEMO_TICKS);

    for t in 0..DEMO_TICKS {
        let input = TickInput {
            frame: scripted_input(t),
            contacts: tracker.detect(&state, &host),
        };

        let result = fixed_tick(&mut state, &input, &mut host, config);

        for event in &result.events {
            match &event.data {
                GameEventData::SlowdownApplied { factor, .. } => {
                    info!("Tick {}: slowed to {:.0}%", event.tick, factor * 100.0);
                }
                GameEventData::KnockbackStarted { .. } => {
                    info!("Tick {}: knocked back", event.tick);
                }
                other => info!("Tick {}: {:?}", event.tick, other),
            }
        }

        // Report every 5 seconds
        if t % (TICK_RATE * 5) == 0 {
            for id in state.skier_ids() {
                if let Some(controller) = state.controller(id) {
                    info!(
                        "Tick {}: skier {} heading {:.1} speed {:.2} ({:?}) at {}",
                        t,
                        id.0,
                        controller.heading(),
                        controller.current_speed(),
                        controller.speed_state(),
                        host.body(id).map(|b| b.position).unwrap_or_default(),
                    );
                }
            }
        }

        live_events.extend(result.events);
        recorded.push(input);
    }

    // Print final results
    info!("=== Run Results ===");
    let hash = state.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));
    info!("Entities left: {}", state.len());
    info!("Total events: {}", live_events.len());

    // Verify determinism by replaying the recorded inputs on a fresh host
    info!("=== Verifying Determinism ===");
    let mut replay_host = HeadlessHost::new();
    let mut replay_state = build_run(config, &mut replay_host);
    replay_state.take_events();
    let (replay_final, replay_events) =
        replay_run(replay_state, &recorded, &mut replay_host, config.fixed_dt);
    let replay_hash = replay_final.compute_hash();

    info!("Replay State Hash: {}", hex::encode(replay_hash));

    let bodies_match = state
        .skier_ids()
        .into_iter()
        .all(|id| host.body(id) == replay_host.body(id));

    if hash == replay_hash && live_events == replay_events && bodies_match {
        info!("DETERMINISM VERIFIED: Hashes, events and bodies match!");
    } else {
        warn!(
            hashes = hash == replay_hash,
            events = live_events == replay_events,
            bodies = bodies_match,
            "DETERMINISM FAILURE"
        );
    }
}
