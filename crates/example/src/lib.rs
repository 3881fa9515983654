//! Example particle simulation.
//!
//! Particles live in the default world as `Position`/`Velocity` pairs. Each
//! tick they move; any particle leaving the arena is despawned and an
//! [`Escape`] event is recorded in the `events` world. Every system receives
//! its worlds, pools, the shared [`SimConfig`] and the injected [`EventLog`]
//! through tagged fields.

use std::sync::Arc;

use keystone_system::prelude::*;

/// Name of the world holding escape events.
pub const EVENTS_WORLD: &str = "events";

// ─────────────────────────────────────────────────────────────────────────────
// Components
// ─────────────────────────────────────────────────────────────────────────────

/// A particle's location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

/// A particle's velocity, in units per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity {
    /// Horizontal speed.
    pub dx: f32,
    /// Vertical speed.
    pub dy: f32,
}

/// Recorded in the `events` world when a particle leaves the arena.
#[derive(Debug, Clone, Copy)]
pub struct Escape {
    /// The despawned particle.
    pub particle: Entity,
    /// The tick on which it escaped.
    pub tick: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared context and injects
// ─────────────────────────────────────────────────────────────────────────────

/// Simulation parameters, shared by every system.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Seconds per tick.
    pub dt: f32,
    /// Half-width of the square arena centered on the origin.
    pub arena: f32,
    /// Number of particles spawned on init.
    pub particles: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,
            arena: 10.0,
            particles: 16,
        }
    }
}

/// Destination for simulation messages.
pub trait EventLog: Send + Sync {
    /// Records one message.
    fn record(&self, message: &str);
}

/// Forwards messages to `tracing` at info level.
#[derive(Debug, Default)]
pub struct TracingLog;

impl EventLog for TracingLog {
    fn record(&self, message: &str) {
        tracing::info!(target: "simulation", "{message}");
    }
}

/// Errors that can stop a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// Injection failed.
    #[error(transparent)]
    Inject(#[from] InjectError),
    /// A lifecycle step failed.
    #[error(transparent)]
    Systems(#[from] SystemsError),
    /// A world lookup failed.
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Final counts after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimSummary {
    /// Particles still inside the arena.
    pub remaining: usize,
    /// Particles that escaped.
    pub escaped: usize,
}

fn not_injected(field: &str) -> SystemError {
    SystemError::ExecutionError(format!("`{field}` was not injected"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

/// Spawns the initial particles.
#[derive(Injectable, Default)]
pub struct Spawner {
    #[world]
    world: Option<World>,
    #[pool]
    positions: Option<Pool<Position>>,
    #[pool]
    velocities: Option<Pool<Velocity>>,
    #[shared]
    config: Option<Arc<SimConfig>>,
}

impl System for Spawner {
    fn init(&mut self) -> Result<(), SystemError> {
        let world = self.world.as_ref().ok_or_else(|| not_injected("world"))?;
        let positions = self.positions.as_ref().ok_or_else(|| not_injected("positions"))?;
        let velocities = self.velocities.as_ref().ok_or_else(|| not_injected("velocities"))?;
        let config = self.config.as_ref().ok_or_else(|| not_injected("config"))?;

        let half = config.particles as f32 / 2.0;
        for index in 0..config.particles {
            let particle = world.spawn();
            let offset = index as f32 - half;
            positions
                .add(particle, Position { x: 0.0, y: 0.0 })
                .map_err(|err| SystemError::ExecutionError(err.to_string()))?;
            velocities
                .add(
                    particle,
                    Velocity {
                        dx: offset * 2.0,
                        dy: 1.0 + offset.abs(),
                    },
                )
                .map_err(|err| SystemError::ExecutionError(err.to_string()))?;
        }

        tracing::debug!(particles = config.particles, "spawned particles");
        Ok(())
    }
}

/// Integrates velocities into positions.
#[derive(Injectable, Default)]
pub struct Movement {
    #[pool]
    positions: Option<Pool<Position>>,
    #[pool]
    velocities: Option<Pool<Velocity>>,
    #[shared]
    config: Option<Arc<SimConfig>>,
}

impl System for Movement {
    fn run(&mut self) -> Result<(), SystemError> {
        let positions = self.positions.as_ref().ok_or_else(|| not_injected("positions"))?;
        let velocities = self.velocities.as_ref().ok_or_else(|| not_injected("velocities"))?;
        let dt = self.config.as_ref().ok_or_else(|| not_injected("config"))?.dt;

        for particle in velocities.entities() {
            let Some(velocity) = velocities.get(particle).map(|velocity| *velocity) else {
                continue;
            };
            if let Some(mut position) = positions.get_mut(particle) {
                position.x += velocity.dx * dt;
                position.y += velocity.dy * dt;
            }
        }
        Ok(())
    }
}

/// Despawns particles outside the arena and records an [`Escape`] for each.
#[derive(Injectable, Default)]
pub struct Boundary {
    #[world]
    world: Option<World>,
    #[pool]
    positions: Option<Pool<Position>>,
    #[world("events")]
    events: Option<World>,
    #[pool("events")]
    escapes: Option<Pool<Escape>>,
    #[shared]
    config: Option<Arc<SimConfig>>,
    #[inject]
    log: Option<Arc<dyn EventLog>>,
    tick: u64,
}

impl System for Boundary {
    fn run(&mut self) -> Result<(), SystemError> {
        let world = self.world.as_ref().ok_or_else(|| not_injected("world"))?;
        let positions = self.positions.as_ref().ok_or_else(|| not_injected("positions"))?;
        let events = self.events.as_ref().ok_or_else(|| not_injected("events"))?;
        let escapes = self.escapes.as_ref().ok_or_else(|| not_injected("escapes"))?;
        let arena = self.config.as_ref().ok_or_else(|| not_injected("config"))?.arena;

        self.tick += 1;
        for particle in positions.entities() {
            let outside = positions
                .get(particle)
                .is_some_and(|position| position.x.abs() > arena || position.y.abs() > arena);
            if !outside {
                continue;
            }

            world.despawn(particle);
            let event = events.spawn();
            escapes
                .add(
                    event,
                    Escape {
                        particle,
                        tick: self.tick,
                    },
                )
                .map_err(|err| SystemError::ExecutionError(err.to_string()))?;
            if let Some(log) = &self.log {
                log.record(&format!("particle {particle} escaped on tick {}", self.tick));
            }
        }
        Ok(())
    }
}

/// Reports particle counts every tick and a summary on shutdown.
#[derive(Injectable, Default)]
pub struct Reporter {
    #[pool]
    positions: Option<Pool<Position>>,
    #[pool("events")]
    escapes: Option<Pool<Escape>>,
    #[inject]
    log: Option<Arc<dyn EventLog>>,
    tick: u64,
}

impl Reporter {
    fn counts(&self) -> Result<SimSummary, SystemError> {
        let positions = self.positions.as_ref().ok_or_else(|| not_injected("positions"))?;
        let escapes = self.escapes.as_ref().ok_or_else(|| not_injected("escapes"))?;
        Ok(SimSummary {
            remaining: positions.len(),
            escaped: escapes.len(),
        })
    }
}

impl System for Reporter {
    fn run(&mut self) -> Result<(), SystemError> {
        self.tick += 1;
        let counts = self.counts()?;
        tracing::debug!(
            tick = self.tick,
            remaining = counts.remaining,
            escaped = counts.escaped,
            "tick complete"
        );
        Ok(())
    }

    fn destroy(&mut self) -> Result<(), SystemError> {
        let counts = self.counts()?;
        if let Some(log) = &self.log {
            log.record(&format!(
                "after {} ticks: {} particles remaining, {} escaped",
                self.tick, counts.remaining, counts.escaped
            ));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wiring
// ─────────────────────────────────────────────────────────────────────────────

/// Composes the simulation's worlds and systems.
#[must_use]
pub fn build(config: SimConfig) -> Systems {
    let mut systems = Systems::new(World::new()).with_shared(Arc::new(config));
    systems.add_world(EVENTS_WORLD, World::new()).add((
        Spawner::default(),
        Movement::default(),
        Boundary::default(),
        Reporter::default(),
    ));
    systems
}

/// Builds, injects and runs the simulation for `ticks` ticks.
///
/// # Errors
///
/// Returns [`SimulationError`] if injection or any lifecycle step fails.
pub fn simulate(
    config: SimConfig,
    ticks: u64,
    log: Arc<dyn EventLog>,
) -> Result<SimSummary, SimulationError> {
    let mut systems = build(config);
    systems.inject(log)?.init()?;

    for _ in 0..ticks {
        systems.run()?;
    }

    let summary = SimSummary {
        remaining: systems.default_world().pool::<Position>().len(),
        escaped: systems.world(EVENTS_WORLD)?.pool::<Escape>().len(),
    };
    systems.destroy()?;
    Ok(summary)
}
