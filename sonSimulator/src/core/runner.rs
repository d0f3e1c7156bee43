//! Runs a [`Simulation`] on its own worker thread.
//!
//! The worker owns the simulation outright. Other threads see it only
//! through the snapshot published after each complete tick, and stop it
//! through the running flag, which is checked once per tick boundary.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{error, info};

use super::network::NetworkSnapshot;
use super::simulation::Simulation;
use crate::config::constants::{DEFAULT_SPEED, MIN_SPEED};

pub struct SimulationRunner {
    running: Arc<AtomicBool>,
    speed: Arc<RwLock<f64>>,
    snapshot: Arc<RwLock<NetworkSnapshot>>,
    handle: Option<JoinHandle<Simulation>>,
}

impl SimulationRunner {
    /// Starts ticking until [`stop`](Self::stop) is called.
    pub fn start(simulation: Simulation, paced: bool) -> io::Result<Self> {
        Self::spawn(simulation, paced, None)
    }

    /// Starts ticking and stops by itself after `max_ticks` ticks.
    pub fn start_for(simulation: Simulation, paced: bool, max_ticks: u64) -> io::Result<Self> {
        Self::spawn(simulation, paced, Some(max_ticks))
    }

    fn spawn(mut simulation: Simulation, paced: bool, max_ticks: Option<u64>) -> io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let speed = Arc::new(RwLock::new(DEFAULT_SPEED));
        let snapshot = Arc::new(RwLock::new(simulation.snapshot()));

        let worker_running = Arc::clone(&running);
        let worker_speed = Arc::clone(&speed);
        let worker_snapshot = Arc::clone(&snapshot);
        let tick_rate = simulation.config().tick_rate;

        let handle = thread::Builder::new()
            .name("son-simulation".to_string())
            .spawn(move || {
                let mut ticks = 0u64;
                while worker_running.load(Ordering::SeqCst) {
                    if max_ticks.map_or(false, |max| ticks >= max) {
                        break;
                    }
                    let started = Instant::now();

                    simulation.tick();
                    ticks += 1;
                    *worker_snapshot.write() = simulation.snapshot();

                    if paced {
                        let interval = tick_interval(tick_rate, *worker_speed.read());
                        if let Some(remaining) = interval.checked_sub(started.elapsed()) {
                            thread::sleep(remaining);
                        }
                    }
                }
                worker_running.store(false, Ordering::SeqCst);
                info!(ticks, "Simulation worker stopped");
                simulation
            })?;

        Ok(Self {
            running,
            speed,
            snapshot,
            handle: Some(handle),
        })
    }

    pub fn change_speed(&self, speed: f64) {
        let speed = if speed.is_finite() { speed.max(MIN_SPEED) } else { DEFAULT_SPEED };
        *self.speed.write() = speed;
    }

    pub fn speed(&self) -> f64 {
        *self.speed.read()
    }

    /// Latest fully-updated view of the network.
    pub fn snapshot(&self) -> NetworkSnapshot {
        self.snapshot.read().clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
            && self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }

    /// Asks the worker to stop after its current tick and hands the
    /// simulation back.
    pub fn stop(mut self) -> Option<Simulation> {
        self.running.store(false, Ordering::SeqCst);
        self.join_worker()
    }

    /// Waits for a bounded run started with [`start_for`](Self::start_for).
    pub fn join(mut self) -> Option<Simulation> {
        self.join_worker()
    }

    fn join_worker(&mut self) -> Option<Simulation> {
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(simulation) => Some(simulation),
            Err(_) => {
                error!("Simulation worker panicked");
                None
            }
        }
    }
}

impl Drop for SimulationRunner {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        let _ = self.join_worker();
    }
}

/// Wall-clock budget of one tick at the given speed multiplier.
pub fn tick_interval(tick_rate: f64, speed: f64) -> Duration {
    let rate = tick_rate * speed.max(MIN_SPEED);
    if rate.is_finite() && rate > 0.0 {
        Duration::from_secs_f64(1.0 / rate)
    } else {
        Duration::ZERO
    }
}
