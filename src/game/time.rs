//! Simulation timing
//!
//! Fixed-step clock plus the periodic timers and rate limiters that drive
//! bullets, enemy decisions, spawns and player input. All of them run on
//! simulation time, never on wall-clock time.

use std::time::Duration;

/// Fixed-timestep accumulator
#[derive(Debug, Clone)]
pub struct SimClock {
    /// Length of one tick in seconds
    step: f32,
    /// Upper bound on ticks per frame, to avoid a spiral of death
    max_substeps: u32,
    /// Wall time not yet consumed by ticks
    accumulator: f32,
    /// Total simulated time in seconds
    elapsed: f64,
}

impl SimClock {
    pub fn new(hz: u32, max_substeps: u32) -> Self {
        Self {
            step: 1.0 / hz.max(1) as f32,
            max_substeps: max_substeps.max(1),
            accumulator: 0.0,
            elapsed: 0.0,
        }
    }

    /// Feed wall time and return how many ticks to run now.
    ///
    /// Time beyond `max_substeps` ticks is dropped rather than carried over.
    pub fn advance(&mut self, delta: Duration) -> u32 {
        self.accumulator += delta.as_secs_f32();

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_substeps {
            self.accumulator -= self.step;
            steps += 1;
        }
        if steps == self.max_substeps && self.accumulator >= self.step {
            log::debug!("Dropping {:.3}s of simulation backlog", self.accumulator);
            self.accumulator = 0.0;
        }

        self.elapsed += steps as f64 * self.step as f64;
        steps
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Total simulated time in seconds
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Reset the timer
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.elapsed = 0.0;
    }
}

/// Fires at a fixed period
#[derive(Debug, Clone)]
pub struct Interval {
    period: f32,
    since_last: f32,
}

impl Interval {
    pub fn new(period: f32) -> Self {
        Self {
            period: period.max(f32::EPSILON),
            since_last: 0.0,
        }
    }

    /// An interval that fires `rate` times per second
    pub fn per_second(rate: f32) -> Self {
        Self::new(1.0 / rate.max(f32::EPSILON))
    }

    /// Advance by `dt` seconds and return how many periods elapsed
    pub fn update(&mut self, dt: f32) -> u32 {
        self.since_last += dt;
        let mut fired = 0;
        while self.since_last >= self.period {
            self.since_last -= self.period;
            fired += 1;
        }
        fired
    }

    pub fn reset(&mut self) {
        self.since_last = 0.0;
    }
}

/// Rate limiter: at most one action per `delay` seconds.
///
/// Calls inside the window are rejected, not queued.
#[derive(Debug, Clone)]
pub struct Throttle {
    delay: f64,
    last: Option<f64>,
}

impl Throttle {
    pub fn new(delay: f64) -> Self {
        Self { delay, last: None }
    }

    /// A throttle that allows `rate` actions per second
    pub fn per_second(rate: f32) -> Self {
        Self::new(1.0 / rate.max(f32::EPSILON) as f64)
    }

    /// Claim the action at time `now`. Returns false while throttled.
    pub fn try_acquire(&mut self, now: f64) -> bool {
        if let Some(last) = self.last {
            if now - last < self.delay {
                return false;
            }
        }
        self.last = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
