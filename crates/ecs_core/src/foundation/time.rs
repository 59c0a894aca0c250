//! Frame timing for hosts driving [`World::update`](crate::World::update)

use std::time::Instant;

#[derive(Debug, Clone, Copy)]
enum Step {
    RealTime { last_tick: Instant },
    Fixed(f32),
}

/// Produces the delta for each frame
///
/// A real-time clock measures the wall time between ticks; a fixed-step clock
/// returns the same delta every tick, which keeps simulations deterministic.
#[derive(Debug, Clone)]
pub struct FrameClock {
    step: Step,
    delta: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::real_time()
    }
}

impl FrameClock {
    /// Clock measuring wall time between ticks
    pub fn real_time() -> Self {
        Self::with_step(Step::RealTime {
            last_tick: Instant::now(),
        })
    }

    /// Clock advancing by `step` seconds every tick
    ///
    /// Negative steps are treated as zero.
    pub fn fixed(step: f32) -> Self {
        Self::with_step(Step::Fixed(step.max(0.0)))
    }

    const fn with_step(step: Step) -> Self {
        Self {
            step,
            delta: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance one frame and return its delta in seconds
    pub fn tick(&mut self) -> f32 {
        self.delta = match &mut self.step {
            Step::RealTime { last_tick } => {
                let now = Instant::now();
                let elapsed = now.duration_since(*last_tick).as_secs_f32();
                *last_tick = now;
                elapsed
            }
            Step::Fixed(step) => *step,
        };
        self.total_time += self.delta;
        self.frame_count += 1;
        self.delta
    }

    /// Delta of the last tick
    pub const fn delta(&self) -> f32 {
        self.delta
    }

    /// Sum of all deltas so far
    pub const fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Number of ticks so far
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Whether the clock uses a fixed step
    pub const fn is_fixed(&self) -> bool {
        matches!(self.step, Step::Fixed(_))
    }

    /// Average frames per second since creation
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}
