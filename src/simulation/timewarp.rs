//! Timewarp scheduling
//!
//! Maps the user's warp factor to how much physics runs per rendered frame:
//! how many logical ticks, how long each tick is, and how many frames are
//! skipped between renders.

use log::info;

pub const DEFAULT_LADDER: [u32; 5] = [1, 2, 5, 10, 25];

/// Work for one frame at a given warp factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarpSettings {
    pub steps: u32, // logical ticks per frame
    pub sub_time_step: f64, // length of each tick
    pub render_skip: u32, // render every n-th frame
}

/// Banded warp rules.
///
/// | factor      | steps          | sub_time_step        | render_skip          |
/// |-------------|----------------|----------------------|----------------------|
/// | <= 1        | 1              | 1.0                  | 1                    |
/// | <= 5        | factor         | 1.0                  | 1                    |
/// | <= 25       | 5              | factor / 5           | min(2, factor / 10)  |
/// | <= 100      | ceil(f / 4)    | min(4, f / steps)    | min(4, factor / 25)  |
/// | above       | ceil(f / 5)    | min(5, f / steps)    | min(8, factor / 25)  |
///
/// Integer divisions round down. `render_skip` never drops below 1.
pub fn time_warp_settings(factor: u32) -> WarpSettings {
    let f = f64::from(factor);

    let (steps, sub_time_step, render_skip) = if factor <= 1 {
        (1, 1.0, 1)
    } else if factor <= 5 {
        (factor, 1.0, 1)
    } else if factor <= 25 {
        (5, f / 5.0, (factor / 10).min(2))
    } else if factor <= 100 {
        let steps = factor.div_ceil(4);
        (steps, (f / f64::from(steps)).min(4.0), (factor / 25).min(4))
    } else {
        let steps = factor.div_ceil(5);
        (steps, (f / f64::from(steps)).min(5.0), (factor / 25).min(8))
    };

    WarpSettings {
        steps,
        sub_time_step,
        render_skip: render_skip.max(1),
    }
}

/// What the controller should do this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePlan {
    pub physics_steps: u32, // 0 while paused
    pub sub_time_step: f64,
    pub render: bool,
}

/// Warp ladder state machine plus pause flag.
#[derive(Debug, Clone)]
pub struct TimewarpScheduler {
    ladder: Vec<u32>,
    index: usize,
    paused: bool,
    frame: u64,
}

impl Default for TimewarpScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_LADDER.to_vec())
    }
}

impl TimewarpScheduler {
    /// Scheduler over `ladder`, starting on its first rung. An empty ladder
    /// falls back to `[1]`.
    pub fn new(ladder: Vec<u32>) -> Self {
        let ladder = if ladder.is_empty() { vec![1] } else { ladder };
        Self {
            ladder,
            index: 0,
            paused: false,
            frame: 0,
        }
    }

    pub fn ladder(&self) -> &[u32] {
        &self.ladder
    }

    pub fn level(&self) -> usize {
        self.index
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Effective warp factor, 0 while paused.
    pub fn current_warp(&self) -> u32 {
        if self.paused {
            0
        } else {
            self.ladder[self.index]
        }
    }

    pub fn settings(&self) -> WarpSettings {
        time_warp_settings(self.current_warp())
    }

    /// Move one rung up, clamped at the top.
    pub fn increase(&mut self) -> u32 {
        if self.index + 1 < self.ladder.len() {
            self.index += 1;
            info!("Time warp increased to {}x", self.ladder[self.index]);
        }
        self.ladder[self.index]
    }

    /// Move one rung down, clamped at the bottom.
    pub fn decrease(&mut self) -> u32 {
        if self.index > 0 {
            self.index -= 1;
            info!("Time warp decreased to {}x", self.ladder[self.index]);
        }
        self.ladder[self.index]
    }

    /// Back to the first rung, unpaused.
    pub fn reset(&mut self) {
        self.index = 0;
        self.paused = false;
        info!("Time warp reset to {}x", self.ladder[0]);
    }

    /// Jump straight to rung `level` (clamped to the ladder).
    pub fn set_level(&mut self, level: usize) -> u32 {
        self.index = level.min(self.ladder.len() - 1);
        info!("Time warp set to {}x", self.ladder[self.index]);
        self.ladder[self.index]
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        if self.paused {
            info!("Simulation paused");
        } else {
            info!("Simulation resumed at {}x", self.ladder[self.index]);
        }
        self.paused
    }

    /// Advance the frame counter and say how much physics to run this frame.
    ///
    /// A paused scheduler still renders every frame.
    pub fn plan_frame(&mut self) -> FramePlan {
        self.frame += 1;

        if self.paused {
            return FramePlan {
                physics_steps: 0,
                sub_time_step: 0.0,
                render: true,
            };
        }

        let s = self.settings();
        FramePlan {
            physics_steps: s.steps,
            sub_time_step: s.sub_time_step,
            render: self.frame % u64::from(s.render_skip) == 0,
        }
    }
}
