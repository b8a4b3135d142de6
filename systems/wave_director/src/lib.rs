#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave director that walks the schedule and emits spawn and reward commands.
//!
//! The director acts at most once per tick. Every call to [`WaveDirector::handle`]
//! first drains the countdown by the elapsed time and only evaluates the
//! current phase once the countdown has run out.

use std::time::Duration;

use lane_defence_core::{Command, WavePhase, WaveSchedule, WaveStatus};
use log::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    BetweenWaves,
    Bursting { burst: usize, remaining: u32 },
    PostBurstPause,
    Terminal,
}

/// Pure system that turns the wave schedule into commands.
#[derive(Debug)]
pub struct WaveDirector {
    phase: Phase,
    wave: u32,
    countdown: f32,
    can_skip: bool,
}

impl Default for WaveDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveDirector {
    /// Creates a director waiting to start the first wave.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Phase::BetweenWaves,
            wave: 0,
            countdown: 0.0,
            can_skip: false,
        }
    }

    /// Advances the countdown by `dt` and emits the commands due this tick.
    pub fn handle(&mut self, dt: Duration, schedule: &WaveSchedule, out: &mut Vec<Command>) {
        if self.phase == Phase::Terminal {
            return;
        }

        self.countdown = (self.countdown - dt.as_secs_f32()).max(0.0);
        if self.countdown > 0.0 {
            return;
        }

        match self.phase {
            Phase::BetweenWaves => self.begin_next_wave(schedule, out),
            Phase::Bursting { burst, remaining } => {
                self.continue_burst(burst, remaining, schedule, out);
            }
            Phase::PostBurstPause => {
                if let Some(wave) = schedule.wave(self.wave) {
                    self.countdown = wave.wait;
                }
                self.can_skip = true;
                self.phase = Phase::BetweenWaves;
            }
            Phase::Terminal => {}
        }
    }

    fn begin_next_wave(&mut self, schedule: &WaveSchedule, out: &mut Vec<Command>) {
        if self.wave > 0 {
            if let Some(finished) = schedule.wave(self.wave) {
                out.push(Command::CompleteWave {
                    wave: self.wave,
                    reward: finished.reward,
                });
            }
        }

        self.wave = self.wave.saturating_add(1);
        self.can_skip = false;
        let Some(wave) = schedule.wave(self.wave) else {
            debug!("no wave {} scheduled, schedule exhausted", self.wave);
            self.phase = Phase::Terminal;
            out.push(Command::ConcludeSchedule);
            return;
        };

        debug!("wave {} begins with {} bursts", self.wave, wave.bursts.len());
        self.phase = match wave.bursts.first() {
            Some(burst) => Phase::Bursting {
                burst: 0,
                remaining: burst.quantity,
            },
            None => Phase::PostBurstPause,
        };
    }

    fn continue_burst(
        &mut self,
        burst: usize,
        remaining: u32,
        schedule: &WaveSchedule,
        out: &mut Vec<Command>,
    ) {
        let Some(wave) = schedule.wave(self.wave) else {
            self.phase = Phase::PostBurstPause;
            return;
        };

        if remaining > 0 {
            if let Some(current) = wave.bursts.get(burst) {
                out.push(Command::SpawnEnemy {
                    template: current.enemy.clone(),
                });
                self.countdown = current.cooldown;
            }
            self.phase = Phase::Bursting {
                burst,
                remaining: remaining - 1,
            };
            return;
        }

        let next = burst + 1;
        self.phase = match wave.bursts.get(next) {
            Some(following) => Phase::Bursting {
                burst: next,
                remaining: following.quantity,
            },
            None => Phase::PostBurstPause,
        };
    }

    /// Forces the remaining pause to zero.
    ///
    /// Permitted only while skipping is allowed and no enemy is alive.
    /// Returns whether the countdown was forced.
    pub fn skip_wave(&mut self, live_enemies: usize) -> bool {
        if !self.can_skip || live_enemies > 0 {
            return false;
        }
        self.countdown = 0.0;
        true
    }

    /// One-based number of the current wave, zero before the first wave.
    #[must_use]
    pub fn wave(&self) -> u32 {
        self.wave
    }

    /// Whether the player may currently skip the pause.
    #[must_use]
    pub fn can_skip(&self) -> bool {
        self.can_skip
    }

    /// Reports whether the schedule has been exhausted.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Terminal
    }

    /// Summary of the director used by presentation layers.
    #[must_use]
    pub fn status(&self) -> WaveStatus {
        WaveStatus {
            wave: self.wave,
            phase: match self.phase {
                Phase::BetweenWaves => WavePhase::BetweenWaves,
                Phase::Bursting { .. } => WavePhase::Bursting,
                Phase::PostBurstPause => WavePhase::PostBurstPause,
                Phase::Terminal => WavePhase::Terminal,
            },
            countdown: self.countdown,
            can_skip: self.can_skip,
        }
    }
}
