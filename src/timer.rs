//! Cooking countdown timer
//!
//! A single-slot countdown: at most one countdown exists per session,
//! starting a new one silently replaces the old one, and completion is
//! reported exactly once. The engine itself is a pure state machine
//! driven by tick events; the recurring one-second schedule producing
//! those ticks is owned by the session runtime and marshalled onto the
//! controller queue.
//!
//! Every countdown carries a monotonically increasing generation number.
//! A tick must present the generation it was scheduled for; ticks from a
//! replaced or cancelled countdown are discarded, so a stale schedule can
//! never decrement or complete the current countdown.

use serde::{Deserialize, Serialize};

/// Snapshot of the active countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// Total length of the countdown in seconds
    pub duration_seconds: u32,
    /// Seconds left until completion
    pub remaining_seconds: u32,
    /// Whether the countdown is counting
    pub running: bool,
}

/// Outcome of feeding one tick to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick belonged to a replaced or cancelled countdown, or no
    /// countdown is active; nothing happened.
    Stale,
    /// The countdown is still running.
    Running { remaining_seconds: u32 },
    /// The countdown reached zero. Reported exactly once; the slot is
    /// already cleared when this is returned.
    Completed { duration_seconds: u32 },
}

#[derive(Debug)]
struct ActiveCountdown {
    duration_seconds: u32,
    remaining_seconds: u32,
    generation: u64,
}

/// Single-slot countdown engine.
#[derive(Debug, Default)]
pub struct CountdownTimer {
    active: Option<ActiveCountdown>,
    next_generation: u64,
}

impl CountdownTimer {
    /// Creates an idle timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a countdown of `seconds`, silently replacing any running
    /// countdown. The replaced countdown's completion never fires.
    ///
    /// Returns the generation the driving schedule must stamp its ticks
    /// with.
    pub fn start(&mut self, seconds: u32) -> u64 {
        if let Some(previous) = self.active.take() {
            tracing::debug!(
                "Replacing running timer with {} remaining (generation {})",
                format_clock(previous.remaining_seconds),
                previous.generation
            );
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        self.active = Some(ActiveCountdown {
            duration_seconds: seconds,
            remaining_seconds: seconds,
            generation,
        });

        tracing::info!(
            "Timer started: {} (generation {})",
            format_clock(seconds),
            generation
        );
        generation
    }

    /// Cancel the running countdown. No completion fires. Returns whether
    /// a countdown was actually running; cancelling an idle timer is a
    /// no-op.
    pub fn cancel(&mut self) -> bool {
        match self.active.take() {
            Some(cancelled) => {
                tracing::info!(
                    "Timer cancelled with {} remaining",
                    format_clock(cancelled.remaining_seconds)
                );
                true
            }
            None => false,
        }
    }

    /// Feed one tick for the given generation.
    ///
    /// Stale generations are ignored. On reaching zero the slot is
    /// cleared before completion is returned, so completion is observed
    /// at most once per countdown.
    pub fn tick(&mut self, generation: u64) -> TickOutcome {
        let Some(active) = self.active.as_mut() else {
            return TickOutcome::Stale;
        };
        if active.generation != generation {
            return TickOutcome::Stale;
        }

        active.remaining_seconds = active.remaining_seconds.saturating_sub(1);
        if active.remaining_seconds == 0 {
            let duration_seconds = active.duration_seconds;
            self.active = None;
            tracing::info!("Timer complete ({})", format_clock(duration_seconds));
            TickOutcome::Completed { duration_seconds }
        } else {
            TickOutcome::Running {
                remaining_seconds: active.remaining_seconds,
            }
        }
    }

    /// Generation of the running countdown, if any.
    pub fn generation(&self) -> Option<u64> {
        self.active.as_ref().map(|active| active.generation)
    }

    /// Whether a countdown is running.
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Snapshot of the running countdown, if any.
    pub fn state(&self) -> Option<TimerState> {
        self.active.as_ref().map(|active| TimerState {
            duration_seconds: active.duration_seconds,
            remaining_seconds: active.remaining_seconds,
            running: true,
        })
    }
}

/// Format seconds as "M:SS" with zero-padded seconds.
pub fn format_clock(total_seconds: u32) -> String {
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Spoken form of a duration: "5 minutes and 0 seconds".
pub fn spoken_duration(total_seconds: u32) -> String {
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!(
        "{} minute{} and {} second{}",
        minutes,
        plural(minutes),
        seconds,
        plural(seconds)
    )
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_timer_is_idle() {
        let timer = CountdownTimer::new();
        assert!(!timer.is_running());
        assert_eq!(timer.state(), None);
        assert_eq!(timer.generation(), None);
    }

    #[test]
    fn test_start_sets_state() {
        let mut timer = CountdownTimer::new();
        let generation = timer.start(300);

        assert!(timer.is_running());
        assert_eq!(timer.generation(), Some(generation));
        assert_eq!(
            timer.state(),
            Some(TimerState {
                duration_seconds: 300,
                remaining_seconds: 300,
                running: true,
            })
        );
    }

    #[test]
    fn test_tick_counts_down() {
        let mut timer = CountdownTimer::new();
        let generation = timer.start(3);

        assert_eq!(
            timer.tick(generation),
            TickOutcome::Running {
                remaining_seconds: 2
            }
        );
        assert_eq!(
            timer.tick(generation),
            TickOutcome::Running {
                remaining_seconds: 1
            }
        );
        assert_eq!(
            timer.tick(generation),
            TickOutcome::Completed {
                duration_seconds: 3
            }
        );
        assert!(!timer.is_running());
    }

    #[test]
    fn test_completion_fires_exactly_once() {
        let mut timer = CountdownTimer::new();
        let generation = timer.start(1);

        assert_eq!(
            timer.tick(generation),
            TickOutcome::Completed {
                duration_seconds: 1
            }
        );
        assert_eq!(timer.tick(generation), TickOutcome::Stale);
        assert_eq!(timer.tick(generation), TickOutcome::Stale);
    }

    #[test]
    fn test_replaced_timer_never_completes() {
        let mut timer = CountdownTimer::new();
        let first = timer.start(300);
        let second = timer.start(60);

        // Ticks from the replaced schedule are discarded
        for _ in 0..400 {
            assert_eq!(timer.tick(first), TickOutcome::Stale);
        }

        // Only the second countdown completes, after its full length
        let mut completions = 0;
        for _ in 0..60 {
            if let TickOutcome::Completed { duration_seconds } = timer.tick(second) {
                assert_eq!(duration_seconds, 60);
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_cancel_prevents_completion() {
        let mut timer = CountdownTimer::new();
        let generation = timer.start(2);

        assert!(timer.cancel());
        assert!(!timer.is_running());
        assert_eq!(timer.tick(generation), TickOutcome::Stale);
    }

    #[test]
    fn test_cancel_when_idle_is_noop() {
        let mut timer = CountdownTimer::new();
        assert!(!timer.cancel());
    }

    #[test]
    fn test_generations_increase() {
        let mut timer = CountdownTimer::new();
        let first = timer.start(10);
        timer.cancel();
        let second = timer.start(10);
        assert!(second > first);
    }

    #[test]
    fn test_format_clock_pads_seconds() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(59), "0:59");
        assert_eq!(format_clock(60), "1:00");
        assert_eq!(format_clock(305), "5:05");
        assert_eq!(format_clock(3600), "60:00");
    }

    #[test]
    fn test_spoken_duration() {
        assert_eq!(spoken_duration(300), "5 minutes and 0 seconds");
        assert_eq!(spoken_duration(60), "1 minute and 0 seconds");
        assert_eq!(spoken_duration(90), "1 minute and 30 seconds");
        assert_eq!(spoken_duration(61), "1 minute and 1 second");
    }
}
