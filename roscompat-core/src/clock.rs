//! The clock reference answering every time query of a node.
//!
//! A [`Clock`] is created once at bootstrap. In wall mode it is anchored on
//! the system clock at creation and advanced with a monotonic [`Instant`],
//! so two consecutive reads never go backwards even if the system clock is
//! adjusted. In simulated mode it only moves when a `/clock` message is
//! received.

use crate::time::Time;
use std::{cell::Cell, time::Instant};

/// Topic carrying simulated time.
pub const CLOCK_TOPIC: &str = "/clock";

/// Parameter switching a node to simulated time.
pub const USE_SIM_TIME: &str = "use_sim_time";

/// Where a clock takes its time from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    /// System time, monotonically advanced.
    Wall,
    /// Time received on [`CLOCK_TOPIC`].
    Simulated,
}

/// Clock reference of an execution context.
#[derive(Debug)]
pub struct Clock {
    source: ClockSource,
    anchor_wall: Time,
    anchor_instant: Instant,
    sim_time: Cell<Time>,
}

impl Clock {
    /// Create a clock for the given source.
    pub fn new(source: ClockSource) -> Self {
        Self {
            source,
            anchor_wall: std::time::SystemTime::now().into(),
            anchor_instant: Instant::now(),
            sim_time: Cell::new(Time::zero()),
        }
    }

    /// The time source.
    pub fn source(&self) -> ClockSource {
        self.source
    }

    /// Whether the clock follows simulated time.
    pub fn is_simulated(&self) -> bool {
        self.source == ClockSource::Simulated
    }

    /// Current time.
    pub fn now(&self) -> Time {
        match self.source {
            ClockSource::Wall => self.anchor_wall + self.anchor_instant.elapsed(),
            ClockSource::Simulated => self.sim_time.get(),
        }
    }

    /// Feed a simulated time sample. Ignored by a wall clock.
    pub fn set_sim_time(&self, time: Time) {
        if self.is_simulated() {
            self.sim_time.set(time);
        } else {
            tracing::trace!("wall clock ignores simulated time sample");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_clock_monotonic() {
        let clock = Clock::new(ClockSource::Wall);
        let mut last = clock.now();
        for _ in 0..1000 {
            let now = clock.now();
            assert!(now >= last);
            last = now;
        }
        assert!(!last.is_zero());
    }

    #[test]
    fn test_sim_clock() {
        let clock = Clock::new(ClockSource::Simulated);
        assert!(clock.now().is_zero());
        clock.set_sim_time(Time::new(5, 0));
        assert_eq!(clock.now(), Time::new(5, 0));
    }

    #[test]
    fn test_wall_clock_ignores_sim_samples() {
        let clock = Clock::new(ClockSource::Wall);
        clock.set_sim_time(Time::new(5, 0));
        assert_ne!(clock.now(), Time::new(5, 0));
    }
}
