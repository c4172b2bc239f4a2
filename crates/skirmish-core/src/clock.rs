//! Encounter clock.
//!
//! Counts update ticks, accumulates elapsed seconds and tracks how long the
//! state machine has been in its current state, which is what the timed
//! phases (fades, celebration, AI thinking) measure against.
//!
//! All counters use checked arithmetic; a non-finite or negative elapsed
//! time is rejected rather than folded in.

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// The host passed an elapsed time that is negative, NaN or infinite.
    #[error("invalid elapsed time: {elapsed}")]
    InvalidElapsed {
        /// The rejected value in seconds.
        elapsed: f64,
    },
}

/// Tick and time bookkeeping for one encounter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncounterClock {
    /// Updates processed so far.
    tick: u64,
    /// Seconds since the encounter started.
    elapsed: f64,
    /// Seconds since the last state transition.
    in_state: f64,
}

impl EncounterClock {
    /// A clock at tick 0.
    pub const fn new() -> Self {
        Self {
            tick: 0,
            elapsed: 0.0,
            in_state: 0.0,
        }
    }

    /// Advance by one tick of `elapsed` seconds. Returns the new tick.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidElapsed`] for negative or non-finite
    /// input and [`ClockError::TickOverflow`] if the counter is exhausted.
    pub fn advance(&mut self, elapsed: f64) -> Result<u64, ClockError> {
        if !elapsed.is_finite() || elapsed < 0.0 {
            return Err(ClockError::InvalidElapsed { elapsed });
        }
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        self.elapsed += elapsed;
        self.in_state += elapsed;
        Ok(self.tick)
    }

    /// Restart the per-state timer; called on every transition.
    pub const fn reset_state_timer(&mut self) {
        self.in_state = 0.0;
    }

    /// Current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Seconds since the encounter started.
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Seconds spent in the current state.
    pub const fn state_elapsed(&self) -> f64 {
        self.in_state
    }
}
