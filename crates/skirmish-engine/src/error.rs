//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and the encounter
//! loop so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: skirmish_core::ConfigError,
    },

    /// Building or ticking the encounter failed.
    #[error("combat error: {source}")]
    Combat {
        /// The underlying combat error.
        #[from]
        source: skirmish_core::CombatError,
    },

    /// The encounter did not finish within the tick budget.
    #[error("encounter still running after {ticks} ticks")]
    TickLimit {
        /// Ticks executed.
        ticks: u64,
    },
}
