//! Error types for the skewt-engine crate.
use thiserror::Error;

/// Error type for the crate.
#[derive(Clone, PartialEq, Debug, Error)]
pub enum AnalysisError {
    /// A pressure was zero, negative, or not a finite number.
    #[error("Invalid pressure {0} hPa.")]
    InvalidPressure(f64),
    /// A pressure was valid but outside the configured plot range.
    #[error("Pressure {pressure} hPa is outside the range {top} - {bottom} hPa.")]
    OutOfRange {
        /// The offending pressure in hPa.
        pressure: f64,
        /// Lowest pressure (top) of the allowed range in hPa.
        top: f64,
        /// Highest pressure (bottom) of the allowed range in hPa.
        bottom: f64,
    },
    /// The sounding failed one of its structural invariants.
    #[error("Malformed profile: {0}")]
    MalformedProfile(String),
    /// Root finding did not bracket or did not converge within its iteration bound.
    #[error("Failed to converge while searching for the {what} after {iterations} iterations.")]
    ConvergenceFailure {
        /// What was being searched for.
        what: &'static str,
        /// Number of iterations spent.
        iterations: usize,
    },
    /// ODE integration produced a non-finite or non-physical value.
    #[error("Integration diverged beyond {pressure} hPa, the last valid sample.")]
    IntegrationDivergence {
        /// Pressure of the last valid sample in hPa.
        pressure: f64,
    },
    /// A caller supplied step budget ran out before integration finished.
    #[error("Integration step budget of {budget} steps exhausted at {pressure} hPa.")]
    StepBudgetExhausted {
        /// The budget that was exhausted.
        budget: usize,
        /// Pressure reached when the budget ran out, in hPa.
        pressure: f64,
    },
    /// Bad or invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Configuration could not be parsed or is inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Shorthand for results.
pub type Result<T> = std::result::Result<T, AnalysisError>;

impl From<toml::de::Error> for AnalysisError {
    fn from(err: toml::de::Error) -> Self {
        AnalysisError::InvalidConfig(err.to_string())
    }
}
