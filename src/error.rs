//! Error type shared by instance loading, configuration and the search engine.

use std::fmt;

/// Errors surfaced by the solver.
#[derive(Debug)]
pub enum SolverError {
    /// Instance file could not be read
    Io(std::io::Error),
    /// Instance file is malformed
    Parse(String),
    /// Instance content is unusable (demand above capacity, no customers, ...)
    InvalidInstance(String),
    /// Configuration rejected at engine construction
    InvalidConfig(String),
    /// Feasibility restoration needed more routes than the instance allows
    FleetExhausted { max_routes: usize },
    /// Solution text could not be loaded
    InvalidSolution(String),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::Io(e) => write!(f, "I/O error: {}", e),
            SolverError::Parse(msg) => write!(f, "Parse error: {}", msg),
            SolverError::InvalidInstance(msg) => write!(f, "Invalid instance: {}", msg),
            SolverError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            SolverError::FleetExhausted { max_routes } => write!(
                f,
                "Feasibility restoration exceeded the maximum number of routes ({})",
                max_routes
            ),
            SolverError::InvalidSolution(msg) => write!(f, "Invalid solution: {}", msg),
        }
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolverError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SolverError {
    fn from(e: std::io::Error) -> Self {
        SolverError::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, SolverError>;
