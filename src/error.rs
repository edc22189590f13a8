//! Error types for NRQL building.

use crate::builder::Clause;
use thiserror::Error;

/// The main error type for NRQL operations.
#[derive(Debug, Error)]
pub enum NrqlError {
    /// Time period unit outside of minutes, hours, days, weeks.
    #[error("Unit '{0}' is not supported.")]
    InvalidUnit(String),

    /// A clause was assigned a second time.
    #[error("Value has already been assigned to the query part '{0}'.")]
    DuplicateAssignment(Clause),

    /// Keyword that does not name any clause.
    #[error("Query part '{0}' is not recognized.")]
    UnknownSlot(String),

    /// Required clause absent at render time.
    #[error("{} is missing.", describe(.0))]
    MissingClause(Clause),

    /// Clauses that contradict each other.
    #[error("{0}")]
    InvalidCombination(&'static str),

    /// Moment shorthand that could not be understood.
    #[error("Invalid moment: {0}")]
    InvalidMoment(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe(clause: &Clause) -> String {
    match clause {
        Clause::Select => "SELECT statement".to_string(),
        other => format!("{} clause", other),
    }
}

impl NrqlError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid moment error.
    pub fn moment(message: impl Into<String>) -> Self {
        Self::InvalidMoment(message.into())
    }
}

/// Result type alias for NRQL operations.
pub type NrqlResult<T> = Result<T, NrqlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            NrqlError::InvalidUnit("fortnights".into()).to_string(),
            "Unit 'fortnights' is not supported."
        );
        assert_eq!(
            NrqlError::DuplicateAssignment(Clause::CompareWith).to_string(),
            "Value has already been assigned to the query part 'COMPARE WITH'."
        );
    }

    #[test]
    fn test_missing_clause_display() {
        assert_eq!(
            NrqlError::MissingClause(Clause::Select).to_string(),
            "SELECT statement is missing."
        );
        assert_eq!(
            NrqlError::MissingClause(Clause::From).to_string(),
            "FROM clause is missing."
        );
    }
}
