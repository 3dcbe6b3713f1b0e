//! Domain-level error taxonomy for Podium.

use super::apparatus::Apparatus;
use super::athlete::AthleteId;

/// Errors produced while validating an athlete record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("athlete {athlete}: {apparatus} score must be a finite number, got {value}")]
    NonFiniteScore {
        athlete: String,
        apparatus: Apparatus,
        value: f64,
    },

    #[error("athlete field must not be empty: {field}")]
    EmptyField { field: &'static str },

    #[error("athlete id already present in roster: {0}")]
    DuplicateAthlete(AthleteId),
}

/// Podium domain errors.
#[derive(Debug, thiserror::Error)]
pub enum PodiumError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("roster is empty: nothing to remove")]
    EmptyStore,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("unknown apparatus code: {0}")]
    UnknownApparatus(String),

    #[error("simulation worker failed: {0}")]
    WorkerJoin(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Podium domain operations.
pub type Result<T> = std::result::Result<T, PodiumError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_podium_error_display() {
        let err = PodiumError::InvalidConfiguration("trials must be positive".to_string());
        assert!(err.to_string().contains("invalid configuration"));

        let err = PodiumError::EmptyStore;
        assert!(err.to_string().contains("roster is empty"));

        let err = PodiumError::UnknownApparatus("PB".to_string());
        assert!(err.to_string().contains("PB"));
    }

    #[test]
    fn test_non_finite_score_names_athlete_and_apparatus() {
        let err = ValidationError::NonFiniteScore {
            athlete: "Biles".to_string(),
            apparatus: Apparatus::Vault,
            value: f64::NAN,
        };
        let msg = err.to_string();
        assert!(msg.contains("Biles"));
        assert!(msg.contains("VT"));
        assert!(msg.contains("NaN"));
    }

    #[test]
    fn test_validation_error_converts() {
        let err: PodiumError = ValidationError::EmptyField { field: "country" }.into();
        assert!(matches!(err, PodiumError::Validation(_)));
        assert!(err.to_string().contains("country"));
    }
}
