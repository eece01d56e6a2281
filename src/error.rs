//! Error types shared by the projection, hedge, and cost basis calculators

use thiserror::Error;

/// Errors surfaced by the simulator library
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// An input value violates a precondition. Raised before any computation runs.
    #[error("Invalid parameter: {field}: {reason}")]
    InvalidParameter { field: String, reason: String },

    /// External market data was not available for an expiry or ticker
    #[error("No data for {source_name}: {reason}")]
    DataGap { source_name: String, reason: String },

    /// A derived quantity has no mathematically defined value for the input
    #[error("Undefined: {0}")]
    Undefined(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl SimulatorError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        SimulatorError::InvalidParameter {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn data_gap(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        SimulatorError::DataGap {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// True for precondition violations (the only errors that abort a whole call)
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, SimulatorError::InvalidParameter { .. })
    }
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, SimulatorError>;

/// Reject non-finite values and values below `min`
pub(crate) fn ensure_at_least(field: &str, value: f64, min: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(SimulatorError::invalid(field, format!("must be finite, got {}", value)));
    }
    if value < min {
        return Err(SimulatorError::invalid(field, format!("must be >= {}, got {}", min, value)));
    }
    Ok(())
}

/// Reject non-finite values and values that are not strictly positive
pub(crate) fn ensure_positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SimulatorError::invalid(field, format!("must be > 0, got {}", value)));
    }
    Ok(())
}

/// Reject percentages outside [0, 100]
pub(crate) fn ensure_percent(field: &str, value: f64) -> Result<()> {
    ensure_at_least(field, value, 0.0)?;
    if value > 100.0 {
        return Err(SimulatorError::invalid(field, format!("must be <= 100, got {}", value)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_message() {
        let err = SimulatorError::invalid("reinvestment_price", "must be > 0, got 0");
        assert!(err.is_invalid_parameter());
        assert_eq!(
            err.to_string(),
            "Invalid parameter: reinvestment_price: must be > 0, got 0"
        );
    }

    #[test]
    fn test_validators() {
        assert!(ensure_at_least("x", 0.0, 0.0).is_ok());
        assert!(ensure_at_least("x", -0.01, 0.0).is_err());
        assert!(ensure_at_least("x", f64::NAN, 0.0).is_err());
        assert!(ensure_positive("x", 0.0).is_err());
        assert!(ensure_positive("x", f64::INFINITY).is_err());
        assert!(ensure_percent("x", 100.0).is_ok());
        assert!(ensure_percent("x", 100.5).is_err());
    }

    #[test]
    fn test_data_gap_is_not_invalid_parameter() {
        let err = SimulatorError::data_gap("2025-06-20", "timeout");
        assert!(!err.is_invalid_parameter());
        assert_eq!(err.to_string(), "No data for 2025-06-20: timeout");
    }
}
