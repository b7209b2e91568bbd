//! Errors raised by the pricing engine

use crate::catalog::JoinType;
use std::fmt;
use thiserror::Error;

/// What the engine failed to find in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    Device(String),
    Plan(String),
    Subsidy {
        device_id: String,
        plan_id: String,
        join_type: JoinType,
    },
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Device(id) => write!(f, "device '{}' is not offered", id),
            Missing::Plan(id) => write!(f, "plan '{}' is not offered", id),
            Missing::Subsidy {
                device_id,
                plan_id,
                join_type,
            } => write!(
                f,
                "no subsidy for device '{}' on plan '{}' ({})",
                device_id, plan_id, join_type
            ),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalculationError {
    /// Bad user selection; rejected before any catalog lookup
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// The requested combination is not sold
    #[error("Combination unavailable: {0}")]
    NotFound(Missing),

    /// A calculator was called with arguments outside its domain
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Catalog values that cannot produce a trustworthy price
    #[error("Catalog data integrity violation: {0}")]
    DataIntegrity(String),
}

impl CalculationError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        CalculationError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Whether the customer can fix this by changing their selection
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            CalculationError::Validation { .. } | CalculationError::NotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CalculationError::NotFound(Missing::Subsidy {
            device_id: "s24".into(),
            plan_id: "basic".into(),
            join_type: JoinType::Transfer,
        });
        assert_eq!(
            err.to_string(),
            "Combination unavailable: no subsidy for device 's24' on plan 'basic' (transfer)"
        );

        let err = CalculationError::validation("installmentMonths", "18 is not offered");
        assert_eq!(err.to_string(), "Invalid installmentMonths: 18 is not offered");
    }

    #[test]
    fn test_user_correctable() {
        assert!(CalculationError::validation("joinType", "x").is_user_correctable());
        assert!(CalculationError::NotFound(Missing::Plan("p".into())).is_user_correctable());
        assert!(!CalculationError::DataIntegrity("overflow".into()).is_user_correctable());
        assert!(!CalculationError::InvalidArgument("months".into()).is_user_correctable());
    }
}
