use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("projection overflowed the decimal range in year {year}")]
    Overflow { year: u32 },
}

impl SimulationError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Offending field for validation failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            Self::Overflow { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
