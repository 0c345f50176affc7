//! Column length limits for program text fields

use serde::{Deserialize, Serialize};

use super::errors::{ValidationError, ValidationResult};

/// Maximum lengths, in characters, of program text fields.
///
/// Lengths are measured on the trimmed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLimits {
    /// Maximum program name length (default: 50)
    #[serde(default = "default_name_max_length")]
    pub name_max_length: usize,

    /// Maximum description length (default: 500)
    #[serde(default = "default_description_max_length")]
    pub description_max_length: usize,

    /// Maximum retire reason length (default: 255)
    #[serde(default = "default_retire_reason_max_length")]
    pub retire_reason_max_length: usize,
}

fn default_name_max_length() -> usize {
    50
}

fn default_description_max_length() -> usize {
    500
}

fn default_retire_reason_max_length() -> usize {
    255
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            name_max_length: default_name_max_length(),
            description_max_length: default_description_max_length(),
            retire_reason_max_length: default_retire_reason_max_length(),
        }
    }
}

impl FieldLimits {
    /// Every limit must be positive
    pub fn validate(&self) -> ValidationResult<()> {
        let limits = [
            ("name_max_length", self.name_max_length),
            ("description_max_length", self.description_max_length),
            ("retire_reason_max_length", self.retire_reason_max_length),
        ];
        for (key, value) in limits {
            if value == 0 {
                return Err(ValidationError::InvalidLimits(format!("{} must be > 0", key)));
            }
        }
        Ok(())
    }
}
