//! Validated names for reference entities and people

use super::ValidationError;

/// Maximum length for reference entity names
const MAX_REFERENCE_NAME_LEN: usize = 128;

/// Maximum length for a first or last name
const MAX_PERSON_NAME_LEN: usize = 64;

/// Validated name of a reference entity (college, funnel, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceName(pub(crate) String);

impl ReferenceName {
    /// Create a new reference name.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    /// - Max 128 characters, not counting surrounding whitespace
    ///
    /// The name is kept exactly as given.
    ///
    /// # Example
    /// ```
    /// use tutorctl_server::models::ReferenceName;
    ///
    /// assert!(ReferenceName::new("Tel Aviv University").is_ok());
    /// assert!(ReferenceName::new("").is_err());
    /// assert!(ReferenceName::new("   ").is_err());  // whitespace only
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }

        if trimmed.chars().count() > MAX_REFERENCE_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "name",
                max: MAX_REFERENCE_NAME_LEN,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for ReferenceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validated first or last name of a student
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    pub fn new(field: &'static str, s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field });
        }

        if trimmed.chars().count() > MAX_PERSON_NAME_LEN {
            return Err(ValidationError::TooLong {
                field,
                max: MAX_PERSON_NAME_LEN,
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}
