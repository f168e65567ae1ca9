//! Student rows and validated student input

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validation::require_id;
use super::{PersonName, ValidationError};

/// Maximum length for free-text contact fields
const MAX_CONTACT_LEN: usize = 256;

/// Loose email shape check: something@something.tld
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex")
});

/// Student record from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub student_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub college_id: Option<i64>,
    pub funnel_id: Option<i64>,
    pub hourly_fee: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated student fields, shared by create and full-row update.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentParams {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub college_id: Option<i64>,
    pub funnel_id: Option<i64>,
    pub hourly_fee: Option<f64>,
    pub notes: Option<String>,
}

/// Unvalidated student fields as they arrive from a client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub college_id: Option<i64>,
    pub funnel_id: Option<i64>,
    pub hourly_fee: Option<f64>,
    pub notes: Option<String>,
}

impl TryFrom<StudentInput> for StudentParams {
    type Error = ValidationError;

    fn try_from(input: StudentInput) -> Result<Self, Self::Error> {
        let first_name = input
            .first_name
            .ok_or(ValidationError::Missing { field: "first_name" })?;
        let last_name = input
            .last_name
            .ok_or(ValidationError::Missing { field: "last_name" })?;

        let email = optional_text("email", input.email)?;
        if let Some(email) = &email {
            if !EMAIL_RE.is_match(email) {
                return Err(ValidationError::InvalidFormat {
                    field: "email",
                    reason: "must look like name@domain.tld",
                });
            }
        }

        if let Some(fee) = input.hourly_fee {
            if !fee.is_finite() || fee < 0.0 {
                return Err(ValidationError::InvalidFormat {
                    field: "hourly_fee",
                    reason: "must be a non-negative number",
                });
            }
        }

        Ok(Self {
            first_name: PersonName::new("first_name", &first_name)?,
            last_name: PersonName::new("last_name", &last_name)?,
            email,
            phone_number: optional_text("phone_number", input.phone_number)?,
            address: optional_text("address", input.address)?,
            college_id: input
                .college_id
                .map(|id| require_id("college_id", id))
                .transpose()?,
            funnel_id: input
                .funnel_id
                .map(|id| require_id("funnel_id", id))
                .transpose()?,
            hourly_fee: input.hourly_fee,
            notes: input.notes,
        })
    }
}

/// Validate an optional text field; blank becomes `None`, anything else is kept as given.
fn optional_text(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<String>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_CONTACT_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_CONTACT_LEN,
        });
    }
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> StudentInput {
        StudentInput {
            first_name: Some("Dana".into()),
            last_name: Some("Levi".into()),
            email: Some("dana@example.com".into()),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_minimal_student() {
        let params = StudentParams::try_from(input()).unwrap();
        assert_eq!(params.first_name.as_str(), "Dana");
        assert_eq!(params.email.as_deref(), Some("dana@example.com"));
        assert_eq!(params.college_id, None);
    }

    #[test]
    fn last_name_is_required() {
        let err = StudentParams::try_from(StudentInput {
            last_name: None,
            ..input()
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::Missing { field: "last_name" });
    }

    #[test]
    fn rejects_bad_email() {
        let err = StudentParams::try_from(StudentInput {
            email: Some("not-an-email".into()),
            ..input()
        })
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { field: "email", .. }));
    }

    #[test]
    fn blank_optional_fields_become_none() {
        let params = StudentParams::try_from(StudentInput {
            email: Some("  ".into()),
            phone_number: Some("".into()),
            ..input()
        })
        .unwrap();
        assert_eq!(params.email, None);
        assert_eq!(params.phone_number, None);
    }

    #[test]
    fn optional_text_is_stored_as_given() {
        let params = StudentParams::try_from(StudentInput {
            address: Some(" 12 Herzl St ".into()),
            ..input()
        })
        .unwrap();
        assert_eq!(params.address.as_deref(), Some(" 12 Herzl St "));
    }

    #[test]
    fn contact_length_counts_characters() {
        // 256 two-byte characters are 512 bytes but still fit
        let hebrew = "ש".repeat(MAX_CONTACT_LEN);
        let params = StudentParams::try_from(StudentInput {
            address: Some(hebrew.clone()),
            ..input()
        })
        .unwrap();
        assert_eq!(params.address, Some(hebrew));

        let err = StudentParams::try_from(StudentInput {
            address: Some("ש".repeat(MAX_CONTACT_LEN + 1)),
            ..input()
        })
        .unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { field: "address", .. }));
    }

    #[test]
    fn rejects_negative_fee_and_zero_ids() {
        assert!(StudentParams::try_from(StudentInput {
            hourly_fee: Some(-1.0),
            ..input()
        })
        .is_err());

        assert!(StudentParams::try_from(StudentInput {
            college_id: Some(0),
            ..input()
        })
        .is_err());
    }
}
