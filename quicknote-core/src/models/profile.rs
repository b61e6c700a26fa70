//! Profile field validation (display name and date of birth)

use chrono::NaiveDate;

use super::ValidationError;

const MAX_NAME_LEN: usize = 100;

/// Validated display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileName(String);

impl ProfileName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Required { field: "name" });
        }

        if s.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "name",
                max: MAX_NAME_LEN,
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

/// Date of birth as an ISO calendar date (`YYYY-MM-DD`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateOfBirth(NaiveDate);

impl DateOfBirth {
    /// Parse a date of birth from form input.
    ///
    /// # Example
    /// ```
    /// use quicknote_core::DateOfBirth;
    ///
    /// assert!(DateOfBirth::parse("1990-04-01").is_ok());
    /// assert!(DateOfBirth::parse("01/04/1990").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Required { field: "dob" });
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "dob",
                reason: "must be a date in YYYY-MM-DD format",
            })
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed() {
        assert_eq!(ProfileName::new("  Ada  ").unwrap().as_str(), "Ada");
    }

    #[test]
    fn name_rejects_blank_and_long() {
        assert_eq!(
            ProfileName::new("").unwrap_err(),
            ValidationError::Required { field: "name" }
        );
        assert!(matches!(
            ProfileName::new(&"x".repeat(101)).unwrap_err(),
            ValidationError::TooLong { max: 100, .. }
        ));
    }

    #[test]
    fn dob_parses_iso_dates() {
        let dob = DateOfBirth::parse("2000-02-29").unwrap();
        assert_eq!(dob.date(), NaiveDate::from_ymd_opt(2000, 2, 29).unwrap());
    }

    #[test]
    fn dob_rejects_impossible_dates() {
        assert!(matches!(
            DateOfBirth::parse("2001-02-29").unwrap_err(),
            ValidationError::InvalidFormat { field: "dob", .. }
        ));
    }
}
