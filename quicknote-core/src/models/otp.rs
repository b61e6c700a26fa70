//! One-time passcode validation

use super::ValidationError;

/// Identity providers issue 6-10 digit codes depending on project settings
const MIN_OTP_LEN: usize = 6;
const MAX_OTP_LEN: usize = 10;

/// Validated OTP code (digits only)
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Create a new OTP code from user input.
    ///
    /// # Rules
    /// - Surrounding whitespace is trimmed
    /// - 6 to 10 ASCII digits
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Required { field: "otp" });
        }

        if s.len() > MAX_OTP_LEN {
            return Err(ValidationError::TooLong {
                field: "otp",
                max: MAX_OTP_LEN,
            });
        }

        if s.len() < MIN_OTP_LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidFormat {
                field: "otp",
                reason: "must be 6 to 10 digits",
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Codes are credentials; keep them out of logs.
impl std::fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OtpCode(******)")
    }
}
