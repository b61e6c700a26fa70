//! Domain values with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod email;
pub mod otp;
pub mod note;
pub mod profile;

pub use validation::ValidationError;
pub use email::EmailAddress;
pub use otp::OtpCode;
pub use note::NoteContent;
pub use profile::{DateOfBirth, ProfileName};
