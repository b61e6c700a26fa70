//! quicknote-core - shared types for the quicknote server and client
//!
//! This crate provides:
//! - Validated domain values (email, OTP code, note content, profile fields)
//! - The JSON wire format spoken between client and server
//! - The `~/.quicknote/config.toml` configuration layer

pub mod config;
pub mod error;
pub mod models;
pub mod wire;

pub use config::{ClientConfig, QuicknoteConfig, ServerSection, SupabaseSection};
pub use error::ConfigError;
pub use models::{
    DateOfBirth, EmailAddress, NoteContent, OtpCode, ProfileName, ValidationError,
};
pub use wire::{AuthUser, ErrorBody, Note, Profile};
