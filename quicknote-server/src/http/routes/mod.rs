//! Route handlers organized by resource

pub mod health;
pub mod auth;
pub mod notes;
pub mod profile;
