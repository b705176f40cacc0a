//! Domain model for feedback forms, accounts and the profile wizard.
//!
//! # Responsibility
//! - Define canonical data structures used by builder, preview and backend.
//! - Keep validation next to the data it protects.
//!
//! # Invariants
//! - Every field and form is identified by a stable UUID.
//! - A form owns its fields exclusively.

pub mod field;
pub mod form;
pub mod profile;
pub mod record;
pub mod user;
