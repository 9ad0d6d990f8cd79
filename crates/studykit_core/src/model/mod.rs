//! Typed entities stored in feature slices.
//!
//! # Responsibility
//! - Define the records each slice persists.
//! - Declare temporal fields explicitly, so decoding never guesses.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID.
//! - Every date field round-trips through `codec::iso8601`.

pub mod attendance;
pub mod note;
pub mod task;
