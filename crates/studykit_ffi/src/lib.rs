//! Host-facing bindings for StudyKit core.

pub mod api;
