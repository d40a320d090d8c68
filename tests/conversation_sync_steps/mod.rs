//! Step definitions for conversation synchronisation scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
