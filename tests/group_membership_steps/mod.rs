//! Step definitions for group membership scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
