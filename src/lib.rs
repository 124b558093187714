//! Everbloom library crate — re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the actual simulation entry point.
//! This library crate exposes the same modules so that `tests/` integration
//! tests can import game types, systems, and resources without needing a
//! window or GPU.

pub mod shared;
pub mod clock;
pub mod economy;
pub mod garden;
pub mod quiz;
pub mod story;
pub mod save;
pub mod data;
