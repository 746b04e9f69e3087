//! Chroma Player library.
//!
//! Frame-sequenced Razer Chroma animations for 2D devices, driven by a host
//! tick. This module exposes the ECS components, resources, systems, and
//! events for use in integration tests and as a reusable library.

pub mod components;
pub mod events;
pub mod resources;
pub mod systems;
