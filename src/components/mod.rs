//! ECS components for entities.
//!
//! Submodules overview:
//! - [`animation2d`] – frame store and playback state machine for 2D Chroma animations
//! - [`curve`] – keyframe timeline holding the per-frame key times

pub mod animation2d;
pub mod curve;
