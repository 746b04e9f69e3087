//! Event types used by the player.
//!
//! Submodules:
//! - [`animation`] – completion notifications emitted by the animation system
pub mod animation;
