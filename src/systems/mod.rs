//! Player systems.
//!
//! Submodules overview
//! - [`animation2d`] – advance Chroma animations and run their lifecycle on entities
//! - [`time`] – update the host clock

pub mod animation2d;
pub mod time;
