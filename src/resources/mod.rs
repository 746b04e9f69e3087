//! ECS resources made available to systems.
//!
//! Overview
//! - `asset` – JSON persistence of animation frames and key times
//! - `chromaconfig` – INI configuration for the player
//! - `device` – 2D device kinds and LED matrix geometry
//! - `effects` – effect management service and its in-process implementation
//! - `palette` – Chroma color presets and frame builders
//! - `worldtime` – host clock and delta
pub mod asset;
pub mod chromaconfig;
pub mod device;
pub mod effects;
pub mod palette;
pub mod worldtime;
