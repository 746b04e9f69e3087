//! Host clock shared by the animation systems.
//!
//! `elapsed` is the timeline every [`ChromaAnimation2D`] compares its key
//! times against, so it must only grow. It is kept in `f64` so a tick's
//! delta is not rounded away after the host has been running for days.
//!
//! [`ChromaAnimation2D`]: crate::components::animation2d::ChromaAnimation2D
use bevy_ecs::prelude::Resource;

#[derive(Resource, Debug, Clone, Copy)]
pub struct WorldTime {
    /// Seconds since the clock started, scaled.
    pub elapsed: f64,
    /// Scaled length of the last update.
    pub delta: f32,
    pub time_scale: f32,
    /// Number of updates applied so far.
    pub frame_count: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            frame_count: 0,
        }
    }
}

impl WorldTime {
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }
}
