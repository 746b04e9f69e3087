//! Animation completion events.
//!
//! When a [`ChromaAnimation2D`](crate::components::animation2d::ChromaAnimation2D)
//! runs past its last frame, [`update_chroma_animations`] triggers an
//! [`AnimationCompleteEvent`] for the entity. Observers can replay, unload or
//! despawn it.
//!
//! # Example
//!
//! ```ignore
//! world.add_observer(|trigger: On<AnimationCompleteEvent>| {
//!     log::info!("{:?} finished", trigger.event().entity);
//! });
//! ```
//!
//! [`update_chroma_animations`]: crate::systems::animation2d::update_chroma_animations

use bevy_ecs::prelude::*;

/// Event emitted when an animation finishes playing.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct AnimationCompleteEvent {
    /// The entity whose animation completed.
    pub entity: Entity,
}
