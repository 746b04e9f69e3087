//! Chroma animation systems.
//!
//! - [`update_chroma_animations`] advances every playing
//!   [`ChromaAnimation2D`] against [`WorldTime`] and triggers an
//!   [`AnimationCompleteEvent`] when one finishes.
//! - [`load_chroma_animation`], [`play_chroma_animation`] and
//!   [`play_chroma_animation_with_on_complete`] run the lifecycle operations
//!   for one entity using the shared [`ChromaEffects`] resource.
//! - [`unload_chroma_animations`] releases every loaded animation, typically
//!   right before the host shuts down.
//!
//! # Animation Flow
//!
//! 1. Spawn an entity with a [`ChromaAnimation2D`]
//! 2. Call [`load_chroma_animation`] to upload its frames
//! 3. Call [`play_chroma_animation`] to start it at the current world time
//! 4. Each host tick: [`update_world_time`](crate::systems::time::update_world_time)
//!    then run the schedule containing [`update_chroma_animations`]
//! 5. Observe [`AnimationCompleteEvent`] to replay or unload

use bevy_ecs::prelude::*;
use log::info;

use crate::components::animation2d::{AnimationError, ChromaAnimation2D};
use crate::events::animation::AnimationCompleteEvent;
use crate::resources::effects::ChromaEffects;
use crate::resources::worldtime::WorldTime;

/// Advance animation playback to the current world time.
///
/// Contract
/// - Reads [`WorldTime::elapsed`] as the current time.
/// - Activates effects through [`ChromaEffects`].
/// - Skips animations that are not playing.
/// - Triggers [`AnimationCompleteEvent`] for animations finishing this tick.
pub fn update_chroma_animations(
    world_time: Res<WorldTime>,
    mut effects: ResMut<ChromaEffects>,
    mut query: Query<(Entity, &mut ChromaAnimation2D)>,
    mut commands: Commands,
) {
    let now = world_time.elapsed;
    for (entity, mut animation) in query.iter_mut() {
        if animation.start_time().is_none() {
            continue;
        }
        if animation.tick(effects.service_mut(), now) {
            commands.trigger(AnimationCompleteEvent { entity });
        }
    }
}

/// Upload the frames of `entity`'s animation.
pub fn load_chroma_animation(world: &mut World, entity: Entity) -> Result<(), AnimationError> {
    world.resource_scope(|world, mut effects: Mut<ChromaEffects>| {
        let Some(mut animation) = world.get_mut::<ChromaAnimation2D>(entity) else {
            return Err(AnimationError::MissingAnimation(entity));
        };
        animation.load(effects.service_mut())
    })
}

/// Start `entity`'s animation at the current world time.
pub fn play_chroma_animation(world: &mut World, entity: Entity) -> Result<(), AnimationError> {
    let now = world.resource::<WorldTime>().elapsed;
    world.resource_scope(|world, mut effects: Mut<ChromaEffects>| {
        let Some(mut animation) = world.get_mut::<ChromaAnimation2D>(entity) else {
            return Err(AnimationError::MissingAnimation(entity));
        };
        animation.play(effects.service_mut(), now)
    })
}

/// Start `entity`'s animation and fire `on_complete` when it finishes.
pub fn play_chroma_animation_with_on_complete<F>(
    world: &mut World,
    entity: Entity,
    on_complete: F,
) -> Result<(), AnimationError>
where
    F: FnOnce(&ChromaAnimation2D) + Send + Sync + 'static,
{
    let now = world.resource::<WorldTime>().elapsed;
    world.resource_scope(|world, mut effects: Mut<ChromaEffects>| {
        let Some(mut animation) = world.get_mut::<ChromaAnimation2D>(entity) else {
            return Err(AnimationError::MissingAnimation(entity));
        };
        animation.play_with_on_complete(effects.service_mut(), now, on_complete)
    })
}

/// Unload every loaded animation. Returns how many were unloaded.
pub fn unload_chroma_animations(world: &mut World) -> usize {
    world.resource_scope(|world, mut effects: Mut<ChromaEffects>| {
        let mut unloaded = 0;
        let mut query = world.query::<&mut ChromaAnimation2D>();
        for mut animation in query.iter_mut(world) {
            if animation.is_loaded() && animation.unload(effects.service_mut()).is_ok() {
                unloaded += 1;
            }
        }
        if unloaded > 0 {
            info!("Unloaded {} Chroma animations", unloaded);
        }
        unloaded
    })
}
