//! Frame-sequenced Chroma animation for 2D devices.
//!
//! A [`ChromaAnimation2D`] owns a list of color grids (one per frame) sized to
//! its device, and plays them back by uploading each grid as a device effect
//! and switching the active effect as time passes.
//!
//! # Lifecycle
//!
//! 1. [`load`](ChromaAnimation2D::load) uploads every frame through an
//!    [`EffectService`] and keeps the returned handles.
//! 2. [`play`](ChromaAnimation2D::play) records the start time and shows the
//!    first frame.
//! 3. [`tick`](ChromaAnimation2D::tick) is called by the host once per update
//!    with the current time. When the elapsed time passes the current frame's
//!    key time, the next frame is shown. Past the last frame playback stops
//!    and the completion callback (if any) fires once.
//! 4. [`unload`](ChromaAnimation2D::unload) removes the uploaded effects.
//!
//! Calling an operation in the wrong state logs an error and returns an
//! [`AnimationError`] without touching the animation. Failures reported by the
//! effect service are logged and skipped.
//!
//! # Related
//!
//! - [`crate::components::curve::AnimationCurve`] – per-frame key times
//! - [`crate::systems::animation2d::update_chroma_animations`] – ECS driver
//! - [`crate::resources::effects::EffectService`] – effect backend

use std::fmt;
use std::sync::Arc;

use bevy_ecs::prelude::{Component, Entity};
use log::{debug, error, info};

use crate::components::curve::AnimationCurve;
use crate::resources::device::{ChromaDevice2D, DeviceGeometry, StandardGeometry};
use crate::resources::effects::{EffectResponseId, EffectService};

/// One frame: `max_row` rows of `max_column` packed BGR colors.
pub type ColorFrame2D = Vec<Vec<i32>>;

/// Callback fired once when playback runs past the last frame.
pub type OnComplete2D = Box<dyn FnOnce(&ChromaAnimation2D) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// No effects uploaded.
    Unloaded,
    /// Effects uploaded, not advancing.
    LoadedIdle,
    /// Effects uploaded and the timeline is running.
    Playing,
}

/// Operation called in a state that does not allow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationError {
    AlreadyLoaded,
    NotLoaded,
    /// The entity has no [`ChromaAnimation2D`].
    MissingAnimation(Entity),
}

impl fmt::Display for AnimationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimationError::AlreadyLoaded => f.write_str("Animation has already been loaded!"),
            AnimationError::NotLoaded => f.write_str("Animation has not been loaded!"),
            AnimationError::MissingAnimation(entity) => {
                write!(f, "Entity {:?} has no Chroma animation!", entity)
            }
        }
    }
}

impl std::error::Error for AnimationError {}

#[derive(Component)]
pub struct ChromaAnimation2D {
    /// Per-frame key times.
    pub curve: AnimationCurve,
    device: ChromaDevice2D,
    geometry: Arc<dyn DeviceGeometry>,
    frames: Vec<ColorFrame2D>,
    on_complete: Option<OnComplete2D>,
    loaded: bool,
    playing: bool,
    start_time: Option<f64>,
    current_frame: usize,
    effects: Vec<Option<EffectResponseId>>,
}

impl fmt::Debug for ChromaAnimation2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromaAnimation2D")
            .field("device", &self.device)
            .field("frames", &self.frames.len())
            .field("curve", &self.curve)
            .field("state", &self.state())
            .field("current_frame", &self.current_frame)
            .field("start_time", &self.start_time)
            .field("effects", &self.effects)
            .field("has_on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl Default for ChromaAnimation2D {
    fn default() -> Self {
        Self::new(ChromaDevice2D::default())
    }
}

impl ChromaAnimation2D {
    /// Create an unloaded animation with no stored frames.
    ///
    /// The first read of the frames fills in one blank frame.
    pub fn new(device: ChromaDevice2D) -> Self {
        Self {
            curve: AnimationCurve::new(),
            device,
            geometry: Arc::new(StandardGeometry),
            frames: Vec::new(),
            on_complete: None,
            loaded: false,
            playing: false,
            start_time: None,
            current_frame: 0,
            effects: Vec::new(),
        }
    }

    /// Use a custom matrix size table.
    pub fn with_geometry(mut self, geometry: Arc<dyn DeviceGeometry>) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_frames(mut self, frames: &[ColorFrame2D]) -> Self {
        self.set_frames(frames);
        self
    }

    pub fn with_curve(mut self, curve: AnimationCurve) -> Self {
        self.curve = curve;
        self
    }

    pub fn device(&self) -> ChromaDevice2D {
        self.device
    }

    /// Switch the target device. Stored frames that no longer fit are
    /// replaced on the next read.
    pub fn set_device(&mut self, device: ChromaDevice2D) {
        self.device = device;
    }

    pub fn max_row(&self) -> usize {
        self.geometry.max_row(self.device)
    }

    pub fn max_column(&self) -> usize {
        self.geometry.max_column(self.device)
    }

    fn frames_fit_device(&self) -> bool {
        let max_row = self.max_row();
        let max_column = self.max_column();
        !self.frames.is_empty()
            && self.frames.iter().all(|frame| {
                frame.len() == max_row && frame.iter().all(|row| row.len() == max_column)
            })
    }

    /// Copy of the stored frames.
    ///
    /// Stored data that is empty or does not match the device matrix is
    /// replaced by a single blank frame first.
    pub fn get_frames(&mut self) -> Vec<ColorFrame2D> {
        if !self.frames_fit_device() {
            self.clear_frames();
        }
        self.frames.clone()
    }

    /// Replace the stored frames with a copy of `frames`.
    ///
    /// Sizes are checked on the next read, not here.
    pub fn set_frames(&mut self, frames: &[ColorFrame2D]) {
        self.frames = frames.to_vec();
    }

    /// Reset to one frame with every color off.
    pub fn clear_frames(&mut self) {
        let row = vec![0; self.max_column()];
        self.frames = vec![vec![row; self.max_row()]];
    }

    /// Number of frames after validation.
    pub fn frame_count(&mut self) -> usize {
        if !self.frames_fit_device() {
            self.clear_frames();
        }
        self.frames.len()
    }

    /// Bring the curve's key count in line with the frame count.
    pub fn refresh_curve(&mut self) {
        let frame_count = self.frame_count();
        self.curve.refresh(frame_count);
    }

    pub fn state(&self) -> PlayerState {
        if !self.loaded {
            PlayerState::Unloaded
        } else if self.playing {
            PlayerState::Playing
        } else {
            PlayerState::LoadedIdle
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Time playback started, if it is running.
    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    /// Uploaded handles, one per frame in upload order.
    pub fn effects(&self) -> &[Option<EffectResponseId>] {
        &self.effects
    }

    pub fn has_on_complete(&self) -> bool {
        self.on_complete.is_some()
    }

    /// Upload every frame as a device effect.
    ///
    /// A failed upload is logged and its handle is kept anyway so handles stay
    /// aligned with frames.
    pub fn load(&mut self, effects: &mut dyn EffectService) -> Result<(), AnimationError> {
        if self.loaded {
            error!("{}", AnimationError::AlreadyLoaded);
            return Err(AnimationError::AlreadyLoaded);
        }

        let frames = self.get_frames();
        debug!("Create {} {} frames.", frames.len(), self.device);
        for frame in &frames {
            let effect = effects.create_custom_2d_effect(self.device, frame);
            if !effect.as_ref().is_some_and(|e| e.is_success()) {
                error!("Failed to create effect!");
            }
            self.effects.push(effect);
        }

        self.loaded = true;
        Ok(())
    }

    /// Release every uploaded effect. Running playback is stopped.
    ///
    /// The connection is checked first: when the service reports it as lost,
    /// the handles are dropped without calling it and the animation ends up
    /// unloaded, even if it was never loaded. Only a connected service reports
    /// [`AnimationError::NotLoaded`].
    pub fn unload(&mut self, effects: &mut dyn EffectService) -> Result<(), AnimationError> {
        if !effects.is_connected() {
            debug!("Connection lost, dropping {} effects", self.effects.len());
            self.reset_playback();
            self.effects.clear();
            self.loaded = false;
            return Ok(());
        }

        if !self.loaded {
            error!("Animation has already been unloaded!");
            return Err(AnimationError::NotLoaded);
        }

        self.reset_playback();

        for effect in self.effects.drain(..) {
            let Some(effect) = effect else {
                error!("Failed to delete effect! Missing handle.");
                continue;
            };
            match effects.remove_effect(&effect.id) {
                Some(result) if result.is_success() => debug!("Removed effect {}", result.id),
                Some(result) => error!(
                    "Failed to delete effect {}! Result: {}",
                    result.id, result.result
                ),
                None => error!("Failed to delete effect {}!", effect.id),
            }
        }

        self.loaded = false;
        Ok(())
    }

    /// Start playback from the first frame at time `now`.
    ///
    /// Drops any completion callback registered by an earlier
    /// [`play_with_on_complete`](Self::play_with_on_complete).
    pub fn play(&mut self, effects: &mut dyn EffectService, now: f64) -> Result<(), AnimationError> {
        debug!("play");
        if !self.loaded {
            error!("Play {}", AnimationError::NotLoaded);
            return Err(AnimationError::NotLoaded);
        }
        self.on_complete = None;
        self.start(effects, now);
        Ok(())
    }

    /// Start playback and fire `on_complete` once it runs past the last frame.
    pub fn play_with_on_complete<F>(
        &mut self,
        effects: &mut dyn EffectService,
        now: f64,
        on_complete: F,
    ) -> Result<(), AnimationError>
    where
        F: FnOnce(&ChromaAnimation2D) + Send + Sync + 'static,
    {
        debug!("play_with_on_complete");
        if !self.loaded {
            error!("{}", AnimationError::NotLoaded);
            return Err(AnimationError::NotLoaded);
        }
        self.on_complete = Some(Box::new(on_complete));
        self.start(effects, now);
        Ok(())
    }

    fn start(&mut self, effects: &mut dyn EffectService, now: f64) {
        self.start_time = Some(now);
        self.playing = true;
        self.current_frame = 0;
        if self.current_frame < self.effects.len() {
            self.activate(effects, self.current_frame);
        }
    }

    /// Halt playback. Uploaded effects are kept.
    pub fn stop(&mut self) {
        debug!("stop");
        self.reset_playback();
    }

    fn reset_playback(&mut self) {
        self.playing = false;
        self.start_time = None;
        self.current_frame = 0;
    }

    fn activate(&self, effects: &mut dyn EffectService, index: usize) {
        let Some(Some(effect)) = self.effects.get(index) else {
            error!("Failed to set effect! No handle for frame {}.", index);
            return;
        };
        match effects.set_effect(&effect.id) {
            Some(result) if result.is_success() => debug!("Set effect {}", result.id),
            Some(result) => error!(
                "Failed to set effect {} for frame {}! Result: {}",
                result.id, index, result.result
            ),
            None => error!("Failed to set effect {} for frame {}!", effect.id, index),
        }
    }

    /// Advance the timeline to `now`.
    ///
    /// Moves forward at most one frame per call. Returns `true` on the call
    /// that finishes playback.
    pub fn tick(&mut self, effects: &mut dyn EffectService, now: f64) -> bool {
        let Some(start_time) = self.start_time else {
            return false;
        };

        let elapsed = now - start_time;
        let frame_time = f64::from(self.curve.frame_time(self.current_frame));
        if frame_time >= elapsed {
            return false;
        }

        self.current_frame += 1;
        if self.current_frame < self.effects.len() {
            self.activate(effects, self.current_frame);
            return false;
        }

        info!("{} animation complete", self.device);
        self.reset_playback();
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(self);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::effects::LocalEffectService;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TinyGeometry;

    impl DeviceGeometry for TinyGeometry {
        fn max_row(&self, device: ChromaDevice2D) -> usize {
            match device {
                ChromaDevice2D::Keyboard => 2,
                _ => 1,
            }
        }
        fn max_column(&self, device: ChromaDevice2D) -> usize {
            match device {
                ChromaDevice2D::Keyboard => 3,
                _ => 2,
            }
        }
    }

    fn frame(fill: i32, rows: usize, columns: usize) -> ColorFrame2D {
        vec![vec![fill; columns]; rows]
    }

    fn two_frame_animation() -> ChromaAnimation2D {
        ChromaAnimation2D::new(ChromaDevice2D::Keypad)
            .with_frames(&[frame(1, 4, 5), frame(2, 4, 5)])
            .with_curve(AnimationCurve::from_times([0.5, 0.5]))
    }

    // --- Frame store ---

    #[test]
    fn test_clear_frames_for_every_device() {
        for device in ChromaDevice2D::ALL {
            let mut animation = ChromaAnimation2D::new(device);
            animation.clear_frames();
            let frames = animation.get_frames();
            let geometry = StandardGeometry;
            assert_eq!(frames.len(), 1);
            assert_eq!(frames[0].len(), geometry.max_row(device));
            assert!(
                frames[0]
                    .iter()
                    .all(|row| row.len() == geometry.max_column(device)
                        && row.iter().all(|c| *c == 0))
            );
        }
    }

    #[test]
    fn test_get_frames_heals_empty_store() {
        let mut animation = ChromaAnimation2D::new(ChromaDevice2D::Mouse);
        assert_eq!(animation.get_frames(), vec![frame(0, 9, 7)]);
    }

    #[test]
    fn test_get_frames_returns_copy_of_valid_frames() {
        let input = vec![frame(7, 4, 5), frame(9, 4, 5)];
        let mut animation = ChromaAnimation2D::new(ChromaDevice2D::Keypad);
        animation.set_frames(&input);

        let mut output = animation.get_frames();
        assert_eq!(output, input);

        output[0][0][0] = 42;
        assert_eq!(animation.get_frames(), input);
    }

    #[test]
    fn test_get_frames_replaces_mismatched_rows() {
        let mut animation = ChromaAnimation2D::new(ChromaDevice2D::Keypad);
        animation.set_frames(&[frame(7, 3, 5)]);
        assert_eq!(animation.get_frames(), vec![frame(0, 4, 5)]);
    }

    #[test]
    fn test_get_frames_replaces_mismatched_columns() {
        let mut animation = ChromaAnimation2D::new(ChromaDevice2D::Keypad);
        let mut bad = frame(7, 4, 5);
        bad[2].push(1);
        animation.set_frames(&[frame(7, 4, 5), bad]);
        assert_eq!(animation.get_frames(), vec![frame(0, 4, 5)]);
    }

    #[test]
    fn test_device_switch_invalidates_frames() {
        let mut animation =
            ChromaAnimation2D::new(ChromaDevice2D::Keypad).with_frames(&[frame(3, 4, 5)]);
        animation.set_device(ChromaDevice2D::Keyboard);
        assert_eq!(animation.get_frames(), vec![frame(0, 6, 22)]);
    }

    #[test]
    fn test_set_get_round_trip_is_stable() {
        let mut animation = ChromaAnimation2D::new(ChromaDevice2D::Keyboard);
        animation.set_frames(&[frame(5, 6, 22)]);
        let first = animation.get_frames();
        animation.set_frames(&first);
        assert_eq!(animation.get_frames(), first);
    }

    #[test]
    fn test_injected_geometry_sizes_frames() {
        let mut animation = ChromaAnimation2D::new(ChromaDevice2D::Keyboard)
            .with_geometry(Arc::new(TinyGeometry));
        assert_eq!(animation.get_frames(), vec![frame(0, 2, 3)]);
        animation.set_device(ChromaDevice2D::Mouse);
        assert_eq!(animation.get_frames(), vec![frame(0, 1, 2)]);
    }

    #[test]
    fn test_refresh_curve_tracks_frame_count() {
        let mut animation = ChromaAnimation2D::new(ChromaDevice2D::Keypad)
            .with_frames(&[frame(0, 4, 5), frame(0, 4, 5), frame(0, 4, 5)]);
        animation.refresh_curve();
        assert_eq!(animation.curve.times(), vec![1.0, 2.0, 3.0]);

        animation.set_frames(&[frame(0, 4, 5)]);
        animation.curve = AnimationCurve::from_times([5.0, 5.0, 5.0]);
        animation.refresh_curve();
        assert_eq!(animation.curve.times(), vec![5.0]);
    }

    // --- State machine ---

    #[test]
    fn test_load_uploads_each_frame_in_order() {
        let mut service = LocalEffectService::new();
        let mut animation = two_frame_animation();
        assert_eq!(animation.state(), PlayerState::Unloaded);

        assert_eq!(animation.load(&mut service), Ok(()));
        assert_eq!(animation.state(), PlayerState::LoadedIdle);
        assert_eq!(animation.effects().len(), 2);

        let first = animation.effects()[0].clone().unwrap();
        let second = animation.effects()[1].clone().unwrap();
        assert_eq!(service.effect(&first.id).unwrap().frame, frame(1, 4, 5));
        assert_eq!(service.effect(&second.id).unwrap().frame, frame(2, 4, 5));
    }

    #[test]
    fn test_load_twice_is_rejected() {
        let mut service = LocalEffectService::new();
        let mut animation = two_frame_animation();
        animation.load(&mut service).unwrap();
        assert_eq!(
            animation.load(&mut service),
            Err(AnimationError::AlreadyLoaded)
        );
        assert_eq!(animation.effects().len(), 2);
        assert_eq!(service.create_calls(), 2);
    }

    #[test]
    fn test_failed_create_keeps_handle_slot() {
        let mut service = LocalEffectService::new();
        service.fail_create_at(0);
        let mut animation = two_frame_animation();
        animation.load(&mut service).unwrap();
        assert!(animation.is_loaded());
        assert_eq!(animation.effects().len(), 2);
        assert!(!animation.effects()[0].as_ref().unwrap().is_success());
        assert!(animation.effects()[1].as_ref().unwrap().is_success());
    }

    #[test]
    fn test_missing_handles_are_kept_when_service_returns_nothing() {
        let mut service = LocalEffectService::new();
        service.set_connected(false);
        let mut animation = two_frame_animation();
        animation.load(&mut service).unwrap();
        assert_eq!(animation.effects().len(), 2);
        assert!(animation.effects().iter().all(Option::is_none));
    }

    #[test]
    fn test_load_while_playing_is_rejected() {
        let mut service = LocalEffectService::new();
        let mut animation = two_frame_animation();
        animation.load(&mut service).unwrap();
        animation.play(&mut service, 1.0).unwrap();
        animation.tick(&mut service, 1.6);
        assert_eq!(animation.current_frame(), 1);

        assert_eq!(
            animation.load(&mut service),
            Err(AnimationError::AlreadyLoaded)
        );
        assert_eq!(animation.state(), PlayerState::Playing);
        assert_eq!(animation.current_frame(), 1);
        assert_eq!(animation.start_time(), Some(1.0));
        assert_eq!(animation.effects().len(), 2);
        assert_eq!(service.create_calls(), 2);
    }

    #[test]
    fn test_playback_skips_failed_handle() {
        let mut service = LocalEffectService::new();
        service.fail_create_at(0);
        let mut animation = two_frame_animation();
        animation.load(&mut service).unwrap();
        let good = animation.effects()[1].clone().unwrap();

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        animation
            .play_with_on_complete(&mut service, 0.0, move |_| {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        assert_eq!(animation.state(), PlayerState::Playing);

        assert!(!animation.tick(&mut service, 0.6));
        assert_eq!(animation.current_frame(), 1);
        assert!(animation.tick(&mut service, 1.2));

        assert_eq!(animation.state(), PlayerState::LoadedIdle);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(service.activations(), vec![good.id]);
    }

    #[test]
    fn test_playback_runs_with_missing_handles() {
        let mut service = LocalEffectService::new();
        service.set_connected(false);
        let mut animation = two_frame_animation();
        animation.load(&mut service).unwrap();
        service.set_connected(true);

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        animation
            .play_with_on_complete(&mut service, 0.0, move |_| {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        assert!(!animation.tick(&mut service, 0.6));
        assert!(animation.tick(&mut service, 1.2));

        assert_eq!(animation.state(), PlayerState::LoadedIdle);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(service.activations().is_empty());
    }

    #[test]
    fn test_play_when_unloaded_is_rejected() {
        let mut service = LocalEffectService::new();
        let mut animation = two_frame_animation();
        assert_eq!(
            animation.play(&mut service, 0.0),
            Err(AnimationError::NotLoaded)
        );
        assert_eq!(
            animation.play_with_on_complete(&mut service, 0.0, |_| {}),
            Err(AnimationError::NotLoaded)
        );
        assert_eq!(animation.state(), PlayerState::Unloaded);
        assert!(!animation.has_on_complete());
        assert!(service.activations().is_empty());
    }

    #[test]
    fn test_play_shows_first_frame() {
        let mut service = LocalEffectService::new();
        let mut animation = two_frame_animation();
        animation.load(&mut service).unwrap();
        animation.play(&mut service, 3.0).unwrap();

        let first = animation.effects()[0].clone().unwrap();
        assert_eq!(animation.state(), PlayerState::Playing);
        assert_eq!(animation.start_time(), Some(3.0));
        assert_eq!(animation.current_frame(), 0);
        assert_eq!(service.active_effect(), Some(first.id));
    }

    #[test]
    fn test_tick_follows_key_times_and_completes_once() {
        let mut service = LocalEffectService::new();
        let mut animation = two_frame_animation();
        animation.load(&mut service).unwrap();

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        animation
            .play_with_on_complete(&mut service, 10.0, move |_| {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        assert!(!animation.tick(&mut service, 10.4));
        assert_eq!(animation.current_frame(), 0);

        assert!(!animation.tick(&mut service, 10.6));
        assert_eq!(animation.current_frame(), 1);
        let second = animation.effects()[1].clone().unwrap();
        assert_eq!(service.active_effect(), Some(second.id));

        assert!(animation.tick(&mut service, 11.2));
        assert_eq!(animation.state(), PlayerState::LoadedIdle);
        assert_eq!(animation.current_frame(), 0);
        assert_eq!(animation.start_time(), None);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        assert!(!animation.tick(&mut service, 20.0));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_tick_advances_one_frame_per_call() {
        let mut service = LocalEffectService::new();
        let mut animation = ChromaAnimation2D::new(ChromaDevice2D::Keypad)
            .with_frames(&[frame(1, 4, 5), frame(2, 4, 5), frame(3, 4, 5)])
            .with_curve(AnimationCurve::from_times([0.1, 0.2, 0.3]));
        animation.load(&mut service).unwrap();
        animation.play(&mut service, 0.0).unwrap();

        assert!(!animation.tick(&mut service, 5.0));
        assert_eq!(animation.current_frame(), 1);
        assert!(!animation.tick(&mut service, 5.0));
        assert_eq!(animation.current_frame(), 2);
        assert!(animation.tick(&mut service, 5.0));
    }

    #[test]
    fn test_tick_uses_default_time_past_curve_end() {
        let mut service = LocalEffectService::new();
        let mut animation = two_frame_animation();
        animation.curve = AnimationCurve::new();
        animation.load(&mut service).unwrap();
        animation.play(&mut service, 0.0).unwrap();

        assert!(!animation.tick(&mut service, 0.03));
        assert_eq!(animation.current_frame(), 0);
        assert!(!animation.tick(&mut service, 0.04));
        assert_eq!(animation.current_frame(), 1);
    }

    #[test]
    fn test_completion_callback_receives_finished_animation() {
        let mut service = LocalEffectService::new();
        let mut animation = two_frame_animation();
        animation.load(&mut service).unwrap();

        let seen = Arc::new(Mutex::new(None));
        let seen_clone = seen.clone();
        animation
            .play_with_on_complete(&mut service, 0.0, move |finished| {
                *seen_clone.lock().unwrap() = Some((finished.state(), finished.device()));
            })
            .unwrap();
        animation.tick(&mut service, 0.6);
        animation.tick(&mut service, 0.7);

        assert_eq!(
            *seen.lock().unwrap(),
            Some((PlayerState::LoadedIdle, ChromaDevice2D::Keypad))
        );
    }

    #[test]
    fn test_plain_play_drops_earlier_callback() {
        let mut service = LocalEffectService::new();
        let mut animation = two_frame_animation();
        animation.load(&mut service).unwrap();

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        animation
            .play_with_on_complete(&mut service, 0.0, move |_| {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        animation.tick(&mut service, 0.6);

        animation.play(&mut service, 1.0).unwrap();
        assert!(!animation.has_on_complete());
        animation.tick(&mut service, 1.6);
        assert!(animation.tick(&mut service, 2.2));

        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_stop_keeps_effects_loaded() {
        let mut service = LocalEffectService::new();
        let mut animation = two_frame_animation();
        animation.load(&mut service).unwrap();
        animation.play(&mut service, 0.0).unwrap();
        animation.tick(&mut service, 0.6);

        animation.stop();
        assert_eq!(animation.state(), PlayerState::LoadedIdle);
        assert_eq!(animation.current_frame(), 0);
        assert_eq!(animation.start_time(), None);
        assert_eq!(animation.effects().len(), 2);
        assert!(!animation.tick(&mut service, 100.0));
    }

    #[test]
    fn test_unload_removes_every_effect() {
        let mut service = LocalEffectService::new();
        let mut animation = two_frame_animation();
        animation.load(&mut service).unwrap();
        let ids: Vec<String> = animation
            .effects()
            .iter()
            .map(|e| e.clone().unwrap().id)
            .collect();

        assert_eq!(animation.unload(&mut service), Ok(()));
        assert_eq!(animation.state(), PlayerState::Unloaded);
        assert!(animation.effects().is_empty());
        assert_eq!(service.removals(), ids);
        assert_eq!(service.effect_count(), 0);
    }

    #[test]
    fn test_unload_continues_past_failed_removal() {
        let mut service = LocalEffectService::new();
        service.fail_create_at(0);
        let mut animation = two_frame_animation();
        animation.load(&mut service).unwrap();

        assert_eq!(animation.unload(&mut service), Ok(()));
        assert_eq!(service.removals().len(), 1);
        assert_eq!(service.effect_count(), 0);
        assert!(!animation.is_loaded());
    }

    #[test]
    fn test_unload_when_disconnected_skips_removal() {
        let mut service = LocalEffectService::new();
        let mut animation = two_frame_animation();
        animation.load(&mut service).unwrap();
        service.set_connected(false);

        assert_eq!(animation.unload(&mut service), Ok(()));
        assert_eq!(animation.state(), PlayerState::Unloaded);
        assert!(animation.effects().is_empty());
        assert!(service.removals().is_empty());
        assert_eq!(service.effect_count(), 2);
    }

    #[test]
    fn test_unload_when_unloaded_is_rejected() {
        let mut service = LocalEffectService::new();
        let mut animation = two_frame_animation();
        assert_eq!(
            animation.unload(&mut service),
            Err(AnimationError::NotLoaded)
        );
        assert!(service.removals().is_empty());
    }

    #[test]
    fn test_unload_when_unloaded_and_disconnected_is_silent() {
        let mut service = LocalEffectService::new();
        service.set_connected(false);
        let mut animation = two_frame_animation();
        assert_eq!(animation.unload(&mut service), Ok(()));
        assert_eq!(animation.state(), PlayerState::Unloaded);
        assert!(animation.effects().is_empty());
        assert!(service.removals().is_empty());
    }

    #[test]
    fn test_unload_stops_playback_and_allows_reload() {
        let mut service = LocalEffectService::new();
        let mut animation = two_frame_animation();
        animation.load(&mut service).unwrap();
        animation.play(&mut service, 0.0).unwrap();
        animation.unload(&mut service).unwrap();
        assert!(!animation.is_playing());

        animation.load(&mut service).unwrap();
        assert_eq!(animation.effects().len(), 2);
        assert_eq!(service.effect_count(), 2);
    }
}
