//! Keyframe curve used as the per-frame timeline of an animation.
//!
//! Each [`Keyframe`] maps one animation frame to the time (in seconds since
//! playback started) after which the player moves on to the next frame. The
//! `value` half of the key is not read by the player; it is kept for editing
//! tools that draw the curve.

use serde::{Deserialize, Serialize};

/// Frame time used when a key is missing or not positive (~30 fps).
pub const DEFAULT_FRAME_TIME: f32 = 0.033;
/// Time of the first key synthesized for an empty curve.
pub const FIRST_KEY_TIME: f32 = 1.0;
/// Spacing between synthesized keys.
pub const KEY_TIME_STEP: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

impl Keyframe {
    pub fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Ordered list of keyframes, one per animation frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationCurve {
    keys: Vec<Keyframe>,
}

impl AnimationCurve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a curve from key times, each paired with a zero value.
    pub fn from_times(times: impl IntoIterator<Item = f32>) -> Self {
        Self {
            keys: times.into_iter().map(|t| Keyframe::new(t, 0.0)).collect(),
        }
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn add_key(&mut self, time: f32, value: f32) {
        self.keys.push(Keyframe::new(time, value));
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Key times in order.
    pub fn times(&self) -> Vec<f32> {
        self.keys.iter().map(|k| k.time).collect()
    }

    /// Time configured for frame `index`.
    ///
    /// Missing or non-positive keys fall back to [`DEFAULT_FRAME_TIME`].
    pub fn frame_time(&self, index: usize) -> f32 {
        match self.keys.get(index) {
            Some(key) if key.time > 0.0 => key.time,
            _ => DEFAULT_FRAME_TIME,
        }
    }

    /// Reconcile the key count with `frame_count`.
    ///
    /// Non-positive or NaN times are clamped to [`DEFAULT_FRAME_TIME`], surplus keys
    /// are dropped from the end, and missing keys are appended one
    /// [`KEY_TIME_STEP`] after the previous one (starting at
    /// [`FIRST_KEY_TIME`] for an empty curve). The curve is then rebuilt with
    /// zero values.
    pub fn refresh(&mut self, frame_count: usize) {
        let mut times: Vec<f32> = self
            .keys
            .iter()
            .map(|k| {
                // NaN fails the comparison and takes the default too.
                if k.time > 0.0 {
                    k.time
                } else {
                    DEFAULT_FRAME_TIME
                }
            })
            .collect();

        times.truncate(frame_count);

        while times.len() < frame_count {
            let next = match times.last() {
                Some(last) => last + KEY_TIME_STEP,
                None => FIRST_KEY_TIME,
            };
            times.push(next);
        }

        self.clear();
        for time in times {
            self.add_key(time, 0.0);
        }
    }
}
