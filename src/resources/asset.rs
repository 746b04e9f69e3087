//! Persisted animation data.
//!
//! An [`AnimationAsset2D`] is the on-disk form of a
//! [`ChromaAnimation2D`]: the target device, the color frames and the key
//! times. Runtime state (uploaded effects, playback position) is never saved.
//!
//! # File Format
//!
//! ```json
//! {
//!   "device": "keyboard",
//!   "frames": [[[255, 0, ...], ...]],
//!   "curve": { "keys": [{ "time": 0.1, "value": 0.0 }] }
//! }
//! ```

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::components::animation2d::{ChromaAnimation2D, ColorFrame2D};
use crate::components::curve::AnimationCurve;
use crate::resources::device::ChromaDevice2D;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationAsset2D {
    pub device: ChromaDevice2D,
    #[serde(default)]
    pub frames: Vec<ColorFrame2D>,
    #[serde(default)]
    pub curve: AnimationCurve,
}

impl AnimationAsset2D {
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse animation: {}", e))
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize animation: {}", e))
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read animation file {:?}: {}", path, e))?;
        let asset = Self::from_json(&json)?;
        info!(
            "Loaded {} animation with {} frames from {:?}",
            asset.device,
            asset.frames.len(),
            path
        );
        Ok(asset)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let path = path.as_ref();
        let json = self.to_json()?;
        fs::write(path, json)
            .map_err(|e| format!("Failed to write animation file {:?}: {}", path, e))?;
        info!("Saved animation to {:?}", path);
        Ok(())
    }
}

impl ChromaAnimation2D {
    /// Build an unloaded animation from persisted data.
    pub fn from_asset(asset: &AnimationAsset2D) -> Self {
        ChromaAnimation2D::new(asset.device)
            .with_frames(&asset.frames)
            .with_curve(asset.curve.clone())
    }

    /// Snapshot the persisted part of this animation.
    pub fn to_asset(&mut self) -> AnimationAsset2D {
        AnimationAsset2D {
            device: self.device(),
            frames: self.get_frames(),
            curve: self.curve.clone(),
        }
    }
}
