//! Player configuration resource.
//!
//! Settings are loaded from an INI file. Defaults keep the player usable when
//! the file is missing or incomplete.
//!
//! # Configuration File Format
//!
//! ```ini
//! [app]
//! title = Chroma Player
//! description = Frame-sequenced Chroma animation player
//! author_name = Chroma Developer
//! author_contact = www.razerzone.com
//!
//! [playback]
//! device = keyboard
//! target_fps = 60
//! loops = 1
//! frame_time = 0.1
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;

use crate::resources::device::ChromaDevice2D;

const DEFAULT_TITLE: &str = "Chroma Player";
const DEFAULT_DESCRIPTION: &str = "Frame-sequenced Chroma animation player";
const DEFAULT_AUTHOR_NAME: &str = "Chroma Developer";
const DEFAULT_AUTHOR_CONTACT: &str = "www.razerzone.com";
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_LOOPS: u32 = 1;
const DEFAULT_FRAME_TIME: f32 = 0.1;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

#[derive(Resource, Debug, Clone)]
pub struct ChromaConfig {
    /// Application title reported to the lighting service.
    pub title: String,
    pub description: String,
    pub author_name: String,
    pub author_contact: String,
    /// Device targeted by generated animations.
    pub device: ChromaDevice2D,
    /// Host update rate in ticks per second.
    pub target_fps: u32,
    /// How many times the demo plays the animation.
    pub loops: u32,
    /// Seconds each generated frame stays on screen.
    pub frame_time: f32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ChromaConfig {
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            author_name: DEFAULT_AUTHOR_NAME.to_string(),
            author_contact: DEFAULT_AUTHOR_CONTACT.to_string(),
            device: ChromaDevice2D::default(),
            target_fps: DEFAULT_TARGET_FPS,
            loops: DEFAULT_LOOPS,
            frame_time: DEFAULT_FRAME_TIME,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current values. Invalid values are
    /// logged and ignored.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    fn apply(&mut self, config: &Ini) {
        // [app] section
        if let Some(title) = config.get("app", "title") {
            self.title = title;
        }
        if let Some(description) = config.get("app", "description") {
            self.description = description;
        }
        if let Some(name) = config.get("app", "author_name") {
            self.author_name = name;
        }
        if let Some(contact) = config.get("app", "author_contact") {
            self.author_contact = contact;
        }

        // [playback] section
        if let Some(device) = config.get("playback", "device") {
            match device.parse() {
                Ok(device) => self.device = device,
                Err(e) => warn!("{}, keeping {}", e, self.device),
            }
        }
        if let Some(fps) = config.getuint("playback", "target_fps").ok().flatten() {
            if fps > 0 {
                self.target_fps = fps as u32;
            }
        }
        if let Some(loops) = config.getuint("playback", "loops").ok().flatten() {
            self.loops = loops as u32;
        }
        if let Some(frame_time) = config.getfloat("playback", "frame_time").ok().flatten() {
            if frame_time > 0.0 {
                self.frame_time = frame_time as f32;
            }
        }

        info!(
            "Loaded config: '{}' device={}, fps={}, loops={}, frame_time={}",
            self.title, self.device, self.target_fps, self.loops, self.frame_time
        );
    }

    /// Save configuration to the INI file.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [app] section
        config.set("app", "title", Some(self.title.clone()));
        config.set("app", "description", Some(self.description.clone()));
        config.set("app", "author_name", Some(self.author_name.clone()));
        config.set("app", "author_contact", Some(self.author_contact.clone()));

        // [playback] section
        config.set("playback", "device", Some(self.device.to_string()));
        config.set("playback", "target_fps", Some(self.target_fps.to_string()));
        config.set("playback", "loops", Some(self.loops.to_string()));
        config.set("playback", "frame_time", Some(self.frame_time.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Seconds between host updates.
    pub fn tick_interval(&self) -> f32 {
        1.0 / self.target_fps.max(1) as f32
    }
}
