//! Chroma 2D device kinds and their LED matrix geometry.
//!
//! Every 2D Chroma surface exposes a fixed grid of LEDs addressed by
//! `(row, column)`. Animations size their frames from a [`DeviceGeometry`]
//! provider so tests and alternative hardware tables can be injected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Keyboard matrix rows.
pub const KEYBOARD_MAX_ROW: usize = 6;
/// Keyboard matrix columns.
pub const KEYBOARD_MAX_COLUMN: usize = 22;
/// Keypad matrix rows.
pub const KEYPAD_MAX_ROW: usize = 4;
/// Keypad matrix columns.
pub const KEYPAD_MAX_COLUMN: usize = 5;
/// Mouse matrix rows.
pub const MOUSE_MAX_ROW: usize = 9;
/// Mouse matrix columns.
pub const MOUSE_MAX_COLUMN: usize = 7;

/// 2D lighting surface kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChromaDevice2D {
    #[default]
    Keyboard,
    Keypad,
    Mouse,
}

impl ChromaDevice2D {
    /// All supported 2D devices.
    pub const ALL: [ChromaDevice2D; 3] = [
        ChromaDevice2D::Keyboard,
        ChromaDevice2D::Keypad,
        ChromaDevice2D::Mouse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChromaDevice2D::Keyboard => "keyboard",
            ChromaDevice2D::Keypad => "keypad",
            ChromaDevice2D::Mouse => "mouse",
        }
    }
}

impl fmt::Display for ChromaDevice2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChromaDevice2D {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyboard" => Ok(ChromaDevice2D::Keyboard),
            "keypad" => Ok(ChromaDevice2D::Keypad),
            "mouse" => Ok(ChromaDevice2D::Mouse),
            other => Err(format!("Unknown 2D device: {}", other)),
        }
    }
}

/// Resolves the LED matrix size of a device.
pub trait DeviceGeometry: Send + Sync {
    fn max_row(&self, device: ChromaDevice2D) -> usize;
    fn max_column(&self, device: ChromaDevice2D) -> usize;
}

/// Matrix sizes published by the Chroma SDK.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardGeometry;

impl DeviceGeometry for StandardGeometry {
    fn max_row(&self, device: ChromaDevice2D) -> usize {
        match device {
            ChromaDevice2D::Keyboard => KEYBOARD_MAX_ROW,
            ChromaDevice2D::Keypad => KEYPAD_MAX_ROW,
            ChromaDevice2D::Mouse => MOUSE_MAX_ROW,
        }
    }

    fn max_column(&self, device: ChromaDevice2D) -> usize {
        match device {
            ChromaDevice2D::Keyboard => KEYBOARD_MAX_COLUMN,
            ChromaDevice2D::Keypad => KEYPAD_MAX_COLUMN,
            ChromaDevice2D::Mouse => MOUSE_MAX_COLUMN,
        }
    }
}
