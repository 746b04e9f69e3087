//! Color presets and frame builders.
//!
//! Chroma packs colors as `0x00BBGGRR`, so pure red is `255` and pure blue is
//! `16711680`.

use std::fmt;
use std::str::FromStr;

use crate::components::animation2d::ColorFrame2D;
use crate::resources::device::{ChromaDevice2D, DeviceGeometry};

pub const BLACK: i32 = 0;
pub const RED: i32 = 255;
pub const GREEN: i32 = 65280;
pub const BLUE: i32 = 16711680;
pub const ORANGE: i32 = 35071;
pub const WHITE: i32 = 16777215;

/// Pack an RGB triple into a Chroma color.
pub fn bgr(red: u8, green: u8, blue: u8) -> i32 {
    (blue as i32) << 16 | (green as i32) << 8 | red as i32
}

/// Unpack a Chroma color into `(red, green, blue)`.
pub fn rgb(color: i32) -> (u8, u8, u8) {
    (
        (color & 0xff) as u8,
        ((color >> 8) & 0xff) as u8,
        ((color >> 16) & 0xff) as u8,
    )
}

pub fn solid_frame(geometry: &dyn DeviceGeometry, device: ChromaDevice2D, color: i32) -> ColorFrame2D {
    vec![vec![color; geometry.max_column(device)]; geometry.max_row(device)]
}

pub fn blank_frame(geometry: &dyn DeviceGeometry, device: ChromaDevice2D) -> ColorFrame2D {
    solid_frame(geometry, device, BLACK)
}

/// A frame of random colors in `[0, WHITE)`.
pub fn random_frame(
    geometry: &dyn DeviceGeometry,
    device: ChromaDevice2D,
    rng: &mut fastrand::Rng,
) -> ColorFrame2D {
    (0..geometry.max_row(device))
        .map(|_| {
            (0..geometry.max_column(device))
                .map(|_| rng.i32(0..WHITE))
                .collect()
        })
        .collect()
}

/// Named presets offered by the demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Blue,
    Green,
    Red,
    Orange,
    White,
    Random,
    Clear,
}

impl Preset {
    /// Solid color for this preset. `None` for [`Preset::Random`].
    pub fn color(&self) -> Option<i32> {
        match self {
            Preset::Blue => Some(BLUE),
            Preset::Green => Some(GREEN),
            Preset::Red => Some(RED),
            Preset::Orange => Some(ORANGE),
            Preset::White => Some(WHITE),
            Preset::Clear => Some(BLACK),
            Preset::Random => None,
        }
    }

    pub fn frame(
        &self,
        geometry: &dyn DeviceGeometry,
        device: ChromaDevice2D,
        rng: &mut fastrand::Rng,
    ) -> ColorFrame2D {
        match self.color() {
            Some(color) => solid_frame(geometry, device, color),
            None => random_frame(geometry, device, rng),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Preset::Blue => "blue",
            Preset::Green => "green",
            Preset::Red => "red",
            Preset::Orange => "orange",
            Preset::White => "white",
            Preset::Random => "random",
            Preset::Clear => "clear",
        };
        f.write_str(name)
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blue" => Ok(Preset::Blue),
            "green" => Ok(Preset::Green),
            "red" => Ok(Preset::Red),
            "orange" => Ok(Preset::Orange),
            "white" => Ok(Preset::White),
            "random" | "custom" => Ok(Preset::Random),
            "clear" | "none" => Ok(Preset::Clear),
            other => Err(format!("Unknown preset: {}", other)),
        }
    }
}
