use serde::{Deserialize, Serialize};

/// A RGB color used for embeds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const GOLD: Self = Self::from_rgb(0xF1, 0xC4, 0x0F);
    pub const RED: Self = Self::from_rgb(0xE7, 0x4C, 0x3C);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
