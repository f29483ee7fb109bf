use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self { r: 0, g: 0, b: 0 }
    }
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(value: u8) -> Self {
        Self {
            r: value,
            g: value,
            b: value,
        }
    }

    /// Component scaled to the 0.0..=1.0 range used by PDF content streams.
    pub fn r_f(&self) -> f32 {
        self.r as f32 / 255.0
    }

    pub fn g_f(&self) -> f32 {
        self.g as f32 / 255.0
    }

    pub fn b_f(&self) -> f32 {
        self.b as f32 / 255.0
    }
}
