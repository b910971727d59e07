use std::sync::{Arc, Mutex};

use crate::shared::bounding_box::BoundingBox;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const GREEN: Color = Color::rgb(0x00, 0xff, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    pub size: f32,
}

/// A 2-D drawing target layered over the video.
///
/// Coordinates are surface pixels with the origin at the top left.
/// Resizing discards everything drawn so far.
pub trait OverlaySurface: Send {
    fn size(&self) -> (u32, u32);
    fn resize(&mut self, width: u32, height: u32);
    fn clear(&mut self);
    fn stroke_rect(&mut self, rect: &BoundingBox, style: &StrokeStyle);
    /// Draws `text` with its baseline starting at `(x, y)`.
    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle);
}

/// Surface shared between the render loop and whoever stops the session.
pub type SharedSurface = Arc<Mutex<dyn OverlaySurface>>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("#00ff00", Some(Color::GREEN))]
    #[case("00FF00", Some(Color::GREEN))]
    #[case("#123abc", Some(Color::rgb(0x12, 0x3a, 0xbc)))]
    #[case("#0f0", None)]
    #[case("#gg0000", None)]
    #[case("", None)]
    fn test_from_hex(#[case] input: &str, #[case] expected: Option<Color>) {
        assert_eq!(Color::from_hex(input), expected);
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Color::GREEN.to_hex(), "#00ff00");
    }
}
