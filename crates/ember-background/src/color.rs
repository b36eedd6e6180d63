//! Palette and alpha blending for the ember canvas.

use ratatui::style::Color;

/// Ember gold, `rgb(212, 163, 44)`.
pub const EMBER_GOLD: (u8, u8, u8) = (212, 163, 44);

/// Pale spark gold.
pub const SPARK_GOLD: (u8, u8, u8) = (253, 230, 138);

/// Warm near-black backdrop, `#1a1500`.
pub const BACKDROP: (u8, u8, u8) = (26, 21, 0);

/// Share of a particle's opacity that bleeds into its neighbours when glow is on.
pub const GLOW_SPREAD: f32 = 0.35;

/// Composite `fg` over `bg` with the given alpha (clamped to 0.0-1.0).
pub fn blend(fg: (u8, u8, u8), bg: (u8, u8, u8), alpha: f32) -> Color {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |f: u8, b: u8| (b as f32 + (f as f32 - b as f32) * a).round() as u8;
    Color::Rgb(mix(fg.0, bg.0), mix(fg.1, bg.1), mix(fg.2, bg.2))
}

/// The backdrop as a ratatui color.
pub fn backdrop() -> Color {
    let (r, g, b) = BACKDROP;
    Color::Rgb(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_extremes() {
        assert_eq!(blend(EMBER_GOLD, BACKDROP, 0.0), backdrop());
        assert_eq!(blend(EMBER_GOLD, BACKDROP, 1.0), Color::Rgb(212, 163, 44));
        assert_eq!(blend(EMBER_GOLD, BACKDROP, 7.0), Color::Rgb(212, 163, 44));
        assert_eq!(blend(EMBER_GOLD, BACKDROP, -1.0), backdrop());
    }

    #[test]
    fn test_blend_midpoint() {
        assert_eq!(blend((200, 100, 0), (0, 0, 100), 0.5), Color::Rgb(100, 50, 50));
    }
}
