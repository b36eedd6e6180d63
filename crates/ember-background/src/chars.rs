//! Character constants for the ember canvas.

/// Ember glyphs from smallest to largest radius.
pub const EMBER_CHARS: &[char] = &['·', '•', '●'];

/// Spark glyphs from freshest to most faded.
pub const SPARK_CHARS: &[char] = &['✦', '✧', '·'];

/// Pick an ember glyph for a radius in particle units.
pub fn ember_char(radius: f32) -> char {
    if radius < 1.0 {
        EMBER_CHARS[0]
    } else if radius < 1.8 {
        EMBER_CHARS[1]
    } else {
        EMBER_CHARS[2]
    }
}

/// Pick a spark glyph for a remaining scale in 0.0-1.0.
pub fn spark_char(scale: f32) -> char {
    if scale > 0.66 {
        SPARK_CHARS[0]
    } else if scale > 0.33 {
        SPARK_CHARS[1]
    } else {
        SPARK_CHARS[2]
    }
}
