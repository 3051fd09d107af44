//! Block type → RGBA colour.

/// Linear RGBA, each channel in 0.0..=1.0.
pub type Rgba = [f32; 4];

const GREY: Rgba = [0.5, 0.5, 0.5, 1.0];
const GREEN: Rgba = [0.0, 1.0, 0.0, 1.0];
const BROWN: Rgba = [0.6, 0.3, 0.0, 1.0];
const BLACK: Rgba = [0.0, 0.0, 0.0, 1.0];
const BLUE: Rgba = [0.0, 0.0, 1.0, 1.0];
const ORANGE: Rgba = [1.0, 0.5, 0.0, 1.0];
const SAND: Rgba = [1.0, 1.0, 0.0, 1.0];
const GRAVEL: Rgba = [0.8, 0.8, 0.8, 1.0];
const WHITE: Rgba = [1.0, 1.0, 1.0, 1.0];

/// Shown for any code without an entry, so unknown blocks stand out.
pub const UNKNOWN: Rgba = [1.0, 0.0, 1.0, 1.0];

pub fn block_color(block_type_code: u32) -> Rgba {
    match block_type_code {
        1 | 4 => GREY,     // stone, cobblestone
        2 | 18 => GREEN,   // grass, leaves
        3 => BROWN,        // dirt
        7 => BLACK,        // bedrock
        8 | 9 => BLUE,     // water
        10 | 11 => ORANGE, // lava
        12 => SAND,
        13 => GRAVEL,
        35 => WHITE, // wool
        _ => UNKNOWN,
    }
}
