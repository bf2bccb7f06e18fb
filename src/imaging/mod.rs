//! Pixel handling for text burning: decode, normalize, draw, re-encode.

pub mod codec;
pub mod normalize;
pub mod text;

pub use codec::{decode_pixel_data, replace_pixel_data, PixelModule};
pub use normalize::{normalize_to_u8, Normalized, PixelLayout};
pub use text::{font_size_for_height, Canvas, TextRenderer};
