//! 8-bit normalization and layout classification of decoded pixel buffers.

use ndarray::ArrayD;

/// 可以燒字的兩種像素排列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// `[rows, cols]`
    Grayscale { rows: usize, cols: usize },
    /// `[rows, cols, 3]`，交錯排列
    Color { rows: usize, cols: usize },
}

impl PixelLayout {
    /// 依陣列形狀判斷排列方式，其他形狀一律不支援
    pub fn from_shape(shape: &[usize]) -> Option<Self> {
        match *shape {
            [rows, cols] => Some(PixelLayout::Grayscale { rows, cols }),
            [rows, cols, 3] => Some(PixelLayout::Color { rows, cols }),
            _ => None,
        }
    }

    pub fn rows(&self) -> usize {
        match *self {
            PixelLayout::Grayscale { rows, .. } | PixelLayout::Color { rows, .. } => rows,
        }
    }

    pub fn cols(&self) -> usize {
        match *self {
            PixelLayout::Grayscale { cols, .. } | PixelLayout::Color { cols, .. } => cols,
        }
    }

    pub fn samples_per_pixel(&self) -> usize {
        match self {
            PixelLayout::Grayscale { .. } => 1,
            PixelLayout::Color { .. } => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub pixels: ArrayD<u8>,
    /// 是否以 min/max 線性縮放過
    pub rescaled: bool,
}

/// 轉成 8-bit：最大值超過 255 時以觀察到的 min/max 線性縮放，否則直接截成一個位元組
pub fn normalize_to_u8(pixels: &ArrayD<i32>) -> Normalized {
    let max = pixels.iter().copied().max();
    let min = pixels.iter().copied().min();

    match (min, max) {
        (Some(min), Some(max)) if max > 255 => {
            let range = (max as i64 - min as i64) as f64;
            let scaled = pixels.mapv(|v| {
                if range == 0.0 {
                    0
                } else {
                    ((v as i64 - min as i64) as f64 / range * 255.0) as u8
                }
            });
            Normalized {
                pixels: scaled,
                rescaled: true,
            }
        }
        // 與無號位元組轉型相同：只保留最低 8 位元
        _ => Normalized {
            pixels: pixels.mapv(|v| v as u8),
            rescaled: false,
        },
    }
}
