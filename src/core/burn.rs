use crate::domain::model::{BurnOutcome, SkipReason};
use crate::imaging::{
    decode_pixel_data, font_size_for_height, normalize_to_u8, replace_pixel_data, Canvas,
    PixelLayout, TextRenderer,
};
use crate::utils::error::{Result, TestkitError};
use dicom_object::{open_file, DefaultDicomObject, InMemDicomObject};
use tempfile::NamedTempFile;
use std::path::{Path, PathBuf};

pub const DEFAULT_TEXT: &str = "this is a text string";

#[derive(Debug, Clone)]
pub struct BurnOptions {
    pub text: String,
    /// 文字左上角相對於影像左上角的位移
    pub origin: (i32, i32),
    pub min_font_size: u32,
    /// 字高 = 影像高度 / divisor
    pub font_size_divisor: u32,
    /// 有設定時另存燒字後影像的 PNG 預覽
    pub preview_dir: Option<PathBuf>,
}

impl Default for BurnOptions {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT.to_string(),
            origin: (10, 10),
            min_font_size: 20,
            font_size_divisor: 20,
            preview_dir: None,
        }
    }
}

/// 記憶體中物件的燒字結果
pub enum ObjectOutcome {
    Burned { canvas: Canvas, rescaled: bool },
    Skipped(SkipReason),
}

pub struct TextBurner {
    renderer: TextRenderer,
    options: BurnOptions,
}

impl TextBurner {
    pub fn new(renderer: TextRenderer, options: BurnOptions) -> Self {
        Self { renderer, options }
    }

    pub fn options(&self) -> &BurnOptions {
        &self.options
    }

    /// 在物件上燒字並取代 PixelData；略過時物件不會被修改
    pub fn burn_object(&self, obj: &mut InMemDicomObject) -> Result<ObjectOutcome> {
        let Some((module, pixels)) = decode_pixel_data(obj)? else {
            return Ok(ObjectOutcome::Skipped(SkipReason::NoPixelData));
        };

        let layout = match PixelLayout::from_shape(pixels.shape()) {
            Some(layout) if module.number_of_frames == 1 => layout,
            _ => {
                return Ok(ObjectOutcome::Skipped(SkipReason::UnsupportedShape(
                    pixels.shape().to_vec(),
                )))
            }
        };

        let normalized = normalize_to_u8(&pixels);
        let mut canvas = Canvas::from_pixels(&normalized.pixels, layout)?;

        let font_size = font_size_for_height(
            canvas.height(),
            self.options.min_font_size,
            self.options.font_size_divisor,
        );
        tracing::debug!(
            "Drawing {:?} at {:?}, font size {}, {:?}",
            self.options.text,
            self.options.origin,
            font_size,
            layout
        );
        self.renderer
            .draw(&mut canvas, &self.options.text, self.options.origin, font_size);

        replace_pixel_data(obj, layout, canvas.as_raw().to_vec(), normalized.rescaled);

        Ok(ObjectOutcome::Burned {
            canvas,
            rescaled: normalized.rescaled,
        })
    }

    /// 讀檔、燒字、寫回；`output` 為 `None` 時覆寫原檔
    pub fn burn_file(&self, input: &Path, output: Option<&Path>) -> Result<BurnOutcome> {
        let mut obj = open_file(input).map_err(|source| TestkitError::DicomReadError {
            path: input.to_path_buf(),
            source,
        })?;

        let (canvas, rescaled) = match self.burn_object(&mut obj)? {
            ObjectOutcome::Burned { canvas, rescaled } => (canvas, rescaled),
            ObjectOutcome::Skipped(reason) => return Ok(BurnOutcome::Skipped { reason }),
        };

        let output = output.unwrap_or(input);

        // 預覽先寫，失敗時原檔還沒被動過
        if let Some(preview_dir) = &self.options.preview_dir {
            std::fs::create_dir_all(preview_dir)?;
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "preview".to_string());
            let preview_path = preview_dir.join(format!("{}.png", stem));
            canvas.save_preview(&preview_path)?;
            tracing::debug!("Preview written to {}", preview_path.display());
        }

        write_replacing(&obj, output)?;

        if rescaled {
            tracing::debug!("{} was rescaled to 8 bits", input.display());
        }

        Ok(BurnOutcome::Burned {
            output: output.to_path_buf(),
            rescaled,
        })
    }
}

/// 先寫到同目錄的暫存檔再改名，寫入失敗時目標檔保持原樣
fn write_replacing(obj: &DefaultDicomObject, output: &Path) -> Result<()> {
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = NamedTempFile::new_in(parent)?;
    obj.write_to_file(temp.path())
        .map_err(|source| TestkitError::DicomWriteError {
            path: output.to_path_buf(),
            source,
        })?;

    if let Ok(metadata) = std::fs::metadata(output) {
        std::fs::set_permissions(temp.path(), metadata.permissions())?;
    }

    temp.persist(output).map_err(|e| TestkitError::IoError(e.error))?;
    Ok(())
}
