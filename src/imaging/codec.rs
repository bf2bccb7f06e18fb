//! Decoding native (uncompressed) DICOM pixel data into sample arrays and
//! writing an 8-bit buffer back into the image pixel module.

use crate::imaging::normalize::PixelLayout;
use crate::utils::error::{Result, TestkitError};
use dicom_core::header::HasLength;
use dicom_core::value::{DicomValueType, PrimitiveValue};
use dicom_core::{DataElement, Tag, VR};
use dicom_dictionary_std::tags;
use dicom_object::InMemDicomObject;
use ndarray::{ArrayD, IxDyn};

/// 燒字需要的 Image Pixel Module 屬性
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelModule {
    pub rows: usize,
    pub cols: usize,
    pub samples_per_pixel: usize,
    pub bits_allocated: u16,
    pub bits_stored: u16,
    pub pixel_representation: u16,
    pub planar_configuration: u16,
    pub number_of_frames: usize,
    pub photometric_interpretation: String,
}

impl PixelModule {
    pub fn from_object(obj: &InMemDicomObject) -> Result<Self> {
        let rows = to_u16(required_int(obj, tags::ROWS, "Rows")?, "Rows")?;
        let cols = to_u16(required_int(obj, tags::COLUMNS, "Columns")?, "Columns")?;
        let bits_allocated = to_u16(
            required_int(obj, tags::BITS_ALLOCATED, "BitsAllocated")?,
            "BitsAllocated",
        )?;
        let samples_per_pixel =
            optional_int(obj, tags::SAMPLES_PER_PIXEL, "SamplesPerPixel")?.unwrap_or(1);
        let bits_stored = match optional_int(obj, tags::BITS_STORED, "BitsStored")? {
            Some(value) => to_u16(value, "BitsStored")?,
            None => bits_allocated,
        };
        let pixel_representation = to_u16(
            optional_int(obj, tags::PIXEL_REPRESENTATION, "PixelRepresentation")?.unwrap_or(0),
            "PixelRepresentation",
        )?;
        let planar_configuration = to_u16(
            optional_int(obj, tags::PLANAR_CONFIGURATION, "PlanarConfiguration")?.unwrap_or(0),
            "PlanarConfiguration",
        )?;
        let number_of_frames =
            optional_int(obj, tags::NUMBER_OF_FRAMES, "NumberOfFrames")?.unwrap_or(1);

        let photometric_interpretation = match obj.get(tags::PHOTOMETRIC_INTERPRETATION) {
            Some(elem) => elem
                .to_str()
                .map_err(|e| attribute_error("PhotometricInterpretation", e))?
                .trim()
                .to_string(),
            None => String::new(),
        };

        if bits_stored == 0 || bits_stored > bits_allocated {
            return Err(TestkitError::PixelAttributeError {
                attribute: "BitsStored".to_string(),
                reason: format!(
                    "{} is not within 1..={} (BitsAllocated)",
                    bits_stored, bits_allocated
                ),
            });
        }

        Ok(Self {
            rows: rows as usize,
            cols: cols as usize,
            samples_per_pixel: samples_per_pixel as usize,
            bits_allocated,
            bits_stored,
            pixel_representation,
            planar_configuration,
            number_of_frames: number_of_frames.max(1) as usize,
            photometric_interpretation,
        })
    }

    /// 解碼後陣列的形狀，單張影像時省略 frame 維度，單一 sample 時省略 sample 維度
    pub fn shape(&self) -> Vec<usize> {
        let mut shape = Vec::with_capacity(4);
        if self.number_of_frames > 1 {
            shape.push(self.number_of_frames);
        }
        shape.push(self.rows);
        shape.push(self.cols);
        if self.samples_per_pixel > 1 {
            shape.push(self.samples_per_pixel);
        }
        shape
    }

    pub fn sample_count(&self) -> usize {
        self.number_of_frames * self.rows * self.cols * self.samples_per_pixel
    }

    fn is_signed(&self) -> bool {
        self.pixel_representation == 1
    }
}

fn attribute_error(attribute: &str, reason: impl ToString) -> TestkitError {
    TestkitError::PixelAttributeError {
        attribute: attribute.to_string(),
        reason: reason.to_string(),
    }
}

fn optional_int(obj: &InMemDicomObject, tag: Tag, name: &str) -> Result<Option<u32>> {
    match obj.get(tag) {
        Some(elem) if elem.is_empty() => Ok(None),
        Some(elem) => elem
            .to_int::<u32>()
            .map(Some)
            .map_err(|e| attribute_error(name, e)),
        None => Ok(None),
    }
}

fn required_int(obj: &InMemDicomObject, tag: Tag, name: &str) -> Result<u32> {
    optional_int(obj, tag, name)?.ok_or_else(|| attribute_error(name, "attribute is missing"))
}

/// US 屬性超出範圍時視為錯誤
fn to_u16(value: u32, name: &str) -> Result<u16> {
    u16::try_from(value).map_err(|_| attribute_error(name, format!("{} is out of range", value)))
}

/// 把 PixelData 的內容攤平成位元組，OW 以 little endian 展開
fn raw_bytes(value: &PrimitiveValue) -> Result<Vec<u8>> {
    match value {
        PrimitiveValue::U8(bytes) => Ok(bytes.to_vec()),
        PrimitiveValue::U16(words) => Ok(words.iter().flat_map(|w| w.to_le_bytes()).collect()),
        PrimitiveValue::I16(words) => Ok(words.iter().flat_map(|w| w.to_le_bytes()).collect()),
        PrimitiveValue::Empty => Ok(Vec::new()),
        other => Err(TestkitError::UnsupportedPixelEncoding {
            reason: format!("pixel data stored as {:?}", other.value_type()),
        }),
    }
}

fn sign_extend(raw: u32, bits_stored: u16) -> i32 {
    let shift = 32 - bits_stored as u32;
    ((raw << shift) as i32) >> shift
}

/// 讀出 PixelData；沒有 PixelData 時回傳 `None`
pub fn decode_pixel_data(obj: &InMemDicomObject) -> Result<Option<(PixelModule, ArrayD<i32>)>> {
    let Some(element) = obj.get(tags::PIXEL_DATA) else {
        return Ok(None);
    };

    let Some(value) = element.value().primitive() else {
        return Err(TestkitError::UnsupportedPixelEncoding {
            reason: "encapsulated (compressed) pixel data".to_string(),
        });
    };

    let module = PixelModule::from_object(obj)?;
    let bytes = raw_bytes(value)?;
    let count = module.sample_count();

    let mut samples: Vec<i32> = match module.bits_allocated {
        8 => {
            if bytes.len() < count {
                return Err(truncated(bytes.len(), count));
            }
            bytes[..count]
                .iter()
                .map(|&b| {
                    if module.is_signed() {
                        sign_extend(b as u32, module.bits_stored)
                    } else {
                        b as i32
                    }
                })
                .collect()
        }
        16 => {
            if bytes.len() < count * 2 {
                return Err(truncated(bytes.len(), count * 2));
            }
            bytes[..count * 2]
                .chunks_exact(2)
                .map(|pair| {
                    let word = u16::from_le_bytes([pair[0], pair[1]]);
                    if module.is_signed() {
                        sign_extend(word as u32, module.bits_stored)
                    } else {
                        word as i32
                    }
                })
                .collect()
        }
        other => {
            return Err(TestkitError::UnsupportedPixelEncoding {
                reason: format!("{} bits allocated per sample", other),
            })
        }
    };

    if module.samples_per_pixel > 1 && module.planar_configuration == 1 {
        samples = interleave_planes(&samples, &module);
    }

    let pixels = ArrayD::from_shape_vec(IxDyn(&module.shape()), samples).map_err(|e| {
        TestkitError::ImageBufferError {
            message: e.to_string(),
        }
    })?;

    Ok(Some((module, pixels)))
}

fn truncated(actual: usize, expected: usize) -> TestkitError {
    TestkitError::PixelAttributeError {
        attribute: "PixelData".to_string(),
        reason: format!("expected {} bytes, found {}", expected, actual),
    }
}

/// RRR…GGG…BBB 轉成 RGBRGB…，逐 frame 處理
fn interleave_planes(samples: &[i32], module: &PixelModule) -> Vec<i32> {
    let spp = module.samples_per_pixel;
    let pixels_per_frame = module.rows * module.cols;
    let frame_len = pixels_per_frame * spp;
    let mut out = vec![0; samples.len()];

    for (frame_index, frame) in samples.chunks_exact(frame_len).enumerate() {
        let base = frame_index * frame_len;
        for sample in 0..spp {
            for pixel in 0..pixels_per_frame {
                out[base + pixel * spp + sample] = frame[sample * pixels_per_frame + pixel];
            }
        }
    }

    out
}

/// 只和像素值範圍相關的屬性，重新縮放後就失效
const VALUE_RANGE_TAGS: &[Tag] = &[
    tags::WINDOW_CENTER,
    tags::WINDOW_WIDTH,
    tags::RESCALE_INTERCEPT,
    tags::RESCALE_SLOPE,
];

/// VR 依 PixelRepresentation 而定 (US/SS) 的屬性
const REPRESENTATION_TAGS: &[Tag] = &[
    tags::SMALLEST_IMAGE_PIXEL_VALUE,
    tags::LARGEST_IMAGE_PIXEL_VALUE,
    tags::PIXEL_PADDING_VALUE,
];

fn put_us(obj: &mut InMemDicomObject, tag: Tag, value: u16) {
    obj.put(DataElement::new(tag, VR::US, PrimitiveValue::from(value)));
}

/// 以 8-bit 無號、交錯排列的緩衝區取代 PixelData，並更新描述它的屬性
pub fn replace_pixel_data(
    obj: &mut InMemDicomObject,
    layout: PixelLayout,
    mut pixels: Vec<u8>,
    rescaled: bool,
) {
    // OB 長度必須是偶數
    if pixels.len() % 2 == 1 {
        pixels.push(0);
    }

    obj.put(DataElement::new(
        tags::PIXEL_DATA,
        VR::OB,
        PrimitiveValue::U8(pixels.into()),
    ));

    put_us(obj, tags::SAMPLES_PER_PIXEL, layout.samples_per_pixel() as u16);
    put_us(obj, tags::BITS_ALLOCATED, 8);
    put_us(obj, tags::BITS_STORED, 8);
    put_us(obj, tags::HIGH_BIT, 7);
    put_us(obj, tags::PIXEL_REPRESENTATION, 0);

    if let PixelLayout::Color { .. } = layout {
        put_us(obj, tags::PLANAR_CONFIGURATION, 0);
    }

    for tag in REPRESENTATION_TAGS {
        obj.remove_element(*tag);
    }

    if rescaled {
        for tag in VALUE_RANGE_TAGS {
            obj.remove_element(*tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{gray16_object, image_object, ImageSpec};

    #[test]
    fn test_missing_pixel_data_decodes_to_none() {
        let mut obj = gray16_object(2, 2, &[1, 2, 3, 4]);
        obj.remove_element(tags::PIXEL_DATA);
        assert!(decode_pixel_data(&obj).unwrap().is_none());
    }

    #[test]
    fn test_decode_unsigned_16_bit_grayscale() {
        let obj = gray16_object(2, 3, &[0, 100, 4095, 7, 8, 9]);
        let (module, pixels) = decode_pixel_data(&obj).unwrap().unwrap();

        assert_eq!(module.rows, 2);
        assert_eq!(module.cols, 3);
        assert_eq!(pixels.shape(), &[2, 3]);
        assert_eq!(pixels[[0, 2]], 4095);
        assert_eq!(pixels[[1, 0]], 7);
    }

    #[test]
    fn test_decode_signed_12_bit_sign_extends() {
        let spec = ImageSpec {
            rows: 1,
            cols: 2,
            bits_allocated: 16,
            bits_stored: 12,
            pixel_representation: 1,
            ..ImageSpec::default()
        };
        // 0x0FFF 在 12 位元有號表示為 -1
        let obj = image_object(&spec, PrimitiveValue::U16(vec![0x0FFF, 0x0400].into()));
        let (_, pixels) = decode_pixel_data(&obj).unwrap().unwrap();

        assert_eq!(pixels[[0, 0]], -1);
        assert_eq!(pixels[[0, 1]], 1024);
    }

    #[test]
    fn test_decode_planar_color_is_interleaved() {
        let spec = ImageSpec {
            rows: 1,
            cols: 2,
            samples_per_pixel: 3,
            bits_allocated: 8,
            bits_stored: 8,
            planar_configuration: 1,
            photometric: "RGB",
            ..ImageSpec::default()
        };
        let planes = vec![10u8, 11, 20, 21, 30, 31];
        let obj = image_object(&spec, PrimitiveValue::U8(planes.into()));
        let (_, pixels) = decode_pixel_data(&obj).unwrap().unwrap();

        assert_eq!(pixels.shape(), &[1, 2, 3]);
        let values: Vec<i32> = pixels.iter().copied().collect();
        assert_eq!(values, vec![10, 20, 30, 11, 21, 31]);
    }

    #[test]
    fn test_decode_multi_frame_keeps_frame_axis() {
        let spec = ImageSpec {
            rows: 2,
            cols: 2,
            frames: 3,
            bits_allocated: 8,
            bits_stored: 8,
            ..ImageSpec::default()
        };
        let obj = image_object(&spec, PrimitiveValue::U8(vec![1u8; 12].into()));
        let (module, pixels) = decode_pixel_data(&obj).unwrap().unwrap();

        assert_eq!(module.number_of_frames, 3);
        assert_eq!(pixels.shape(), &[3, 2, 2]);
    }

    #[test]
    fn test_decode_eight_bit_data_stored_as_words() {
        let spec = ImageSpec {
            rows: 1,
            cols: 4,
            bits_allocated: 8,
            bits_stored: 8,
            ..ImageSpec::default()
        };
        // 隱式 VR 時 8-bit 資料可能被讀成 OW
        let words = vec![u16::from_le_bytes([1, 2]), u16::from_le_bytes([3, 4])];
        let obj = image_object(&spec, PrimitiveValue::U16(words.into()));
        let (_, pixels) = decode_pixel_data(&obj).unwrap().unwrap();

        let values: Vec<i32> = pixels.iter().copied().collect();
        assert_eq!(values, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_truncated_pixel_data_is_an_error() {
        let obj = gray16_object(4, 4, &[1, 2, 3]);
        let err = decode_pixel_data(&obj).unwrap_err();
        assert!(matches!(err, TestkitError::PixelAttributeError { .. }));
    }

    #[test]
    fn test_unsupported_bit_depth_is_an_error() {
        let spec = ImageSpec {
            rows: 1,
            cols: 1,
            bits_allocated: 32,
            bits_stored: 32,
            ..ImageSpec::default()
        };
        let obj = image_object(&spec, PrimitiveValue::U8(vec![0u8; 4].into()));
        let err = decode_pixel_data(&obj).unwrap_err();
        assert!(matches!(err, TestkitError::UnsupportedPixelEncoding { .. }));
    }

    #[test]
    fn test_replace_pixel_data_updates_module() {
        let mut obj = gray16_object(1, 3, &[0, 2000, 4000]);
        obj.put(DataElement::new(
            tags::WINDOW_CENTER,
            VR::DS,
            PrimitiveValue::from("2000"),
        ));
        obj.put(DataElement::new(
            tags::SMALLEST_IMAGE_PIXEL_VALUE,
            VR::US,
            PrimitiveValue::from(0u16),
        ));

        let layout = PixelLayout::Grayscale { rows: 1, cols: 3 };
        replace_pixel_data(&mut obj, layout, vec![0, 127, 255], true);

        let module = PixelModule::from_object(&obj).unwrap();
        assert_eq!(module.bits_allocated, 8);
        assert_eq!(module.bits_stored, 8);
        assert_eq!(module.pixel_representation, 0);
        assert!(obj.get(tags::WINDOW_CENTER).is_none());
        assert!(obj.get(tags::SMALLEST_IMAGE_PIXEL_VALUE).is_none());

        // 奇數長度補一個位元組
        let data = obj.get(tags::PIXEL_DATA).unwrap().to_bytes().unwrap();
        assert_eq!(data.as_ref(), &[0, 127, 255, 0]);

        let (_, pixels) = decode_pixel_data(&obj).unwrap().unwrap();
        let values: Vec<i32> = pixels.iter().copied().collect();
        assert_eq!(values, vec![0, 127, 255]);
    }
}
