#![allow(dead_code)]

use dicom_core::value::PrimitiveValue;
use dicom_core::{DataElement, VR};
use dicom_dictionary_std::tags;
use dicom_object::{FileMetaTableBuilder, InMemDicomObject};
use std::path::Path;

const SECONDARY_CAPTURE: &str = "1.2.840.10008.5.1.4.1.1.7";

fn base_object(rows: u16, cols: u16, samples_per_pixel: u16, bits: u16) -> InMemDicomObject {
    let mut obj = InMemDicomObject::new_empty();
    obj.put(DataElement::new(
        tags::SOP_CLASS_UID,
        VR::UI,
        PrimitiveValue::from(SECONDARY_CAPTURE),
    ));
    obj.put(DataElement::new(
        tags::SOP_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from("2.25.42"),
    ));
    obj.put(DataElement::new(
        tags::PHOTOMETRIC_INTERPRETATION,
        VR::CS,
        PrimitiveValue::from(if samples_per_pixel == 3 { "RGB" } else { "MONOCHROME2" }),
    ));
    for (tag, value) in [
        (tags::ROWS, rows),
        (tags::COLUMNS, cols),
        (tags::SAMPLES_PER_PIXEL, samples_per_pixel),
        (tags::BITS_ALLOCATED, bits),
        (tags::BITS_STORED, bits),
        (tags::HIGH_BIT, bits - 1),
        (tags::PIXEL_REPRESENTATION, 0),
    ] {
        obj.put(DataElement::new(tag, VR::US, PrimitiveValue::from(value)));
    }
    if samples_per_pixel > 1 {
        obj.put(DataElement::new(
            tags::PLANAR_CONFIGURATION,
            VR::US,
            PrimitiveValue::from(0u16),
        ));
    }
    obj
}

fn write(obj: InMemDicomObject, path: &Path) {
    obj.with_meta(
        FileMetaTableBuilder::new()
            .transfer_syntax("1.2.840.10008.1.2.1")
            .media_storage_sop_class_uid(SECONDARY_CAPTURE)
            .media_storage_sop_instance_uid("2.25.42"),
    )
    .unwrap()
    .write_to_file(path)
    .unwrap();
}

/// 8-bit 灰階，像素值為 (row + col) % 200
pub fn write_gray8(path: &Path, rows: u16, cols: u16) {
    let pixels: Vec<u8> = (0..rows as usize)
        .flat_map(|r| (0..cols as usize).map(move |c| ((r + c) % 200) as u8))
        .collect();
    let mut obj = base_object(rows, cols, 1, 8);
    obj.put(DataElement::new(
        tags::PIXEL_DATA,
        VR::OB,
        PrimitiveValue::U8(pixels.into()),
    ));
    write(obj, path);
}

/// 16-bit 灰階，值域超過 255
pub fn write_gray16(path: &Path, rows: u16, cols: u16) {
    let pixels: Vec<u16> = (0..rows as usize * cols as usize)
        .map(|i| (i * 7 % 4096) as u16)
        .collect();
    let mut obj = base_object(rows, cols, 1, 16);
    obj.put(DataElement::new(
        tags::PIXEL_DATA,
        VR::OW,
        PrimitiveValue::U16(pixels.into()),
    ));
    write(obj, path);
}

/// 多 frame 影像，燒字時會被略過
pub fn write_multi_frame(path: &Path, rows: u16, cols: u16, frames: u32) {
    let mut obj = base_object(rows, cols, 1, 8);
    obj.put(DataElement::new(
        tags::NUMBER_OF_FRAMES,
        VR::IS,
        PrimitiveValue::from(frames.to_string()),
    ));
    let len = rows as usize * cols as usize * frames as usize;
    obj.put(DataElement::new(
        tags::PIXEL_DATA,
        VR::OB,
        PrimitiveValue::U8(vec![3u8; len].into()),
    ));
    write(obj, path);
}

/// 沒有 PixelData 的物件 (例如結構化報告)
pub fn write_without_pixels(path: &Path) {
    write(base_object(4, 4, 1, 8), path);
}
