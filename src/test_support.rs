//! In-memory DICOM objects for unit tests.

use dicom_core::value::PrimitiveValue;
use dicom_core::{DataElement, VR};
use dicom_dictionary_std::tags;
use dicom_object::{DefaultDicomObject, FileMetaTableBuilder, InMemDicomObject};

pub const SECONDARY_CAPTURE: &str = "1.2.840.10008.5.1.4.1.1.7";
pub const EXPLICIT_VR_LE: &str = "1.2.840.10008.1.2.1";

#[derive(Debug, Clone)]
pub struct ImageSpec {
    pub rows: u16,
    pub cols: u16,
    pub frames: u32,
    pub samples_per_pixel: u16,
    pub bits_allocated: u16,
    pub bits_stored: u16,
    pub pixel_representation: u16,
    pub planar_configuration: u16,
    pub photometric: &'static str,
}

impl Default for ImageSpec {
    fn default() -> Self {
        Self {
            rows: 1,
            cols: 1,
            frames: 1,
            samples_per_pixel: 1,
            bits_allocated: 16,
            bits_stored: 16,
            pixel_representation: 0,
            planar_configuration: 0,
            photometric: "MONOCHROME2",
        }
    }
}

fn us(obj: &mut InMemDicomObject, tag: dicom_core::Tag, value: u16) {
    obj.put(DataElement::new(tag, VR::US, PrimitiveValue::from(value)));
}

pub fn image_object(spec: &ImageSpec, pixel_data: PrimitiveValue) -> InMemDicomObject {
    let mut obj = InMemDicomObject::new_empty();
    obj.put(DataElement::new(
        tags::SOP_CLASS_UID,
        VR::UI,
        PrimitiveValue::from(SECONDARY_CAPTURE),
    ));
    obj.put(DataElement::new(
        tags::SOP_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from("2.25.1234"),
    ));
    obj.put(DataElement::new(
        tags::PHOTOMETRIC_INTERPRETATION,
        VR::CS,
        PrimitiveValue::from(spec.photometric),
    ));
    us(&mut obj, tags::ROWS, spec.rows);
    us(&mut obj, tags::COLUMNS, spec.cols);
    us(&mut obj, tags::SAMPLES_PER_PIXEL, spec.samples_per_pixel);
    us(&mut obj, tags::BITS_ALLOCATED, spec.bits_allocated);
    us(&mut obj, tags::BITS_STORED, spec.bits_stored);
    us(&mut obj, tags::HIGH_BIT, spec.bits_stored.saturating_sub(1));
    us(&mut obj, tags::PIXEL_REPRESENTATION, spec.pixel_representation);
    if spec.samples_per_pixel > 1 {
        us(&mut obj, tags::PLANAR_CONFIGURATION, spec.planar_configuration);
    }
    if spec.frames > 1 {
        obj.put(DataElement::new(
            tags::NUMBER_OF_FRAMES,
            VR::IS,
            PrimitiveValue::from(spec.frames.to_string()),
        ));
    }

    let vr = match pixel_data {
        PrimitiveValue::U8(_) => VR::OB,
        _ => VR::OW,
    };
    obj.put(DataElement::new(tags::PIXEL_DATA, vr, pixel_data));
    obj
}

/// 16-bit 無號灰階影像
pub fn gray16_object(rows: u16, cols: u16, samples: &[u16]) -> InMemDicomObject {
    let spec = ImageSpec {
        rows,
        cols,
        ..ImageSpec::default()
    };
    image_object(&spec, PrimitiveValue::U16(samples.to_vec().into()))
}

pub fn into_file_object(obj: InMemDicomObject) -> DefaultDicomObject {
    obj.with_meta(
        FileMetaTableBuilder::new()
            .transfer_syntax(EXPLICIT_VR_LE)
            .media_storage_sop_class_uid(SECONDARY_CAPTURE)
            .media_storage_sop_instance_uid("2.25.1234"),
    )
    .expect("valid file meta")
}
