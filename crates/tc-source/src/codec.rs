use image::ImageFormat;
use tc_core::error::DecodeError;
use tc_core::frame::DecodedImage;
use tc_core::traits::ImageCodec;

/// Décodeur JPEG (frames MJPEG) basé sur le crate `image`.
///
/// # Example
/// ```
/// use tc_core::traits::ImageCodec;
/// use tc_source::codec::JpegCodec;
/// assert!(JpegCodec.decode(b"not a jpeg").is_err());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct JpegCodec;

impl ImageCodec for JpegCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
            .map_err(|e| DecodeError::Codec(e.to_string()))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(DecodeError::Empty { width, height });
        }
        DecodedImage::from_raw(width, height, rgba.into_raw())
            .map_err(|e| DecodeError::Codec(e.to_string()))
    }
}

/// Encode une image RGB unie en JPEG. Utilisé par les tests et la relecture.
#[cfg(test)]
pub(crate) fn solid_jpeg(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    use std::io::Cursor;
    let img = image::RgbImage::from_pixel(width, height, image::Rgb(rgb));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Jpeg).unwrap();
    out.into_inner()
}
