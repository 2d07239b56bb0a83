use anyhow::{Context, Result};
use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer as FirResizer};
use tc_core::frame::DecodedImage;

/// Resizer réutilisable wrappant fast_image_resize (filtre bilinéaire).
///
/// Each destination pixel is a weighted average of the source region it
/// covers, which keeps the mosaic stable at large downscale ratios.
///
/// # Example
/// ```
/// use tc_source::resize::Resizer;
/// let r = Resizer::new();
/// ```
pub struct Resizer {
    inner: FirResizer,
    options: ResizeOptions,
    /// Scratch copy of the source (fast_image_resize wants `&mut [u8]`).
    src_buf: Vec<u8>,
}

impl Resizer {
    /// Create a new resizer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
            src_buf: Vec::new(),
        }
    }

    /// Resize `src` into `dst`. Dimensions of `dst` determine output size.
    ///
    /// # Errors
    /// Returns an error if either image has a zero dimension or the resize
    /// operation fails.
    ///
    /// # Example
    /// ```
    /// use tc_source::resize::Resizer;
    /// use tc_core::frame::DecodedImage;
    /// let mut r = Resizer::new();
    /// let src = DecodedImage::new(640, 480);
    /// let mut dst = DecodedImage::new(80, 24);
    /// r.resize_into(&src, &mut dst).unwrap();
    /// ```
    pub fn resize_into(&mut self, src: &DecodedImage, dst: &mut DecodedImage) -> Result<()> {
        if src.width == dst.width && src.height == dst.height {
            dst.data.copy_from_slice(&src.data);
            return Ok(());
        }

        self.src_buf.clear();
        self.src_buf.extend_from_slice(&src.data);

        let src_image =
            Image::from_slice_u8(src.width, src.height, &mut self.src_buf, PixelType::U8x4)
                .context("Dimensions source invalides")?;

        let mut dst_image =
            Image::from_slice_u8(dst.width, dst.height, &mut dst.data, PixelType::U8x4)
                .context("Dimensions destination invalides")?;

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .context("Redimensionnement échoué")?;

        Ok(())
    }

    /// Scale `src` to exactly `cols × rows` pixels, one per terminal cell.
    ///
    /// `dst` is reshaped in place, so its allocation is reused across frames
    /// as long as the terminal geometry does not grow.
    ///
    /// # Errors
    /// Returns an error if `cols` or `rows` is zero, or the resize fails.
    pub fn scale_into(
        &mut self,
        src: &DecodedImage,
        cols: u16,
        rows: u16,
        dst: &mut DecodedImage,
    ) -> Result<()> {
        if cols == 0 || rows == 0 {
            anyhow::bail!("Géométrie cible vide : {cols}×{rows}");
        }
        dst.reshape(u32::from(cols), u32::from(rows));
        self.resize_into(src, dst)
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot scaling. Allocates; the render loop uses `Resizer::scale_into`.
///
/// # Errors
/// Returns an error if the resize operation fails.
///
/// # Example
/// ```
/// use tc_source::resize::scale;
/// use tc_core::frame::DecodedImage;
/// let src = DecodedImage::new(100, 100);
/// let dst = scale(&src, 50, 20).unwrap();
/// assert_eq!((dst.width, dst.height), (50, 20));
/// ```
pub fn scale(src: &DecodedImage, cols: u16, rows: u16) -> Result<DecodedImage> {
    let mut dst = DecodedImage::new(u32::from(cols), u32::from(rows));
    Resizer::new().scale_into(src, cols, rows, &mut dst)?;
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> DecodedImage {
        let data = rgba.repeat(width as usize * height as usize);
        DecodedImage::from_raw(width, height, data).unwrap()
    }

    #[test]
    fn output_matches_requested_geometry() {
        let mut resizer = Resizer::new();
        let mut dst = DecodedImage::new(1, 1);
        for &(sw, sh) in &[(1, 1), (3, 7), (640, 480), (1920, 1080)] {
            let src = solid(sw, sh, [10, 20, 30, 255]);
            for &(cols, rows) in &[(1, 1), (80, 24), (213, 57), (2, 300)] {
                resizer.scale_into(&src, cols, rows, &mut dst).unwrap();
                assert_eq!((dst.width, dst.height), (u32::from(cols), u32::from(rows)));
                assert_eq!(dst.data.len(), usize::from(cols) * usize::from(rows) * 4);
            }
        }
    }

    #[test]
    fn solid_color_survives_downscale() {
        let src = solid(320, 240, [200, 40, 90, 255]);
        let dst = scale(&src, 40, 12).unwrap();
        for px in dst.data.chunks_exact(4) {
            assert!(px[0].abs_diff(200) <= 1 && px[1].abs_diff(40) <= 1 && px[2].abs_diff(90) <= 1);
        }
    }

    #[test]
    fn downscale_averages_instead_of_sampling() {
        // Colonnes alternées noir / blanc : un échantillonnage au plus proche
        // donnerait 0 ou 255, un filtre lissant donne un gris intermédiaire.
        let mut src = DecodedImage::new(64, 8);
        for (i, px) in src.data.chunks_exact_mut(4).enumerate() {
            let v = if i % 2 == 0 { 0 } else { 255 };
            px.copy_from_slice(&[v, v, v, 255]);
        }
        let dst = scale(&src, 4, 1).unwrap();
        for px in dst.data.chunks_exact(4) {
            assert!((64..=192).contains(&px[0]), "got {}", px[0]);
        }
    }

    #[test]
    fn zero_target_is_rejected() {
        let src = DecodedImage::new(10, 10);
        assert!(scale(&src, 0, 10).is_err());
        assert!(scale(&src, 10, 0).is_err());
    }
}
