use tc_core::color::quantize_rgb8;
use tc_core::frame::{CellGrid, DecodedImage};

/// Quantize a scaled frame into the cell grid, one pixel per cell.
///
/// `frame` is expected to already match the grid geometry (see
/// `Resizer::scale_into`). Any mismatch is absorbed by clamping the source
/// coordinates, so the whole grid is always written.
///
/// # Example
/// ```
/// use tc_core::frame::{CellGrid, DecodedImage};
/// use tc_render::mosaic::process_mosaic;
///
/// let frame = DecodedImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap();
/// let mut grid = CellGrid::new(2, 1);
/// process_mosaic(&frame, &mut grid);
/// assert_eq!(grid.cells, vec![196, 21]);
/// ```
pub fn process_mosaic(frame: &DecodedImage, grid: &mut CellGrid) {
    if frame.width == 0 || frame.height == 0 {
        return;
    }
    let max_x = frame.width - 1;
    let max_y = frame.height - 1;
    for cy in 0..grid.height {
        let py = u32::from(cy).min(max_y);
        for cx in 0..grid.width {
            let px = u32::from(cx).min(max_x);
            let (r, g, b, _) = frame.pixel(px, py);
            grid.set(cx, cy, quantize_rgb8(r, g, b));
        }
    }
}
