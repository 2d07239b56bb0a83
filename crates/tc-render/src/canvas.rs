use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use tc_core::frame::CellGrid;

/// Écrit directement une `CellGrid` dans un `ratatui::Buffer`.
///
/// Chaque cellule reçoit `symbol` avec l'index de palette en couleur de
/// fond : la mosaïque est faite de blocs de fond colorés.
///
/// # Example
/// ```
/// use ratatui::buffer::Buffer;
/// use ratatui::layout::Rect;
/// use ratatui::style::Color;
/// use tc_core::frame::CellGrid;
/// use tc_render::canvas::render_grid;
///
/// let area = Rect::new(0, 0, 2, 1);
/// let mut buf = Buffer::empty(area);
/// let mut grid = CellGrid::new(2, 1);
/// grid.set(1, 0, 196);
/// render_grid(&mut buf, area, &grid, ' ');
/// assert_eq!(buf[(1, 0)].bg, Color::Indexed(196));
/// ```
pub fn render_grid(buf: &mut Buffer, area: Rect, grid: &CellGrid, symbol: char) {
    for cy in 0..grid.height.min(area.height) {
        for cx in 0..grid.width.min(area.width) {
            if let Some(cell) = buf.cell_mut((area.x + cx, area.y + cy)) {
                cell.set_char(symbol)
                    .set_fg(Color::Reset)
                    .set_bg(Color::Indexed(grid.get(cx, cy)));
            }
        }
    }
}
