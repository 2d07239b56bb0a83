use anyhow::{Context, Result};
use ratatui::DefaultTerminal;
use tc_core::frame::CellGrid;
use tc_core::traits::TerminalSurface;

use crate::canvas::render_grid;

/// Surface plein écran ratatui/crossterm (écran alternatif, mode raw).
///
/// The terminal is restored when the surface is dropped, on the error path
/// as well.
pub struct RatatuiSurface {
    terminal: DefaultTerminal,
    symbol: char,
}

impl RatatuiSurface {
    /// Passe le terminal en mode plein écran.
    ///
    /// # Errors
    /// Returns an error if raw mode or the alternate screen cannot be enabled.
    pub fn init(symbol: char) -> Result<Self> {
        let terminal = ratatui::try_init().context("Impossible d'initialiser le terminal")?;
        log::debug!("terminal initialisé (écran alternatif, mode raw)");
        Ok(Self { terminal, symbol })
    }
}

impl TerminalSurface for RatatuiSurface {
    fn size(&self) -> Result<(u16, u16)> {
        let size = self
            .terminal
            .size()
            .context("Impossible de lire la taille du terminal")?;
        Ok((size.width, size.height))
    }

    fn draw(&mut self, grid: &CellGrid) -> Result<()> {
        let symbol = self.symbol;
        self.terminal
            .draw(|frame| {
                let area = frame.area();
                render_grid(frame.buffer_mut(), area, grid, symbol);
            })
            .context("Écriture terminal échouée")?;
        Ok(())
    }
}

impl Drop for RatatuiSurface {
    fn drop(&mut self) {
        ratatui::restore();
    }
}
