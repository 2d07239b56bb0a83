use crate::error::CoreError;

/// Image décodée, RGBA row-major, 4 bytes par pixel.
///
/// Produite par un `ImageCodec`, consommée une seule fois par le scaler.
///
/// # Example
/// ```
/// use tc_core::frame::DecodedImage;
/// let img = DecodedImage::new(10, 10);
/// assert_eq!(img.data.len(), 400);
/// ```
#[derive(Clone, Debug)]
pub struct DecodedImage {
    /// Pixels RGBA, row-major, 4 bytes par pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl DecodedImage {
    /// Crée une image noire (alpha 0) aux dimensions données.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * 4],
            width,
            height,
        }
    }

    /// Wrap an existing RGBA buffer.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidDimensions` if `data` is not exactly
    /// `width * height * 4` bytes long.
    ///
    /// # Example
    /// ```
    /// use tc_core::frame::DecodedImage;
    /// assert!(DecodedImage::from_raw(2, 1, vec![0; 8]).is_ok());
    /// assert!(DecodedImage::from_raw(2, 2, vec![0; 8]).is_err());
    /// ```
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CoreError> {
        if data.len() != width as usize * height as usize * 4 {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Change les dimensions en réutilisant l'allocation existante.
    pub fn reshape(&mut self, width: u32, height: u32) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.data.resize(width as usize * height as usize * 4, 0);
    }

    /// Accès au pixel (x, y) → (r, g, b, a).
    ///
    /// # Example
    /// ```
    /// use tc_core::frame::DecodedImage;
    /// let mut img = DecodedImage::new(2, 2);
    /// img.data[4..8].copy_from_slice(&[1, 2, 3, 4]);
    /// assert_eq!(img.pixel(1, 0), (1, 2, 3, 4));
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        match self.data.get(idx..idx + 4) {
            Some(px) => (px[0], px[1], px[2], px[3]),
            None => (0, 0, 0, 0),
        }
    }
}

/// Grille de cellules terminal : un index de palette par cellule.
///
/// Pré-allouée, écrasée sur place à chaque frame. Aucun historique.
///
/// # Example
/// ```
/// use tc_core::frame::CellGrid;
/// let mut grid = CellGrid::new(80, 24);
/// grid.set(3, 2, 196);
/// assert_eq!(grid.get(3, 2), 196);
/// assert_eq!(grid.cells.len(), 80 * 24);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellGrid {
    /// Palette indices, row-major.
    pub cells: Vec<u8>,
    /// Width in columns.
    pub width: u16,
    /// Height in rows.
    pub height: u16,
}

impl CellGrid {
    /// Crée une grille remplie de l'index 16 (noir du cube).
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            cells: vec![16; usize::from(width) * usize::from(height)],
            width,
            height,
        }
    }

    /// Adapt the grid to a new terminal geometry. Reuses the buffer.
    ///
    /// # Example
    /// ```
    /// use tc_core::frame::CellGrid;
    /// let mut grid = CellGrid::new(4, 4);
    /// grid.resize(10, 2);
    /// assert_eq!((grid.width, grid.height, grid.cells.len()), (10, 2, 20));
    /// ```
    pub fn resize(&mut self, width: u16, height: u16) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.cells.resize(usize::from(width) * usize::from(height), 16);
    }

    #[inline(always)]
    pub fn set(&mut self, x: u16, y: u16, index: u8) {
        self.cells[usize::from(y) * usize::from(self.width) + usize::from(x)] = index;
    }

    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> u8 {
        self.cells[usize::from(y) * usize::from(self.width) + usize::from(x)]
    }

    /// True si la grille n'a aucune cellule (terminal 0×N ou N×0).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Touche pressée, telle que vue par la boucle de rendu.
///
/// # Example
/// ```
/// use tc_core::frame::KeyPress;
/// assert!(KeyPress::Escape.is_quit());
/// assert!(KeyPress::Interrupt.is_quit());
/// assert!(!KeyPress::Char('q').is_quit());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPress {
    /// Touche Échap.
    Escape,
    /// Ctrl+C (le terminal est en mode raw, aucun SIGINT n'est émis).
    Interrupt,
    /// Caractère imprimable.
    Char(char),
    /// Toute autre touche.
    Other,
}

impl KeyPress {
    /// The two designated cancel keys stop the loop; everything else is ignored.
    #[must_use]
    pub fn is_quit(self) -> bool {
        matches!(self, KeyPress::Escape | KeyPress::Interrupt)
    }
}
