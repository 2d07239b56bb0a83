//! Quantification RGB → palette 256 couleurs du terminal.
//!
//! Palette layout:
//! - 0–15   : couleurs de base du terminal (non calculées ici)
//! - 16–231 : cube 6×6×6, `16 + 36·r + 6·g + b`
//! - 232–255: rampe de gris en 24 pas
//!
//! The mapping is closed-form. Channel levels use round-half-to-even; with
//! 8- or 16-bit integer samples no exact `.5` product can occur, so the
//! tie rule never changes a reachable result.

/// Premier index du cube 6×6×6.
pub const CUBE_BASE: u8 = 16;
/// Premier index de la rampe de gris.
pub const GRAY_BASE: u8 = 232;
/// Nombre de pas dans la rampe de gris.
pub const GRAY_STEPS: u8 = 24;

/// Intensités xterm des 6 niveaux du cube.
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// Quantize a normalized RGB triple to a palette index.
///
/// Channels are clamped to `[0.0, 1.0]`. A NaN channel is a caller bug and
/// panics.
///
/// # Panics
/// Panics if any channel is NaN.
///
/// # Example
/// ```
/// use tc_core::color::quantize_unit;
/// assert_eq!(quantize_unit(1.0, 0.0, 0.0), 196);
/// assert_eq!(quantize_unit(0.5, 0.5, 0.5), 244);
/// ```
#[allow(clippy::float_cmp)] // égalité exacte = test de neutralité
#[must_use]
pub fn quantize_unit(r: f64, g: f64, b: f64) -> u8 {
    assert!(
        !(r.is_nan() || g.is_nan() || b.is_nan()),
        "quantize_unit: canal NaN ({r}, {g}, {b})"
    );
    let r = r.clamp(0.0, 1.0);
    let g = g.clamp(0.0, 1.0);
    let b = b.clamp(0.0, 1.0);

    // Neutres stricts : la rampe est plus fine que la diagonale du cube.
    // Noir et blanc purs restent sur le cube (16 et 231).
    if r == g && g == b && r > 0.0 && r < 1.0 {
        let step = (f64::from(GRAY_STEPS) * r).round_ties_even() as u8;
        return GRAY_BASE + step.min(GRAY_STEPS - 1);
    }

    CUBE_BASE + 36 * cube_level(r) + 6 * cube_level(g) + cube_level(b)
}

#[inline(always)]
fn cube_level(c: f64) -> u8 {
    (5.0 * c).round_ties_even() as u8
}

/// Quantize 16-bit samples (`0..=65535`).
///
/// # Example
/// ```
/// use tc_core::color::quantize;
/// assert_eq!(quantize(0, 0, 0), 16);
/// assert_eq!(quantize(65535, 65535, 65535), 231);
/// assert_eq!(quantize(32768, 32768, 32768), 244);
/// ```
#[inline]
#[must_use]
pub fn quantize(r: u16, g: u16, b: u16) -> u8 {
    const MAX: f64 = u16::MAX as f64;
    quantize_unit(f64::from(r) / MAX, f64::from(g) / MAX, f64::from(b) / MAX)
}

/// Quantize 8-bit samples. Each sample is widened to 16 bits as `v * 257`.
///
/// # Example
/// ```
/// use tc_core::color::quantize_rgb8;
/// assert_eq!(quantize_rgb8(255, 0, 0), 196);
/// assert_eq!(quantize_rgb8(128, 128, 128), 244);
/// ```
#[inline]
#[must_use]
pub fn quantize_rgb8(r: u8, g: u8, b: u8) -> u8 {
    quantize(u16::from(r) * 257, u16::from(g) * 257, u16::from(b) * 257)
}

/// Couleur RGB affichée par le terminal pour un index de palette.
///
/// Returns `None` for the 16 base colors, which depend on the terminal theme.
///
/// # Example
/// ```
/// use tc_core::color::palette_rgb;
/// assert_eq!(palette_rgb(16), Some((0, 0, 0)));
/// assert_eq!(palette_rgb(231), Some((255, 255, 255)));
/// assert_eq!(palette_rgb(232), Some((8, 8, 8)));
/// assert_eq!(palette_rgb(7), None);
/// ```
#[must_use]
pub fn palette_rgb(index: u8) -> Option<(u8, u8, u8)> {
    match index {
        0..CUBE_BASE => None,
        CUBE_BASE..GRAY_BASE => {
            let i = usize::from(index - CUBE_BASE);
            Some((
                CUBE_LEVELS[i / 36],
                CUBE_LEVELS[(i / 6) % 6],
                CUBE_LEVELS[i % 6],
            ))
        }
        _ => {
            let v = 8 + 10 * (index - GRAY_BASE);
            Some((v, v, v))
        }
    }
}
