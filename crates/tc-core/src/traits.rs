use std::time::Duration;

use crate::error::{CaptureError, DecodeError};
use crate::frame::{CellGrid, DecodedImage, KeyPress};

/// Résultat d'une attente de frame.
///
/// Exactly three outcomes: a frame is ready, the bound elapsed, or the
/// device failed for good.
#[derive(Debug)]
pub enum FrameWait {
    /// Une frame est disponible pour `read_frame`.
    Ready,
    /// Rien reçu avant l'expiration du délai. Non fatal.
    TimedOut,
    /// Erreur matérielle. Fatal.
    Failed(CaptureError),
}

/// Fournit des frames encodées (MJPEG) à la boucle de rendu.
///
/// Implémenté par : `V4l2Source`, `ReplaySource`.
///
/// The source must already be configured and streaming when handed to the
/// render loop.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use tc_core::error::CaptureError;
/// use tc_core::traits::{CaptureSource, FrameWait};
///
/// struct Silent;
/// impl CaptureSource for Silent {
///     fn wait_for_frame(&mut self, _timeout: Duration) -> FrameWait { FrameWait::TimedOut }
///     fn read_frame(&mut self) -> Result<Vec<u8>, CaptureError> { Ok(Vec::new()) }
/// }
/// ```
pub trait CaptureSource {
    /// Bloque au plus `timeout` en attendant la prochaine frame.
    fn wait_for_frame(&mut self, timeout: Duration) -> FrameWait;

    /// Lit la frame disponible. Un vecteur vide signifie « rien à afficher ».
    ///
    /// # Errors
    /// Returns an error on a hard read failure.
    fn read_frame(&mut self) -> Result<Vec<u8>, CaptureError>;
}

impl<T: CaptureSource + ?Sized> CaptureSource for Box<T> {
    fn wait_for_frame(&mut self, timeout: Duration) -> FrameWait {
        (**self).wait_for_frame(timeout)
    }

    fn read_frame(&mut self) -> Result<Vec<u8>, CaptureError> {
        (**self).read_frame()
    }
}

/// Décode une frame encodée en image RGBA. Pure et synchrone.
pub trait ImageCodec {
    /// # Errors
    /// Returns `DecodeError` if the payload is not a valid image.
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError>;
}

/// Flux d'événements clavier, consulté sans jamais bloquer.
pub trait InputSource {
    /// Prochaine touche en attente, dans l'ordre d'arrivée. `None` si aucune.
    ///
    /// # Errors
    /// Returns an error once the keyboard can no longer deliver keys, since
    /// the quit keys would then be unreachable.
    fn poll_key(&mut self) -> anyhow::Result<Option<KeyPress>>;
}

/// Surface d'affichage en cellules.
///
/// `draw` writes every cell of the grid and flushes once, so a frame reaches
/// the screen as a single update.
pub trait TerminalSurface {
    /// Géométrie courante (colonnes, lignes). Interrogée à chaque frame.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be queried.
    fn size(&self) -> anyhow::Result<(u16, u16)>;

    /// Affiche la grille complète.
    ///
    /// # Errors
    /// Returns an error if writing to the terminal fails.
    fn draw(&mut self, grid: &CellGrid) -> anyhow::Result<()>;
}
