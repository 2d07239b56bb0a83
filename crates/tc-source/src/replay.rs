//! Relecture d'un flux MJPEG enregistré (JPEG concaténés).
//!
//! Sert de `CaptureSource` sans caméra : démo, tests, machines sans V4L2.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tc_core::error::CaptureError;
use tc_core::traits::{CaptureSource, FrameWait};

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: u8 = 0xD9;
const SOS: u8 = 0xDA;

/// Découpe un flux MJPEG brut en images JPEG (SOI … EOI inclus).
///
/// Each image is delimited by walking its marker segments, so `FF D9` bytes
/// inside a comment, an EXIF thumbnail or an ICC profile do not end the
/// frame. Bytes outside a complete image are skipped; a corrupt or truncated
/// image is dropped and the search resumes after its SOI.
///
/// # Example
/// ```
/// use tc_source::replay::split_mjpeg;
/// // SOI+EOI, un octet parasite, puis une image dont le commentaire contient FF D9.
/// let stream = [
///     0xFF, 0xD8, 0xFF, 0xD9, 9,
///     0xFF, 0xD8, 0xFF, 0xFE, 0x00, 0x04, 0xFF, 0xD9, 0xFF, 0xD9,
/// ];
/// let frames = split_mjpeg(&stream);
/// assert_eq!(frames.len(), 2);
/// assert_eq!(frames[1], stream[5..].to_vec());
/// ```
#[must_use]
pub fn split_mjpeg(data: &[u8]) -> Vec<Vec<u8>> {
    let mut frames = Vec::new();
    let mut pos = 0;
    while let Some(start) = find_soi(&data[pos..]).map(|i| pos + i) {
        match jpeg_end(data, start) {
            Some(end) => {
                frames.push(data[start..end].to_vec());
                pos = end;
            }
            None => pos = start + 2,
        }
    }
    frames
}

fn find_soi(haystack: &[u8]) -> Option<usize> {
    haystack.windows(2).position(|w| w == SOI)
}

/// Fin (exclusive) de l'image qui commence à `start`, ou `None` si elle est
/// tronquée ou mal formée.
fn jpeg_end(data: &[u8], start: usize) -> Option<usize> {
    let mut pos = start + 2;
    loop {
        if *data.get(pos)? != 0xFF {
            return None;
        }
        match *data.get(pos + 1)? {
            // Octet de remplissage avant un marqueur.
            0xFF => pos += 1,
            EOI => return Some(pos + 2),
            0x00 => return None,
            // Marqueurs sans longueur : TEM, RSTn.
            0x01 | 0xD0..=0xD7 => pos += 2,
            marker => {
                let len = u16::from_be_bytes([*data.get(pos + 2)?, *data.get(pos + 3)?]);
                if len < 2 {
                    return None;
                }
                pos += 2 + usize::from(len);
                if marker == SOS {
                    pos = skip_entropy(data, pos)?;
                }
            }
        }
    }
}

/// Position du premier marqueur après des données compressées. `FF 00`
/// (octet bourré) et `FF D0..=D7` (restart) font partie du scan.
fn skip_entropy(data: &[u8], mut pos: usize) -> Option<usize> {
    loop {
        let ff = pos + data.get(pos..)?.iter().position(|&b| b == 0xFF)?;
        match *data.get(ff + 1)? {
            0x00 | 0xD0..=0xD7 => pos = ff + 2,
            0xFF => pos = ff + 1,
            _ => return Some(ff),
        }
    }
}

/// Source qui rejoue un fichier MJPEG en boucle à cadence fixe.
pub struct ReplaySource {
    frames: Vec<Vec<u8>>,
    next: usize,
    interval: Duration,
    due: Instant,
    ready: bool,
}

impl ReplaySource {
    /// Charge `path` et prépare la relecture à `fps` images par seconde.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or holds no complete JPEG.
    pub fn open(path: &Path, fps: u32) -> Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("Impossible de lire {}", path.display()))?;
        let source = Self::from_frames(split_mjpeg(&data), fps);
        if source.frames.is_empty() {
            anyhow::bail!("Aucune image JPEG complète dans {}", path.display());
        }
        log::info!(
            "replay: {} frames @ {fps}fps depuis {}",
            source.frames.len(),
            path.display()
        );
        Ok(source)
    }

    /// Build a source from already split frames. The first frame is due
    /// immediately.
    #[must_use]
    pub fn from_frames(frames: Vec<Vec<u8>>, fps: u32) -> Self {
        Self {
            frames,
            next: 0,
            interval: Duration::from_secs(1) / fps.max(1),
            due: Instant::now(),
            ready: false,
        }
    }

    /// Nombre d'images dans la boucle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl CaptureSource for ReplaySource {
    fn wait_for_frame(&mut self, timeout: Duration) -> FrameWait {
        if self.frames.is_empty() {
            return FrameWait::Failed(CaptureError::Device("flux de relecture vide".into()));
        }
        if self.ready {
            return FrameWait::Ready;
        }
        let wait = self.due.saturating_duration_since(Instant::now());
        if wait > timeout {
            std::thread::sleep(timeout);
            return FrameWait::TimedOut;
        }
        std::thread::sleep(wait);
        self.ready = true;
        FrameWait::Ready
    }

    fn read_frame(&mut self) -> Result<Vec<u8>, CaptureError> {
        if !self.ready {
            return Ok(Vec::new());
        }
        self.ready = false;
        let frame = self.frames[self.next].clone();
        self.next = (self.next + 1) % self.frames.len();
        // Cadence ancrée sur l'échéance précédente, sans rattrapage après un retard.
        let now = Instant::now();
        self.due = (self.due + self.interval).max(now);
        Ok(frame)
    }
}
