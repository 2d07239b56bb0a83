//! Choix de la résolution de capture en fonction de la taille du terminal.

/// Plage de résolutions offerte par le périphérique pour un format donné.
///
/// A discrete size has `min == max` on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSize {
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
}

impl FrameSize {
    /// Taille discrète unique.
    #[must_use]
    pub fn discrete(width: u32, height: u32) -> Self {
        Self {
            min_width: width,
            max_width: width,
            min_height: height,
            max_height: height,
        }
    }

    /// Surface maximale, clé de tri des candidats.
    #[must_use]
    pub fn area(&self) -> u64 {
        u64::from(self.max_width) * u64::from(self.max_height)
    }
}

/// Pick the capture resolution for a `cols × rows` terminal.
///
/// Candidates are sorted by area, smallest first. The first one whose
/// minimum width and height both exceed the terminal geometry wins, so the
/// camera delivers just enough pixels for one sample per cell. When no
/// candidate is large enough the largest one is used. Returns `None` only
/// for an empty list.
///
/// # Example
/// ```
/// use tc_source::negotiate::{FrameSize, choose_frame_size};
/// let sizes = [
///     FrameSize::discrete(1280, 720),
///     FrameSize::discrete(160, 120),
///     FrameSize::discrete(320, 240),
/// ];
/// assert_eq!(choose_frame_size(&sizes, 200, 60), Some(FrameSize::discrete(320, 240)));
/// assert_eq!(choose_frame_size(&sizes, 2000, 60), Some(FrameSize::discrete(1280, 720)));
/// ```
#[must_use]
pub fn choose_frame_size(sizes: &[FrameSize], cols: u16, rows: u16) -> Option<FrameSize> {
    let mut sorted = sizes.to_vec();
    sorted.sort_by_key(FrameSize::area);

    let (cols, rows) = (u32::from(cols), u32::from(rows));
    let mut chosen = None;
    for size in sorted {
        chosen = Some(size);
        if size.min_width > cols && size.min_height > rows {
            break;
        }
    }
    chosen
}
