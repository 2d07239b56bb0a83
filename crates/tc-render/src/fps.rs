use std::collections::VecDeque;
use std::time::Instant;

/// Cadence d'affichage mesurée sur une fenêtre glissante.
///
/// `record` is called once per frame that reached the screen; every
/// `report_every` frames it hands back the windowed rate so the caller can
/// log it. `report_every == 0` never reports.
///
/// # Example
/// ```
/// use tc_render::fps::FrameRate;
/// let mut rate = FrameRate::new(60, 2);
/// assert_eq!(rate.record(), None);
/// assert!(rate.record().is_some());
/// assert_eq!(rate.rendered(), 2);
/// ```
pub struct FrameRate {
    /// Instants d'affichage des dernières frames (au plus `window`).
    shown: VecDeque<Instant>,
    window: usize,
    report_every: u64,
    rendered: u64,
}

impl FrameRate {
    /// `window` is clamped to at least 2 frames.
    #[must_use]
    pub fn new(window: usize, report_every: u32) -> Self {
        let window = window.max(2);
        Self {
            shown: VecDeque::with_capacity(window + 1),
            window,
            report_every: u64::from(report_every),
            rendered: 0,
        }
    }

    /// Appeler APRÈS le flush. `Some(fps)` quand un rapport est dû.
    pub fn record(&mut self) -> Option<f64> {
        self.record_at(Instant::now())
    }

    fn record_at(&mut self, now: Instant) -> Option<f64> {
        self.rendered += 1;
        self.shown.push_back(now);
        if self.shown.len() > self.window {
            self.shown.pop_front();
        }
        (self.report_every > 0 && self.rendered.is_multiple_of(self.report_every))
            .then(|| self.fps())
    }

    /// Images par seconde sur la fenêtre ; 0 tant qu'elle ne couvre aucune durée.
    #[must_use]
    pub fn fps(&self) -> f64 {
        let (Some(first), Some(last)) = (self.shown.front(), self.shown.back()) else {
            return 0.0;
        };
        let secs = last.duration_since(*first).as_secs_f64();
        if secs > 0.0 {
            (self.shown.len() - 1) as f64 / secs
        } else {
            0.0
        }
    }

    /// Frames affichées depuis la création.
    #[must_use]
    pub fn rendered(&self) -> u64 {
        self.rendered
    }
}
