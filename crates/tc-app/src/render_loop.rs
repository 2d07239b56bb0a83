//! Boucle de rendu : clavier → capture → décodage → mosaïque → terminal.
//!
//! Every iteration checks the keyboard first, without blocking, and only
//! then waits (bounded) for a frame. Quit latency is therefore one poll when
//! frames flow, and at most one capture timeout when the device stalls.

use std::time::Duration;

use anyhow::{Context, Result};
use tc_core::frame::{CellGrid, DecodedImage};
use tc_core::traits::{CaptureSource, FrameWait, ImageCodec, InputSource, TerminalSurface};
use tc_render::fps::FrameRate;
use tc_render::mosaic::process_mosaic;
use tc_source::resize::Resizer;

/// État de la boucle.
///
/// # Example
/// ```
/// use tc_app::render_loop::LoopState;
/// assert_ne!(LoopState::Idle, LoopState::Stopped);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Pas encore démarrée.
    Idle,
    /// Consultation non bloquante du clavier.
    Polling,
    /// Une touche est en cours de traitement.
    EventHandling,
    /// Attente / lecture d'une frame.
    Capturing,
    /// Décodage JPEG.
    Decoding,
    /// Scale + quantification + flush.
    Rendering,
    /// Touche de sortie reçue. Terminal.
    Stopped,
}

/// Compteurs de la session, retournés à la sortie propre.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub frames_rendered: u64,
    pub timeouts: u64,
    pub empty_reads: u64,
    pub decode_failures: u64,
    pub keys_ignored: u64,
}

/// Orchestrateur mono-thread.
///
/// Owns its collaborators; the scaled image and the cell grid are reused
/// across iterations and never leave this struct.
pub struct RenderLoop<C, I, D, S> {
    capture: C,
    input: I,
    codec: D,
    surface: S,
    timeout: Duration,
    state: LoopState,
    stats: LoopStats,
    resizer: Resizer,
    scaled: DecodedImage,
    grid: CellGrid,
    frame_rate: FrameRate,
}

impl<C, I, D, S> RenderLoop<C, I, D, S>
where
    C: CaptureSource,
    I: InputSource,
    D: ImageCodec,
    S: TerminalSurface,
{
    /// Assemble la boucle. `timeout` borne chaque attente de frame.
    pub fn new(capture: C, input: I, codec: D, surface: S, timeout: Duration) -> Self {
        Self {
            capture,
            input,
            codec,
            surface,
            timeout,
            state: LoopState::Idle,
            stats: LoopStats::default(),
            resizer: Resizer::new(),
            scaled: DecodedImage::new(1, 1),
            grid: CellGrid::new(0, 0),
            frame_rate: FrameRate::new(60, 0),
        }
    }

    /// Log the measured frame rate every `frames` rendered frames (debug
    /// level). 0 disables it.
    #[must_use]
    pub fn with_fps_log_interval(mut self, frames: u32) -> Self {
        self.frame_rate = FrameRate::new(60, frames);
        self
    }

    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[must_use]
    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Rend les collaborateurs (capture, clavier, codec, surface).
    pub fn into_parts(self) -> (C, I, D, S) {
        (self.capture, self.input, self.codec, self.surface)
    }

    /// Tourne jusqu'à une touche de sortie.
    ///
    /// # Errors
    /// Returns an error on a fatal condition: capture device failure, frame
    /// read failure, keyboard loss, or terminal failure. Timeouts, empty reads and
    /// undecodable frames are logged and skipped.
    pub fn run(&mut self) -> Result<LoopStats> {
        while self.step()? != LoopState::Stopped {}
        log::info!(
            "Arrêt demandé : {} frames affichées, {} timeouts, {} frames illisibles",
            self.stats.frames_rendered,
            self.stats.timeouts,
            self.stats.decode_failures
        );
        Ok(self.stats)
    }

    /// One iteration. Returns the last state reached.
    ///
    /// # Errors
    /// See [`RenderLoop::run`].
    pub fn step(&mut self) -> Result<LoopState> {
        if self.state == LoopState::Stopped {
            return Ok(LoopState::Stopped);
        }

        // === Clavier (jamais bloquant) ===
        self.state = LoopState::Polling;
        if let Some(key) = self.input.poll_key().context("Lecture clavier impossible")? {
            self.state = LoopState::EventHandling;
            if key.is_quit() {
                log::debug!("touche de sortie : {key:?}");
                self.state = LoopState::Stopped;
            } else {
                self.stats.keys_ignored += 1;
            }
            return Ok(self.state);
        }

        // === Attente bornée d'une frame ===
        self.state = LoopState::Capturing;
        match self.capture.wait_for_frame(self.timeout) {
            FrameWait::Ready => {}
            FrameWait::TimedOut => {
                self.stats.timeouts += 1;
                log::warn!("Aucune frame reçue en {:?}", self.timeout);
                return Ok(self.state);
            }
            FrameWait::Failed(e) => {
                return Err(anyhow::Error::new(e).context("Échec d'attente de frame"));
            }
        }

        let frame = self
            .capture
            .read_frame()
            .context("Échec de lecture de frame")?;
        if frame.is_empty() {
            self.stats.empty_reads += 1;
            log::trace!("frame vide, rien à afficher");
            return Ok(self.state);
        }

        // === Décodage (échec non fatal) ===
        self.state = LoopState::Decoding;
        let image = match self.codec.decode(&frame) {
            Ok(image) => image,
            Err(e) => {
                self.stats.decode_failures += 1;
                log::warn!("Frame ignorée : {e}");
                return Ok(self.state);
            }
        };
        drop(frame);

        self.state = LoopState::Rendering;
        self.render(&image)?;
        Ok(self.state)
    }

    fn render(&mut self, image: &DecodedImage) -> Result<()> {
        // Taille relue à chaque frame : un resize s'applique dès la suivante.
        let (cols, rows) = self.surface.size()?;
        if cols == 0 || rows == 0 {
            log::debug!("terminal {cols}x{rows}, rendu sauté");
            return Ok(());
        }

        if let Err(e) = self.resizer.scale_into(image, cols, rows, &mut self.scaled) {
            self.stats.decode_failures += 1;
            log::warn!("Frame ignorée ({}x{}) : {e:#}", image.width, image.height);
            return Ok(());
        }

        self.grid.resize(cols, rows);
        process_mosaic(&self.scaled, &mut self.grid);
        self.surface.draw(&self.grid)?;

        self.stats.frames_rendered += 1;
        if let Some(fps) = self.frame_rate.record() {
            log::debug!("rendu : {fps:.1} fps ({cols}x{rows})");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use tc_core::error::{CaptureError, DecodeError};
    use tc_core::frame::KeyPress;

    /// Clavier scripté : `None` = pas de touche à ce tour.
    struct ScriptedInput {
        script: VecDeque<Option<KeyPress>>,
        polls: usize,
    }

    impl ScriptedInput {
        fn new(script: impl IntoIterator<Item = Option<KeyPress>>) -> Self {
            Self {
                script: script.into_iter().collect(),
                polls: 0,
            }
        }
    }

    impl InputSource for ScriptedInput {
        fn poll_key(&mut self) -> Result<Option<KeyPress>> {
            self.polls += 1;
            Ok(self.script.pop_front().flatten())
        }
    }

    /// Clavier dont le lecteur est mort.
    struct DeadInput;

    impl InputSource for DeadInput {
        fn poll_key(&mut self) -> Result<Option<KeyPress>> {
            anyhow::bail!("reader gone")
        }
    }

    /// Capture scriptée ; au-delà du script, toujours TimedOut / lecture vide.
    #[derive(Default)]
    struct ScriptedCapture {
        waits: VecDeque<FrameWait>,
        reads: VecDeque<Result<Vec<u8>, CaptureError>>,
        wait_calls: usize,
    }

    impl CaptureSource for ScriptedCapture {
        fn wait_for_frame(&mut self, _timeout: Duration) -> FrameWait {
            self.wait_calls += 1;
            self.waits.pop_front().unwrap_or(FrameWait::TimedOut)
        }

        fn read_frame(&mut self) -> Result<Vec<u8>, CaptureError> {
            self.reads.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    /// Codec qui échoue sur les appels listés et sinon rend une image
    /// unie dont la couleur est le premier octet de la frame répété.
    #[derive(Default)]
    struct FlakyCodec {
        fail_on: Vec<usize>,
        calls: Cell<usize>,
    }

    impl ImageCodec for FlakyCodec {
        fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
            let n = self.calls.get();
            self.calls.set(n + 1);
            if self.fail_on.contains(&n) {
                return Err(DecodeError::Codec("corrupt".into()));
            }
            let v = bytes[0];
            let data = [v, 0, 0, 255].repeat(16 * 12);
            Ok(DecodedImage::from_raw(16, 12, data).unwrap())
        }
    }

    struct RecordingSurface {
        sizes: RefCell<VecDeque<(u16, u16)>>,
        draws: Vec<CellGrid>,
    }

    impl RecordingSurface {
        fn new(sizes: impl IntoIterator<Item = (u16, u16)>) -> Self {
            Self {
                sizes: RefCell::new(sizes.into_iter().collect()),
                draws: Vec::new(),
            }
        }
    }

    impl TerminalSurface for RecordingSurface {
        fn size(&self) -> Result<(u16, u16)> {
            let mut sizes = self.sizes.borrow_mut();
            let current = *sizes.front().unwrap_or(&(80, 24));
            if sizes.len() > 1 {
                sizes.pop_front();
            }
            Ok(current)
        }

        fn draw(&mut self, grid: &CellGrid) -> Result<()> {
            self.draws.push(grid.clone());
            Ok(())
        }
    }

    fn ready_frames(bytes: &[u8]) -> ScriptedCapture {
        ScriptedCapture {
            waits: bytes.iter().map(|_| FrameWait::Ready).collect(),
            reads: bytes.iter().map(|&b| Ok(vec![b])).collect(),
            wait_calls: 0,
        }
    }

    #[test]
    fn quit_first_never_waits_for_a_frame() {
        let mut rl = RenderLoop::new(
            ScriptedCapture::default(),
            ScriptedInput::new([Some(KeyPress::Escape)]),
            FlakyCodec::default(),
            RecordingSurface::new([(8, 4)]),
            Duration::from_secs(5),
        );
        let stats = rl.run().unwrap();
        assert_eq!(rl.state(), LoopState::Stopped);
        assert_eq!(stats, LoopStats::default());
        let (capture, input, _, surface) = rl.into_parts();
        assert_eq!(capture.wait_calls, 0);
        assert_eq!(input.polls, 1);
        assert!(surface.draws.is_empty());
    }

    #[test]
    fn timeouts_keep_polling_input() {
        let script = std::iter::repeat_n(None, 50).chain([Some(KeyPress::Interrupt)]);
        let mut rl = RenderLoop::new(
            ScriptedCapture::default(),
            ScriptedInput::new(script),
            FlakyCodec::default(),
            RecordingSurface::new([(8, 4)]),
            Duration::from_secs(5),
        );
        let stats = rl.run().unwrap();
        assert_eq!(stats.timeouts, 50);
        let (capture, input, _, _) = rl.into_parts();
        assert_eq!(capture.wait_calls, 50);
        // Le clavier est consulté avant chaque attente.
        assert_eq!(input.polls, 51);
    }

    #[test]
    fn decode_failure_does_not_block_the_next_frame() {
        let mut rl = RenderLoop::new(
            ready_frames(&[255, 255]),
            ScriptedInput::new([None, None, Some(KeyPress::Escape)]),
            FlakyCodec {
                fail_on: vec![0],
                ..FlakyCodec::default()
            },
            RecordingSurface::new([(4, 3)]),
            Duration::from_secs(5),
        );
        let stats = rl.run().unwrap();
        assert_eq!(stats.decode_failures, 1);
        assert_eq!(stats.frames_rendered, 1);
        let (_, _, _, surface) = rl.into_parts();
        assert_eq!(surface.draws.len(), 1);
        let grid = &surface.draws[0];
        assert_eq!((grid.width, grid.height), (4, 3));
        // Rouge pur → 196 partout.
        assert!(grid.cells.iter().all(|&c| c == 196));
    }

    #[test]
    fn empty_read_renders_nothing() {
        let capture = ScriptedCapture {
            waits: [FrameWait::Ready].into(),
            reads: [Ok(Vec::new())].into(),
            wait_calls: 0,
        };
        let mut rl = RenderLoop::new(
            capture,
            ScriptedInput::new([None, Some(KeyPress::Escape)]),
            FlakyCodec::default(),
            RecordingSurface::new([(4, 3)]),
            Duration::from_secs(5),
        );
        let stats = rl.run().unwrap();
        assert_eq!(stats.empty_reads, 1);
        assert_eq!(stats.frames_rendered, 0);
    }

    #[test]
    fn capture_failure_is_fatal() {
        let capture = ScriptedCapture {
            waits: [FrameWait::Failed(CaptureError::Device("unplugged".into()))].into(),
            ..ScriptedCapture::default()
        };
        let mut rl = RenderLoop::new(
            capture,
            ScriptedInput::new([None, Some(KeyPress::Escape)]),
            FlakyCodec::default(),
            RecordingSurface::new([(4, 3)]),
            Duration::from_secs(5),
        );
        let err = rl.run().unwrap_err();
        assert!(format!("{err:#}").contains("unplugged"));
    }

    #[test]
    fn read_failure_is_fatal() {
        let capture = ScriptedCapture {
            waits: [FrameWait::Ready].into(),
            reads: [Err(CaptureError::Io(std::io::Error::other("EIO")))].into(),
            wait_calls: 0,
        };
        let mut rl = RenderLoop::new(
            capture,
            ScriptedInput::new([None, Some(KeyPress::Escape)]),
            FlakyCodec::default(),
            RecordingSurface::new([(4, 3)]),
            Duration::from_secs(5),
        );
        assert!(rl.run().is_err());
    }

    #[test]
    fn keyboard_loss_is_fatal() {
        let mut rl = RenderLoop::new(
            ready_frames(&[255]),
            DeadInput,
            FlakyCodec::default(),
            RecordingSurface::new([(4, 3)]),
            Duration::from_secs(5),
        );
        let err = rl.run().unwrap_err();
        assert!(format!("{err:#}").contains("reader gone"));
        let (capture, _, _, surface) = rl.into_parts();
        assert_eq!(capture.wait_calls, 0);
        assert!(surface.draws.is_empty());
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut rl = RenderLoop::new(
            ScriptedCapture::default(),
            ScriptedInput::new([
                Some(KeyPress::Char('q')),
                Some(KeyPress::Other),
                Some(KeyPress::Escape),
            ]),
            FlakyCodec::default(),
            RecordingSurface::new([(4, 3)]),
            Duration::from_secs(5),
        );
        let stats = rl.run().unwrap();
        assert_eq!(stats.keys_ignored, 2);
        let (capture, _, _, _) = rl.into_parts();
        assert_eq!(capture.wait_calls, 0);
    }

    #[test]
    fn terminal_resize_applies_on_next_frame() {
        let mut rl = RenderLoop::new(
            ready_frames(&[0, 255]),
            ScriptedInput::new([None, None, Some(KeyPress::Escape)]),
            FlakyCodec::default(),
            RecordingSurface::new([(4, 3), (10, 2)]),
            Duration::from_secs(5),
        );
        rl.run().unwrap();
        let (_, _, _, surface) = rl.into_parts();
        let dims: Vec<_> = surface.draws.iter().map(|g| (g.width, g.height)).collect();
        assert_eq!(dims, vec![(4, 3), (10, 2)]);
        assert!(surface.draws[0].cells.iter().all(|&c| c == 16));
        assert_eq!(surface.draws[1].cells.len(), 20);
    }

    #[test]
    fn zero_sized_terminal_skips_render() {
        let mut rl = RenderLoop::new(
            ready_frames(&[255]),
            ScriptedInput::new([None, Some(KeyPress::Escape)]),
            FlakyCodec::default(),
            RecordingSurface::new([(0, 5)]),
            Duration::from_secs(5),
        );
        let stats = rl.run().unwrap();
        assert_eq!(stats.frames_rendered, 0);
        let (_, _, _, surface) = rl.into_parts();
        assert!(surface.draws.is_empty());
    }

    #[test]
    fn step_after_stop_is_a_no_op() {
        let mut rl = RenderLoop::new(
            ScriptedCapture::default(),
            ScriptedInput::new([Some(KeyPress::Escape)]),
            FlakyCodec::default(),
            RecordingSurface::new([(4, 3)]),
            Duration::from_secs(5),
        );
        assert_eq!(rl.state(), LoopState::Idle);
        assert_eq!(rl.step().unwrap(), LoopState::Stopped);
        assert_eq!(rl.step().unwrap(), LoopState::Stopped);
        let (_, input, _, _) = rl.into_parts();
        assert_eq!(input.polls, 1);
    }
}
