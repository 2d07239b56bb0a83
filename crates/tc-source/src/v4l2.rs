use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use tc_core::config::CaptureConfig;
use tc_core::error::CaptureError;
use tc_core::traits::{CaptureSource, FrameWait};
use v4l::buffer::Type;
use v4l::framesize::FrameSizeEnum;
use v4l::io::mmap::Stream as MmapStream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

use crate::negotiate::{FrameSize, choose_frame_size};

/// Caméra V4L2 en MJPEG, lue via des buffers mmap.
///
/// `wait_for_frame` dequeues the next buffer (bounded by the timeout) and
/// keeps a copy until `read_frame` takes it; the mmap buffer itself is only
/// valid until the next dequeue.
pub struct V4l2Source {
    // Ordre de drop : le stream (munmap + STREAMOFF) avant le device.
    stream: MmapStream<'static>,
    pending: Option<Vec<u8>>,
    format: Format,
    _device: Device,
}

impl std::fmt::Debug for V4l2Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V4l2Source")
            .field("format", &self.format)
            .field("pending", &self.pending.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}

impl V4l2Source {
    /// Open the device, negotiate format and resolution for a `cols × rows`
    /// terminal, and allocate the capture buffers.
    ///
    /// # Errors
    /// Returns an error if the device cannot be opened, does not offer the
    /// configured FourCC, or rejects the format.
    pub fn open(config: &CaptureConfig, cols: u16, rows: u16) -> Result<Self> {
        let path = config.device.display().to_string();
        let device = Device::with_path(&config.device)
            .with_context(|| format!("Impossible d'ouvrir la webcam '{path}'"))?;

        let code: [u8; 4] = config
            .fourcc
            .as_bytes()
            .try_into()
            .with_context(|| format!("FourCC invalide : {:?}", config.fourcc))?;
        let fourcc = FourCC::new(&code);

        let formats = device
            .enum_formats()
            .with_context(|| format!("Énumération des formats impossible sur '{path}'"))?;
        if !formats.iter().any(|f| f.fourcc == fourcc) {
            let available = formats
                .iter()
                .map(|f| format!("{} ({})", f.fourcc, f.description))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(CaptureError::UnsupportedFormat {
                format: config.fourcc.clone(),
                available,
            }
            .into());
        }

        let sizes: Vec<FrameSize> = device
            .enum_framesizes(fourcc)
            .with_context(|| format!("Énumération des résolutions impossible sur '{path}'"))?
            .into_iter()
            .map(|fs| match fs.size {
                FrameSizeEnum::Discrete(d) => FrameSize::discrete(d.width, d.height),
                FrameSizeEnum::Stepwise(s) => FrameSize {
                    min_width: s.min_width,
                    max_width: s.max_width,
                    min_height: s.min_height,
                    max_height: s.max_height,
                },
            })
            .collect();

        let (width, height) = match choose_frame_size(&sizes, cols, rows) {
            Some(size) => (size.max_width, size.max_height),
            None => {
                let current = device.format().context("Lecture du format courant")?;
                log::warn!(
                    "Aucune résolution annoncée, conservation de {}x{}",
                    current.width,
                    current.height
                );
                (current.width, current.height)
            }
        };

        let format = device
            .set_format(&Format::new(width, height, fourcc))
            .context("Échec de configuration du format d'image")?;
        if format.fourcc != fourcc {
            return Err(CaptureError::UnsupportedFormat {
                format: config.fourcc.clone(),
                available: format.fourcc.to_string(),
            }
            .into());
        }
        log::info!(
            "Format obtenu : {} ({}x{}) sur {path}",
            format.fourcc,
            format.width,
            format.height
        );

        let stream = MmapStream::with_buffers(&device, Type::VideoCapture, config.buffer_count)
            .context("Échec du démarrage du streaming")?;

        Ok(Self {
            stream,
            pending: None,
            format,
            _device: device,
        })
    }
}

impl CaptureSource for V4l2Source {
    fn wait_for_frame(&mut self, timeout: Duration) -> FrameWait {
        if self.pending.is_some() {
            return FrameWait::Ready;
        }
        // Le premier `next` met les buffers en file et lance STREAMON.
        self.stream.set_timeout(timeout);
        match CaptureStream::next(&mut self.stream) {
            Ok((buf, meta)) => {
                let used = (meta.bytesused as usize).min(buf.len());
                self.pending = Some(buf[..used].to_vec());
                FrameWait::Ready
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => FrameWait::TimedOut,
            Err(e) => FrameWait::Failed(CaptureError::Io(e)),
        }
    }

    fn read_frame(&mut self) -> Result<Vec<u8>, CaptureError> {
        Ok(self.pending.take().unwrap_or_default())
    }
}
