use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Configuration complète de termcam.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use tc_core::config::TermcamConfig;
/// let config = TermcamConfig::default();
/// assert_eq!(config.capture.timeout_secs, 5);
/// assert_eq!(config.capture.fourcc, "MJPG");
/// ```
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct TermcamConfig {
    /// Périphérique de capture.
    pub capture: CaptureConfig,
    /// Rendu terminal.
    pub render: RenderConfig,
    /// Source de relecture MJPEG.
    pub replay: ReplayConfig,
}

/// Capture device parameters.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CaptureConfig {
    /// Chemin du périphérique V4L2.
    pub device: PathBuf,
    /// Attente maximale d'une frame, en secondes [1, 60].
    pub timeout_secs: u32,
    /// Nombre de buffers mmap [1, 32].
    pub buffer_count: u32,
    /// Format de pixel demandé (FourCC, 4 caractères ASCII).
    pub fourcc: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/video0"),
            timeout_secs: 5,
            buffer_count: 4,
            fourcc: "MJPG".to_string(),
        }
    }
}

impl CaptureConfig {
    /// Délai d'attente sous forme de `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_secs))
    }
}

/// Terminal output parameters.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RenderConfig {
    /// Caractère écrit dans chaque cellule (la couleur est portée par le fond).
    pub cell_symbol: char,
    /// Frames entre deux logs FPS (debug). 0 = désactivé.
    pub fps_log_interval: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cell_symbol: ' ',
            fps_log_interval: 120,
        }
    }
}

/// Replay source parameters.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ReplayConfig {
    /// Cadence de relecture [1, 120].
    pub fps: u32,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self { fps: 30 }
    }
}

impl TermcamConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    ///
    /// Each adjusted field is logged at `warn` and its name returned.
    pub fn clamp_all(&mut self) -> Vec<&'static str> {
        let mut clamped = Vec::new();
        let fields = [
            ("capture.timeout_secs", &mut self.capture.timeout_secs, 1, 60),
            ("capture.buffer_count", &mut self.capture.buffer_count, 1, 32),
            ("replay.fps", &mut self.replay.fps, 1, 120),
        ];
        for (name, value, min, max) in fields {
            let bounded = (*value).clamp(min, max);
            if bounded != *value {
                log::warn!("{name} = {value} hors de [{min}, {max}], ramené à {bounded}");
                *value = bounded;
                clamped.push(name);
            }
        }
        clamped
    }

    /// Reject values that cannot be clamped into something meaningful.
    ///
    /// # Errors
    /// Returns `CoreError::Config` if the FourCC is not 4 ASCII characters
    /// or the cell symbol is a control character.
    pub fn validate(&self) -> Result<(), CoreError> {
        let fourcc = &self.capture.fourcc;
        if fourcc.len() != 4 || !fourcc.is_ascii() {
            return Err(CoreError::Config(format!(
                "capture.fourcc doit faire 4 caractères ASCII, reçu {fourcc:?}"
            )));
        }
        if self.render.cell_symbol.is_control() {
            return Err(CoreError::Config(
                "render.cell_symbol ne peut pas être un caractère de contrôle".to_string(),
            ));
        }
        Ok(())
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    capture: Option<CaptureSection>,
    render: Option<RenderSection>,
    replay: Option<ReplaySection>,
}

#[derive(Deserialize)]
struct CaptureSection {
    device: Option<PathBuf>,
    timeout_secs: Option<u32>,
    buffer_count: Option<u32>,
    fourcc: Option<String>,
}

#[derive(Deserialize)]
struct RenderSection {
    cell_symbol: Option<char>,
    fps_log_interval: Option<u32>,
}

#[derive(Deserialize)]
struct ReplaySection {
    fps: Option<u32>,
}

/// Parse une config TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the TOML is malformed or a value is invalid.
///
/// # Example
/// ```
/// use tc_core::config::parse_config;
/// let config = parse_config("[capture]\ntimeout_secs = 2\n").unwrap();
/// assert_eq!(config.capture.timeout_secs, 2);
/// assert_eq!(config.replay.fps, 30);
/// ```
pub fn parse_config(content: &str) -> Result<TermcamConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;
    let mut config = TermcamConfig::default();

    if let Some(c) = file.capture {
        if let Some(v) = c.device {
            config.capture.device = v;
        }
        if let Some(v) = c.timeout_secs {
            config.capture.timeout_secs = v;
        }
        if let Some(v) = c.buffer_count {
            config.capture.buffer_count = v;
        }
        if let Some(v) = c.fourcc {
            config.capture.fourcc = v;
        }
    }
    if let Some(r) = file.render {
        if let Some(v) = r.cell_symbol {
            config.render.cell_symbol = v;
        }
        if let Some(v) = r.fps_log_interval {
            config.render.fps_log_interval = v;
        }
    }
    if let Some(p) = file.replay
        && let Some(v) = p.fps
    {
        config.replay.fps = v;
    }

    config.clamp_all();
    config.validate()?;
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use tc_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/termcam.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<TermcamConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Config invalide : {}", path.display()))
}
