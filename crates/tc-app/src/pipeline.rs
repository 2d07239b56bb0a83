use anyhow::Result;
use tc_core::config::{self, TermcamConfig};
use tc_core::traits::CaptureSource;
use tc_source::replay::ReplaySource;

use crate::cli::Cli;
use crate::render_loop::LoopStats;

/// Charge la config (fichier si présent, sinon défauts) puis applique la CLI.
///
/// # Errors
/// Returns an error if the config file exists but cannot be parsed.
pub fn resolve_config(cli: &Cli) -> Result<TermcamConfig> {
    let mut config = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        TermcamConfig::default()
    };
    cli.apply_overrides(&mut config);
    Ok(config)
}

/// Ouvre la source de frames demandée : fichier de relecture ou webcam.
///
/// The returned source is configured and ready to stream.
///
/// # Errors
/// Returns an error if the source cannot be opened or negotiated.
pub fn open_capture(cli: &Cli, config: &TermcamConfig) -> Result<Box<dyn CaptureSource>> {
    if let Some(ref path) = cli.replay {
        log::info!("Source : relecture {}", path.display());
        return Ok(Box::new(ReplaySource::open(path, config.replay.fps)?));
    }
    open_device(config)
}

/// Journalise la fin de session et rend le résultat de la boucle.
///
/// A fatal error is logged only when logs go to a file: otherwise `main`
/// returning it already prints it on stderr.
///
/// # Errors
/// Returns the loop's error unchanged.
pub fn report_outcome(outcome: Result<LoopStats>, log_to_file: bool) -> Result<LoopStats> {
    match outcome {
        Ok(stats) => {
            log::info!("Session terminée : {stats:?}");
            Ok(stats)
        }
        Err(e) => {
            if log_to_file {
                log::error!("{e:#}");
            }
            Err(e)
        }
    }
}

#[cfg(feature = "v4l2")]
fn open_device(config: &TermcamConfig) -> Result<Box<dyn CaptureSource>> {
    use anyhow::Context;

    let (cols, rows) =
        crossterm::terminal::size().context("Impossible de lire la taille du terminal")?;
    log::info!(
        "Source : webcam {} (terminal {cols}x{rows})",
        config.capture.device.display()
    );
    let source = tc_source::v4l2::V4l2Source::open(&config.capture, cols, rows)?;
    Ok(Box::new(source))
}

#[cfg(not(feature = "v4l2"))]
fn open_device(config: &TermcamConfig) -> Result<Box<dyn CaptureSource>> {
    anyhow::bail!(
        "Webcam {} indisponible : compilé sans la feature `v4l2` (utiliser --replay)",
        config.capture.device.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let args = ["termcam", "--config", "/nonexistent/termcam.toml"];
        let cli = Cli::try_parse_from(args).unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config, TermcamConfig::default());
    }

    #[test]
    fn cli_overrides_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[capture]\ntimeout_secs = 9\ndevice = \"/dev/video7\"").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let args = ["termcam", "--config", &path, "--timeout", "2"];
        let cli = Cli::try_parse_from(args).unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.capture.timeout_secs, 2);
        assert_eq!(config.capture.device.to_str(), Some("/dev/video7"));
    }

    #[test]
    fn broken_config_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[capture]\ntimeout_secs = \"soon\"").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let cli = Cli::try_parse_from(["termcam", "--config", &path]).unwrap();
        assert!(resolve_config(&cli).is_err());
    }

    #[test]
    fn outcome_passes_through_unchanged() {
        let stats = LoopStats {
            frames_rendered: 3,
            ..LoopStats::default()
        };
        assert_eq!(report_outcome(Ok(stats), false).unwrap(), stats);

        let err = anyhow::anyhow!("unplugged").context("Échec d'attente de frame");
        let out = report_outcome(Err(err), true).unwrap_err();
        assert_eq!(format!("{out:#}"), "Échec d'attente de frame: unplugged");
    }

    #[test]
    fn replay_without_file_fails() {
        let cli = Cli::try_parse_from(["termcam", "--replay", "/nonexistent/clip.mjpeg"]).unwrap();
        assert!(open_capture(&cli, &TermcamConfig::default()).is_err());
    }
}
