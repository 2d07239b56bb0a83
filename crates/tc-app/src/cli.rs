use std::path::PathBuf;

use clap::Parser;
use tc_core::config::TermcamConfig;

/// termcam : affiche une webcam dans le terminal sous forme de mosaïque 256 couleurs.
///
/// Quitter avec Échap ou Ctrl+C.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Périphérique V4L2 à ouvrir (défaut : capture.device de la config, /dev/video0).
    #[arg(long)]
    pub device: Option<PathBuf>,

    /// Rejouer un fichier MJPEG (JPEG concaténés) au lieu d'une webcam.
    #[arg(long, conflicts_with = "device")]
    pub replay: Option<PathBuf>,

    /// Attente maximale d'une frame, en secondes.
    #[arg(long)]
    pub timeout: Option<u32>,

    /// Fichier de configuration TOML.
    #[arg(short, long, default_value = "config/termcam.toml")]
    pub config: PathBuf,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Écrire les logs dans ce fichier plutôt que sur stderr (qui partage l'écran).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply command-line overrides on top of the file configuration.
    pub fn apply_overrides(&self, config: &mut TermcamConfig) {
        if let Some(ref device) = self.device {
            config.capture.device.clone_from(device);
        }
        if let Some(timeout) = self.timeout {
            config.capture.timeout_secs = timeout;
        }
        config.clamp_all();
    }

    /// Niveau de log demandé, `Warn` si la valeur est inconnue.
    #[must_use]
    pub fn log_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Warn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["termcam"]).unwrap();
        assert!(cli.device.is_none() && cli.replay.is_none());
        assert_eq!(cli.config, PathBuf::from("config/termcam.toml"));
        assert_eq!(cli.log_filter(), log::LevelFilter::Warn);
    }

    #[test]
    fn positional_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["termcam", "/dev/video1"]).is_err());
    }

    #[test]
    fn replay_and_device_conflict() {
        let args = ["termcam", "--device", "/dev/video1", "--replay", "a.mjpeg"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn overrides_win_over_file_values() {
        let args = ["termcam", "--device", "/dev/video3", "--timeout", "90"];
        let cli = Cli::try_parse_from(args).unwrap();
        let mut config = TermcamConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.capture.device, PathBuf::from("/dev/video3"));
        // Borné à 60 s.
        assert_eq!(config.capture.timeout_secs, 60);
    }

    #[test]
    fn unknown_log_level_falls_back_to_warn() {
        let cli = Cli::try_parse_from(["termcam", "--log-level", "chatty"]).unwrap();
        assert_eq!(cli.log_filter(), log::LevelFilter::Warn);
        let cli = Cli::try_parse_from(["termcam", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_filter(), log::LevelFilter::Debug);
    }
}
