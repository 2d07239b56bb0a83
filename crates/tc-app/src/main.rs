use std::fs::File;

use anyhow::{Context, Result};
use clap::Parser;
use tc_app::cli::Cli;
use tc_app::input::KeyboardWorker;
use tc_app::pipeline::{open_capture, report_outcome, resolve_config};
use tc_app::render_loop::RenderLoop;
use tc_render::surface::RatatuiSurface;
use tc_source::codec::JpegCodec;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = Cli::parse();

    // 2. Logging (stderr est masqué par l'écran alternatif : --log-file)
    init_logging(&cli)?;

    // 3. Config
    let config = resolve_config(&cli)?;

    // 4. Source ouverte et négociée AVANT de prendre le terminal
    let capture = open_capture(&cli, &config)?;

    // 5. Terminal + clavier
    let surface = RatatuiSurface::init(config.render.cell_symbol)?;
    let input = KeyboardWorker::spawn()?;

    // 6. Boucle
    let timeout = config.capture.timeout();
    let mut render_loop = RenderLoop::new(capture, input, JpegCodec, surface, timeout)
        .with_fps_log_interval(config.render.fps_log_interval);
    let outcome = render_loop.run();

    // Restaure le terminal avant tout message final.
    drop(render_loop);

    report_outcome(outcome, cli.log_file.is_some())?;
    Ok(())
}

fn init_logging(cli: &Cli) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(cli.log_filter()).parse_default_env();
    if let Some(ref path) = cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("Impossible de créer le journal {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}
