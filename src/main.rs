use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use memegen::cli::CliOptions;
use memegen::compositor::Compositor;
use memegen::config::setup_logging;
use memegen::fetch::{FileImageSource, HttpImageSource, ImageSource};
use memegen::meme::MemeRequest;
use tracing::{error, info};

fn run(cli: &CliOptions) -> anyhow::Result<()> {
    let manifest = cli.font_manifest()?;
    let compositor = Compositor::from_manifest(&manifest);

    let request = MemeRequest::new(&cli.source, &cli.top, &cli.bottom);
    let source: Box<dyn ImageSource> = if request.is_remote() {
        let agent = HttpImageSource::default_agent(cli.timeout());
        Box::new(HttpImageSource::new(agent).with_delay(cli.delay_policy()))
    } else {
        Box::new(FileImageSource)
    };

    let png = request.generate(source.as_ref(), &compositor)?;
    std::fs::write(&cli.output, &png)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    info!("Saved: {} ({} bytes)", cli.output.display(), png.len());
    Ok(())
}

fn main() -> ExitCode {
    let cli = CliOptions::parse();

    if let Err(err) = setup_logging(cli.debug) {
        eprintln!("Logging disabled: {}", err);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Application error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
