mod capture;
mod detect;
mod lifecycle;
mod recorder;
#[cfg(test)]
mod testing;
mod writer;

use std::path::PathBuf;

use lifecycle::TerminationSignals;
use motion_recorder_common::config::{Config, DEFAULT_CONFIG_FILE};
use recorder::Recorder;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config_path = PathBuf::from(DEFAULT_CONFIG_FILE);

    let config = match Config::load_or_default(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", config_path.display());
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.parse().unwrap_or_default()),
        )
        .init();

    info!(
        device = config.camera.device_path(),
        fps = config.recording.fps,
        codec_tag = config.recording.codec_tag,
        output_dir = config.recording.output_dir,
        threshold = config.detection.threshold,
        min_area = config.detection.min_area,
        "starting motion recorder"
    );

    // Capture and encoding both go through ffmpeg.
    writer::avi::check_ffmpeg_available(&config.camera.ffmpeg_bin).await;

    let signals = match TerminationSignals::register() {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to install signal handlers");
            std::process::exit(1);
        }
    };

    let recorder = match Recorder::open(&config).await {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "failed to start recording");
            std::process::exit(1);
        }
    };

    match lifecycle::run_until_shutdown(recorder, signals.recv()).await {
        Ok(stats) => {
            info!(
                frames_read = stats.read,
                frames_written = stats.written,
                "motion recorder stopped"
            );
        }
        Err(e) => {
            error!(error = %e, "recording aborted");
            std::process::exit(1);
        }
    }
}
