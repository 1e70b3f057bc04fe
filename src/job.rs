use crate::{
    cipher::{CipherSession, Progress, SessionOptions, SessionSummary},
    config::CipherConfig,
    stego::CipherOperation,
    video_io::{
        audio::{extract_audio, mux},
        inspect::{FfprobeInspector, VideoInspector},
        reader_ffmpeg::FfmpegReader,
        writer_ffmpeg::FfmpegWriter,
        FrameSink,
    },
};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

/// One complete encode or decode run, from two video files to the muxed output file.
///
/// For `Embed` the first input is the cloak and the second one the message. For `Extract`
/// the first input is the encrypted video and the second one the key, which is the
/// original cloak.
pub struct CipherJob {
    config: CipherConfig,
    operation: CipherOperation,
    cloak: PathBuf,
    message: PathBuf,
}

impl CipherJob {
    pub fn new(
        config: CipherConfig,
        operation: CipherOperation,
        cloak: impl Into<PathBuf>,
        message: impl Into<PathBuf>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, operation, cloak: cloak.into(), message: message.into() })
    }

    pub fn output_path(&self) -> PathBuf { PathBuf::from(self.config.output_path(self.operation)) }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            operation: self.operation,
            rounds: self.config.signed_rounds(self.operation),
            seed: self.config.seed,
            message_exhaustion: self.config.message_exhaustion,
        }
    }

    pub fn run(&self, progress: impl FnMut(Progress)) -> Result<SessionSummary> {
        let config = &self.config;
        let inspector = FfprobeInspector::new(&config.ffprobe);
        let cloak_dims = inspector.dimensions(&self.cloak)?;
        let message_dims = inspector.dimensions(&self.message)?;
        let total_frames = inspector.frame_count(&self.cloak);

        let scratch = tempfile::Builder::new()
            .prefix("cloakweave-")
            .tempdir()
            .context("could not create the scratch directory")?;
        let format = config.output_format(self.operation);
        let video_path = scratch.path().join(format!("video.{}", format.extension()));
        let audio_path = scratch.path().join("audio.mka");

        let has_audio = extract_audio(&config.ffmpeg, &self.cloak, &audio_path)?;

        let summary = {
            let mut cloak =
                FfmpegReader::spawn(&config.ffmpeg, &self.cloak, cloak_dims, total_frames)?;
            let mut message =
                FfmpegReader::spawn(&config.ffmpeg, &self.message, message_dims, None)?;
            let mut sink = FfmpegWriter::spawn(
                &config.ffmpeg,
                &video_path,
                cloak_dims,
                format,
                config.lossy_fps,
                &config.encoder_options,
            )?;

            let summary = CipherSession::new(self.session_options(), cloak_dims, message_dims)
                .run(&mut cloak, &mut message, &mut sink, progress)?;
            sink.finish().context("could not finish encoding")?;
            summary
        };

        let output = self.output_path();
        mux(&config.ffmpeg, &video_path, has_audio.then(|| audio_path.as_path()), &output)?;

        if config.keep_temporary {
            let kept = scratch.keep();
            info!("kept temporary files in {}", kept.display());
        } else {
            scratch.close().context("could not remove the scratch directory")?;
        }
        Ok(summary)
    }
}
