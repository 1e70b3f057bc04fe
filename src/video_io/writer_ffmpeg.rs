use crate::{
    config::OutputFormat,
    frame::{Dimensions, RgbFrame},
    util::formatting_helpers::command_line,
    video_io::{writer_raw::RawBlobWriter, FrameSink},
};
use anyhow::{anyhow, Context, Result};
use std::{
    path::Path,
    process::{Child, ChildStdin, Command, Stdio},
};
use tracing::debug;

/// Encodes rgb24 frames into a video file through an ffmpeg child process.
pub struct FfmpegWriter {
    child: Child,
    frames: Option<RawBlobWriter<ChildStdin>>,
    dims: Dimensions,
}

pub fn encoder_arguments(
    dims: Dimensions,
    format: OutputFormat,
    fps: f64,
    extra_options: &str,
) -> Result<Vec<String>> {
    let input = format!(
        "-y -v error -f rawvideo -vcodec rawvideo -pix_fmt rgb24 -color_range 2 -s {}x{}",
        dims.width, dims.height
    );
    let arguments = match format {
        OutputFormat::Lossless => format!(
            "{} -i - -map 0:v:0 -pix_fmt bgr24 -c:v libx264rgb -preset veryslow -qp 0 {}",
            input, extra_options
        ),
        OutputFormat::Lossy => {
            format!("{} -r {} -i - -map 0:v:0 -vcodec mpeg4 {}", input, fps, extra_options)
        }
    };
    shlex::split(&arguments)
        .ok_or_else(|| anyhow!("could not split encoder options {:?}", extra_options))
}

impl FfmpegWriter {
    pub fn spawn(
        ffmpeg: &str,
        output: &Path,
        dims: Dimensions,
        format: OutputFormat,
        fps: f64,
        extra_options: &str,
    ) -> Result<Self> {
        let mut command = Command::new(ffmpeg);
        command
            .args(encoder_arguments(dims, format, fps, extra_options)?)
            .arg(output)
            .stdin(Stdio::piped());
        debug!("spawning {}", command_line(&command));

        let mut child =
            command.spawn().with_context(|| format!("could not start {} to encode", ffmpeg))?;
        let stdin = child.stdin.take().ok_or_else(|| anyhow!("ffmpeg encoder has no stdin pipe"))?;

        Ok(Self { child, frames: Some(RawBlobWriter::new(stdin, dims)), dims })
    }
}

impl FrameSink for FfmpegWriter {
    fn dims(&self) -> Dimensions { self.dims }

    fn write_frame(&mut self, frame: &RgbFrame) -> Result<()> {
        self.frames
            .as_mut()
            .ok_or_else(|| anyhow!("the ffmpeg encoder was already finished"))?
            .write_frame(frame)
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(mut frames) = self.frames.take() {
            frames.finish()?;
            // closing stdin tells ffmpeg the stream is over
            drop(frames);
            let status = self.child.wait()?;
            if !status.success() {
                return Err(anyhow!("ffmpeg encoder exited with {}", status));
            }
        }
        Ok(())
    }
}

impl Drop for FfmpegWriter {
    fn drop(&mut self) {
        if self.frames.take().is_some() {
            let _ = self.child.wait();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config::OutputFormat,
        frame::Dimensions,
        video_io::writer_ffmpeg::encoder_arguments,
    };

    #[test]
    fn test_lossless_arguments() {
        let args =
            encoder_arguments(Dimensions::new(320, 240).unwrap(), OutputFormat::Lossless, 25.0, "")
                .unwrap();
        assert!(args.windows(2).any(|w| w == ["-s", "320x240"]));
        assert!(args.windows(2).any(|w| w == ["-c:v", "libx264rgb"]));
        assert!(args.windows(2).any(|w| w == ["-qp", "0"]));
        assert!(!args.iter().any(|a| a == "-r"));
    }

    #[test]
    fn test_lossy_arguments_with_extra_options() {
        let args = encoder_arguments(
            Dimensions::new(64, 48).unwrap(),
            OutputFormat::Lossy,
            30.0,
            "-b:v '4 M'",
        )
        .unwrap();
        assert!(args.windows(2).any(|w| w == ["-r", "30"]));
        assert!(args.windows(2).any(|w| w == ["-vcodec", "mpeg4"]));
        assert_eq!(&args[args.len() - 2..], &["-b:v", "4 M"]);
    }

    #[test]
    fn test_unbalanced_quotes_are_rejected() {
        let dims = Dimensions::new(64, 48).unwrap();
        assert!(encoder_arguments(dims, OutputFormat::Lossy, 25.0, "-b:v '4M").is_err());
    }
}
