use crate::{
    frame::{Dimensions, RgbFrame},
    util::formatting_helpers::command_line,
    video_io::{reader_raw::RawBlobReader, FrameSource},
};
use anyhow::{anyhow, Context, Result};
use std::{
    path::Path,
    process::{Child, ChildStdout, Command, Stdio},
};
use tracing::debug;

/// Decodes a video file to rgb24 frames through an ffmpeg child process.
pub struct FfmpegReader {
    child: Child,
    frames: RawBlobReader<ChildStdout>,
}

impl FfmpegReader {
    pub fn spawn(
        ffmpeg: &str,
        input: &Path,
        dims: Dimensions,
        frame_count: Option<u64>,
    ) -> Result<Self> {
        let mut command = Command::new(ffmpeg);
        command
            .args(["-nostdin", "-v", "error", "-i"])
            .arg(input)
            .args(["-f", "rawvideo", "-vcodec", "rawvideo", "-pix_fmt", "rgb24"])
            .args(["-color_range", "2", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped());
        debug!("spawning {}", command_line(&command));

        let mut child =
            command.spawn().with_context(|| format!("could not start {} to decode", ffmpeg))?;
        let stdout =
            child.stdout.take().ok_or_else(|| anyhow!("ffmpeg decoder has no stdout pipe"))?;

        Ok(Self { child, frames: RawBlobReader::new(stdout, dims).with_frame_count(frame_count) })
    }
}

impl FrameSource for FfmpegReader {
    fn dims(&self) -> Dimensions { self.frames.dims() }
    fn read_frame(&mut self, frame: &mut RgbFrame) -> Result<bool> { self.frames.read_frame(frame) }
    fn frame_count(&self) -> Option<u64> { self.frames.frame_count() }
}

// the other stream may end first, so the decoder can still be blocked on a full pipe
impl Drop for FfmpegReader {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
