use crate::{
    frame::Dimensions,
    util::{error::CipherError, formatting_helpers::command_line},
};
use anyhow::Result;
use std::{path::Path, process::Command};
use tracing::debug;

/// Looks up the geometry of a video file before any frame is read.
pub trait VideoInspector {
    fn dimensions(&self, path: &Path) -> Result<Dimensions>;

    /// Number of video frames, if the container states it. Only used for progress output.
    fn frame_count(&self, _path: &Path) -> Option<u64> { None }
}

pub struct FfprobeInspector {
    binary: String,
}

impl FfprobeInspector {
    pub fn new(binary: impl Into<String>) -> Self { Self { binary: binary.into() } }

    fn query(&self, path: &Path, entries: &str, format: &str) -> Result<String> {
        let inspect_error =
            |reason: String| CipherError::Inspect { path: path.display().to_string(), reason };

        let mut command = Command::new(&self.binary);
        command
            .args(["-v", "error", "-select_streams", "v:0", "-show_entries", entries])
            .args(["-of", format])
            .arg(path);
        debug!("running {}", command_line(&command));

        let output = command
            .output()
            .map_err(|e| inspect_error(format!("could not run {}: {}", self.binary, e)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(inspect_error(stderr).into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for FfprobeInspector {
    fn default() -> Self { Self::new("ffprobe") }
}

impl VideoInspector for FfprobeInspector {
    fn dimensions(&self, path: &Path) -> Result<Dimensions> {
        let output = self.query(path, "stream=width,height", "csv=s=x:p=0")?;
        parse_dimensions(&output).map_err(|e| {
            CipherError::Inspect { path: path.display().to_string(), reason: e.to_string() }.into()
        })
    }

    fn frame_count(&self, path: &Path) -> Option<u64> {
        self.query(path, "stream=nb_frames", "csv=p=0").ok().and_then(|out| parse_frame_count(&out))
    }
}

// a file with several video streams still only reports v:0, but be lenient about blank lines
pub fn parse_dimensions(output: &str) -> Result<Dimensions> {
    output.lines().find(|line| !line.trim().is_empty()).unwrap_or("").parse()
}

pub fn parse_frame_count(output: &str) -> Option<u64> {
    output.lines().next().and_then(|line| line.trim().trim_end_matches(',').parse().ok())
}
