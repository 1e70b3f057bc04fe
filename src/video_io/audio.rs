use crate::util::formatting_helpers::command_line;
use anyhow::{anyhow, Context, Result};
use std::{fs, path::Path, process::Command};
use tracing::{debug, info, warn};

fn run(mut command: Command) -> Result<std::process::Output> {
    debug!("running {}", command_line(&command));
    let program = command.get_program().to_string_lossy().into_owned();
    command.output().with_context(|| format!("could not run {}", program))
}

/// Copies the first audio track of `input` into `destination` without re-encoding.
///
/// Returns false (and leaves no usable file behind) when `input` has no audio track.
pub fn extract_audio(ffmpeg: &str, input: &Path, destination: &Path) -> Result<bool> {
    let mut command = Command::new(ffmpeg);
    command
        .args(["-nostdin", "-y", "-v", "error", "-i"])
        .arg(input)
        .args(["-vn", "-map", "0:a:0", "-acodec", "copy"])
        .arg(destination);

    let output = run(command)?;
    if !output.status.success() {
        warn!(
            "no audio track copied from {}, the output will be video only: {}",
            input.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Ok(false);
    }
    Ok(true)
}

/// Produces `output` from the encoded `video` and, if given, the extracted `audio` track.
///
/// A failed mux is not fatal: the video is then delivered without sound.
pub fn mux(ffmpeg: &str, video: &Path, audio: Option<&Path>, output: &Path) -> Result<()> {
    if let Some(audio) = audio {
        let mut command = Command::new(ffmpeg);
        command
            .args(["-nostdin", "-y", "-v", "error", "-i"])
            .arg(video)
            .arg("-i")
            .arg(audio)
            .args(["-c", "copy", "-map", "0:v:0", "-map", "1:a:0"])
            .arg(output);

        let result = run(command)?;
        if result.status.success() {
            info!("wrote {} with audio", output.display());
            return Ok(());
        }
        warn!(
            "muxing the audio track failed, writing video only: {}",
            String::from_utf8_lossy(&result.stderr).trim()
        );
    }

    fs::copy(video, output).map_err(|e| {
        anyhow!("could not move {} to {}: {}", video.display(), output.display(), e)
    })?;
    info!("wrote {}", output.display());
    Ok(())
}
