use crate::stego::CipherOperation;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, str::FromStr};

/// What to do with the cloak frames left over once the message stream ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageExhaustion {
    /// keep embedding frames made only of filler runs drawn from the last message frame
    Filler,
    /// keep embedding the last message frame unchanged
    RepeatLast,
    /// write the cloak frames unchanged
    PassThrough,
}

impl FromStr for MessageExhaustion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "filler" => Ok(Self::Filler),
            "repeat-last" => Ok(Self::RepeatLast),
            "pass-through" => Ok(Self::PassThrough),
            _ => Err(anyhow!(
                "unknown message exhaustion policy {}, use filler, repeat-last or pass-through",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// rgb preserving libx264rgb at qp 0 in a matroska container
    Lossless,
    /// mpeg4 in an mp4 container
    Lossy,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Lossless => "mkv",
            Self::Lossy => "mp4",
        }
    }

    pub fn default_for(operation: CipherOperation) -> Self {
        match operation {
            CipherOperation::Embed => Self::Lossless,
            CipherOperation::Extract => Self::Lossy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CipherConfig {
    /// number of permutation rounds, the direction follows from the operation
    pub rounds: u32,
    pub seed: u64,
    pub message_exhaustion: MessageExhaustion,
    /// defaults to lossless when embedding and lossy when extracting
    pub output_format: Option<OutputFormat>,
    pub lossy_fps: f64,
    pub output: Option<String>,
    pub ffmpeg: String,
    pub ffprobe: String,
    /// appended to the encoder command line
    pub encoder_options: String,
    pub keep_temporary: bool,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            rounds: 3,
            seed: 0,
            message_exhaustion: MessageExhaustion::Filler,
            output_format: None,
            lossy_fps: 25.0,
            output: None,
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            encoder_options: String::new(),
            keep_temporary: false,
        }
    }
}

impl CipherConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        Self::from_yaml(&yaml).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.rounds > 32 {
            return Err(anyhow!("at most 32 permutation rounds are supported, got {}", self.rounds));
        }
        if !(self.lossy_fps > 0.0) {
            return Err(anyhow!("lossy-fps has to be positive, got {}", self.lossy_fps));
        }
        shlex::split(&self.encoder_options)
            .ok_or_else(|| anyhow!("could not split encoder-options {:?}", self.encoder_options))?;
        Ok(())
    }

    /// Positive rounds scramble the message before embedding, negative rounds
    /// descramble the composite after extracting.
    pub fn signed_rounds(&self, operation: CipherOperation) -> i32 {
        match operation {
            CipherOperation::Embed => self.rounds as i32,
            CipherOperation::Extract => -(self.rounds as i32),
        }
    }

    pub fn output_format(&self, operation: CipherOperation) -> OutputFormat {
        self.output_format.unwrap_or_else(|| OutputFormat::default_for(operation))
    }

    pub fn output_path(&self, operation: CipherOperation) -> String {
        self.output.clone().unwrap_or_else(|| {
            format!("output.{}", self.output_format(operation).extension())
        })
    }
}
