use crate::util::error::CipherError;
use anyhow::Result;
use std::{fmt, str::FromStr};

pub mod rgb_frame;

pub use rgb_frame::RgbFrame;

/// Width and height of a video stream in pixels. Both are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u64,
    pub height: u64,
}

impl Dimensions {
    pub fn new(width: u64, height: u64) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CipherError::ZeroDimensions { width, height }.into());
        }
        Ok(Self { width, height })
    }

    pub fn pixel_count(&self) -> usize { self.width as usize * self.height as usize }
    pub fn required_bytes(&self) -> usize { self.pixel_count() * 3 }
    pub fn contains(&self, x: u64, y: u64) -> bool { x < self.width && y < self.height }

    /// Whether `rounds` halvings of both axes are exact.
    pub fn divisible_by_rounds(&self, rounds: u32) -> bool {
        let divisor = 1u64.checked_shl(rounds).unwrap_or(0);
        divisor != 0 && self.width % divisor == 0 && self.height % divisor == 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ffprobe prints `WIDTHxHEIGHT`, sometimes followed by a trailing separator or newline
impl FromStr for Dimensions {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || CipherError::MalformedDimensions(s.to_string());
        let mut parts = s.trim().trim_end_matches('x').split('x');
        let width = parts.next().and_then(|w| w.trim().parse().ok()).ok_or_else(malformed)?;
        let height = parts.next().and_then(|h| h.trim().parse().ok()).ok_or_else(malformed)?;
        if parts.next().is_some() {
            return Err(malformed().into());
        }
        Dimensions::new(width, height)
    }
}
