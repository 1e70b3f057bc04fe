use crate::{
    frame::{Dimensions, RgbFrame},
    video_io::FrameSource,
};
use anyhow::{Context, Result};
use std::io::{ErrorKind, Read};

/// Reads headerless rgb24 frames back to back from any byte stream.
pub struct RawBlobReader<R> {
    reader: R,
    dims: Dimensions,
    frame_count: Option<u64>,
}

impl<R: Read> RawBlobReader<R> {
    pub fn new(reader: R, dims: Dimensions) -> Self { Self { reader, dims, frame_count: None } }

    pub fn with_frame_count(mut self, frame_count: Option<u64>) -> Self {
        self.frame_count = frame_count;
        self
    }

    pub fn into_inner(self) -> R { self.reader }
}

// like read_exact, but a stream ending early is not an error
fn read_full(reader: &mut impl Read, buffer: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e).context("error while reading frame"),
        }
    }
    Ok(filled)
}

impl<R: Read> FrameSource for RawBlobReader<R> {
    fn dims(&self) -> Dimensions { self.dims }

    fn read_frame(&mut self, frame: &mut RgbFrame) -> Result<bool> {
        frame.resize(self.dims);
        let read_count = read_full(&mut self.reader, frame.as_mut_slice())?;
        Ok(read_count == self.dims.required_bytes())
    }

    fn frame_count(&self) -> Option<u64> { self.frame_count }
}
