use crate::{
    frame::{Dimensions, RgbFrame},
    video_io::{writer::check_frame_size, FrameSink},
};
use anyhow::{Context, Result};
use std::io::Write;

pub struct RawBlobWriter<W> {
    writer: W,
    dims: Dimensions,
}

impl<W: Write> RawBlobWriter<W> {
    pub fn new(writer: W, dims: Dimensions) -> Self { Self { writer, dims } }
    pub fn into_inner(self) -> W { self.writer }
}

impl<W: Write> FrameSink for RawBlobWriter<W> {
    fn dims(&self) -> Dimensions { self.dims }

    fn write_frame(&mut self, frame: &RgbFrame) -> Result<()> {
        check_frame_size(self.dims, frame)?;
        self.writer.write_all(frame.as_slice()).context("error while writing frame")
    }

    fn finish(&mut self) -> Result<()> { Ok(self.writer.flush()?) }
}
