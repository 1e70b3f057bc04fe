use crate::{
    frame::{Dimensions, RgbFrame},
    util::error::CipherError,
};
use anyhow::Result;

pub trait FrameSink {
    fn dims(&self) -> Dimensions;
    fn write_frame(&mut self, frame: &RgbFrame) -> Result<()>;

    /// Flushes and closes the sink. Writing afterwards is an error.
    fn finish(&mut self) -> Result<()> { Ok(()) }
}

impl<T: FrameSink + ?Sized> FrameSink for Box<T> {
    fn dims(&self) -> Dimensions { (**self).dims() }
    fn write_frame(&mut self, frame: &RgbFrame) -> Result<()> { (**self).write_frame(frame) }
    fn finish(&mut self) -> Result<()> { (**self).finish() }
}

pub(crate) fn check_frame_size(sink_dims: Dimensions, frame: &RgbFrame) -> Result<()> {
    if frame.as_slice().len() != sink_dims.required_bytes() {
        return Err(CipherError::BufferSize {
            expected: sink_dims.required_bytes(),
            found: frame.as_slice().len(),
        }
        .into());
    }
    Ok(())
}
