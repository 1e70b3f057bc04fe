use crate::frame::{Dimensions, RgbFrame};
use anyhow::Result;

pub trait FrameSource {
    fn dims(&self) -> Dimensions;

    /// Fills `frame` with the next frame, resizing it to [`FrameSource::dims`] first.
    /// Returns `false` once less than a full frame is left, the contents of `frame` are
    /// unspecified in that case.
    fn read_frame(&mut self, frame: &mut RgbFrame) -> Result<bool>;

    fn frame_count(&self) -> Option<u64> { None }
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn dims(&self) -> Dimensions { (**self).dims() }
    fn read_frame(&mut self, frame: &mut RgbFrame) -> Result<bool> { (**self).read_frame(frame) }
    fn frame_count(&self) -> Option<u64> { (**self).frame_count() }
}
