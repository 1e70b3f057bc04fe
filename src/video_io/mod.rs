pub mod audio;
pub mod inspect;
pub mod reader_ffmpeg;
pub mod reader_raw;
pub mod source;
pub mod writer;
pub mod writer_ffmpeg;
pub mod writer_raw;

pub use source::FrameSource;
pub use writer::FrameSink;
