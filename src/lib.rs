pub mod cipher;
pub mod config;
pub mod frame;
pub mod job;
pub mod stego;
pub mod util;
pub mod video_io;
