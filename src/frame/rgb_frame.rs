use crate::{frame::Dimensions, util::error::CipherError};
use anyhow::Result;

/// An interleaved rgb24 frame, row major, owned by whoever is processing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbFrame {
    dims: Dimensions,
    buffer: Vec<u8>,
}

impl RgbFrame {
    pub fn new(dims: Dimensions) -> Self { Self { dims, buffer: vec![0; dims.required_bytes()] } }

    pub fn from_bytes(bytes: Vec<u8>, dims: Dimensions) -> Result<Self> {
        if bytes.len() != dims.required_bytes() {
            return Err(CipherError::BufferSize {
                expected: dims.required_bytes(),
                found: bytes.len(),
            }
            .into());
        }

        Ok(Self { dims, buffer: bytes })
    }

    pub fn filled(dims: Dimensions, pixel: [u8; 3]) -> Self {
        Self { dims, buffer: pixel.repeat(dims.pixel_count()) }
    }

    pub fn dims(&self) -> Dimensions { self.dims }
    pub fn as_slice(&self) -> &[u8] { &self.buffer }
    pub fn as_mut_slice(&mut self) -> &mut [u8] { &mut self.buffer }

    pub fn offset(&self, x: u64, y: u64) -> usize {
        (y as usize * self.dims.width as usize + x as usize) * 3
    }

    pub fn pixel(&self, x: u64, y: u64) -> [u8; 3] {
        let offset = self.offset(x, y);
        let pixel = &self.buffer[offset..offset + 3];
        [pixel[0], pixel[1], pixel[2]]
    }

    pub fn set_pixel(&mut self, x: u64, y: u64, pixel: [u8; 3]) {
        let offset = self.offset(x, y);
        self.buffer[offset..offset + 3].copy_from_slice(&pixel);
    }

    /// Resizes to `dims`, reusing the allocation. The contents are not meaningful
    /// afterwards.
    pub fn resize(&mut self, dims: Dimensions) {
        self.buffer.resize(dims.required_bytes(), 0);
        self.dims = dims;
    }

    pub fn copy_from(&mut self, other: &RgbFrame) {
        self.buffer.clear();
        self.buffer.extend_from_slice(&other.buffer);
        self.dims = other.dims;
    }
}
