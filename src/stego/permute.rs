//! Recursive quadrant permutation of pixel coordinates.
//!
//! Every round halves the current region and rotates its four quadrants by one position:
//! clockwise for positive rounds, counter clockwise for negative ones. Later rounds work
//! inside the quadrant the pixel started in, so `n` rounds shuffle `4^n` blocks. When
//! width and height are divisible by `2^|rounds|` the two directions undo each other
//! exactly. Other sizes degenerate (some targets collide) and are processed anyway.

use crate::{
    frame::{Dimensions, RgbFrame},
    util::error::CipherError,
};
use anyhow::Result;
use tracing::warn;

// indexed by [right half][bottom half]
const QUADRANT: [[usize; 2]; 2] = [[0, 3], [1, 2]];
const TRANSLATION: [(i64, i64); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Where the pixel at (`x`, `y`) lands after `rounds` rounds.
pub fn destination(dims: Dimensions, rounds: i32, x: u64, y: u64) -> (u64, u64) {
    let (x, y) = (x as i64, y as i64);
    let mut location = (x, y);
    let mut offset = (0i64, 0i64);
    let mut region = (dims.width as i64, dims.height as i64);

    for _ in 0..rounds.unsigned_abs() {
        region = (region.0 / 2, region.1 / 2);
        let right = x >= offset.0 + region.0;
        let bottom = y >= offset.1 + region.1;

        let mut quadrant = QUADRANT[right as usize][bottom as usize];
        if rounds < 0 {
            quadrant = (quadrant + 1) % 4;
        }

        let (dx, dy) = TRANSLATION[quadrant];
        location.0 += dx * region.0;
        location.1 += dy * region.1;

        offset.0 += right as i64 * region.0;
        offset.1 += bottom as i64 * region.1;
    }

    (location.0 as u64, location.1 as u64)
}

/// Permutation table for one frame geometry, computed once and applied to every frame
/// of a session.
pub struct CoordinatePermuter {
    dims: Dimensions,
    rounds: i32,
    // destination pixel index for every source pixel index
    destinations: Vec<usize>,
}

impl CoordinatePermuter {
    pub fn new(dims: Dimensions, rounds: i32) -> Self {
        if !dims.divisible_by_rounds(rounds.unsigned_abs()) {
            warn!(
                "{} is not divisible by 2^{}, the coordinate permutation will not be reversible",
                dims,
                rounds.unsigned_abs()
            );
        }

        let destinations = (0..dims.height)
            .flat_map(|y| (0..dims.width).map(move |x| (x, y)))
            .map(|(x, y)| {
                let (dest_x, dest_y) = destination(dims, rounds, x, y);
                debug_assert!(dims.contains(dest_x, dest_y));
                (dest_y * dims.width + dest_x) as usize
            })
            .collect();

        Self { dims, rounds, destinations }
    }

    pub fn dims(&self) -> Dimensions { self.dims }
    pub fn rounds(&self) -> i32 { self.rounds }
    pub fn inverse(&self) -> Self { Self::new(self.dims, self.rounds.saturating_neg()) }

    fn check_dims(&self, frame: &RgbFrame) -> Result<()> {
        if frame.dims() != self.dims {
            return Err(CipherError::DimensionMismatch {
                left: frame.dims().to_string(),
                right: self.dims.to_string(),
            }
            .into());
        }
        Ok(())
    }

    pub fn permute(&self, frame: &mut RgbFrame) -> Result<()> {
        self.check_dims(frame)?;
        if self.rounds == 0 {
            return Ok(());
        }

        let mut permuted = RgbFrame::new(self.dims);
        self.permute_into(frame, &mut permuted)?;
        *frame = permuted;
        Ok(())
    }

    /// Writes the permuted `source` into `target`, reusing `target`'s allocation.
    pub fn permute_into(&self, source: &RgbFrame, target: &mut RgbFrame) -> Result<()> {
        self.check_dims(source)?;

        // untargeted pixels (only under degenerate sizes) keep their old value
        target.copy_from(source);
        if self.rounds == 0 {
            return Ok(());
        }

        let (from, to) = (source.as_slice(), target.as_mut_slice());
        for (src, dst) in self.destinations.iter().enumerate() {
            let (src, dst) = (src * 3, dst * 3);
            to[dst..dst + 3].copy_from_slice(&from[src..src + 3]);
        }
        Ok(())
    }
}
