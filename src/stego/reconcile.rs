use crate::frame::{Dimensions, RgbFrame};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

pub const MAX_FILLER_RUN: u32 = 300;

struct FillerRun {
    pixel: [u8; 3],
    remaining: u32,
}

/// Stretches a message frame to the cloak's dimensions.
///
/// The message keeps its native pixels in the top left corner, everything outside is
/// painted with runs of pixels sampled from four seed positions of the message.
pub struct FrameReconciler {
    rng: ChaCha20Rng,
}

impl FrameReconciler {
    pub fn new(seed: u64) -> Self { Self::from_rng(ChaCha20Rng::seed_from_u64(seed)) }
    pub fn from_rng(rng: ChaCha20Rng) -> Self { Self { rng } }

    /// Reconciles `message` in place, reallocating it when the dimensions differ.
    pub fn reconcile(&mut self, message: &mut RgbFrame, target: Dimensions) {
        if message.dims() == target {
            return;
        }
        let mut output = RgbFrame::new(target);
        self.reconcile_into(message, &mut output);
        *message = output;
    }

    /// Writes the reconciled version of `message` into `output`, which keeps its
    /// dimensions and allocation.
    pub fn reconcile_into(&mut self, message: &RgbFrame, output: &mut RgbFrame) {
        if message.dims() == output.dims() {
            output.copy_from(message);
            return;
        }
        self.paint(message, Some(message.dims()), output);
    }

    /// Paints all of `output` with filler runs drawn from the seed positions of
    /// `message`. No message pixel is copied verbatim.
    pub fn fill_into(&mut self, message: &RgbFrame, output: &mut RgbFrame) {
        self.paint(message, None, output);
    }

    // pixels inside `native` are copied, everything else is filler
    fn paint(&mut self, message: &RgbFrame, native: Option<Dimensions>, output: &mut RgbFrame) {
        let target = output.dims();
        let mut run = FillerRun { pixel: [0; 3], remaining: 0 };
        for (pixel_index, out) in output.as_mut_slice().chunks_exact_mut(3).enumerate() {
            let x = pixel_index as u64 % target.width;
            let y = pixel_index as u64 / target.width;
            if native.map_or(false, |native| native.contains(x, y)) {
                out.copy_from_slice(&message.pixel(x, y));
            } else {
                if run.remaining == 0 {
                    run.remaining = self.rng.gen_range(1..=MAX_FILLER_RUN);
                    let quadrant = self.rng.gen_range(0..4u32);
                    run.pixel = filler_seed(message, quadrant);
                }
                out.copy_from_slice(&run.pixel);
                run.remaining -= 1;
            }
        }
    }
}

// the seeds sit at byte (not pixel) offsets: left and middle of the first two rows
pub(crate) fn filler_seed(message: &RgbFrame, quadrant: u32) -> [u8; 3] {
    let row_bytes = message.dims().width as usize * 3;
    let quadrant = quadrant as usize;
    let offset = quadrant + (row_bytes / 2) * (quadrant % 2) + (quadrant / 2) * row_bytes;

    let bytes = message.as_slice();
    let offset = offset.min(bytes.len() - 3);
    [bytes[offset], bytes[offset + 1], bytes[offset + 2]]
}

#[cfg(test)]
mod tests {
    use crate::{
        frame::{Dimensions, RgbFrame},
        stego::reconcile::{filler_seed, FrameReconciler},
    };

    fn gradient(dims: Dimensions) -> RgbFrame {
        let bytes = (0..dims.required_bytes()).map(|i| (i % 251) as u8).collect();
        RgbFrame::from_bytes(bytes, dims).unwrap()
    }

    #[test]
    fn test_message_region_is_preserved() {
        let cloak_dims = Dimensions::new(100, 100).unwrap();
        let original = gradient(Dimensions::new(40, 30).unwrap());
        let mut message = original.clone();

        FrameReconciler::new(0).reconcile(&mut message, cloak_dims);

        assert_eq!(message.dims(), cloak_dims);
        for y in 0..30 {
            for x in 0..40 {
                assert_eq!(message.pixel(x, y), original.pixel(x, y));
            }
        }
    }

    #[test]
    fn test_filler_is_drawn_from_message_bytes() {
        let cloak_dims = Dimensions::new(100, 100).unwrap();
        let original = gradient(Dimensions::new(40, 30).unwrap());
        let mut message = original.clone();

        FrameReconciler::new(0).reconcile(&mut message, cloak_dims);

        let triples: Vec<&[u8]> = original.as_slice().windows(3).collect();
        for y in 0..100 {
            for x in 0..100 {
                if x < 40 && y < 30 {
                    continue;
                }
                let pixel = message.pixel(x, y);
                assert!(triples.contains(&&pixel[..]), "({x}, {y}) = {pixel:?}");
            }
        }
    }

    #[test]
    fn test_filler_comes_in_runs() {
        let mut message = gradient(Dimensions::new(8, 2).unwrap());
        FrameReconciler::new(3).reconcile(&mut message, Dimensions::new(64, 64).unwrap());

        let filler: Vec<[u8; 3]> = (2..64)
            .flat_map(|y| (0..64).map(move |x| (x, y)))
            .map(|(x, y)| message.pixel(x, y))
            .collect();
        let changes = filler.windows(2).filter(|pair| pair[0] != pair[1]).count();
        assert!(changes > 0);
        assert!(changes < filler.len() / 2);
    }

    #[test]
    fn test_same_seed_gives_same_filler() {
        let cloak_dims = Dimensions::new(64, 48).unwrap();
        let source = gradient(Dimensions::new(16, 16).unwrap());

        let mut first = source.clone();
        let mut second = source.clone();
        FrameReconciler::new(42).reconcile(&mut first, cloak_dims);
        FrameReconciler::new(42).reconcile(&mut second, cloak_dims);
        assert_eq!(first, second);
    }

    #[test]
    fn test_generator_state_carries_across_frames() {
        let cloak_dims = Dimensions::new(64, 48).unwrap();
        let source = gradient(Dimensions::new(16, 16).unwrap());
        let mut reconciler = FrameReconciler::new(42);

        let mut first = source.clone();
        let mut second = source.clone();
        reconciler.reconcile(&mut first, cloak_dims);
        reconciler.reconcile(&mut second, cloak_dims);
        assert_ne!(first, second);
    }

    #[test]
    fn test_matching_dimensions_are_untouched() {
        let dims = Dimensions::new(8, 8).unwrap();
        let original = gradient(dims);
        let mut message = original.clone();
        FrameReconciler::new(0).reconcile(&mut message, dims);
        assert_eq!(message, original);
    }

    #[test]
    fn test_reconcile_into_reuses_output() {
        let source = gradient(Dimensions::new(16, 16).unwrap());
        let mut in_place = source.clone();
        FrameReconciler::new(7).reconcile(&mut in_place, Dimensions::new(32, 24).unwrap());

        let mut output = RgbFrame::new(Dimensions::new(32, 24).unwrap());
        FrameReconciler::new(7).reconcile_into(&source, &mut output);
        assert_eq!(output, in_place);

        let mut same_size = RgbFrame::new(source.dims());
        FrameReconciler::new(7).reconcile_into(&source, &mut same_size);
        assert_eq!(same_size, source);
    }

    #[test]
    fn test_larger_message_is_cropped() {
        let original = gradient(Dimensions::new(10, 10).unwrap());
        let mut message = original.clone();
        FrameReconciler::new(0).reconcile(&mut message, Dimensions::new(4, 3).unwrap());
        assert_eq!(message.dims(), Dimensions::new(4, 3).unwrap());
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(message.pixel(x, y), original.pixel(x, y));
            }
        }
    }

    #[test]
    fn test_single_pixel_message_stays_in_bounds() {
        let mut message = RgbFrame::filled(Dimensions::new(1, 1).unwrap(), [9, 8, 7]);
        FrameReconciler::new(0).reconcile(&mut message, Dimensions::new(5, 5).unwrap());
        for pixel in message.as_slice().chunks_exact(3) {
            assert_eq!(pixel, &[9, 8, 7]);
        }
    }

    #[test]
    fn test_seed_offsets_are_byte_offsets() {
        // 2x2 blue: bytes 0 0 255 | 0 0 255 / 0 0 255 | 0 0 255
        let blue = RgbFrame::filled(Dimensions::new(2, 2).unwrap(), [0, 0, 255]);
        assert_eq!(filler_seed(&blue, 0), [0, 0, 255]);
        assert_eq!(filler_seed(&blue, 1), [0, 255, 0]);
        assert_eq!(filler_seed(&blue, 2), [255, 0, 0]);
        // offset 12 is clamped to the last pixel
        assert_eq!(filler_seed(&blue, 3), [0, 0, 255]);

        let message = gradient(Dimensions::new(4, 2).unwrap());
        assert_eq!(filler_seed(&message, 0), [0, 1, 2]);
        assert_eq!(filler_seed(&message, 1), [7, 8, 9]);
        assert_eq!(filler_seed(&message, 2), [14, 15, 16]);
        assert_eq!(filler_seed(&message, 3), [21, 22, 23]);
    }

    #[test]
    fn test_fill_into_uses_only_seed_pixels() {
        let message = gradient(Dimensions::new(4, 2).unwrap());
        let seeds: Vec<[u8; 3]> = (0..4).map(|quadrant| filler_seed(&message, quadrant)).collect();

        let mut reconciler = FrameReconciler::new(9);
        let mut output = RgbFrame::new(Dimensions::new(24, 24).unwrap());
        reconciler.fill_into(&message, &mut output);

        assert_eq!(output.dims(), Dimensions::new(24, 24).unwrap());
        for pixel in output.as_slice().chunks_exact(3) {
            assert!(seeds.iter().any(|seed| seed == pixel), "{pixel:?}");
        }
        // the top left corner is not a copy of the message
        assert!((1..4).any(|x| output.pixel(x, 0) != message.pixel(x, 0)));
    }

    #[test]
    fn test_fill_into_is_deterministic_and_advances() {
        let message = gradient(Dimensions::new(4, 2).unwrap());
        let dims = Dimensions::new(40, 40).unwrap();

        let mut first = FrameReconciler::new(1);
        let mut second = FrameReconciler::new(1);
        let (mut a, mut b) = (RgbFrame::new(dims), RgbFrame::new(dims));
        first.fill_into(&message, &mut a);
        second.fill_into(&message, &mut b);
        assert_eq!(a, b);

        let mut draws: Vec<RgbFrame> = Vec::new();
        for _ in 0..8 {
            let mut next = RgbFrame::new(dims);
            first.fill_into(&message, &mut next);
            draws.push(next);
        }
        assert!(draws.iter().any(|frame| frame != &a));
    }
}
