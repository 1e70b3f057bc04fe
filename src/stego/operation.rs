use crate::{
    frame::RgbFrame,
    stego::bits::{from_bits, to_bits, BitString},
    util::error::CipherError,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// The per channel bit transform applied between a cloak value and a message (or key)
/// value.
///
/// `Embed` xors the message's high nibble into the cloak's low nibble. `Extract` xors the
/// key's low nibble into the low nibble and then swaps both nibbles, so with the
/// original cloak as key the hidden high nibble ends up in the high nibble of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CipherOperation {
    Embed,
    Extract,
}

impl CipherOperation {
    pub fn apply(self, message: &BitString, cloak: &BitString) -> BitString {
        let mut result = *cloak;
        let digits = result.digits_mut();
        match self {
            Self::Embed => {
                for lsd in 4..8 {
                    digits[lsd] ^= message.digits()[lsd - 4];
                }
            }
            Self::Extract => {
                for lsd in 4..8 {
                    digits[lsd] ^= message.digits()[lsd];
                }
                let (high, low) = digits.split_at_mut(4);
                high.swap_with_slice(low);
            }
        }
        result
    }

    pub fn apply_to_value(self, message: u8, cloak: u8) -> u8 {
        from_bits(&self.apply(&to_bits(message), &to_bits(cloak)))
    }

    /// Runs the operation over every channel of every pixel, writing into `cloak`.
    pub fn apply_to_frame(self, cloak: &mut RgbFrame, message: &RgbFrame) -> Result<()> {
        if cloak.dims() != message.dims() {
            return Err(CipherError::DimensionMismatch {
                left: cloak.dims().to_string(),
                right: message.dims().to_string(),
            }
            .into());
        }

        for (cloak_value, message_value) in
            cloak.as_mut_slice().iter_mut().zip(message.as_slice().iter())
        {
            *cloak_value = self.apply_to_value(*message_value, *cloak_value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        frame::{Dimensions, RgbFrame},
        stego::{bits::to_bits, operation::CipherOperation},
    };

    fn embed(message: u8, cloak: u8) -> u8 { CipherOperation::Embed.apply_to_value(message, cloak) }
    fn extract(message: u8, cloak: u8) -> u8 {
        CipherOperation::Extract.apply_to_value(message, cloak)
    }

    #[test]
    fn test_embed_only_touches_low_nibble() {
        assert_eq!(embed(0x00, 0xff), 0xff);
        assert_eq!(embed(0xff, 0x00), 0x0f);
        assert_eq!(embed(0x3c, 0xa5), 0xa6);
        assert_eq!(embed(0x34, 0x12), 0x11);
        for message in 0..=255u8 {
            for cloak in 0..=255u8 {
                assert_eq!(embed(message, cloak) & 0xf0, cloak & 0xf0);
            }
        }
    }

    #[test]
    fn test_extract_swaps_nibbles() {
        assert_eq!(extract(0x00, 0x0f), 0xf0);
        assert_eq!(extract(0xff, 0xff), 0x0f);
        assert_eq!(extract(0x0f, 0xa5), 0xaa);
        assert_eq!(extract(0x00, 0x12), 0x21);
    }

    #[test]
    fn test_embed_then_extract_with_same_message() {
        let cases = [
            (0x00u8, 0xffu8, 0xffu8),
            (0xff, 0x00, 0x00),
            (0x3c, 0xa5, 0xaa),
            (0x34, 0x12, 0x51),
            (0x80, 0x00, 0x80),
            (0x01, 0x00, 0x10),
        ];
        for (message, cloak, expected) in cases {
            assert_eq!(extract(message, embed(message, cloak)), expected, "{message:#x} {cloak:#x}");
        }
    }

    #[test]
    fn test_bit_string_path_matches_bitwise_formula() {
        for message in 0..=255u8 {
            for cloak in 0..=255u8 {
                let embedded = (cloak & 0xf0) | ((cloak ^ (message >> 4)) & 0x0f);
                assert_eq!(embed(message, cloak), embedded);
                let mixed = (cloak & 0xf0) | ((cloak ^ message) & 0x0f);
                assert_eq!(extract(message, cloak), mixed.rotate_left(4));
            }
        }
    }

    #[test]
    fn test_extract_with_cloak_as_key_recovers_high_nibble() {
        for message in 0..=255u8 {
            for cloak in 0..=255u8 {
                let recovered = extract(cloak, embed(message, cloak));
                assert_eq!(recovered & 0xf0, message & 0xf0);
            }
        }
    }

    #[test]
    fn test_red_cloak_blue_message() {
        let cloak_dims = Dimensions::new(4, 4).unwrap();
        let mut cloak = RgbFrame::filled(cloak_dims, [255, 0, 0]);
        let message = RgbFrame::filled(cloak_dims, [0, 0, 255]);
        let key = cloak.clone();

        CipherOperation::Embed.apply_to_frame(&mut cloak, &message).unwrap();
        assert_eq!(to_bits(cloak.pixel(0, 0)[0]).low_nibble(), &[1, 1, 1, 1]);
        assert_eq!(to_bits(cloak.pixel(0, 0)[2]).low_nibble(), &[1, 1, 1, 1]);
        assert_eq!(cloak.pixel(3, 3), [0xff, 0x00, 0x0f]);

        CipherOperation::Extract.apply_to_frame(&mut cloak, &key).unwrap();
        assert_eq!(cloak.pixel(1, 1), [0x0f, 0x00, 0xf0]);
    }

    #[test]
    fn test_apply_to_frame_rejects_mismatched_frames() {
        let mut cloak = RgbFrame::new(Dimensions::new(4, 4).unwrap());
        let message = RgbFrame::new(Dimensions::new(2, 2).unwrap());
        assert!(CipherOperation::Embed.apply_to_frame(&mut cloak, &message).is_err());
    }
}
