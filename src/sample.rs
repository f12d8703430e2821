//! Decoding of the `DATAX0..DATAZ1` output registers.

/// Sensitivity in full-resolution mode (and ±2 g in 10-bit mode), in mg/LSB.
pub const SENSITIVITY_MG_PER_LSB: f32 = 3.9;

/// [`SENSITIVITY_MG_PER_LSB`] in tenths of mg, for integer arithmetic.
pub const SENSITIVITY_TENTH_MG_PER_LSB: i32 = 39;

/// Number of consecutive bytes spanning the X, Y, Z output registers.
pub const RAW_AXIS_BYTES: usize = 6;

/// One acceleration reading.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Raw X, Y, Z counts.
    pub raw: [i16; 3],
    /// X, Y, Z acceleration in g.
    pub g: [f32; 3],
}

impl Sample {
    /// Builds a sample from raw counts and the active scale factor.
    pub fn from_raw(raw: [i16; 3], scale_mg_per_lsb: f32) -> Self {
        Self {
            raw,
            g: raw.map(|counts| counts_to_g(counts, scale_mg_per_lsb)),
        }
    }

    /// Decodes a burst read starting at `DATAX0`.
    pub fn from_bytes(bytes: &[u8; RAW_AXIS_BYTES], scale_mg_per_lsb: f32) -> Self {
        Self::from_raw(decode_xyz(bytes), scale_mg_per_lsb)
    }
}

/// Combines one axis register pair; the sensor outputs right-justified two's complement.
#[inline]
pub const fn decode_axis(lsb: u8, msb: u8) -> i16 {
    i16::from_le_bytes([lsb, msb])
}

/// Decodes the six output bytes into X, Y, Z counts.
pub const fn decode_xyz(bytes: &[u8; RAW_AXIS_BYTES]) -> [i16; 3] {
    [
        decode_axis(bytes[0], bytes[1]),
        decode_axis(bytes[2], bytes[3]),
        decode_axis(bytes[4], bytes[5]),
    ]
}

/// Converts raw counts into g.
#[inline]
pub fn counts_to_g(raw: i16, scale_mg_per_lsb: f32) -> f32 {
    raw as f32 * scale_mg_per_lsb / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_positive_and_negative_pairs() {
        assert_eq!(decode_axis(0x00, 0x01), 256);
        assert_eq!(decode_axis(0xFF, 0x00), 255);
        assert_eq!(decode_axis(0xFF, 0xFF), -1);
        assert_eq!(decode_axis(0x00, 0xFF), -256);
        assert_eq!(decode_axis(0x00, 0x80), i16::MIN);
        assert_eq!(decode_axis(0xFF, 0x7F), i16::MAX);
    }

    #[test]
    fn decode_sign_extends_ten_bit_readings() {
        // -512 counts, the most negative value in 10-bit ±2 g mode.
        assert_eq!(decode_axis(0x00, 0xFE), -512);
        // -1 g at full resolution.
        assert_eq!(decode_axis(0x00, 0xFF), -256);
    }

    #[test]
    fn decode_every_pair_matches_reference() {
        for msb in 0..=u8::MAX {
            for lsb in (0..=u8::MAX).step_by(17) {
                let expected = (((msb as u16) << 8) | lsb as u16) as i16;
                assert_eq!(decode_axis(lsb, msb), expected);
            }
        }
    }

    #[test]
    fn decode_xyz_orders_axes() {
        let bytes = [0x10, 0x00, 0xF0, 0xFF, 0x00, 0x01];
        assert_eq!(decode_xyz(&bytes), [16, -16, 256]);
    }

    #[test]
    fn conversion_applies_sensitivity() {
        for raw in [0i16, 1, -1, 256, -256, 4095, -4096, i16::MAX, i16::MIN] {
            assert_eq!(
                counts_to_g(raw, SENSITIVITY_MG_PER_LSB),
                raw as f32 * 3.9 / 1000.0
            );
        }
        assert!((counts_to_g(256, SENSITIVITY_MG_PER_LSB) - 0.9984).abs() < 1e-6);
    }

    #[test]
    fn sample_from_bytes() {
        let sample = Sample::from_bytes(&[0x00, 0x01, 0x00, 0xFF, 0x00, 0x00], 3.9);
        assert_eq!(sample.raw, [256, -256, 0]);
        assert_eq!(sample.g[0], -sample.g[1]);
        assert_eq!(sample.g[2], 0.0);
    }
}
