#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of bytes in a binary descriptor (256 bits)
pub const DESCRIPTOR_BYTES: usize = 32;

/// 256-bit binary descriptor = 32 bytes
pub type Descriptor = [u8; DESCRIPTOR_BYTES];

/// Key-point ≙ FAST corner + orientation (radians), in level-0 coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    /// Corner strength reported by the detector
    pub response: f32,
    /// Pyramid level the keypoint was detected on
    pub octave: usize,
    /// Diameter of the described neighbourhood in level-0 pixels
    pub size: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            angle: 0.0,
            response: 0.0,
            octave: 0,
            size: 0.0,
        }
    }
}

/// Correspondence between a query descriptor and a candidate descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchPair {
    pub query_idx: usize,
    pub train_idx: usize,
    /// Hamming distance between the two descriptors
    pub distance: u32,
}

/// The two nearest candidates found for one query descriptor.
///
/// `second` is `None` when the candidate set holds a single descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KnnMatch {
    pub best: MatchPair,
    pub second: Option<MatchPair>,
}

/// Hamming distance between two packed descriptors (max 256)
#[inline]
pub fn hamming_distance(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x ^ y).count_ones())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hamming_extremes() {
        assert_eq!(hamming_distance(&[0; 32], &[0; 32]), 0);
        assert_eq!(hamming_distance(&[0; 32], &[0xff; 32]), 256);
    }

    #[test]
    fn test_hamming_single_bit() {
        let mut b = [0u8; 32];
        b[17] = 0b0001_0000;
        assert_eq!(hamming_distance(&[0; 32], &b), 1);
    }

    proptest! {
        #[test]
        fn hamming_is_symmetric(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
            prop_assert_eq!(hamming_distance(&a, &b), hamming_distance(&b, &a));
        }

        #[test]
        fn hamming_triangle_inequality(
            a in any::<[u8; 32]>(),
            b in any::<[u8; 32]>(),
            c in any::<[u8; 32]>(),
        ) {
            prop_assert!(
                hamming_distance(&a, &c) <= hamming_distance(&a, &b) + hamming_distance(&b, &c)
            );
        }
    }
}
