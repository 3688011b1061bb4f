/// Circular run detection on the 16-pixel FAST ring.
///
/// `mask` holds one bit per ring pixel, bit `i` for offset `i`. Returns true
/// when at least `min_count` consecutive bits are set, wrapping around.
pub fn has_consecutive_pixels(mask: u16, min_count: usize) -> bool {
    if min_count > 16 || min_count == 0 {
        return false;
    }

    // A run of n bits survives n-1 rotate-and-and steps
    let mut test_mask = mask;
    for i in 1..min_count {
        test_mask &= mask.rotate_left(i as u32);
        if test_mask == 0 {
            return false;
        }
    }

    test_mask != 0
}
