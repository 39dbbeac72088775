//! Bit-width arithmetic for bit-packed coefficient groups.
//!
//! Transform-like records (rectangles, matrices, color transforms, shape
//! edges) store a group of integers at one shared width, written once as a
//! small unsigned prefix. The width is the smallest one that represents
//! every member of the group.

/// Minimum two's-complement width for `value`, never less than 1.
///
/// | Value       | Width |
/// |-------------|-------|
/// | `0`         | 1     |
/// | `-1`        | 1     |
/// | `1`         | 2     |
/// | `-2`        | 2     |
/// | `255`       | 9     |
/// | `i32::MIN`  | 32    |
#[must_use]
pub fn signed_bits(value: i32) -> u32 {
    // value ^ (value >> 31) folds negatives onto their one's complement,
    // so both signs share the magnitude bit count; +1 for the sign bit.
    33 - (value ^ (value >> 31)).leading_zeros()
}

/// Minimum binary width for `value`, never less than 1.
#[must_use]
pub fn unsigned_bits(value: u32) -> u32 {
    (32 - value.leading_zeros()).max(1)
}

/// Shared width for a signed group: the maximum of [`signed_bits`] over
/// the group, or 1 for an empty group.
#[must_use]
pub fn max_signed_bits(values: &[i32]) -> u32 {
    values.iter().copied().map(signed_bits).max().unwrap_or(1)
}

/// Width used for style indices: 0 when there are no styles to index,
/// otherwise the binary width of the largest index.
#[must_use]
pub fn index_bits(count: usize) -> u32 {
    if count == 0 {
        0
    } else {
        // counts are bounded by u16 on the wire
        unsigned_bits(u32::try_from(count).unwrap_or(u32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_widths_at_boundaries() {
        assert_eq!(signed_bits(0), 1);
        assert_eq!(signed_bits(-1), 1);
        assert_eq!(signed_bits(1), 2);
        assert_eq!(signed_bits(-2), 2);
        assert_eq!(signed_bits(2), 3);
        assert_eq!(signed_bits(127), 8);
        assert_eq!(signed_bits(-128), 8);
        assert_eq!(signed_bits(128), 9);
        assert_eq!(signed_bits(i32::MAX), 32);
        assert_eq!(signed_bits(i32::MIN), 32);
    }

    #[test]
    fn unsigned_widths_never_zero() {
        assert_eq!(unsigned_bits(0), 1);
        assert_eq!(unsigned_bits(1), 1);
        assert_eq!(unsigned_bits(2), 2);
        assert_eq!(unsigned_bits(255), 8);
        assert_eq!(unsigned_bits(u32::MAX), 32);
    }

    #[test]
    fn group_width_is_the_maximum() {
        assert_eq!(max_signed_bits(&[0, 0, 0, 0]), 1);
        assert_eq!(max_signed_bits(&[0, 11000, 0, 8000]), 15);
        assert_eq!(max_signed_bits(&[-20, 3]), 6);
        assert_eq!(max_signed_bits(&[]), 1);
    }

    #[test]
    fn index_width_for_style_counts() {
        assert_eq!(index_bits(0), 0);
        assert_eq!(index_bits(1), 1);
        assert_eq!(index_bits(2), 2);
        assert_eq!(index_bits(3), 2);
        assert_eq!(index_bits(4), 3);
    }

    proptest::proptest! {
        #[test]
        fn signed_width_is_minimal(value in proptest::prelude::any::<i32>()) {
            let width = signed_bits(value);
            proptest::prop_assert!(width >= 1 && width <= 32);
            // fits in `width` bits
            let min = -(1i64 << (width - 1));
            let max = (1i64 << (width - 1)) - 1;
            proptest::prop_assert!(i64::from(value) >= min && i64::from(value) <= max);
            // does not fit in one bit fewer
            if width > 1 {
                let min = -(1i64 << (width - 2));
                let max = (1i64 << (width - 2)) - 1;
                proptest::prop_assert!(i64::from(value) < min || i64::from(value) > max);
            }
        }
    }
}
