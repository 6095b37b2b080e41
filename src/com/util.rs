/* clipping within min and max */
#[inline(always)]
pub fn clip3<T: PartialOrd>(min_x: T, max_x: T, value: T) -> T {
    if value < min_x {
        min_x
    } else if value > max_x {
        max_x
    } else {
        value
    }
}

#[inline(always)]
pub fn clip_i16(v: i32) -> i16 {
    clip3(i16::MIN as i32, i16::MAX as i32, v) as i16
}

/// `(value + 2^(bit-1)) >> bit`, with no rounding term when `bit` is 0.
#[inline(always)]
pub fn round_shift(value: i32, bit: u32) -> i32 {
    (value + (1 << bit >> 1)) >> bit
}

/// -1, 0 or 1 depending on how `a` compares with `b`.
#[inline(always)]
pub fn sign_cmp(a: i32, b: i32) -> i32 {
    (a > b) as i32 - (a < b) as i32
}
