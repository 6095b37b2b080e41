/* Fixed integer tables shared by the reconstruction kernels. */

/// Magnitudes of `64·√2·cos(a·π/64)` for `a` in `0..=32`, as used by the
/// integer DCT (entry 0 is the flat DC row instead).
#[rustfmt::skip]
const DCT_COS: [i32; 33] = [
    64, 90, 90, 90, 89, 88, 87, 85, 83, 82, 80, 78, 75, 73, 70, 67,
    64, 61, 57, 54, 50, 46, 43, 38, 36, 31, 25, 22, 18, 13,  9,  4,
     0,
];

lazy_static! {
    /// 32-point integer DCT-II basis, row `k` holds frequency `k`.
    ///
    /// Smaller transforms use every `32 / N`-th row.
    pub static ref DCT_MATRIX_32: [[i32; 32]; 32] = {
        let mut m = [[0i32; 32]; 32];
        for (k, row) in m.iter_mut().enumerate() {
            for (n, v) in row.iter_mut().enumerate() {
                *v = if k == 0 {
                    64
                } else {
                    let a = ((2 * n + 1) * k) % 128;
                    match a {
                        0..=32 => DCT_COS[a],
                        33..=64 => -DCT_COS[64 - a],
                        65..=96 => -DCT_COS[a - 64],
                        _ => DCT_COS[128 - a],
                    }
                };
            }
        }
        m
    };
}

/// Kernel of the 4-point luma DST.
pub const DST4_KERNEL: [i32; 4] = [29, 55, 74, 84];

pub const QPEL_TAPS: usize = 8;
pub const EPEL_TAPS: usize = 4;

/// Quarter-sample luma interpolation filters, indexed by phase 1..3.
#[rustfmt::skip]
pub static TBL_QPEL_FILTER: [[i32; QPEL_TAPS]; 3] = [
    [ -1,  4, -10, 58, 17,  -5,  1,  0 ],
    [ -1,  4, -11, 40, 40, -11,  4, -1 ],
    [  0,  1,  -5, 17, 58, -10,  4, -1 ],
];

/// Eighth-sample chroma interpolation filters, indexed by phase 1..7.
#[rustfmt::skip]
pub static TBL_EPEL_FILTER: [[i32; EPEL_TAPS]; 7] = [
    [ -2, 58, 10, -2 ],
    [ -4, 54, 16, -2 ],
    [ -6, 46, 28, -4 ],
    [ -4, 36, 36, -4 ],
    [ -4, 28, 46, -6 ],
    [ -2, 16, 54, -4 ],
    [ -2, 10, 58, -2 ],
];

/// SAO edge category from `2 + sign0 + sign1`.
pub const SAO_EDGE_IDX: [usize; 5] = [1, 2, 0, 3, 4];

/// Neighbour offsets `(dx, dy)` per edge class: horizontal, vertical, 135°, 45°.
#[rustfmt::skip]
pub const SAO_EDGE_POS: [[(isize, isize); 2]; 4] = [
    [ (-1,  0), ( 1, 0) ],
    [ ( 0, -1), ( 0, 1) ],
    [ (-1, -1), ( 1, 1) ],
    [ ( 1, -1), (-1, 1) ],
];

pub const NTAPS_LUMA: usize = 8;
pub const NTAPS_CHROMA: usize = 4;

/// 16-phase 8-tap filter bank for inter-layer luma resampling.
#[rustfmt::skip]
pub static TBL_UPSAMPLE_LUMA: [[i32; NTAPS_LUMA]; 16] = [
    [  0, 0,   0, 64,  0,   0, 0,  0 ],
    [  0, 1,  -3, 63,  4,  -2, 1,  0 ],
    [ -1, 2,  -5, 62,  8,  -3, 1,  0 ],
    [ -1, 3,  -8, 60, 13,  -4, 1,  0 ],
    [ -1, 4, -10, 58, 17,  -5, 1,  0 ],
    [ -1, 4, -11, 52, 26,  -8, 3, -1 ],
    [ -1, 3,  -9, 47, 31, -10, 4, -1 ],
    [ -1, 4, -11, 45, 34, -10, 4, -1 ],
    [ -1, 4, -11, 40, 40, -11, 4, -1 ],
    [ -1, 4, -10, 34, 45, -11, 4, -1 ],
    [ -1, 4, -10, 31, 47,  -9, 3, -1 ],
    [ -1, 3,  -8, 26, 52, -11, 4, -1 ],
    [  0, 1,  -5, 17, 58, -10, 4, -1 ],
    [  0, 1,  -4, 13, 60,  -8, 3, -1 ],
    [  0, 1,  -3,  8, 62,  -5, 2, -1 ],
    [  0, 1,  -2,  4, 63,  -3, 1,  0 ],
];

/// 16-phase 4-tap filter bank for inter-layer chroma resampling.
#[rustfmt::skip]
pub static TBL_UPSAMPLE_CHROMA: [[i32; NTAPS_CHROMA]; 16] = [
    [  0, 64,  0,  0 ],
    [ -2, 62,  4,  0 ],
    [ -2, 58, 10, -2 ],
    [ -4, 56, 14, -2 ],
    [ -4, 54, 16, -2 ],
    [ -6, 52, 20, -2 ],
    [ -6, 46, 28, -4 ],
    [ -4, 42, 30, -4 ],
    [ -4, 36, 36, -4 ],
    [ -4, 30, 42, -4 ],
    [ -4, 28, 46, -6 ],
    [ -2, 20, 52, -6 ],
    [ -2, 16, 54, -4 ],
    [ -2, 14, 56, -4 ],
    [  0, 10, 58, -4 ],
    [  0,  4, 62, -2 ],
];

/// Transform subset per intra prediction mode, vertical axis.
#[rustfmt::skip]
pub const EMT_TR_SET_V: [usize; 35] = [
    2, 1, 0, 1, 0, 1, 0, 1, 0, 0, 0, 0, 0, 1, 0, 1, 0, 1,
    0, 1, 0, 1, 0, 1, 2, 2, 2, 2, 2, 1, 0, 1, 0, 1, 0,
];

/// Transform subset per intra prediction mode, horizontal axis.
#[rustfmt::skip]
pub const EMT_TR_SET_H: [usize; 35] = [
    2, 1, 0, 1, 0, 1, 0, 1, 2, 2, 2, 2, 2, 1, 0, 1, 0, 1,
    0, 1, 0, 1, 0, 1, 0, 0, 0, 0, 0, 1, 0, 1, 0, 1, 0,
];
