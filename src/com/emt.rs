use super::tbl::*;
use super::util::*;
use super::*;
use crate::api::frame::*;

use std::f64::consts::PI;

/// Separable kernels of the extended multiple transform set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmtType {
    Dct2,
    Dct5,
    Dct8,
    Dst1,
    Dst7,
}

const EMT_TYPES: usize = 5;
const EMT_SIZES: usize = MAX_EMT_LOG2 - MIN_TR_LOG2 + 1;

const EMT_MATRIX_SHIFT: u32 = 6;
/* extra fixed-point precision of the basis over the standard DCT */
const EMT_TRANS_PREC: u32 = 2;
const EMT_SHIFT_V: u32 = EMT_MATRIX_SHIFT + 1 + EMT_TRANS_PREC;

impl EmtType {
    #[inline]
    fn idx(self) -> usize {
        self as usize
    }

    /// Basis value of frequency `k` at sample `n` for an `size`-point kernel.
    fn basis(self, k: usize, n: usize, size: usize) -> f64 {
        let (k, n, sz) = (k as f64, n as f64, size as f64);
        match self {
            EmtType::Dct2 => {
                let w0 = if k == 0.0 { 0.5f64.sqrt() } else { 1.0 };
                w0 * (2.0 / sz).sqrt() * (PI * (n + 0.5) * k / sz).cos()
            }
            EmtType::Dct5 => {
                let w0 = if k == 0.0 { 0.5f64.sqrt() } else { 1.0 };
                let w1 = if n == 0.0 { 0.5f64.sqrt() } else { 1.0 };
                w0 * w1 * (2.0 / (sz - 0.5)).sqrt() * (2.0 * PI * k * n / (2.0 * sz - 1.0)).cos()
            }
            EmtType::Dct8 => {
                (2.0 / (sz + 0.5)).sqrt() * (PI * (k + 0.5) * (n + 0.5) / (sz + 0.5)).cos()
            }
            EmtType::Dst1 => {
                (2.0 / (sz + 1.0)).sqrt() * (PI * (n + 1.0) * (k + 1.0) / (sz + 1.0)).sin()
            }
            EmtType::Dst7 => {
                (2.0 / (sz + 0.5)).sqrt() * (PI * (k + 0.5) * (n + 1.0) / (sz + 0.5)).sin()
            }
        }
    }

    fn max_log2(self) -> usize {
        match self {
            EmtType::Dct2 => MAX_EMT_LOG2,
            _ => MAX_TR_LOG2,
        }
    }
}

const ALL_EMT_TYPES: [EmtType; EMT_TYPES] = [
    EmtType::Dct2,
    EmtType::Dct5,
    EmtType::Dct8,
    EmtType::Dst1,
    EmtType::Dst7,
];

fn gen_basis(ty: EmtType, size: usize) -> Vec<i32> {
    let scale = (size as f64).sqrt() * f64::from(1u32 << (EMT_MATRIX_SHIFT + EMT_TRANS_PREC));
    let mut m = Vec::with_capacity(size * size);
    for k in 0..size {
        for n in 0..size {
            let v = ty.basis(k, n, size);
            m.push((scale * v + if v > 0.0 { 0.5 } else { -0.5 }) as i32);
        }
    }
    m
}

lazy_static! {
    /// Integer basis per kernel and size: `[type][log2_size - 2]`, row `k`
    /// holds frequency `k`. Sizes a kernel does not define are empty.
    static ref EMT_BASIS: Vec<Vec<Vec<i32>>> = ALL_EMT_TYPES
        .iter()
        .map(|&ty| {
            (MIN_TR_LOG2..=MAX_EMT_LOG2)
                .map(|log2| {
                    if log2 <= ty.max_log2() {
                        gen_basis(ty, 1 << log2)
                    } else {
                        Vec::new()
                    }
                })
                .collect()
        })
        .collect();
}

/// Fixed-point basis of `ty` for `1 << log2_size` points.
///
/// Panics for a pairing with no definition (only DCT-II reaches 64 points).
pub fn emt_basis(ty: EmtType, log2_size: usize) -> &'static [i32] {
    assert!(
        log2_size >= MIN_TR_LOG2 && log2_size <= ty.max_log2(),
        "{:?} has no {}-point definition",
        ty,
        1 << log2_size
    );
    debug_assert_eq!(EMT_BASIS.len(), EMT_TYPES);
    debug_assert_eq!(EMT_BASIS[ty.idx()].len(), EMT_SIZES);
    &EMT_BASIS[ty.idx()][log2_size - MIN_TR_LOG2]
}

/// One transposing 1-D pass: `dst[i * n + j] = clip(sum_k src[k * line + i] * m[k * n + j])`.
///
/// With `zo != 0` on 32/64-point kernels only the low half of the frequencies
/// contributes, and `zo == 2` computes the first half of the lines only.
fn emt_pass(
    src: &[i16],
    dst: &mut [i16],
    m: &[i32],
    n: usize,
    line: usize,
    shift: u32,
    zo: u8,
    min: i64,
    max: i64,
) {
    let zero_out = zo != 0 && n >= MAX_TR_SIZE;
    let k_end = if zero_out { n >> 1 } else { n };
    let lines = if zero_out && zo == 2 { line >> 1 } else { line };
    let rnd = if shift == 0 { 0 } else { 1i64 << (shift - 1) };

    for i in 0..lines {
        let out = &mut dst[i * n..(i + 1) * n];
        for (j, o) in out.iter_mut().enumerate() {
            let mut sum = 0i64;
            for k in 0..k_end {
                sum += i64::from(src[k * line + i]) * i64::from(m[k * n + j]);
            }
            *o = clip3(min, max, (sum + rnd) >> shift) as i16;
        }
    }
    for v in dst[lines * n..line * n].iter_mut() {
        *v = 0;
    }
}

/// Two-pass EMT inverse transform, in place: vertical kernel first, then the
/// horizontal one. Every intermediate and output sample is clipped to
/// `[-2^range, 2^range - 1]`.
pub fn idct_emt<BD: BitDepth>(
    coeffs: &mut [i16],
    log2_size: usize,
    max_log2_tr_dynamic_range: u32,
    h: EmtType,
    v: EmtType,
    zo_h: u8,
    zo_v: u8,
) {
    let range = max_log2_tr_dynamic_range;
    assert!(
        range >= MIN_LOG2_TR_DYNAMIC_RANGE && range <= MAX_LOG2_TR_DYNAMIC_RANGE,
        "dynamic range {} does not fit i16 coefficients",
        range
    );
    let n = 1 << log2_size;
    let mv = emt_basis(v, log2_size);
    let mh = emt_basis(h, log2_size);
    assert!(EMT_MATRIX_SHIFT + range + EMT_TRANS_PREC > BD::BITS);
    let shift_h = EMT_MATRIX_SHIFT + range - 1 + EMT_TRANS_PREC - BD::BITS;
    let min = -(1i64 << range);
    let max = (1i64 << range) - 1;

    let mut tmp = vec![0i16; n * n];
    emt_pass(&coeffs[..n * n], &mut tmp, mv, n, n, EMT_SHIFT_V, zo_v, min, max);
    emt_pass(&tmp, &mut coeffs[..n * n], mh, n, n, shift_h, zo_h, min, max);
}

const EMT_INTRA_SUBSETS: [[EmtType; 2]; 3] = [
    [EmtType::Dst7, EmtType::Dct8],
    [EmtType::Dst7, EmtType::Dst1],
    [EmtType::Dst7, EmtType::Dct5],
];
const EMT_INTER_SUBSET: [EmtType; 2] = [EmtType::Dct8, EmtType::Dst7];

/// Kernels `(horizontal, vertical)` picked by the per-axis index bits of a
/// block; `intra_mode` is the luma intra prediction mode, `None` for inter.
pub fn emt_types(intra_mode: Option<usize>, idx_h: bool, idx_v: bool) -> (EmtType, EmtType) {
    match intra_mode {
        Some(mode) => (
            EMT_INTRA_SUBSETS[EMT_TR_SET_H[mode]][idx_h as usize],
            EMT_INTRA_SUBSETS[EMT_TR_SET_V[mode]][idx_v as usize],
        ),
        None => (
            EMT_INTER_SUBSET[idx_h as usize],
            EMT_INTER_SUBSET[idx_v as usize],
        ),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use interpolate_name::interpolate_test;
    use pretty_assertions::assert_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    #[test]
    fn dct2_basis_is_scaled_standard_dct() {
        // rounded cosine basis at 256 * sqrt(4), not 4x the integer 83/36 matrix
        assert_eq!(emt_basis(EmtType::Dct2, 2), &[
            256, 256, 256, 256,
            334, 139, -139, -334,
            256, -256, -256, 256,
            139, -334, 334, -139,
        ][..]);
        let m = emt_basis(EmtType::Dct2, 6);
        assert_eq!(m.len(), 64 * 64);
        assert!(m[..64].iter().all(|&v| v == 256));
    }

    #[test]
    fn dst7_4_point_basis() {
        assert_eq!(&emt_basis(EmtType::Dst7, 2)[..4], &[117, 219, 296, 336]);
    }

    #[test]
    #[should_panic]
    fn dst1_has_no_64_point_kernel() {
        let _ = emt_basis(EmtType::Dst1, 6);
    }

    #[test]
    fn rows_are_nearly_orthonormal() {
        for &ty in ALL_EMT_TYPES.iter() {
            for log2 in 2..=5 {
                let n = 1 << log2;
                let m = emt_basis(ty, log2);
                let norm = (n as f64) * 65536.0;
                for a in 0..n {
                    for b in 0..n {
                        let dot: i64 = (0..n)
                            .map(|i| i64::from(m[a * n + i]) * i64::from(m[b * n + i]))
                            .sum();
                        let want = if a == b { norm } else { 0.0 };
                        assert!(
                            (dot as f64 - want).abs() < norm * 0.01,
                            "{:?} {} rows {} {}",
                            ty,
                            n,
                            a,
                            b
                        );
                    }
                }
            }
        }
    }

    #[interpolate_test(dct2, EmtType::Dct2)]
    #[interpolate_test(dct5, EmtType::Dct5)]
    #[interpolate_test(dct8, EmtType::Dct8)]
    #[interpolate_test(dst1, EmtType::Dst1)]
    #[interpolate_test(dst7, EmtType::Dst7)]
    fn zero_block_stays_zero(ty: EmtType) {
        for log2 in 2..=5 {
            let n = 1 << log2;
            let mut c = vec![0i16; n * n];
            idct_emt::<Depth8>(&mut c, log2, 15, ty, ty, 0, 0);
            assert!(c.iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn outputs_respect_dynamic_range() {
        let mut rng = ChaChaRng::from_seed([5; 32]);
        for &range in &[9u32, 12, 15] {
            let mut c: Vec<i16> = (0..16 * 16).map(|_| rng.gen()).collect();
            idct_emt::<Depth10>(&mut c, 4, range, EmtType::Dst7, EmtType::Dct8, 0, 0);
            let lo = -(1i32 << range);
            let hi = (1i32 << range) - 1;
            assert!(c.iter().all(|&v| i32::from(v) >= lo && i32::from(v) <= hi));
        }
    }

    #[test]
    fn zero_out_matches_truncated_input() {
        let mut rng = ChaChaRng::from_seed([9; 32]);
        let n = 64;
        let mut c = vec![0i16; n * n];
        for y in 0..32 {
            for x in 0..32 {
                c[y * n + x] = rng.gen_range(-200, 200);
            }
        }
        let mut full = c.clone();
        idct_emt::<Depth8>(&mut full, 6, 15, EmtType::Dct2, EmtType::Dct2, 0, 0);
        let mut zo = c.clone();
        idct_emt::<Depth8>(&mut zo, 6, 15, EmtType::Dct2, EmtType::Dct2, 1, 2);
        assert_eq!(zo, full);
    }

    #[test]
    fn dc_of_emt_dct2_is_flat() {
        let mut c = vec![0i16; 8 * 8];
        c[0] = 256;
        idct_emt::<Depth8>(&mut c, 3, 15, EmtType::Dct2, EmtType::Dct2, 0, 0);
        assert!(c.iter().all(|&v| v == c[0]));
    }

    #[test]
    fn subset_selection() {
        // planar uses the DCT-V subset on both axes
        assert_eq!(emt_types(Some(0), false, true), (EmtType::Dst7, EmtType::Dct5));
        // mode 2: subset 0 both ways
        assert_eq!(emt_types(Some(2), true, true), (EmtType::Dct8, EmtType::Dct8));
        assert_eq!(emt_types(None, false, true), (EmtType::Dct8, EmtType::Dst7));
    }
}
