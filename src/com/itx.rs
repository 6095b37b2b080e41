use super::emt::*;
use super::region::*;
use super::tbl::*;
use super::util::*;
use super::*;
use crate::api::frame::*;

pub const ITX_SHIFT1: u32 = 7; /* shift after 1st IT stage */

#[inline(always)]
fn itx_shift2<BD: BitDepth>() -> u32 {
    20 - BD::BITS /* shift after 2nd IT stage */
}

/// Direction of residual DPCM accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdpcmDir {
    Horizontal,
    Vertical,
}

/// Transform applied to a coefficient block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    /// Lossless: coefficients are the residual.
    Bypass,
    /// Transform skip: coefficients are only rescaled.
    Skip,
    /// 4x4 luma intra DST.
    Dst4,
    /// Standard integer DCT, 4..32.
    Dct,
    /// Extended multiple transforms, one kernel per axis.
    Emt { h: EmtType, v: EmtType },
}

/// Everything the transform stage needs to know about one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxDesc {
    pub log2_size: usize,
    pub kind: TxKind,
    /// Coefficients at row/column index `>= col_limit` are zero.
    pub col_limit: usize,
    /// Only the DC coefficient is non-zero.
    pub dc_only: bool,
    pub rdpcm: Option<RdpcmDir>,
    /// EMT zero-out per axis (horizontal, vertical).
    pub zero_out: (u8, u8),
}

impl TxDesc {
    pub fn new(log2_size: usize, kind: TxKind) -> Self {
        TxDesc {
            log2_size,
            kind,
            col_limit: 1 << log2_size,
            dc_only: false,
            rdpcm: None,
            zero_out: (0, 0),
        }
    }
}

/// Turns `coeffs` (row-major, `1 << desc.log2_size` square) into a residual in
/// place. Bypass blocks are left untouched.
pub fn inverse_transform<BD: BitDepth>(coeffs: &mut [i16], desc: &TxDesc, max_log2_tr_dynamic_range: u32) {
    let log2_size = desc.log2_size;
    match desc.kind {
        TxKind::Bypass => {
            if let Some(dir) = desc.rdpcm {
                transform_rdpcm(coeffs, log2_size, dir);
            }
        }
        TxKind::Skip => {
            transform_skip::<BD>(coeffs, log2_size);
            if let Some(dir) = desc.rdpcm {
                transform_rdpcm(coeffs, log2_size, dir);
            }
        }
        TxKind::Dst4 => {
            assert_eq!(log2_size, MIN_TR_LOG2, "DST is only defined for 4x4 blocks");
            transform_4x4_luma::<BD>(coeffs);
        }
        TxKind::Dct => {
            if desc.dc_only {
                idct_dc::<BD>(coeffs, log2_size);
            } else {
                idct::<BD>(coeffs, log2_size, desc.col_limit);
            }
        }
        TxKind::Emt { h, v } => {
            idct_emt::<BD>(
                coeffs,
                log2_size,
                max_log2_tr_dynamic_range,
                h,
                v,
                desc.zero_out.0,
                desc.zero_out.1,
            );
        }
    }
}

/// Copies PCM samples into `dst`, scaling them up from `pcm_bit_depth`.
pub fn put_pcm<BD: BitDepth>(dst: &mut PlaneRegionMut<'_, BD::Pixel>, samples: &[u16], pcm_bit_depth: u32) {
    assert!(pcm_bit_depth >= 1 && pcm_bit_depth <= BD::BITS);
    let shift = BD::BITS - pcm_bit_depth;
    let width = dst.width();
    for (y, src) in samples.chunks(width).take(dst.height()).enumerate() {
        for (d, &s) in dst[y].iter_mut().zip(src.iter()) {
            *d = BD::Pixel::cast_from(u32::from(s) << shift);
        }
    }
}

/// Adds a residual block onto the prediction in `dst`, saturating.
pub fn transform_add<BD: BitDepth>(dst: &mut PlaneRegionMut<'_, BD::Pixel>, coeffs: &[i16], log2_size: usize) {
    let size = 1 << log2_size;
    assert!(dst.width() >= size && dst.height() >= size);
    for (y, res) in coeffs.chunks(size).take(size).enumerate() {
        for (d, &r) in dst[y][..size].iter_mut().zip(res.iter()) {
            let v: i32 = (*d).into();
            *d = BD::clip_pixel(v + i32::from(r));
        }
    }
}

/// Residual DPCM: every sample becomes the running sum along `dir`.
pub fn transform_rdpcm(coeffs: &mut [i16], log2_size: usize, dir: RdpcmDir) {
    let size = 1 << log2_size;
    match dir {
        RdpcmDir::Vertical => {
            for y in 1..size {
                for x in 0..size {
                    coeffs[y * size + x] =
                        coeffs[y * size + x].wrapping_add(coeffs[(y - 1) * size + x]);
                }
            }
        }
        RdpcmDir::Horizontal => {
            for row in coeffs.chunks_mut(size).take(size) {
                for x in 1..size {
                    row[x] = row[x].wrapping_add(row[x - 1]);
                }
            }
        }
    }
}

pub fn transform_skip<BD: BitDepth>(coeffs: &mut [i16], log2_size: usize) {
    let size = 1 << log2_size;
    let shift = 15 - BD::BITS as i32 - log2_size as i32;
    let coeffs = &mut coeffs[..size * size];

    if shift > 0 {
        for c in coeffs.iter_mut() {
            *c = round_shift(i32::from(*c), shift as u32) as i16;
        }
    } else {
        for c in coeffs.iter_mut() {
            *c = clip_i16(i32::from(*c) << -shift);
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[inline(always)]
fn tr_4x4_luma(c: &mut [i16], base: usize, step: usize, shift: u32) {
    let s0 = i32::from(c[base]);
    let s1 = i32::from(c[base + step]);
    let s2 = i32::from(c[base + 2 * step]);
    let s3 = i32::from(c[base + 3 * step]);
    let [k0, k1, k2, _] = DST4_KERNEL;

    let c0 = s0 + s2;
    let c1 = s2 + s3;
    let c2 = s0 - s3;
    let c3 = k2 * s1;

    let add = 1 << (shift - 1);
    c[base + 2 * step] = clip_i16((k2 * (s0 - s2 + s3) + add) >> shift);
    c[base] = clip_i16((k0 * c0 + k1 * c1 + c3 + add) >> shift);
    c[base + step] = clip_i16((k1 * c2 - k0 * c1 + c3 + add) >> shift);
    c[base + 3 * step] = clip_i16((k1 * c0 + k0 * c2 - c3 + add) >> shift);
}

/// 4x4 DST used for intra luma residuals.
pub fn transform_4x4_luma<BD: BitDepth>(coeffs: &mut [i16]) {
    for i in 0..4 {
        tr_4x4_luma(coeffs, i, 4, ITX_SHIFT1);
    }

    let shift = itx_shift2::<BD>();
    for i in 0..4 {
        tr_4x4_luma(coeffs, i * 4, 1, shift);
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
#[inline(always)]
fn tr_4(src: &[i16], base: usize, sstep: usize, out: &mut [i32]) {
    let s = |k: usize| i32::from(src[base + k * sstep]);
    let e0 = 64 * s(0) + 64 * s(2);
    let e1 = 64 * s(0) - 64 * s(2);
    let o0 = 83 * s(1) + 36 * s(3);
    let o1 = 36 * s(1) - 83 * s(3);

    out[0] = e0 + o0;
    out[1] = e1 + o1;
    out[2] = e1 - o1;
    out[3] = e0 - o0;
}

/// Unscaled `n`-point inverse DCT of one line, by even/odd decomposition.
/// Odd inputs at index `>= end` are skipped.
fn tr_n(src: &[i16], base: usize, sstep: usize, n: usize, end: usize, out: &mut [i32]) {
    if n == 4 {
        tr_4(src, base, sstep, out);
        return;
    }

    let half = n >> 1;
    let row_step = MAX_TR_SIZE / n;
    let m = &*DCT_MATRIX_32;

    let mut o = [0i32; MAX_TR_SIZE / 2];
    for j in (1..end).step_by(2) {
        let s = i32::from(src[base + j * sstep]);
        if s == 0 {
            continue;
        }
        let row = &m[j * row_step];
        for (oi, &t) in o[..half].iter_mut().zip(row.iter()) {
            *oi += t * s;
        }
    }

    let sub_end = if n == MAX_TR_SIZE { end >> 1 } else { half };
    let mut e = [0i32; MAX_TR_SIZE / 2];
    tr_n(src, base, 2 * sstep, half, sub_end, &mut e);

    for i in 0..half {
        out[i] = e[i] + o[i];
        out[n - 1 - i] = e[i] - o[i];
    }
}

/// Two-pass inverse DCT of an `N x N` block, `N = 1 << log2_size` in 4..32.
///
/// `col_limit` bounds the significant coefficients: rows and columns at or
/// beyond it must be zero, and their multiplies are skipped. The odd-row bound
/// of the first pass shrinks by 4 every 4 columns, following the diagonal
/// shape of the scan that produced the block.
pub fn idct<BD: BitDepth>(coeffs: &mut [i16], log2_size: usize, col_limit: usize) {
    assert!(
        log2_size >= MIN_TR_LOG2 && log2_size <= MAX_TR_LOG2,
        "no {}-point inverse DCT",
        1 << log2_size
    );
    let n = 1 << log2_size;
    let limit = col_limit.min(n);
    let mut limit2 = (col_limit + 4).min(n);
    let mut out = [0i32; MAX_TR_SIZE];

    let add = 1 << (ITX_SHIFT1 - 1);
    for i in 0..n {
        tr_n(coeffs, i, n, n, limit2, &mut out);
        for k in 0..n {
            coeffs[i + k * n] = clip_i16((out[k] + add) >> ITX_SHIFT1);
        }
        if limit2 < n && i % 4 == 0 && i != 0 {
            limit2 = limit2.saturating_sub(4);
        }
    }

    let shift = itx_shift2::<BD>();
    let add = 1 << (shift - 1);
    for i in 0..n {
        tr_n(coeffs, i * n, 1, n, limit, &mut out);
        for k in 0..n {
            coeffs[i * n + k] = clip_i16((out[k] + add) >> shift);
        }
    }
}

/// Inverse DCT of a block whose only non-zero coefficient is DC.
pub fn idct_dc<BD: BitDepth>(coeffs: &mut [i16], log2_size: usize) {
    let n = 1 << log2_size;
    let shift = 14 - BD::BITS as i32;
    let dc = (i32::from(coeffs[0]) + 1) >> 1;
    let v = if shift > 0 {
        clip_i16(round_shift(dc, shift as u32))
    } else {
        clip_i16(dc << -shift)
    };

    for c in coeffs[..n * n].iter_mut() {
        *c = v;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use interpolate_name::interpolate_test;
    use pretty_assertions::assert_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    /// Straight matrix product reference of the two-pass DCT.
    fn idct_ref(coeffs: &[i16], n: usize, bit_depth: u32) -> Vec<i16> {
        let m = &*DCT_MATRIX_32;
        let step = 32 / n;
        let mut tmp = vec![0i16; n * n];
        for x in 0..n {
            for y in 0..n {
                let sum: i32 = (0..n)
                    .map(|k| m[k * step][y] * i32::from(coeffs[k * n + x]))
                    .sum();
                tmp[y * n + x] = clip_i16((sum + 64) >> 7);
            }
        }
        let shift = 20 - bit_depth;
        let mut out = vec![0i16; n * n];
        for y in 0..n {
            for x in 0..n {
                let sum: i32 = (0..n)
                    .map(|k| m[k * step][x] * i32::from(tmp[y * n + k]))
                    .sum();
                out[y * n + x] = clip_i16((sum + (1 << (shift - 1))) >> shift);
            }
        }
        out
    }

    fn random_block(rng: &mut ChaChaRng, n: usize, limit: usize, range: i16) -> Vec<i16> {
        let mut c = vec![0i16; n * n];
        for y in 0..limit.min(n) {
            for x in 0..limit.min(n) {
                c[y * n + x] = rng.gen_range(-range, range);
            }
        }
        c
    }

    #[interpolate_test(n4, 2)]
    #[interpolate_test(n8, 3)]
    #[interpolate_test(n16, 4)]
    #[interpolate_test(n32, 5)]
    fn idct_matches_matrix_product(log2_size: usize) {
        let n = 1 << log2_size;
        let mut rng = ChaChaRng::from_seed([7; 32]);
        for _ in 0..8 {
            let c = random_block(&mut rng, n, n, 512);
            let mut fast = c.clone();
            idct::<Depth8>(&mut fast, log2_size, n);
            assert_eq!(fast, idct_ref(&c, n, 8));

            let mut fast = c.clone();
            idct::<Depth10>(&mut fast, log2_size, n);
            assert_eq!(fast, idct_ref(&c, n, 10));
        }
    }

    #[interpolate_test(n8, 3)]
    #[interpolate_test(n16, 4)]
    #[interpolate_test(n32, 5)]
    fn col_limit_is_bit_exact(log2_size: usize) {
        let n = 1 << log2_size;
        let mut rng = ChaChaRng::from_seed([3; 32]);
        for &limit in &[1usize, 4, 8] {
            let c = random_block(&mut rng, n, limit, 1000);
            let mut full = c.clone();
            idct::<Depth8>(&mut full, log2_size, n);
            let mut limited = c.clone();
            idct::<Depth8>(&mut limited, log2_size, limit);
            assert_eq!(limited, full);
        }
    }

    #[interpolate_test(n4, 2)]
    #[interpolate_test(n8, 3)]
    #[interpolate_test(n16, 4)]
    #[interpolate_test(n32, 5)]
    fn dc_path_matches_full_transform(log2_size: usize) {
        let n = 1 << log2_size;
        for &dc in &[64i16, -64, 1, -1, 1000, -32768, 32767] {
            let mut c = vec![0i16; n * n];
            c[0] = dc;
            let mut full = c.clone();
            let mut fast = c.clone();
            idct::<Depth8>(&mut full, log2_size, n);
            idct_dc::<Depth8>(&mut fast, log2_size);
            assert_eq!(fast, full);

            let mut full = c.clone();
            let mut fast = c;
            idct::<Depth12>(&mut full, log2_size, n);
            idct_dc::<Depth12>(&mut fast, log2_size);
            assert_eq!(fast, full);
        }
    }

    #[test]
    fn dc_8x8_is_uniform() {
        let mut c = vec![0i16; 64];
        c[0] = 64;
        idct::<Depth8>(&mut c, 3, 8);
        // ((64 + 1) >> 1 + 32) >> 6
        assert!(c.iter().all(|&v| v == 1));
    }

    #[test]
    fn zero_block_gives_zero_residual() {
        for log2_size in 2..=5 {
            let n = 1 << log2_size;
            let mut c = vec![0i16; n * n];
            idct::<Depth8>(&mut c, log2_size, n);
            assert!(c.iter().all(|&v| v == 0));
            transform_skip::<Depth10>(&mut c, log2_size);
            assert!(c.iter().all(|&v| v == 0));
        }
        let mut c = vec![0i16; 16];
        transform_4x4_luma::<Depth8>(&mut c);
        assert!(c.iter().all(|&v| v == 0));
    }

    #[test]
    fn dst_matches_matrix_product() {
        // rows of the DST basis
        let k = [
            [29, 55, 74, 84],
            [74, 74, 0, -74],
            [84, -29, -74, 55],
            [55, -84, 74, -29],
        ];
        let mut rng = ChaChaRng::from_seed([11; 32]);
        let c: Vec<i16> = (0..16).map(|_| rng.gen_range(-300, 300)).collect();

        let mut tmp = [0i16; 16];
        for x in 0..4 {
            for y in 0..4 {
                let s: i32 = (0..4).map(|f| k[f][y] * i32::from(c[f * 4 + x])).sum();
                tmp[y * 4 + x] = clip_i16((s + 64) >> 7);
            }
        }
        let mut want = vec![0i16; 16];
        for y in 0..4 {
            for x in 0..4 {
                let s: i32 = (0..4).map(|f| k[f][x] * i32::from(tmp[y * 4 + f])).sum();
                want[y * 4 + x] = clip_i16((s + 2048) >> 12);
            }
        }

        let mut got = c.clone();
        transform_4x4_luma::<Depth8>(&mut got);
        assert_eq!(got, want);
    }

    #[test]
    fn skip_scales_by_depth() {
        let mut c = vec![100i16; 16];
        // 15 - 8 - 2 = 5
        transform_skip::<Depth8>(&mut c, 2);
        assert!(c.iter().all(|&v| v == (100 + 16) >> 5));

        let mut c = vec![-3i16; 32 * 32];
        // 15 - 12 - 5 = -2
        transform_skip::<Depth12>(&mut c, 5);
        assert!(c.iter().all(|&v| v == -12));
    }

    #[test]
    fn rdpcm_accumulates() {
        let mut c: Vec<i16> = vec![1; 16];
        transform_rdpcm(&mut c, 2, RdpcmDir::Horizontal);
        assert_eq!(&c[..4], &[1, 2, 3, 4]);
        assert_eq!(&c[12..], &[1, 2, 3, 4]);

        let mut c: Vec<i16> = vec![2; 16];
        transform_rdpcm(&mut c, 2, RdpcmDir::Vertical);
        assert_eq!(c[0], 2);
        assert_eq!(c[15], 8);
        assert_eq!(c[4 * 2 + 1], 6);
    }

    #[test]
    fn transform_add_saturates() {
        let mut data = vec![250u8; 8 * 4];
        let mut dst = PlaneRegionMut::from_slice(&mut data, 8, 8, 4);
        let mut res = vec![10i16; 16];
        res[1] = -300;
        transform_add::<Depth8>(&mut dst, &res, 2);
        assert_eq!(&data[..5], &[255, 0, 255, 255, 250]);
    }

    #[test]
    fn pcm_is_scaled_to_depth() {
        let mut data = vec![0u16; 16];
        let mut dst = PlaneRegionMut::from_slice(&mut data, 4, 4, 4);
        let samples: Vec<u16> = (0..16).collect();
        put_pcm::<Depth10>(&mut dst, &samples, 8);
        assert_eq!(data[5], 5 << 2);
        assert_eq!(data[15], 15 << 2);
    }

    #[test]
    #[should_panic]
    fn idct_64_is_not_standard() {
        let mut c = vec![0i16; 64 * 64];
        idct::<Depth8>(&mut c, 6, 64);
    }
}
