use super::plane::*;
use super::region::*;
use super::tbl::*;
use super::tracer::*;
use super::util::*;
use super::*;
use crate::api::frame::*;

/* second pass of the separable filters always drops the 6 bits of filter gain */
const MC_SHIFT2: u32 = 6;

/// Shift applied after the first filter pass, keeps intermediates in 16 bits
/// for every sample width.
#[inline(always)]
fn mc_shift1(bit_depth: u32) -> u32 {
    std::cmp::min(4, bit_depth - 8)
}

/// Shift from the intermediate representation back to samples.
#[inline(always)]
fn mc_shift3(bit_depth: u32) -> u32 {
    if bit_depth < 12 {
        14 - bit_depth
    } else {
        2
    }
}

/// Interpolation filter families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McFilter {
    /// 8-tap luma filter, quarter-sample phases.
    Qpel,
    /// 4-tap chroma filter, eighth-sample phases.
    Epel,
}

impl McFilter {
    #[inline(always)]
    fn taps(self) -> usize {
        match self {
            McFilter::Qpel => QPEL_TAPS,
            McFilter::Epel => EPEL_TAPS,
        }
    }

    #[inline(always)]
    fn extra_before(self) -> usize {
        match self {
            McFilter::Qpel => QPEL_EXTRA_BEFORE,
            McFilter::Epel => EPEL_EXTRA_BEFORE,
        }
    }

    pub fn phases(self) -> usize {
        match self {
            McFilter::Qpel => 4,
            McFilter::Epel => 8,
        }
    }

    fn coeffs(self, phase: usize) -> &'static [i32] {
        assert!(
            phase >= 1 && phase < self.phases(),
            "{:?} has no filter for phase {}",
            self,
            phase
        );
        match self {
            McFilter::Qpel => &TBL_QPEL_FILTER[phase - 1],
            McFilter::Epel => &TBL_EPEL_FILTER[phase - 1],
        }
    }
}

/// Explicit weighted prediction parameters. Index 0 applies to the buffered
/// (first) prediction, index 1 to the second one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredWeight {
    pub log2_denom: u32,
    pub weight: [i32; 2],
    pub offset: [i32; 2],
}

impl PredWeight {
    /// Weights that reproduce the default (unweighted) prediction.
    pub fn identity(log2_denom: u32) -> Self {
        PredWeight {
            log2_denom,
            weight: [1 << log2_denom; 2],
            offset: [0; 2],
        }
    }
}

#[inline(always)]
fn run_filter<T: Copy + Into<i32>>(src: &[T], start: usize, step: usize, filter: &[i32]) -> i32 {
    filter
        .iter()
        .enumerate()
        .map(|(i, &f)| f * src[start + i * step].into())
        .sum::<i32>()
}

fn put_pel<BD: BitDepth>(dst: &mut [i32], src: &PlaneRegion<'_, BD::Pixel>) {
    let shift3 = mc_shift3(BD::BITS);
    for (y, row) in src.rows_iter().enumerate() {
        let out = &mut dst[y * MAX_PB_SIZE..y * MAX_PB_SIZE + row.len()];
        for (d, &s) in out.iter_mut().zip(row) {
            *d = i32::cast_from(s) << shift3;
        }
    }
}

fn put_h<BD: BitDepth>(dst: &mut [i32], src: &PlaneRegion<'_, BD::Pixel>, filter: McFilter, mx: usize) {
    let coeffs = filter.coeffs(mx);
    let shift1 = mc_shift1(BD::BITS);
    let before = filter.extra_before() as isize;
    let (data, _) = src.raw();

    for y in 0..src.height() {
        let start = src.index_of(-before, y as isize);
        let out = &mut dst[y * MAX_PB_SIZE..y * MAX_PB_SIZE + src.width()];
        for (x, d) in out.iter_mut().enumerate() {
            *d = run_filter(data, start + x, 1, coeffs) >> shift1;
        }
    }
}

fn put_v<BD: BitDepth>(dst: &mut [i32], src: &PlaneRegion<'_, BD::Pixel>, filter: McFilter, my: usize) {
    let coeffs = filter.coeffs(my);
    let shift1 = mc_shift1(BD::BITS);
    let before = filter.extra_before() as isize;
    let (data, _) = src.raw();
    let stride = src.stride();

    for y in 0..src.height() {
        let start = src.index_of(0, y as isize - before);
        let out = &mut dst[y * MAX_PB_SIZE..y * MAX_PB_SIZE + src.width()];
        for (x, d) in out.iter_mut().enumerate() {
            *d = run_filter(data, start + x, stride, coeffs) >> shift1;
        }
    }
}

fn put_hv<BD: BitDepth>(
    dst: &mut [i32],
    src: &PlaneRegion<'_, BD::Pixel>,
    filter: McFilter,
    mx: usize,
    my: usize,
) {
    let coeffs_h = filter.coeffs(mx);
    let coeffs_v = filter.coeffs(my);
    let shift1 = mc_shift1(BD::BITS);
    let before = filter.extra_before() as isize;
    let (data, _) = src.raw();
    let (w, h) = (src.width(), src.height());
    let rows = h + filter.taps() - 1;

    let mut tmp = [0i32; (MAX_PB_SIZE + QPEL_EXTRA) * MAX_PB_SIZE];
    for r in 0..rows {
        let start = src.index_of(-before, r as isize - before);
        let out = &mut tmp[r * MAX_PB_SIZE..r * MAX_PB_SIZE + w];
        for (x, t) in out.iter_mut().enumerate() {
            *t = run_filter(data, start + x, 1, coeffs_h) >> shift1;
        }
    }

    for y in 0..h {
        let out = &mut dst[y * MAX_PB_SIZE..y * MAX_PB_SIZE + w];
        for (x, d) in out.iter_mut().enumerate() {
            *d = run_filter(&tmp[..], y * MAX_PB_SIZE + x, MAX_PB_SIZE, coeffs_v) >> MC_SHIFT2;
        }
    }
}

/// Interpolates the block covered by `src` at fractional phase `(mx, my)`
/// into the intermediate buffer `dst` (row stride [`MAX_PB_SIZE`]).
///
/// `src` must have `taps / 2` readable samples of margin on every side the
/// active filter reaches. Panics on a phase outside the filter table.
pub fn predict<BD: BitDepth>(
    dst: &mut [i32],
    src: &PlaneRegion<'_, BD::Pixel>,
    filter: McFilter,
    mx: usize,
    my: usize,
) {
    assert!(src.width() <= MAX_PB_SIZE && src.height() <= MAX_PB_SIZE);
    assert!(dst.len() >= src.height().saturating_sub(1) * MAX_PB_SIZE + src.width());

    match (mx != 0, my != 0) {
        (false, false) => put_pel::<BD>(dst, src),
        (true, false) => put_h::<BD>(dst, src, filter, mx),
        (false, true) => put_v::<BD>(dst, src, filter, my),
        (true, true) => put_hv::<BD>(dst, src, filter, mx, my),
    }
}

/// Single prediction: rounds the intermediates back to samples.
pub fn put_uni<BD: BitDepth>(dst: &mut PlaneRegionMut<'_, BD::Pixel>, src: &[i32]) {
    let shift = mc_shift3(BD::BITS);
    for y in 0..dst.height() {
        let s = &src[y * MAX_PB_SIZE..];
        for (d, &v) in dst.row_mut(y).iter_mut().zip(s) {
            *d = BD::clip_pixel(round_shift(v, shift));
        }
    }
}

/// Bi-prediction: average of the buffered prediction `src0` and `src1`.
pub fn put_bi<BD: BitDepth>(dst: &mut PlaneRegionMut<'_, BD::Pixel>, src0: &[i32], src1: &[i32]) {
    let shift = mc_shift3(BD::BITS) + 1;
    for y in 0..dst.height() {
        let s0 = &src0[y * MAX_PB_SIZE..];
        let s1 = &src1[y * MAX_PB_SIZE..];
        for ((d, &v0), &v1) in dst.row_mut(y).iter_mut().zip(s0).zip(s1) {
            *d = BD::clip_pixel(round_shift(v0 + v1, shift));
        }
    }
}

/// Explicitly weighted single prediction. The offset is given at 8-bit scale.
pub fn put_uni_w<BD: BitDepth>(
    dst: &mut PlaneRegionMut<'_, BD::Pixel>,
    src: &[i32],
    log2_denom: u32,
    weight: i32,
    offset: i32,
) {
    let log2_wd = log2_denom + mc_shift3(BD::BITS);
    let rnd = 1 << (log2_wd - 1);
    let offset = offset << (BD::BITS - 8);
    for y in 0..dst.height() {
        let s = &src[y * MAX_PB_SIZE..];
        for (d, &v) in dst.row_mut(y).iter_mut().zip(s) {
            *d = BD::clip_pixel(((v * weight + rnd) >> log2_wd) + offset);
        }
    }
}

/// Explicitly weighted bi-prediction.
pub fn put_bi_w<BD: BitDepth>(
    dst: &mut PlaneRegionMut<'_, BD::Pixel>,
    src0: &[i32],
    src1: &[i32],
    pw: &PredWeight,
) {
    let log2_wd = pw.log2_denom + mc_shift3(BD::BITS);
    let [w0, w1] = pw.weight;
    let o0 = pw.offset[0] << (BD::BITS - 8);
    let o1 = pw.offset[1] << (BD::BITS - 8);
    let rnd = (o0 + o1 + 1) << log2_wd;
    for y in 0..dst.height() {
        let s0 = &src0[y * MAX_PB_SIZE..];
        let s1 = &src1[y * MAX_PB_SIZE..];
        for ((d, &v0), &v1) in dst.row_mut(y).iter_mut().zip(s0).zip(s1) {
            *d = BD::clip_pixel((v0 * w0 + v1 * w1 + rnd) >> (log2_wd + 1));
        }
    }
}

/// Moves a block origin that lies entirely in the replicated margin back to
/// the closest position whose filter support still fits in the allocation.
/// The fetched samples are unchanged since the margin repeats the edge.
fn clamp_ref_origin(
    cfg: &PlaneConfig,
    x: isize,
    y: isize,
    w: usize,
    h: usize,
    filter: McFilter,
) -> (isize, isize) {
    let before = filter.extra_before() as isize;
    let after = (filter.taps() - 1) as isize - before;
    let right = (cfg.stride - cfg.xorigin) as isize;
    let bottom = (cfg.alloc_height - cfg.yorigin) as isize;
    (
        clip3(before - cfg.xorigin as isize, right - w as isize - after, x),
        clip3(before - cfg.yorigin as isize, bottom - h as isize - after, y),
    )
}

/// Luma motion compensation of the `w`x`h` block at `(x, y)`, displaced by
/// `mv` in quarter samples, into the intermediate buffer `dst`.
///
/// `reference` must be padded with at least `w + 7` samples on each side.
pub fn mc_luma<BD: BitDepth>(
    dst: &mut [i32],
    reference: &Plane<BD::Pixel>,
    x: isize,
    y: isize,
    w: usize,
    h: usize,
    mv: [i32; 2],
) {
    let mx = (mv[0] & 3) as usize;
    let my = (mv[1] & 3) as usize;
    let (rx, ry) = clamp_ref_origin(
        &reference.cfg,
        x + (mv[0] >> 2) as isize,
        y + (mv[1] >> 2) as isize,
        w,
        h,
        McFilter::Qpel,
    );
    let src = reference.region(Rect::new(rx, ry, w, h));
    predict::<BD>(dst, &src, McFilter::Qpel, mx, my);
}

/// Chroma counterpart of [`mc_luma`]. `(x, y)` is in chroma samples and `mv`
/// is the luma vector, whose precision grows with the plane decimation.
pub fn mc_chroma<BD: BitDepth>(
    dst: &mut [i32],
    reference: &Plane<BD::Pixel>,
    x: isize,
    y: isize,
    w: usize,
    h: usize,
    mv: [i32; 2],
) {
    let (xdec, ydec) = (reference.cfg.xdec, reference.cfg.ydec);
    let frac_x = 2 + xdec as i32;
    let frac_y = 2 + ydec as i32;
    let mx = ((mv[0] & ((1 << frac_x) - 1)) << (1 - xdec)) as usize;
    let my = ((mv[1] & ((1 << frac_y) - 1)) << (1 - ydec)) as usize;
    let (rx, ry) = clamp_ref_origin(
        &reference.cfg,
        x + (mv[0] >> frac_x) as isize,
        y + (mv[1] >> frac_y) as isize,
        w,
        h,
        McFilter::Epel,
    );
    let src = reference.region(Rect::new(rx, ry, w, h));
    predict::<BD>(dst, &src, McFilter::Epel, mx, my);
}

/// Final combination stage of a prediction block: picks uni/bi and weighted
/// or default rounding depending on what is supplied.
pub fn mc_combine<BD: BitDepth>(
    tracer: &mut Option<Tracer>,
    ch_type: usize,
    dst: &mut PlaneRegionMut<'_, BD::Pixel>,
    pred0: &[i32],
    pred1: Option<&[i32]>,
    weight: Option<&PredWeight>,
) {
    match (pred1, weight) {
        (None, None) => put_uni::<BD>(dst, pred0),
        (Some(pred1), None) => put_bi::<BD>(dst, pred0, pred1),
        (None, Some(pw)) => put_uni_w::<BD>(dst, pred0, pw.log2_denom, pw.weight[0], pw.offset[0]),
        (Some(pred1), Some(pw)) => put_bi_w::<BD>(dst, pred0, pred1, pw),
    }

    TRACE_PRED(tracer, ch_type, &dst.as_const());
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::*;
    use interpolate_name::interpolate_test;
    use pretty_assertions::assert_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    const PB_BUF: usize = MAX_PB_SIZE * MAX_PB_SIZE;

    fn random_plane<BD: BitDepth>(rng: &mut ChaChaRng, w: usize, h: usize) -> Plane<BD::Pixel> {
        let mut p = Plane::new(w, h, 0, 0, FRAME_PAD_LUMA, FRAME_PAD_LUMA);
        for y in 0..h {
            for v in p.row_mut(y) {
                *v = BD::Pixel::cast_from(rng.gen_range(0, BD::max_value() + 1));
            }
        }
        p.pad();
        p
    }

    #[test]
    fn integer_phase_is_scaled_copy() {
        let mut rng = ChaChaRng::from_seed([7; 32]);
        let p = random_plane::<Depth8>(&mut rng, 16, 16);
        let src = p.region(Rect::new(4, 4, 8, 8));
        let mut tmp = vec![0i32; PB_BUF];
        predict::<Depth8>(&mut tmp, &src, McFilter::Qpel, 0, 0);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(tmp[y * MAX_PB_SIZE + x], i32::from(src[y][x]) << 6);
            }
        }

        let mut out = vec![0u8; 64];
        put_uni::<Depth8>(&mut PlaneRegionMut::from_slice(&mut out, 8, 8, 8), &tmp);
        for y in 0..8 {
            assert_eq!(&out[y * 8..y * 8 + 8], &src[y]);
        }
    }

    #[interpolate_test(qpel_8, Depth8, McFilter::Qpel)]
    #[interpolate_test(qpel_10, Depth10, McFilter::Qpel)]
    #[interpolate_test(qpel_12, Depth12, McFilter::Qpel)]
    #[interpolate_test(qpel_14, Depth14, McFilter::Qpel)]
    #[interpolate_test(qpel_16, Depth16, McFilter::Qpel)]
    #[interpolate_test(epel_8, Depth8, McFilter::Epel)]
    #[interpolate_test(epel_10, Depth10, McFilter::Epel)]
    #[interpolate_test(epel_16, Depth16, McFilter::Epel)]
    fn flat_stays_flat<BD: BitDepth>(_bd: BD, filter: McFilter) {
        let v = BD::max_value() / 3;
        let mut p = Plane::<BD::Pixel>::new(24, 24, 0, 0, 8, 8);
        for y in 0..24 {
            for s in p.row_mut(y) {
                *s = BD::Pixel::cast_from(v);
            }
        }
        p.pad();
        let src = p.region(Rect::new(4, 4, 16, 16));
        let mut tmp = vec![0i32; PB_BUF];
        let mut out = vec![BD::Pixel::cast_from(0u8); 16 * 16];
        for mx in 0..filter.phases() {
            for my in 0..filter.phases() {
                predict::<BD>(&mut tmp, &src, filter, mx, my);
                put_uni::<BD>(&mut PlaneRegionMut::from_slice(&mut out, 16, 16, 16), &tmp);
                assert!(
                    out.iter().all(|&s| i32::cast_from(s) == v),
                    "phase ({}, {}) moved a flat block",
                    mx,
                    my
                );
            }
        }
    }

    #[test]
    fn half_sample_of_ramp() {
        let mut p = Plane::<u8>::new(32, 8, 0, 0, 8, 8);
        for y in 0..8 {
            for (x, s) in p.row_mut(y).iter_mut().enumerate() {
                *s = (x * 4) as u8;
            }
        }
        let src = p.region(Rect::new(8, 2, 8, 4));
        let mut tmp = vec![0i32; PB_BUF];
        let mut out = vec![0u8; 32];
        predict::<Depth8>(&mut tmp, &src, McFilter::Qpel, 2, 0);
        put_uni::<Depth8>(&mut PlaneRegionMut::from_slice(&mut out, 8, 8, 4), &tmp);
        for y in 0..4 {
            let expected: Vec<u8> = (8..16).map(|x| (x * 4 + 2) as u8).collect();
            assert_eq!(&out[y * 8..y * 8 + 8], &expected[..]);
        }
    }

    fn weighted_identity<BD: BitDepth>(filter: McFilter) {
        let mut rng = ChaChaRng::from_seed([3; 32]);
        let p = random_plane::<BD>(&mut rng, 32, 32);
        let mut tmp0 = vec![0i32; PB_BUF];
        let mut tmp1 = vec![0i32; PB_BUF];
        let zero = BD::Pixel::cast_from(0u8);

        for &(w, h) in &[(4usize, 4usize), (8, 16), (16, 8), (32, 32)] {
            for mx in 0..filter.phases() {
                for my in 0..filter.phases() {
                    let src0 = p.region(Rect::new(0, 0, w, h));
                    let src1 = p.region(Rect::new(1, 2, w, h));
                    predict::<BD>(&mut tmp0, &src0, filter, mx, my);
                    predict::<BD>(&mut tmp1, &src1, filter, my, mx);

                    for denom in 0..8 {
                        let pw = PredWeight::identity(denom);
                        let mut a = vec![zero; w * h];
                        let mut b = vec![zero; w * h];
                        put_uni::<BD>(&mut PlaneRegionMut::from_slice(&mut a, w, w, h), &tmp0);
                        put_uni_w::<BD>(
                            &mut PlaneRegionMut::from_slice(&mut b, w, w, h),
                            &tmp0,
                            pw.log2_denom,
                            pw.weight[0],
                            pw.offset[0],
                        );
                        assert_eq!(a, b);

                        put_bi::<BD>(&mut PlaneRegionMut::from_slice(&mut a, w, w, h), &tmp0, &tmp1);
                        put_bi_w::<BD>(
                            &mut PlaneRegionMut::from_slice(&mut b, w, w, h),
                            &tmp0,
                            &tmp1,
                            &pw,
                        );
                        assert_eq!(a, b);
                    }
                }
            }
        }
    }

    #[test]
    fn identity_weights_match_default_prediction() {
        weighted_identity::<Depth8>(McFilter::Qpel);
        weighted_identity::<Depth10>(McFilter::Epel);
        weighted_identity::<Depth12>(McFilter::Qpel);
        weighted_identity::<Depth16>(McFilter::Epel);
    }

    fn saturation_fuzz<BD: BitDepth>() {
        let mut rng = ChaChaRng::from_seed([0x5a; 32]);
        let max = BD::max_value();
        let mut p = Plane::<BD::Pixel>::new(32, 32, 0, 0, 16, 16);
        for y in 0..32 {
            for s in p.row_mut(y) {
                *s = BD::Pixel::cast_from(if rng.gen::<bool>() { max } else { 0 });
            }
        }
        p.pad();

        let mut tmp0 = vec![0i32; PB_BUF];
        let mut tmp1 = vec![0i32; PB_BUF];
        let mut out = vec![BD::Pixel::cast_from(0u8); 16 * 16];
        for _ in 0..64 {
            let filter = if rng.gen::<bool>() { McFilter::Qpel } else { McFilter::Epel };
            let (mx, my) = (rng.gen_range(0, filter.phases()), rng.gen_range(0, filter.phases()));
            predict::<BD>(&mut tmp0, &p.region(Rect::new(4, 4, 16, 16)), filter, mx, my);
            predict::<BD>(&mut tmp1, &p.region(Rect::new(8, 2, 16, 16)), filter, my, mx);
            let pw = PredWeight {
                log2_denom: rng.gen_range(0, 8),
                weight: [rng.gen_range(-128, 128), rng.gen_range(-128, 128)],
                offset: [rng.gen_range(-128, 128), rng.gen_range(-128, 128)],
            };
            for &(bi, weighted) in &[(false, false), (true, false), (false, true), (true, true)] {
                mc_combine::<BD>(
                    &mut None,
                    Y_C,
                    &mut PlaneRegionMut::from_slice(&mut out, 16, 16, 16),
                    &tmp0,
                    if bi { Some(&tmp1[..]) } else { None },
                    if weighted { Some(&pw) } else { None },
                );
                assert!(out.iter().all(|&s| i32::cast_from(s) >= 0 && i32::cast_from(s) <= max));
            }
        }
    }

    #[test]
    fn combination_saturates() {
        saturation_fuzz::<Depth8>();
        saturation_fuzz::<Depth10>();
        saturation_fuzz::<Depth14>();
        saturation_fuzz::<Depth16>();
    }

    #[test]
    #[should_panic]
    fn qpel_phase_out_of_range() {
        let p = Plane::<u8>::new(16, 16, 0, 0, 8, 8);
        let mut tmp = vec![0i32; PB_BUF];
        predict::<Depth8>(&mut tmp, &p.region(Rect::new(0, 0, 4, 4)), McFilter::Qpel, 4, 0);
    }

    #[test]
    fn far_motion_vector_reads_replicated_edge() {
        let mut rng = ChaChaRng::from_seed([9; 32]);
        let p = random_plane::<Depth8>(&mut rng, 16, 16);
        let mut tmp = vec![0i32; PB_BUF];
        mc_luma::<Depth8>(&mut tmp, &p, 0, 0, 8, 8, [-4000, -4000]);
        let corner = i32::from(p.p(0, 0)) << 6;
        for y in 0..8 {
            assert!(tmp[y * MAX_PB_SIZE..y * MAX_PB_SIZE + 8].iter().all(|&v| v == corner));
        }

        mc_luma::<Depth8>(&mut tmp, &p, 8, 8, 8, 8, [4001, 4003]);
        let corner = i32::from(p.p(15, 15)) << 6;
        for y in 0..8 {
            assert!(tmp[y * MAX_PB_SIZE..y * MAX_PB_SIZE + 8].iter().all(|&v| v == corner));
        }
    }

    #[test]
    fn chroma_vector_uses_eighth_samples() {
        let mut rng = ChaChaRng::from_seed([11; 32]);
        let mut frame = Frame::<u8>::new(32, 32, ChromaSampling::Cs420);
        for y in 0..16 {
            for s in frame.planes[U_C].row_mut(y) {
                *s = rng.gen();
            }
        }
        frame.pad();
        let plane = &frame.planes[U_C];

        let mut a = vec![0i32; PB_BUF];
        let mut b = vec![0i32; PB_BUF];
        // 11/8 chroma samples right, 5/8 down
        mc_chroma::<Depth8>(&mut a, plane, 2, 2, 4, 4, [11, 5]);
        predict::<Depth8>(&mut b, &plane.region(Rect::new(3, 2, 4, 4)), McFilter::Epel, 3, 5);
        assert_eq!(a, b);
    }
}
