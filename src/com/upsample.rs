use super::plane::*;
use super::region::*;
use super::tbl::*;
use super::tracer::*;
use super::util::*;
use super::*;
use crate::api::*;

use log::*;

/* base samples are located in 1/16 sample units */
const POS_FRAC_BITS: u32 = 4;
const POS_FRAC_MASK: i64 = (1 << POS_FRAC_BITS) - 1;
/* both passes carry the 6 bit gain of the filter banks */
const UPSAMPLE_GAIN_BITS: u32 = 12;

/// Phases of the 1.5x ratio, repeating every three output samples.
const X1_5_PHASES: [usize; 3] = [0, 11, 5];
/// The scale factor of the 1.5x ratio drifts by 1/12288 per output sample and
/// moves a rounded position once the window exceeds this size.
const X1_5_MAX_WINDOW: usize = 2048;

/// Scaling relation between the base layer and the enhancement window along
/// one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleRatio {
    Generic,
    X2,
    X1_5,
}

/// Fixed-point mapping from enhancement positions to base positions along
/// one axis of one plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResampleAxis {
    /// Number of base layer samples.
    pub base_len: usize,
    /// Number of enhancement layer samples.
    pub enh_len: usize,
    /// First enhancement sample of the scaled window.
    pub start: usize,
    /// One past the last enhancement sample of the scaled window.
    pub end: usize,
    /// Sample location phase, in quarter base samples.
    pub phase: i32,
    /// Base samples per enhancement sample, 16 fractional bits.
    pub scale: i32,
    pub add: i32,
    ratio: ResampleRatio,
}

impl ResampleAxis {
    pub fn new(
        base_len: usize,
        enh_len: usize,
        start_off: usize,
        end_off: usize,
        phase: i32,
    ) -> Self {
        let start = start_off;
        let end = std::cmp::max(enh_len.saturating_sub(end_off), start + 1);
        let window = (end - start) as i64;

        let scale = (((base_len as i64) << 16) + (window >> 1)) / window;
        let add = ((4 * phase as i64) << 12) - (((phase as i64 * scale + 2) >> 2) + (1 << 11));

        let ratio = if phase != 0 {
            ResampleRatio::Generic
        } else if window == 2 * base_len as i64 {
            ResampleRatio::X2
        } else if 2 * window == 3 * base_len as i64 && window <= X1_5_MAX_WINDOW as i64 {
            ResampleRatio::X1_5
        } else {
            ResampleRatio::Generic
        };

        ResampleAxis {
            base_len,
            enh_len,
            start,
            end,
            phase,
            scale: scale as i32,
            add: add as i32,
            ratio,
        }
    }

    pub fn window(&self) -> usize {
        self.end - self.start
    }

    pub fn ratio(&self) -> ResampleRatio {
        self.ratio
    }

    /// Distance of `x` from the window start, after snapping `x` into the
    /// window.
    #[inline(always)]
    fn window_offset(&self, x: usize) -> usize {
        clip3(self.start, self.end - 1, x) - self.start
    }

    fn generic_position(&self, x: usize) -> (isize, usize) {
        let d = self.window_offset(x) as i64;
        let pos16 = (d * self.scale as i64 - self.add as i64) >> UPSAMPLE_GAIN_BITS;
        (
            (pos16 >> POS_FRAC_BITS) as isize,
            (pos16 & POS_FRAC_MASK) as usize,
        )
    }

    /// Integer base position and 1/16 phase feeding enhancement sample `x`.
    #[inline]
    pub fn position(&self, x: usize) -> (isize, usize) {
        match self.ratio {
            ResampleRatio::X2 => {
                let d = self.window_offset(x);
                ((d >> 1) as isize, (d & 1) << 3)
            }
            ResampleRatio::X1_5 => {
                let d = self.window_offset(x);
                ((2 * d / 3) as isize, X1_5_PHASES[d % 3])
            }
            ResampleRatio::Generic => self.generic_position(x),
        }
    }

    fn positions(&self, from: usize, len: usize) -> Vec<(isize, usize)> {
        (from..from + len).map(|x| self.position(x)).collect()
    }
}

/// Horizontal and vertical mapping of one plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResampleGeometry {
    pub hor: ResampleAxis,
    pub ver: ResampleAxis,
}

#[inline(always)]
fn upsample_coeffs(c: usize, phase: usize) -> &'static [i32] {
    if c == Y_C {
        &TBL_UPSAMPLE_LUMA[phase]
    } else {
        &TBL_UPSAMPLE_CHROMA[phase]
    }
}

#[inline(always)]
fn upsample_taps(c: usize) -> usize {
    if c == Y_C {
        NTAPS_LUMA
    } else {
        NTAPS_CHROMA
    }
}

/// Resamples the base plane `src` into `dst`, whose top-left sample sits at
/// (`x0`, `y0`) of the enhancement plane `c`.
///
/// Any rectangle of the enhancement plane can be produced; overlapping
/// blocks agree on their common samples.
pub fn upsample_block<B: BitDepth, E: BitDepth>(
    geom: &ResampleGeometry,
    c: usize,
    dst: &mut PlaneRegionMut<'_, E::Pixel>,
    x0: usize,
    y0: usize,
    src: &PlaneRegion<'_, B::Pixel>,
) {
    assert_eq!(src.width(), geom.hor.base_len);
    assert_eq!(src.height(), geom.ver.base_len);
    assert!(x0 + dst.width() <= geom.hor.enh_len && y0 + dst.height() <= geom.ver.enh_len);

    let (w, h) = (dst.width(), dst.height());
    if w == 0 || h == 0 {
        return;
    }

    let taps = upsample_taps(c);
    let before = (taps >> 1) as isize - 1;
    let max_col = src.width() as isize - 1;
    let max_row = src.height() as isize - 1;

    let cols = geom.hor.positions(x0, w);
    let rows = geom.ver.positions(y0, h);

    let (first_row, last_row) = rows.iter().fold((max_row, 0), |(lo, hi), &(pos, _)| {
        (
            std::cmp::min(lo, clip3(0, max_row, pos - before)),
            std::cmp::max(hi, clip3(0, max_row, pos - before + taps as isize - 1)),
        )
    });

    let shift1 = B::BITS - 8;
    let mut tmp = vec![0i32; (last_row - first_row + 1) as usize * w];
    for (r, line) in (first_row..=last_row).zip(tmp.chunks_mut(w)) {
        let samples = src.row(r as usize);
        for (out, &(pos, phase)) in line.iter_mut().zip(cols.iter()) {
            let coeff = upsample_coeffs(c, phase);
            let sum: i32 = coeff
                .iter()
                .enumerate()
                .map(|(k, &f)| {
                    let x = clip3(0, max_col, pos - before + k as isize) as usize;
                    f * i32::cast_from(samples[x])
                })
                .sum();
            *out = sum >> shift1;
        }
    }

    let shift2 = 20 - E::BITS;
    for (j, &(pos, phase)) in rows.iter().enumerate() {
        let coeff = upsample_coeffs(c, phase);
        let out = dst.row_mut(j);
        for (i, v) in out.iter_mut().enumerate() {
            let sum: i32 = coeff
                .iter()
                .enumerate()
                .map(|(k, &f)| {
                    let y = clip3(0, max_row, pos - before + k as isize) - first_row;
                    f * tmp[y as usize * w + i]
                })
                .sum();
            *v = E::clip_pixel(round_shift(sum, shift2));
        }
    }
}

/// Resamples a whole base plane into enhancement plane `c`, a strip of
/// CTU rows at a time.
pub fn upsample_plane<B: BitDepth, E: BitDepth>(
    tracer: &mut Option<Tracer>,
    geom: &ResampleGeometry,
    c: usize,
    dst: &mut Plane<E::Pixel>,
    src: &Plane<B::Pixel>,
) {
    let (width, height) = (dst.cfg.width, dst.cfg.height);
    assert_eq!(width, geom.hor.enh_len);
    assert_eq!(height, geom.ver.enh_len);

    let base = src.as_region();
    let mut y = 0;
    while y < height {
        let strip = std::cmp::min(MAX_CTU_SIZE, height - y);
        let mut region = dst.region_mut(Rect::new(0, y as isize, width, strip));
        upsample_block::<B, E>(geom, c, &mut region, 0, y, &base);
        for j in 0..strip {
            TRACE_ILR(tracer, c, y + j, region.row(j));
        }
        y += strip;
    }
}

/// Builds the inter-layer reference `dst` from the base layer picture `src`
/// and pads it for motion compensation.
pub fn upsample_frame<B: BitDepth, E: BitDepth>(
    tracer: &mut Option<Tracer>,
    cfg: &InterLayerConfig,
    dst: &mut Frame<E::Pixel>,
    src: &Frame<B::Pixel>,
) {
    let planes = if cfg.chroma_sampling == ChromaSampling::Cs400 {
        1
    } else {
        N_C
    };

    for c in 0..planes {
        assert_eq!(cfg.base_bit_depth(c), B::BITS);
        assert_eq!(cfg.enh_bit_depth(c), E::BITS);

        let geom = cfg.geometry(c);
        debug!(
            "upsample plane {}: {}x{} -> {}x{}, ratio {:?}/{:?}",
            c,
            geom.hor.base_len,
            geom.ver.base_len,
            geom.hor.window(),
            geom.ver.window(),
            geom.hor.ratio(),
            geom.ver.ratio()
        );
        upsample_plane::<B, E>(tracer, &geom, c, &mut dst.planes[c], &src.planes[c]);
        dst.planes[c].pad();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::frame::*;
    use interpolate_name::interpolate_test;
    use pretty_assertions::assert_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    fn random_plane<T: Pixel>(rng: &mut ChaChaRng, w: usize, h: usize, max: u16) -> Plane<T> {
        let samples: Vec<T> = (0..w * h)
            .map(|_| T::cast_from(rng.gen_range(0, max + 1)))
            .collect();
        Plane::from_slice(&samples, w, h, w)
    }

    fn axis_geometry(bw: usize, bh: usize, ew: usize, eh: usize) -> ResampleGeometry {
        ResampleGeometry {
            hor: ResampleAxis::new(bw, ew, 0, 0, 0),
            ver: ResampleAxis::new(bh, eh, 0, 0, 0),
        }
    }

    #[test]
    fn ratio_detection() {
        assert_eq!(ResampleAxis::new(960, 1920, 0, 0, 0).ratio(), ResampleRatio::X2);
        assert_eq!(ResampleAxis::new(1280, 1920, 0, 0, 0).ratio(), ResampleRatio::X1_5);
        assert_eq!(ResampleAxis::new(640, 1296, 8, 8, 0).ratio(), ResampleRatio::X2);
        assert_eq!(ResampleAxis::new(180, 368, 4, 4, 1).ratio(), ResampleRatio::Generic);
        assert_eq!(ResampleAxis::new(1000, 1920, 0, 0, 0).ratio(), ResampleRatio::Generic);
        assert_eq!(ResampleAxis::new(2000, 3000, 0, 0, 0).ratio(), ResampleRatio::Generic);
    }

    #[test]
    fn fast_positions_follow_generic_formula() {
        for axis in &[
            ResampleAxis::new(960, 1920, 0, 0, 0),
            ResampleAxis::new(640, 1296, 8, 8, 0),
            ResampleAxis::new(1280, 1920, 0, 0, 0),
            ResampleAxis::new(1364, 2046, 0, 0, 0),
        ] {
            assert_ne!(axis.ratio(), ResampleRatio::Generic);
            for x in 0..axis.enh_len {
                assert_eq!(axis.position(x), axis.generic_position(x), "{:?} at {}", axis, x);
            }
        }
    }

    #[test]
    fn oversized_windows_use_formula() {
        let axis = ResampleAxis::new(2000, 3000, 0, 0, 0);
        assert_eq!(axis.ratio(), ResampleRatio::Generic);
        let copy = axis;
        assert_eq!(copy.ratio(), axis.ratio());
        for x in 0..axis.enh_len {
            assert_eq!(axis.position(x), axis.generic_position(x));
        }
    }

    #[test]
    fn chroma_phase_shifts_reference_up() {
        let axis = ResampleAxis::new(180, 360, 0, 0, 1);
        assert_eq!(axis.position(0), (-1, 14));
        assert_eq!(axis.position(1), (0, 6));
    }

    #[interpolate_test(d8_8, Depth8, Depth8)]
    #[interpolate_test(d8_10, Depth8, Depth10)]
    #[interpolate_test(d10_10, Depth10, Depth10)]
    #[interpolate_test(d10_12, Depth10, Depth12)]
    #[interpolate_test(d12_16, Depth12, Depth16)]
    fn flat_plane_stays_flat<B: BitDepth, E: BitDepth>(_base: B, _enh: E) {
        let grey = 1u16 << (B::BITS - 1);
        let src = Plane::<B::Pixel>::from_slice(&vec![B::Pixel::cast_from(grey); 24 * 16], 24, 16, 24);

        for &c in &[Y_C, U_C] {
            for geom in &[
                axis_geometry(24, 16, 48, 32),
                axis_geometry(24, 16, 36, 24),
                axis_geometry(24, 16, 40, 30),
            ] {
                let (w, h) = (geom.hor.enh_len, geom.ver.enh_len);
                let mut dst = Plane::<E::Pixel>::new(w, h, 0, 0, 0, 0);
                upsample_plane::<B, E>(&mut None, geom, c, &mut dst, &src);
                for row in dst.rows_iter() {
                    for &v in row {
                        assert_eq!(i32::cast_from(v), 1 << (E::BITS - 1));
                    }
                }
            }
        }
    }

    #[test]
    fn twice_keeps_base_samples_at_even_positions() {
        let mut rng = ChaChaRng::from_seed([7; 32]);
        let src: Plane<u8> = random_plane(&mut rng, 16, 12, 255);
        let geom = axis_geometry(16, 12, 32, 24);
        let mut dst = Plane::<u8>::new(32, 24, 0, 0, 0, 0);
        upsample_plane::<Depth8, Depth8>(&mut None, &geom, Y_C, &mut dst, &src);

        for y in 0..12 {
            for x in 0..16 {
                assert_eq!(dst.p(2 * x, 2 * y), src.p(x, y));
            }
        }
    }

    #[test]
    fn depth_increase_scales_samples() {
        let mut rng = ChaChaRng::from_seed([3; 32]);
        let src: Plane<u8> = random_plane(&mut rng, 8, 8, 255);
        let geom = axis_geometry(8, 8, 16, 16);
        let mut dst = Plane::<u16>::new(16, 16, 0, 0, 0, 0);
        upsample_plane::<Depth8, Depth10>(&mut None, &geom, Y_C, &mut dst, &src);

        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(dst.p(2 * x, 2 * y), (src.p(x, y) as u16) << 2);
            }
        }
    }

    #[test]
    fn window_margins_replicate_edge_columns() {
        let mut rng = ChaChaRng::from_seed([11; 32]);
        let src: Plane<u8> = random_plane(&mut rng, 20, 10, 255);
        let geom = ResampleGeometry {
            hor: ResampleAxis::new(20, 48, 4, 4, 0),
            ver: ResampleAxis::new(10, 20, 0, 0, 0),
        };
        let mut dst = Plane::<u8>::new(48, 20, 0, 0, 0, 0);
        upsample_plane::<Depth8, Depth8>(&mut None, &geom, Y_C, &mut dst, &src);

        for row in dst.rows_iter() {
            for x in 0..4 {
                assert_eq!(row[x], row[4]);
                assert_eq!(row[47 - x], row[43]);
            }
        }
    }

    #[test]
    fn blocks_match_whole_plane() {
        let mut rng = ChaChaRng::from_seed([5; 32]);
        let src: Plane<u16> = random_plane(&mut rng, 30, 22, 1023);
        let mut cfg = InterLayerConfig::new(60, 44, 80, 60);
        cfg.window = ScaledWindow {
            left: 4,
            right: 4,
            top: 2,
            bottom: 2,
        };
        cfg.base_bit_depth_luma = 10;
        cfg.base_bit_depth_chroma = 10;
        cfg.enh_bit_depth_luma = 10;
        cfg.enh_bit_depth_chroma = 10;
        let geom = cfg.geometry(U_C);
        assert_eq!(geom.ver.ratio(), ResampleRatio::Generic);

        let mut whole = Plane::<u16>::new(40, 30, 0, 0, 0, 0);
        upsample_plane::<Depth10, Depth10>(&mut None, &geom, U_C, &mut whole, &src);

        let mut tiled = Plane::<u16>::new(40, 30, 0, 0, 0, 0);
        for &(x, y, w, h) in &[(0, 0, 13, 11), (13, 0, 27, 11), (0, 11, 40, 19)] {
            let mut region = tiled.region_mut(Rect::new(x as isize, y as isize, w, h));
            upsample_block::<Depth10, Depth10>(&geom, U_C, &mut region, x, y, &src.as_region());
        }

        for (a, b) in whole.rows_iter().zip(tiled.rows_iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn frame_upsampling_pads_planes() {
        let src = Frame::<u8>::new(16, 16, ChromaSampling::Cs420);
        let cfg = InterLayerConfig::new(16, 16, 32, 32);
        assert!(cfg.validate().is_ok());
        let mut dst = Frame::<u8>::new(32, 32, ChromaSampling::Cs420);
        upsample_frame::<Depth8, Depth8>(&mut None, &cfg, &mut dst, &src);

        let luma = &dst.planes[Y_C];
        let region = luma.as_region();
        assert_eq!(region.at(-1, -1), luma.p(0, 0));
        assert_eq!(region.at(32, 5), luma.p(31, 5));
        assert_eq!(dst.planes[V_C].p(15, 15), 128);
    }
}
